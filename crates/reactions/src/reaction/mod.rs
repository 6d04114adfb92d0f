//! Reaction records as delivered by the host and their dedup identifiers.

use rand::RngCore;
use serde::{Deserialize, Deserializer};
use serde_json::Value;


/// One externally sourced feedback event.
///
/// Every field is optional. Scalar JSON values (numbers, `true`) are
/// normalised to strings; `null`, `false` and empty strings decode as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Reaction {
	#[serde(deserialize_with = "lenient_string")]
	pub id: Option<String>,
	#[serde(deserialize_with = "lenient_string")]
	pub emoji: Option<String>,
	#[serde(deserialize_with = "lenient_string")]
	pub label: Option<String>,
	#[serde(deserialize_with = "lenient_string")]
	pub title: Option<String>,
	#[serde(deserialize_with = "lenient_string")]
	pub question_set: Option<String>,
	#[serde(deserialize_with = "lenient_string")]
	pub timestamp: Option<String>,
	#[serde(deserialize_with = "lenient_string")]
	pub response_key: Option<String>,
	#[serde(deserialize_with = "lenient_string")]
	pub value: Option<String>,
}

impl Reaction {
	/// Creates a reaction carrying only an explicit identifier.
	pub fn with_id(id: impl Into<String>) -> Self {
		Self {
			id: Some(id.into()),
			..Self::default()
		}
	}

	/// Returns the deterministic part of the dedup identifier: the explicit
	/// id, else the present parts of timestamp, response key and value
	/// joined with `:`.
	pub fn stable_key(&self) -> Option<String> {
		if let Some(id) = present(&self.id) {
			return Some(id.to_string());
		}
		let parts: Vec<&str> = [&self.timestamp, &self.response_key, &self.value]
			.into_iter()
			.filter_map(present)
			.collect();
		(!parts.is_empty()).then(|| parts.join(":"))
	}

	/// Returns the dedup identifier, drawing a random token from `rng` when
	/// the record carries nothing to derive one from.
	pub(crate) fn identifier(&self, rng: &mut impl RngCore) -> String {
		self.stable_key().unwrap_or_else(|| random_token(rng))
	}

	/// Decodes one dynamic feed entry. Falsy and non-object entries yield
	/// `None`.
	pub(crate) fn from_entry(entry: &Value) -> Option<Self> {
		if !is_truthy(entry) {
			return None;
		}
		if !entry.is_object() {
			tracing::debug!(kind = value_kind(entry), "skipping non-object reaction entry");
			return None;
		}
		match Self::deserialize(entry) {
			Ok(reaction) => Some(reaction),
			Err(error) => {
				tracing::debug!(%error, "skipping undecodable reaction entry");
				None
			}
		}
	}
}

/// Envelope served by the reaction endpoint: `{"reactions": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReactionFeed {
	#[serde(default)]
	pub reactions: Vec<Value>,
}

impl ReactionFeed {
	pub fn from_json_str(body: &str) -> Result<Self, FeedError> {
		Ok(serde_json::from_str(body)?)
	}

	/// Decoded records, skipping falsy and malformed entries.
	pub fn records(&self) -> impl Iterator<Item = Reaction> + '_ {
		self.reactions.iter().filter_map(Reaction::from_entry)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
	#[error("malformed reaction feed: {0}")]
	Json(#[from] serde_json::Error),
}

/// JavaScript-style truthiness of a feed entry.
pub(crate) fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

pub(crate) fn present(field: &Option<String>) -> Option<&str> {
	field.as_deref().filter(|s| !s.is_empty())
}

fn random_token(rng: &mut impl RngCore) -> String {
	let mut bytes = [0u8; 16];
	rng.fill_bytes(&mut bytes);
	uuid::Builder::from_random_bytes(bytes).into_uuid().simple().to_string()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::String(s)) if !s.is_empty() => Some(s),
		Some(Value::Number(n)) => Some(number_string(&n)),
		Some(Value::Bool(true)) => Some("true".to_string()),
		_ => None,
	})
}

/// Integral floats print without a fraction, so `3.0` keys the same as `3`.
fn number_string(n: &serde_json::Number) -> String {
	match n.as_f64() {
		Some(f) if !n.is_i64() && !n.is_u64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f + 0.0),
		_ => n.to_string(),
	}
}
