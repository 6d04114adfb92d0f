//! Turns a novel reaction into a pill.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use pulse_surface::{Motion, Pill};
use rand::Rng;

use crate::Reaction;
use crate::reaction::present;


/// Emoji shown when a reaction carries none.
pub const DEFAULT_EMOJI: &str = "✨";
/// Label shown when a reaction has neither label nor title.
pub const DEFAULT_LABEL: &str = "Fresh feedback";
/// Joins the parts of a pill's meta line.
pub const META_SEPARATOR: &str = " · ";

const DRIFT_RANGE_PX: f32 = 13.0;
const DURATION_JITTER_MS: i64 = 450;
const MIN_DURATION_MS: i64 = 3200;

/// Builds the pill for `reaction` tagged with its dedup `key`.
pub(crate) fn build_pill(key: String, reaction: &Reaction, duration_ms: u64, rng: &mut impl Rng) -> Pill {
	let label = primary_label(reaction);
	let meta = meta_line(reaction, label);
	let emoji = present(&reaction.emoji).unwrap_or(DEFAULT_EMOJI);
	Pill::new(key, emoji, label)
		.with_meta(meta)
		.with_motion(motion(duration_ms, rng))
}

pub(crate) fn primary_label(reaction: &Reaction) -> &str {
	present(&reaction.label)
		.or_else(|| present(&reaction.title))
		.unwrap_or(DEFAULT_LABEL)
}

/// Distinct title, humanized question set and local time of day, in that
/// order, joined by [`META_SEPARATOR`].
pub(crate) fn meta_line(reaction: &Reaction, label: &str) -> Option<String> {
	let mut parts = Vec::with_capacity(3);
	let title = present(&reaction.title);

	if let Some(title) = title
		&& title != label
	{
		parts.push(title.to_string());
	}

	if let Some(question_set) = present(&reaction.question_set) {
		let human = humanize(question_set);
		if title.is_none_or(|title| title.to_lowercase() != human.to_lowercase()) {
			parts.push(human);
		}
	}

	if let Some(time) = present(&reaction.timestamp).and_then(time_of_day) {
		parts.push(time);
	}

	(!parts.is_empty()).then(|| parts.join(META_SEPARATOR))
}

pub(crate) fn humanize(question_set: &str) -> String {
	question_set.replace('_', " ")
}

/// Formats `timestamp` as a local `HH:MM`, or `None` if it does not parse.
pub(crate) fn time_of_day(timestamp: &str) -> Option<String> {
	let Some(instant) = parse_instant(timestamp) else {
		tracing::trace!(timestamp, "omitting unparseable reaction time");
		return None;
	};
	Some(instant.format("%H:%M").to_string())
}

/// Accepts RFC 3339 with an offset, a naive ISO-8601 date-time (taken as
/// local time) or a bare date (taken as UTC midnight).
fn parse_instant(timestamp: &str) -> Option<DateTime<Local>> {
	let timestamp = timestamp.trim();
	if let Ok(instant) = DateTime::parse_from_rfc3339(timestamp) {
		return Some(instant.with_timezone(&Local));
	}
	let naive = timestamp
		.parse::<NaiveDateTime>()
		.or_else(|_| NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S%.f"))
		.ok();
	if let Some(naive) = naive {
		return Local.from_local_datetime(&naive).earliest();
	}
	let date = timestamp.parse::<NaiveDate>().ok()?;
	let midnight = date.and_hms_opt(0, 0, 0)?;
	Some(midnight.and_utc().with_timezone(&Local))
}

/// Samples drift in `[-13, 13]` px and a duration of `duration_ms ± 450`,
/// never shorter than 3200 ms.
pub(crate) fn motion(duration_ms: u64, rng: &mut impl Rng) -> Motion {
	let drift_px = rng.random_range(-DRIFT_RANGE_PX..=DRIFT_RANGE_PX);
	let jitter = rng.random_range(-DURATION_JITTER_MS..=DURATION_JITTER_MS);
	let base = i64::try_from(duration_ms).unwrap_or(i64::MAX);
	let millis = base.saturating_add(jitter).max(MIN_DURATION_MS);
	Motion {
		drift_px,
		duration: Duration::from_millis(millis.unsigned_abs()),
	}
}
