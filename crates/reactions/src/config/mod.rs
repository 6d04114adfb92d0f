//! Channel mount options and the TOML file that lists them.

use std::fmt;
use std::path::{Path, PathBuf};

use pulse_surface::SurfaceRef;
use serde::Deserialize;


/// Channel used when a caller names none.
pub const DEFAULT_CHANNEL: &str = "default";
/// Display capacity used when a mount names none.
pub const DEFAULT_MAX_VISIBLE: usize = 4;
/// Nominal pill lifetime used when a mount names none.
pub const DEFAULT_DURATION_MS: u64 = 4800;

/// Settings for mounting one channel.
///
/// Serialized keys are camelCase (`containerId`, `maxVisible`, `durationMs`);
/// snake_case spellings are accepted too. The direct `container` reference
/// only exists in code.
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MountOptions {
	channel: Option<String>,
	#[serde(skip)]
	container: Option<SurfaceRef>,
	#[serde(alias = "container_id")]
	container_id: Option<String>,
	#[serde(alias = "max_visible")]
	max_visible: Option<usize>,
	#[serde(alias = "duration_ms")]
	duration_ms: Option<u64>,
}

impl MountOptions {
	/// Options for `channel` with every other setting defaulted.
	pub fn new(channel: impl Into<String>) -> Self {
		Self {
			channel: Some(channel.into()),
			..Self::default()
		}
	}

	/// Mounts onto `surface` directly. Takes precedence over a container id.
	#[must_use]
	pub fn container(mut self, surface: SurfaceRef) -> Self {
		self.container = Some(surface);
		self
	}

	/// Mounts onto the surface registered under `id` in the registry's
	/// directory.
	#[must_use]
	pub fn container_id(mut self, id: impl Into<String>) -> Self {
		self.container_id = Some(id.into());
		self
	}

	#[must_use]
	pub fn max_visible(mut self, max: usize) -> Self {
		self.max_visible = Some(max);
		self
	}

	#[must_use]
	pub fn duration_ms(mut self, millis: u64) -> Self {
		self.duration_ms = Some(millis);
		self
	}

	/// Channel name, `"default"` when unset or empty.
	pub fn channel_name(&self) -> &str {
		self.channel.as_deref().filter(|c| !c.is_empty()).unwrap_or(DEFAULT_CHANNEL)
	}

	pub(crate) fn direct_container(&self) -> Option<&SurfaceRef> {
		self.container.as_ref()
	}

	pub(crate) fn container_key(&self) -> Option<&str> {
		self.container_id.as_deref().filter(|id| !id.is_empty())
	}

	/// Display capacity; zero counts as unset.
	pub fn resolved_max_visible(&self) -> usize {
		self.max_visible.filter(|&n| n > 0).unwrap_or(DEFAULT_MAX_VISIBLE)
	}

	/// Nominal pill lifetime; zero counts as unset.
	pub fn resolved_duration_ms(&self) -> u64 {
		self.duration_ms.filter(|&ms| ms > 0).unwrap_or(DEFAULT_DURATION_MS)
	}
}

impl fmt::Debug for MountOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MountOptions")
			.field("channel", &self.channel)
			.field("container", &self.container.is_some())
			.field("container_id", &self.container_id)
			.field("max_visible", &self.max_visible)
			.field("duration_ms", &self.duration_ms)
			.finish()
	}
}

/// Channels to mount at startup, one `[[channel]]` table each:
///
/// ```toml
/// [[channel]]
/// channel = "alerts"
/// containerId = "alerts-strip"
/// maxVisible = 2
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PulseConfig {
	#[serde(default, rename = "channel")]
	pub channels: Vec<MountOptions>,
}

impl PulseConfig {
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&source)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid pulse config: {0}")]
	Parse(#[from] toml::de::Error),
}
