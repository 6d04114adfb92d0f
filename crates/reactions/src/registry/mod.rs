//! Channel registry: `mount` configures channels, `ingest` renders reactions.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use pulse_surface::{SurfaceRef, WeakSurfaceRef};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{DEFAULT_CHANNEL, MountOptions, PulseConfig};
use crate::{Clock, Reaction, ReactionFeed, SeenCache, SurfaceDirectory, SystemClock, render};

#[cfg(test)]
mod tests;

/// Why a mount was ignored.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
	#[error("mount options are missing")]
	MissingOptions,
	#[error("neither a container nor a container id was given")]
	NoContainer,
	#[error("no surface is registered under container id `{0}`")]
	UnknownContainer(String),
	#[error("invalid mount options: {0}")]
	Decode(#[from] serde_json::Error),
}

/// Display state of one mounted channel.
pub struct ChannelContext {
	/// Borrowed from the host; replaced on remount.
	surface: SurfaceRef,
	max_visible: usize,
	duration_ms: u64,
	seen: SeenCache,
}

impl ChannelContext {
	fn new(surface: SurfaceRef, max_visible: usize, duration_ms: u64) -> Self {
		Self {
			surface,
			max_visible,
			duration_ms,
			seen: SeenCache::new(),
		}
	}

	pub fn surface(&self) -> &SurfaceRef {
		&self.surface
	}

	pub fn max_visible(&self) -> usize {
		self.max_visible
	}

	pub fn duration_ms(&self) -> u64 {
		self.duration_ms
	}

	pub fn seen(&self) -> &SeenCache {
		&self.seen
	}

	/// Appends the pill for `reaction`, evicting the oldest pills while the
	/// surface is at capacity. Returns false if the surface was busy.
	fn render(&self, key: String, reaction: &Reaction, rng: &mut StdRng) -> bool {
		let mut pill = render::build_pill(key.clone(), reaction, self.duration_ms, rng);
		let weak: WeakSurfaceRef = Rc::downgrade(&self.surface);
		let finished_key = key.clone();
		pill.on_finish(move || {
			let Some(surface) = weak.upgrade() else {
				return;
			};
			if let Ok(mut surface) = surface.try_borrow_mut() {
				surface.remove_child(&finished_key);
			}
		});

		let Ok(mut surface) = self.surface.try_borrow_mut() else {
			tracing::debug!(key = %key, "surface busy, dropping pill");
			return false;
		};
		while surface.child_count() >= self.max_visible {
			let Some(evicted) = surface.remove_first_child() else {
				break;
			};
			tracing::trace!(evicted = evicted.key(), "evicted oldest pill");
		}
		tracing::trace!(key = %key, "rendering reaction pill");
		surface.append_child(pill);
		true
	}
}

impl fmt::Debug for ChannelContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChannelContext")
			.field("max_visible", &self.max_visible)
			.field("duration_ms", &self.duration_ms)
			.field("seen", &self.seen.len())
			.finish_non_exhaustive()
	}
}

/// Owns every mounted channel for the lifetime of the host.
///
/// Single-threaded: surfaces are shared through `Rc<RefCell<_>>` and all
/// entry points run to completion.
pub struct ChannelRegistry {
	channels: HashMap<String, ChannelContext>,
	directory: SurfaceDirectory,
	clock: Box<dyn Clock>,
	rng: StdRng,
}

impl Default for ChannelRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl ChannelRegistry {
	/// Creates an empty registry using the wall clock and OS-seeded jitter.
	pub fn new() -> Self {
		Self {
			channels: HashMap::new(),
			directory: SurfaceDirectory::new(),
			clock: Box::new(SystemClock),
			rng: StdRng::from_os_rng(),
		}
	}

	#[must_use]
	pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
		self.clock = Box::new(clock);
		self
	}

	/// Replaces the randomness source used for jitter and fallback ids.
	#[must_use]
	pub fn with_rng(mut self, rng: StdRng) -> Self {
		self.rng = rng;
		self
	}

	#[must_use]
	pub fn with_directory(mut self, directory: SurfaceDirectory) -> Self {
		self.directory = directory;
		self
	}

	pub fn directory(&self) -> &SurfaceDirectory {
		&self.directory
	}

	pub fn directory_mut(&mut self) -> &mut SurfaceDirectory {
		&mut self.directory
	}

	pub fn channel(&self, name: &str) -> Option<&ChannelContext> {
		self.channels.get(name)
	}

	/// Names of mounted channels, sorted.
	pub fn channel_names(&self) -> Vec<&str> {
		let mut names: Vec<_> = self.channels.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Mounts or reconfigures a channel. Invalid options are logged and
	/// ignored.
	pub fn mount(&mut self, options: &MountOptions) {
		if let Err(error) = self.try_mount(options) {
			tracing::debug!(channel = options.channel_name(), %error, "ignoring mount");
		}
	}

	/// Mounts or reconfigures a channel.
	///
	/// A remount swaps the surface and display settings but keeps the seen
	/// cache. Pills already on the previous surface are left there.
	pub fn try_mount(&mut self, options: &MountOptions) -> Result<(), MountError> {
		let surface = match (options.direct_container(), options.container_key()) {
			(Some(surface), _) => Rc::clone(surface),
			(None, Some(id)) => self
				.directory
				.resolve(id)
				.ok_or_else(|| MountError::UnknownContainer(id.to_string()))?,
			(None, None) => return Err(MountError::NoContainer),
		};

		let name = options.channel_name();
		let max_visible = options.resolved_max_visible();
		let duration_ms = options.resolved_duration_ms();

		if let Some(context) = self.channels.get_mut(name) {
			context.surface = surface;
			context.max_visible = max_visible;
			context.duration_ms = duration_ms;
			tracing::debug!(channel = name, max_visible, duration_ms, seen = context.seen.len(), "remounted channel");
		} else {
			self.channels
				.insert(name.to_string(), ChannelContext::new(surface, max_visible, duration_ms));
			tracing::debug!(channel = name, max_visible, duration_ms, "mounted channel");
		}
		Ok(())
	}

	/// Mounts from dynamic options. `null` and non-objects are ignored.
	pub fn mount_value(&mut self, options: &Value) {
		if let Err(error) = self.try_mount_value(options) {
			tracing::debug!(%error, "ignoring mount");
		}
	}

	fn try_mount_value(&mut self, options: &Value) -> Result<(), MountError> {
		if !options.is_object() {
			return Err(MountError::MissingOptions);
		}
		let options = MountOptions::deserialize(options)?;
		self.try_mount(&options)
	}

	/// Mounts every channel listed in `config`.
	pub fn mount_all(&mut self, config: &PulseConfig) {
		for options in &config.channels {
			self.mount(options);
		}
	}

	/// Renders each reaction not yet seen on `channel`, in order. Returns the
	/// number of pills rendered.
	///
	/// Does nothing if the channel was never mounted.
	pub fn ingest(&mut self, channel: Option<&str>, reactions: &[Reaction]) -> usize {
		if reactions.is_empty() {
			return 0;
		}
		self.ingest_records(channel, reactions)
	}

	/// Like [`Self::ingest`] for a dynamic payload. Non-arrays are ignored;
	/// falsy and non-object entries are skipped.
	pub fn ingest_value(&mut self, channel: Option<&str>, payload: &Value) -> usize {
		let Some(entries) = payload.as_array() else {
			tracing::debug!(channel = channel_or_default(channel), "ignoring non-array reaction payload");
			return 0;
		};
		if entries.is_empty() {
			tracing::trace!(channel = channel_or_default(channel), "ignoring empty reaction payload");
			return 0;
		}
		self.ingest_records(channel, entries.iter().filter_map(Reaction::from_entry))
	}

	/// Ingests every decodable record of a feed envelope.
	pub fn ingest_feed(&mut self, channel: Option<&str>, feed: &ReactionFeed) -> usize {
		self.ingest_records(channel, feed.records())
	}

	fn ingest_records<R>(&mut self, channel: Option<&str>, records: impl IntoIterator<Item = R>) -> usize
	where
		R: std::borrow::Borrow<Reaction>,
	{
		let name = channel_or_default(channel);
		let Some(context) = self.channels.get_mut(name) else {
			tracing::debug!(channel = name, "ignoring reactions for unmounted channel");
			return 0;
		};

		let mut rendered = 0;
		for record in records {
			let reaction: &Reaction = std::borrow::Borrow::borrow(&record);
			let key = reaction.identifier(&mut self.rng);
			if !context.seen.insert(key.clone(), self.clock.now_ms()) {
				tracing::trace!(channel = name, key = %key, "skipping seen reaction");
				continue;
			}
			let pruned = context.seen.prune();
			if pruned > 0 {
				tracing::trace!(channel = name, pruned, "pruned seen cache");
			}
			if context.render(key, reaction, &mut self.rng) {
				rendered += 1;
			}
		}
		rendered
	}
}

impl fmt::Debug for ChannelRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChannelRegistry")
			.field("channels", &self.channel_names())
			.field("directory", &self.directory)
			.finish_non_exhaustive()
	}
}

fn channel_or_default(channel: Option<&str>) -> &str {
	channel.filter(|c| !c.is_empty()).unwrap_or(DEFAULT_CHANNEL)
}
