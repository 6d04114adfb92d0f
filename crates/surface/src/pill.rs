//! Pill element and its animation parameters.

use std::time::Duration;

use crate::Completion;

/// Lifecycle phase of a pill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PillPhase {
	/// Built but not yet attached to a surface.
	#[default]
	Created,
	/// Attached to a surface and animating.
	Visible,
	/// Detached by animation completion or eviction. Terminal.
	Removed,
}

/// Per-pill animation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
	/// Horizontal drift applied over the animation, in pixels.
	pub drift_px: f32,
	/// Total animation length.
	pub duration: Duration,
}

impl Default for Motion {
	fn default() -> Self {
		Self {
			drift_px: 0.0,
			duration: Duration::from_millis(4800),
		}
	}
}

/// Visual element representing one reaction.
#[derive(Debug)]
pub struct Pill {
	key: String,
	emoji: String,
	label: String,
	meta: Option<String>,
	motion: Motion,
	phase: PillPhase,
	completion: Completion,
}

impl Pill {
	/// Creates a pill tagged with `key`.
	pub fn new(key: impl Into<String>, emoji: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			emoji: emoji.into(),
			label: label.into(),
			meta: None,
			motion: Motion::default(),
			phase: PillPhase::Created,
			completion: Completion::new(),
		}
	}

	/// Sets the secondary meta line.
	#[must_use]
	pub fn with_meta(mut self, meta: Option<String>) -> Self {
		self.meta = meta;
		self
	}

	/// Sets the animation parameters.
	#[must_use]
	pub fn with_motion(mut self, motion: Motion) -> Self {
		self.motion = motion;
		self
	}

	/// Registers the one-shot handler run when the animation finishes.
	pub fn on_finish(&mut self, handler: impl FnOnce() + 'static) {
		self.completion.subscribe(handler);
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn emoji(&self) -> &str {
		&self.emoji
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn meta(&self) -> Option<&str> {
		self.meta.as_deref()
	}

	pub fn motion(&self) -> Motion {
		self.motion
	}

	pub fn phase(&self) -> PillPhase {
		self.phase
	}

	/// Marks the pill as attached. Only a `Created` pill can become visible.
	pub fn mark_visible(&mut self) {
		if self.phase == PillPhase::Created {
			self.phase = PillPhase::Visible;
		}
	}

	/// Marks the pill as detached and deregisters any pending completion.
	pub fn mark_removed(&mut self) {
		self.phase = PillPhase::Removed;
		drop(self.completion.take());
	}

	/// Moves the pending completion out of the pill.
	pub(crate) fn take_completion(&mut self) -> Completion {
		self.completion.take()
	}
}
