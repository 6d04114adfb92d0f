use std::cell::Cell;

use chrono::Utc;

/// Source of first-seen timestamps, in milliseconds since the Unix epoch.
pub trait Clock {
	fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_ms(&self) -> i64 {
		Utc::now().timestamp_millis()
	}
}

/// Hand-driven clock for deterministic tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
	now: Cell<i64>,
}

impl ManualClock {
	pub fn new(start_ms: i64) -> Self {
		Self { now: Cell::new(start_ms) }
	}

	/// Moves the clock forward by `delta_ms`.
	pub fn advance(&self, delta_ms: i64) {
		self.now.set(self.now.get().saturating_add(delta_ms));
	}

	pub fn set(&self, now_ms: i64) {
		self.now.set(now_ms);
	}
}

impl Clock for ManualClock {
	fn now_ms(&self) -> i64 {
		self.now.get()
	}
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
	fn now_ms(&self) -> i64 {
		(**self).now_ms()
	}
}
