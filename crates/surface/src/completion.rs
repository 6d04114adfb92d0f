//! One-shot animation completion subscription.

use std::fmt;

/// Handler slot fired at most once when a pill animation finishes.
///
/// Firing consumes the handler. Dropping an armed completion deregisters the
/// handler without running it, which is what happens to evicted pills.
#[derive(Default)]
pub struct Completion {
	handler: Option<Box<dyn FnOnce()>>,
}

impl Completion {
	/// Creates an unarmed completion.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler`, replacing any handler registered before.
	pub fn subscribe(&mut self, handler: impl FnOnce() + 'static) {
		self.handler = Some(Box::new(handler));
	}

	/// Returns true while a handler is registered and has not fired.
	pub fn is_armed(&self) -> bool {
		self.handler.is_some()
	}

	/// Moves the registered handler out, leaving this slot unarmed.
	pub fn take(&mut self) -> Completion {
		Completion {
			handler: self.handler.take(),
		}
	}

	/// Runs the handler if one is registered. Returns whether it ran.
	pub fn fire(mut self) -> bool {
		match self.handler.take() {
			Some(handler) => {
				handler();
				true
			}
			None => false,
		}
	}
}

impl fmt::Debug for Completion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Completion").field("armed", &self.is_armed()).finish()
	}
}
