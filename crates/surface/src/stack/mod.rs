//! In-memory pill surface driven by explicit time steps.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::{Completion, Pill, Surface};


/// A pill and the time it has spent animating.
#[derive(Debug)]
struct PillState {
	pill: Pill,
	elapsed: Duration,
}

/// Surface that keeps pills in attach order and plays their animations.
///
/// Pills are not removed by the stack itself when their animation ends. The
/// stack fires the pill's completion and leaves removal to the handler, so a
/// pill without a subscriber stays attached until evicted.
#[derive(Debug, Default)]
pub struct PillStack {
	states: VecDeque<PillState>,
}

impl PillStack {
	/// Creates an empty stack.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty stack behind a shared handle.
	pub fn shared() -> Rc<RefCell<Self>> {
		Rc::new(RefCell::new(Self::new()))
	}

	/// Returns the number of attached pills.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// Returns true if no pills are attached.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Returns the attached pills, oldest first.
	pub fn pills(&self) -> impl Iterator<Item = &Pill> {
		self.states.iter().map(|state| &state.pill)
	}

	/// Returns the keys of attached pills, oldest first.
	pub fn keys(&self) -> Vec<&str> {
		self.pills().map(Pill::key).collect()
	}

	/// Advances every animation by `delta` and collects the completions of
	/// pills whose animation just finished.
	pub fn tick(&mut self, delta: Duration) -> Vec<Completion> {
		let mut finished = Vec::new();
		for state in &mut self.states {
			state.elapsed = state.elapsed.saturating_add(delta);
			if state.elapsed >= state.pill.motion().duration {
				let completion = state.pill.take_completion();
				if completion.is_armed() {
					finished.push(completion);
				}
			}
		}
		finished
	}

	/// Ticks `stack` and fires finished completions once the borrow is
	/// released. Returns the number of handlers that ran.
	pub fn advance(stack: &Rc<RefCell<Self>>, delta: Duration) -> usize {
		let finished = stack.borrow_mut().tick(delta);
		let fired = finished.into_iter().map(Completion::fire).filter(|ran| *ran).count();
		if fired > 0 {
			tracing::trace!(fired, remaining = stack.borrow().len(), "pill animations finished");
		}
		fired
	}
}

impl Surface for PillStack {
	fn child_count(&self) -> usize {
		self.states.len()
	}

	fn append_child(&mut self, mut pill: Pill) {
		pill.mark_visible();
		self.states.push_back(PillState {
			pill,
			elapsed: Duration::ZERO,
		});
	}

	fn remove_first_child(&mut self) -> Option<Pill> {
		let mut pill = self.states.pop_front()?.pill;
		pill.mark_removed();
		Some(pill)
	}

	fn remove_child(&mut self, key: &str) -> Option<Pill> {
		let index = self.states.iter().position(|state| state.pill.key() == key)?;
		let mut pill = self.states.remove(index)?.pill;
		pill.mark_removed();
		Some(pill)
	}
}
