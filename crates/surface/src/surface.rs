//! Surface trait implemented by pill containers.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::Pill;

/// Shared handle to a host-owned surface.
pub type SurfaceRef = Rc<RefCell<dyn Surface>>;

/// Non-owning handle held by completion handlers.
pub type WeakSurfaceRef = Weak<RefCell<dyn Surface>>;

/// Ordered container of pills, oldest first.
///
/// Implementations mark appended pills [`Pill::mark_visible`] and removed
/// pills [`Pill::mark_removed`].
pub trait Surface {
	/// Number of pills currently attached.
	fn child_count(&self) -> usize;

	/// Attaches `pill` as the last child.
	fn append_child(&mut self, pill: Pill);

	/// Detaches and returns the oldest child.
	fn remove_first_child(&mut self) -> Option<Pill>;

	/// Detaches and returns the first child tagged with `key`.
	fn remove_child(&mut self, key: &str) -> Option<Pill>;
}
