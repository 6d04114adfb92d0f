//! Display side of the reaction feed.
//!
//! A [`Surface`] is a borrowed container of [`Pill`] elements owned by the
//! host. Pills carry their animation parameters and a one-shot
//! [`Completion`] that fires when the animation finishes naturally.
//! [`PillStack`] is an in-memory surface that plays those animations on
//! [`PillStack::advance`].

mod completion;
mod pill;
mod stack;
mod surface;

pub use completion::Completion;
pub use pill::{Motion, Pill, PillPhase};
pub use stack::PillStack;
pub use surface::{Surface, SurfaceRef, WeakSurfaceRef};
