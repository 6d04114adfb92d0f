//! Reaction pill feeds.
//!
//! Reactions arrive in batches on named channels. Each channel is mounted on
//! a host-owned [`Surface`](pulse_surface::Surface) with a display capacity
//! and a nominal animation length. [`ChannelRegistry::ingest`] drops
//! reactions already seen on the channel, renders the rest as pills and
//! evicts the oldest pill when the surface is full.
//!
//! Both entry points fail silently: bad configuration or malformed input
//! degrades to displaying nothing, with the reason logged through `tracing`.

mod clock;
mod config;
mod directory;
mod reaction;
mod registry;
mod render;
mod seen;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, DEFAULT_CHANNEL, DEFAULT_DURATION_MS, DEFAULT_MAX_VISIBLE, MountOptions, PulseConfig};
pub use directory::SurfaceDirectory;
pub use reaction::{FeedError, Reaction, ReactionFeed};
pub use registry::{ChannelContext, ChannelRegistry, MountError};
pub use render::{DEFAULT_EMOJI, DEFAULT_LABEL, META_SEPARATOR};
pub use seen::{SEEN_CEILING, SeenCache};
