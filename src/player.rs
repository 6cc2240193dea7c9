//! The playback controller.
//!
//! A single controller thread owns the playlist position, the playback status
//! and the engine. Surfaces reach it only through `AttachmentHandle` leases
//! handed out by an `AttachmentPoint`; every control from every handle is
//! applied in arrival order on that one thread.

mod attach;
mod error;
mod handle;
mod state;
mod thread;
mod types;

pub use attach::{AttachmentPoint, Launcher};
pub use error::{PlayerError, Result};
pub use handle::AttachmentHandle;
pub use thread::ControllerOptions;
pub use types::{Control, Departure, LeaseId, PlaybackStatus, Snapshot};

#[cfg(test)]
mod tests;
