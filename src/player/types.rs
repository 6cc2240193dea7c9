//! Player-side small types: status, published snapshot, commands and leases.

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::error::PlayerError;

/// Playback status owned by the controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Nothing has been loaded since the controller started.
    #[default]
    Idle,
    Playing,
    Paused,
    /// Output halted and released.
    Stopped,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// The pair every reader sees together: never one without the other.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub index: usize,
    pub status: PlaybackStatus,
}

/// Identifies one attachment lease.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeaseId(pub(crate) u64);

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lease#{}", self.0)
    }
}

/// Why a surface is letting go of its lease.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The surface is going to the background and may come back.
    Backgrounding,
    /// The surface is finishing for good. If it held the last lease the
    /// controller process is torn down with it.
    Finishing,
}

/// A playback control request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Control {
    Play,
    Pause,
    Stop,
    /// Select and play the track at this position. Signed so that callers
    /// computing positions (row - header) can pass what they computed.
    Select(i64),
    Next,
    Previous,
}

#[derive(Debug)]
pub(crate) enum Command {
    /// Register a new lease for the surface named `token`.
    Attach {
        token: String,
        reply: Sender<LeaseId>,
    },
    /// Release a lease; replies with the number of leases left.
    Detach {
        lease: LeaseId,
        reply: Sender<Result<usize, PlayerError>>,
    },
    Control {
        lease: LeaseId,
        control: Control,
        reply: Sender<Result<Snapshot, PlayerError>>,
    },
    /// Tear the controller process down, fading out over `fade_out`.
    Shutdown { fade_out: Duration },
}

/// State published by the controller thread. It is the only writer; it
/// updates this after a transition has fully completed.
#[derive(Debug, Default)]
pub(crate) struct Published {
    pub snapshot: Snapshot,
    pub leases: HashMap<LeaseId, String>,
    pub running: bool,
}

pub(crate) type SharedState = Arc<Mutex<Published>>;

/// Lock published state. The controller never panics while holding the lock,
/// so a poisoned guard still holds a consistent value.
pub(crate) fn lock_published(shared: &SharedState) -> MutexGuard<'_, Published> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
