//! Error types for playback control

use thiserror::Error;

use crate::audio::EngineError;

use super::types::PlaybackStatus;

/// Every failure a control call can report. None of them take the
/// controller down; the player stays in its last valid state.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Selection outside `0..len`
    #[error("track index {index} is out of range (playlist has {len} tracks)")]
    OutOfRange { index: i64, len: usize },

    /// Command not legal in the current status
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: PlaybackStatus,
    },

    /// Handle used after disconnect, before connect completed, or after the
    /// controller was torn down
    #[error("lifecycle misuse: {0}")]
    LifecycleMisuse(String),

    /// The engine could not load or start a track
    #[error("engine failed on track {index}: {source}")]
    EngineFailure {
        index: usize,
        #[source]
        source: EngineError,
    },

    /// No engine could be built when the controller process started
    #[error("playback engine unavailable: {0}")]
    EngineUnavailable(#[source] EngineError),
}

impl PlayerError {
    pub(crate) fn misuse(msg: impl Into<String>) -> Self {
        Self::LifecycleMisuse(msg.into())
    }
}

/// Result type for playback control
pub type Result<T> = std::result::Result<T, PlayerError>;
