//! The control contract between the player and the platform audio stack.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::config::{AudioSettings, EngineBackend};
use crate::library::Track;

use super::silent::SilentEngine;
use super::sink::RodioEngine;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("audio output unavailable: {0}")]
    Output(String),

    #[error("no track is loaded")]
    NotLoaded,
}

/// Primitives the player drives. Only the controller thread ever calls these.
pub trait PlaybackEngine {
    /// Prepare `track` for output, paused at its start. Replaces whatever was loaded.
    fn load(&mut self, track: &Track) -> Result<(), EngineError>;

    /// Start or resume output of the loaded track.
    fn start(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self);

    /// Stop output and release the loaded track.
    fn halt(&mut self);

    /// True once a started track has played to its end.
    fn is_finished(&self) -> bool;

    /// Ramp volume down over `duration` before a halt.
    fn fade_out(&mut self, duration: Duration) {
        let _ = duration;
    }
}

/// Builds an engine on the controller thread. Output streams are not `Send`,
/// so the engine is created where it is used.
pub type EngineFactory =
    Arc<dyn Fn() -> Result<Box<dyn PlaybackEngine>, EngineError> + Send + Sync>;

/// Engine factory for the configured backend.
///
/// The rodio backend degrades to the silent engine when no output device can
/// be opened, so the player stays usable on headless hosts.
pub fn engine_factory(settings: &AudioSettings) -> EngineFactory {
    match settings.backend {
        EngineBackend::Silent => Arc::new(open_silent),
        EngineBackend::Rodio => Arc::new(open_rodio_or_silent),
    }
}

fn open_silent() -> Result<Box<dyn PlaybackEngine>, EngineError> {
    Ok(Box::new(SilentEngine::default()))
}

fn open_rodio_or_silent() -> Result<Box<dyn PlaybackEngine>, EngineError> {
    match RodioEngine::open() {
        Ok(engine) => Ok(Box::new(engine)),
        Err(e) => {
            warn!(error = %e, "no audio output, falling back to silent engine");
            open_silent()
        }
    }
}
