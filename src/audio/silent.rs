//! Device-free engine.
//!
//! Produces no sound. Elapsed time is tracked the same way a real sink plays,
//! so end-of-track fires once a started track has run for its labelled length.

use std::time::{Duration, Instant};

use crate::library::Track;

use super::engine::{EngineError, PlaybackEngine};

#[derive(Debug, Default)]
pub struct SilentEngine {
    /// Length of the loaded track; `None` inside means the length is unknown.
    loaded: Option<Option<Duration>>,
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl SilentEngine {
    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }
}

impl PlaybackEngine for SilentEngine {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        self.loaded = Some(track.duration());
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        if self.loaded.is_none() {
            return Err(EngineError::NotLoaded);
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += st.elapsed();
        }
    }

    fn halt(&mut self) {
        self.loaded = None;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    fn is_finished(&self) -> bool {
        match self.loaded {
            Some(Some(len)) => self.started_at.is_some() && self.elapsed() >= len,
            _ => false,
        }
    }
}
