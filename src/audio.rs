//! Playback engines.
//!
//! `PlaybackEngine` is the seam between the player and the platform audio
//! stack. `RodioEngine` plays through the default output device and
//! `SilentEngine` stands in on hosts without one.

mod engine;
mod silent;
mod sink;

pub use engine::{EngineError, EngineFactory, PlaybackEngine, engine_factory};

#[cfg(test)]
pub mod testing;
