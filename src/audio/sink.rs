//! `rodio`-backed engine.
//!
//! Each load opens and decodes the track file into a fresh paused `Sink` on
//! the default output stream.

use std::fs::File;
use std::io::BufReader;
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use crate::library::Track;

use super::engine::{EngineError, PlaybackEngine};

pub struct RodioEngine {
    stream: OutputStream,
    sink: Option<Sink>,
}

impl RodioEngine {
    pub fn open() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Output(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped; the controller
        // drops it on every teardown.
        stream.log_on_drop(false);
        Ok(Self { stream, sink: None })
    }
}

/// Create a paused `Sink` holding the decoded `track`.
fn create_sink(stream: &OutputStream, track: &Track) -> Result<Sink, EngineError> {
    let path = track.audio.path();
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        self.halt();
        let sink = create_sink(&self.stream, track)?;
        sink.set_volume(1.0);
        self.sink = Some(sink);
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        let sink = self.sink.as_ref().ok_or(EngineError::NotLoaded)?;
        sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
    }

    fn halt(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| !s.is_paused() && s.empty())
    }

    fn fade_out(&mut self, duration: Duration) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        let Some(step) = fade_step(duration).filter(|_| !sink.is_paused()) else {
            sink.set_volume(0.0);
            return;
        };
        debug!(fade_out_ms = step.as_millis() * u128::from(FADE_STEPS), "fading out");
        for n in 1..=FADE_STEPS {
            let t = n as f32 / FADE_STEPS as f32;
            sink.set_volume(1.0 - t);
            thread::sleep(step);
        }
        sink.set_volume(0.0);
    }
}

const FADE_STEPS: u64 = 20;

/// Sleep between volume steps when fading over `duration`; `None` for an
/// immediate cut.
pub(crate) fn fade_step(duration: Duration) -> Option<Duration> {
    let fade_out_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    if fade_out_ms == 0 {
        return None;
    }
    Some(Duration::from_millis((fade_out_ms / FADE_STEPS).max(1)))
}
