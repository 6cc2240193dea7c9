//! In-memory engine for tests: records every call and can be told to fail or
//! to report end-of-track.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::Track;

use super::engine::{EngineError, EngineFactory, PlaybackEngine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Load(String),
    Start,
    Pause,
    Halt,
    FadeOut(Duration),
}

#[derive(Debug, Default)]
pub struct EngineLog {
    pub calls: Vec<EngineCall>,
    /// Titles whose load fails with `EngineError::Open`.
    pub fail_titles: HashSet<String>,
    pub loaded: Option<String>,
    pub playing: bool,
    pub finished: bool,
    /// How many engines the factory has built.
    pub created: usize,
}

pub type SharedLog = Arc<Mutex<EngineLog>>;

pub struct ScriptedEngine {
    log: SharedLog,
}

impl ScriptedEngine {
    pub fn new(log: SharedLog) -> Self {
        Self { log }
    }

    pub fn factory(log: SharedLog) -> EngineFactory {
        Arc::new(move || {
            log.lock().unwrap().created += 1;
            Ok(Box::new(ScriptedEngine::new(log.clone())) as Box<dyn PlaybackEngine>)
        })
    }
}

impl PlaybackEngine for ScriptedEngine {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push(EngineCall::Load(track.title.clone()));
        log.playing = false;
        log.finished = false;
        if log.fail_titles.contains(&track.title) {
            log.loaded = None;
            return Err(EngineError::Open {
                path: track.audio.path().to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing resource"),
            });
        }
        log.loaded = Some(track.title.clone());
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push(EngineCall::Start);
        if log.loaded.is_none() {
            return Err(EngineError::NotLoaded);
        }
        log.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.calls.push(EngineCall::Pause);
        log.playing = false;
    }

    fn halt(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.calls.push(EngineCall::Halt);
        log.playing = false;
        log.loaded = None;
        log.finished = false;
    }

    fn is_finished(&self) -> bool {
        self.log.lock().unwrap().finished
    }

    fn fade_out(&mut self, duration: Duration) {
        self.log.lock().unwrap().calls.push(EngineCall::FadeOut(duration));
    }
}

/// A fresh shared log.
pub fn engine_log() -> SharedLog {
    Arc::new(Mutex::new(EngineLog::default()))
}
