//! The playlist/position state machine.
//!
//! `Player` owns the engine and the (index, status) pair and applies one
//! control at a time. It knows nothing about threads; the controller thread
//! serializes calls into it and publishes the result.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::audio::{EngineError, PlaybackEngine};
use crate::config::BoundaryPolicy;
use crate::library::PlaylistStore;
use crate::notify::NowPlaying;

use super::error::{PlayerError, Result};
use super::types::{Control, PlaybackStatus, Snapshot};

pub(crate) struct Player {
    playlist: PlaylistStore,
    engine: Box<dyn PlaybackEngine>,
    index: usize,
    status: PlaybackStatus,
    /// Last index a `NowPlaying` went out for. Cleared by an explicit stop so
    /// playing again re-announces.
    announced: Option<usize>,
    boundary: BoundaryPolicy,
    notification_id: String,
}

impl Player {
    pub fn new(
        playlist: PlaylistStore,
        engine: Box<dyn PlaybackEngine>,
        boundary: BoundaryPolicy,
        notification_id: String,
    ) -> Self {
        Self {
            playlist,
            engine,
            index: 0,
            status: PlaybackStatus::Idle,
            announced: None,
            boundary,
            notification_id,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            index: self.index,
            status: self.status,
        }
    }

    /// Apply one control. `Ok(Some(_))` means a different track started playing.
    pub fn apply(&mut self, control: Control) -> Result<Option<NowPlaying>> {
        match control {
            Control::Play => self.play(),
            Control::Pause => self.pause(),
            Control::Stop => {
                self.stop();
                Ok(None)
            }
            Control::Select(i) => self.select_by_index(i),
            Control::Next => self.next(),
            Control::Previous => self.previous(),
        }
    }

    pub fn play(&mut self) -> Result<Option<NowPlaying>> {
        match self.status {
            PlaybackStatus::Playing => {
                debug!(index = self.index, "play: already playing");
                Ok(None)
            }
            PlaybackStatus::Paused => {
                if let Err(e) = self.engine.start() {
                    return Err(self.fail(self.index, e));
                }
                self.status = PlaybackStatus::Playing;
                info!(index = self.index, "resumed");
                Ok(None)
            }
            // Idle has never loaded anything and Stopped released it.
            PlaybackStatus::Idle | PlaybackStatus::Stopped => self.load_and_start(self.index),
        }
    }

    pub fn pause(&mut self) -> Result<Option<NowPlaying>> {
        if self.status != PlaybackStatus::Playing {
            warn!(status = %self.status, "pause ignored: not playing");
            return Err(PlayerError::InvalidTransition {
                action: "pause",
                status: self.status,
            });
        }
        self.engine.pause();
        self.status = PlaybackStatus::Paused;
        info!(index = self.index, "paused");
        Ok(None)
    }

    pub fn stop(&mut self) {
        self.engine.halt();
        self.status = PlaybackStatus::Stopped;
        self.announced = None;
        info!(index = self.index, "stopped");
    }

    pub fn select_by_index(&mut self, index: i64) -> Result<Option<NowPlaying>> {
        let len = self.playlist.len();
        let Some(i) = usize::try_from(index).ok().filter(|&i| i < len) else {
            warn!(index, len, "selection out of range");
            return Err(PlayerError::OutOfRange { index, len });
        };
        self.load_and_start(i)
    }

    pub fn next(&mut self) -> Result<Option<NowPlaying>> {
        let n = self.playlist.len();
        let target = match self.boundary {
            BoundaryPolicy::Wrap => (self.index + 1) % n,
            BoundaryPolicy::Clamp if self.index + 1 >= n => {
                debug!(index = self.index, "next: at last track");
                return Ok(None);
            }
            BoundaryPolicy::Clamp => self.index + 1,
        };
        self.load_and_start(target)
    }

    pub fn previous(&mut self) -> Result<Option<NowPlaying>> {
        let n = self.playlist.len();
        let target = match self.boundary {
            BoundaryPolicy::Wrap => (self.index + n - 1) % n,
            BoundaryPolicy::Clamp if self.index == 0 => {
                debug!("previous: at first track");
                return Ok(None);
            }
            BoundaryPolicy::Clamp => self.index - 1,
        };
        self.load_and_start(target)
    }

    /// Check the engine for end-of-track. `None` when nothing happened.
    pub fn poll_track_end(&mut self, auto_advance: bool) -> Option<Result<Option<NowPlaying>>> {
        if self.status != PlaybackStatus::Playing || !self.engine.is_finished() {
            return None;
        }
        debug!(index = self.index, "track ended");
        let at_last = self.index + 1 >= self.playlist.len();
        if !auto_advance || (at_last && self.boundary == BoundaryPolicy::Clamp) {
            self.stop();
            return Some(Ok(None));
        }
        Some(self.next())
    }

    /// Fade out and release the engine; the controller is going away.
    pub fn shutdown(&mut self, fade_out: Duration) {
        if self.status == PlaybackStatus::Playing {
            self.engine.fade_out(fade_out);
        }
        self.engine.halt();
        self.status = PlaybackStatus::Stopped;
    }

    /// Stop whatever is playing, then load and start track `i`.
    ///
    /// On engine failure the index stays where it was and status is Stopped.
    fn load_and_start(&mut self, i: usize) -> Result<Option<NowPlaying>> {
        let len = self.playlist.len();
        self.engine.halt();

        let Some(track) = self.playlist.get(i) else {
            return Err(PlayerError::OutOfRange {
                index: i as i64,
                len,
            });
        };
        if let Err(e) = self.engine.load(track) {
            return Err(self.fail(i, e));
        }
        if let Err(e) = self.engine.start() {
            return Err(self.fail(i, e));
        }

        self.index = i;
        self.status = PlaybackStatus::Playing;
        info!(index = i, title = %track.title, "playing");

        if self.announced == Some(i) {
            return Ok(None);
        }
        self.announced = Some(i);
        Ok(Some(NowPlaying {
            notification_id: self.notification_id.clone(),
            index: i,
            title: track.title.clone(),
            comment: track.comment.clone(),
        }))
    }

    fn fail(&mut self, index: usize, source: EngineError) -> PlayerError {
        error!(index, error = %source, "engine failure");
        self.engine.halt();
        self.status = PlaybackStatus::Stopped;
        self.announced = None;
        PlayerError::EngineFailure { index, source }
    }
}
