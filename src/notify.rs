//! "Now playing" notifications.
//!
//! The controller reports each track change here after its state is
//! published. Rendering the notification is up to whoever implements
//! `NotificationPublisher`; this module only ships the plumbing.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use tracing::{debug, info, warn};

use crate::config::NotificationSettings;
use crate::player::PlayerError;

/// A track became the one playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    /// Stable slot id; every event for the same channel replaces the last one.
    pub notification_id: String,
    pub index: usize,
    pub title: String,
    pub comment: String,
}

/// What a `ChannelPublisher` forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    NowPlaying(NowPlaying),
    PlaybackError { index: usize, message: String },
}

pub trait NotificationPublisher: Send {
    fn on_now_playing(&mut self, event: &NowPlaying);

    fn on_playback_error(&mut self, index: usize, error: &PlayerError) {
        let _ = (index, error);
    }
}

/// Builds a publisher for each controller process that gets started.
pub type PublisherFactory = Arc<dyn Fn() -> Box<dyn NotificationPublisher> + Send + Sync>;

/// Writes events to the log.
#[derive(Debug, Default)]
pub struct LogPublisher;

impl NotificationPublisher for LogPublisher {
    fn on_now_playing(&mut self, event: &NowPlaying) {
        info!(
            id = %event.notification_id,
            index = event.index,
            title = %event.title,
            "now playing"
        );
    }

    fn on_playback_error(&mut self, index: usize, error: &PlayerError) {
        warn!(index, error = %error, "playback error");
    }
}

/// Forwards events over a channel. A dropped receiver is not an error.
pub struct ChannelPublisher {
    tx: Sender<Notification>,
}

impl ChannelPublisher {
    pub fn new(tx: Sender<Notification>) -> Self {
        Self { tx }
    }

    fn forward(&self, n: Notification) {
        if self.tx.send(n).is_err() {
            debug!("notification receiver gone");
        }
    }
}

impl NotificationPublisher for ChannelPublisher {
    fn on_now_playing(&mut self, event: &NowPlaying) {
        self.forward(Notification::NowPlaying(event.clone()));
    }

    fn on_playback_error(&mut self, index: usize, error: &PlayerError) {
        self.forward(Notification::PlaybackError {
            index,
            message: error.to_string(),
        });
    }
}

/// Publishes to several publishers in order.
pub struct FanOut(pub Vec<Box<dyn NotificationPublisher>>);

impl NotificationPublisher for FanOut {
    fn on_now_playing(&mut self, event: &NowPlaying) {
        for p in &mut self.0 {
            p.on_now_playing(event);
        }
    }

    fn on_playback_error(&mut self, index: usize, error: &PlayerError) {
        for p in &mut self.0 {
            p.on_playback_error(index, error);
        }
    }
}

/// Publisher factory for the configured notification settings.
///
/// Disabled notifications still forward to `tx` (the runtime uses it to track
/// what is playing) but skip the log publisher.
pub fn publisher_factory(
    settings: &NotificationSettings,
    tx: Option<Sender<Notification>>,
) -> PublisherFactory {
    let enabled = settings.enabled;
    Arc::new(move || {
        let mut publishers: Vec<Box<dyn NotificationPublisher>> = Vec::new();
        if enabled {
            publishers.push(Box::new(LogPublisher));
        }
        if let Some(tx) = &tx {
            publishers.push(Box::new(ChannelPublisher::new(tx.clone())));
        }
        Box::new(FanOut(publishers)) as Box<dyn NotificationPublisher>
    })
}
