use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::audio::engine_factory;
use crate::config::Settings;
use crate::library::PlaylistStore;
use crate::notify::{Notification, publisher_factory};
use crate::player::{ControllerOptions, Launcher};

/// Install the stderr subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn controller_options(settings: &Settings) -> ControllerOptions {
    ControllerOptions {
        boundary: settings.playback.boundary,
        auto_advance: settings.playback.auto_advance,
        poll_interval: Duration::from_millis(settings.playback.poll_interval_ms.max(1)),
        fade_out: Duration::from_millis(settings.audio.quit_fade_out_ms),
        notification_id: settings.notification.channel_id.clone(),
    }
}

/// Everything the attachment point needs to start controllers for `playlist`.
pub fn launcher(
    settings: &Settings,
    playlist: PlaylistStore,
    notifications: Sender<Notification>,
) -> Launcher {
    Launcher {
        playlist,
        engine_factory: engine_factory(&settings.audio),
        publisher_factory: publisher_factory(&settings.notification, Some(notifications)),
        options: controller_options(settings),
    }
}
