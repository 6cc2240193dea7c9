use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/songmap/config.toml` or `~/.config/songmap/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SONGMAP__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub notification: NotificationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Catalog file listing the tracks. The bundled catalog is used when unset.
    pub path: Option<PathBuf>,
    /// Base directory that relative audio references are resolved against.
    pub media_dir: PathBuf,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: None,
            media_dir: PathBuf::from("media"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// What `next`/`previous` do past either end of the playlist.
    pub boundary: BoundaryPolicy,
    /// Advance to the following track when the current one ends.
    /// When disabled the player stops at the end of every track.
    pub auto_advance: bool,
    /// How often the controller polls the engine for end-of-track (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::Wrap,
            auto_advance: true,
            poll_interval_ms: 200,
        }
    }
}

/// Playlist boundary policy for relative navigation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryPolicy {
    /// `next` from the last track goes to the first, `previous` from the first to the last.
    #[default]
    #[serde(alias = "loop", alias = "loop-all", alias = "loop_all")]
    Wrap,
    /// Navigation past either end is a no-op.
    #[serde(alias = "stop", alias = "no-loop", alias = "no_loop")]
    Clamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Which playback engine drives the audio output.
    pub backend: EngineBackend,
    /// Fade-out duration when the controller is torn down (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            backend: EngineBackend::Rodio,
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineBackend {
    /// Decode and play through the default output device.
    Rodio,
    /// No output device; elapsed time is simulated from the duration labels.
    #[serde(alias = "null", alias = "headless")]
    Silent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Publish "now playing" events at all.
    pub enabled: bool,
    /// Stable identifier of the "now playing" notification slot.
    ///
    /// Every event reuses this id so a new track replaces the previous
    /// notification instead of stacking or clobbering unrelated ones.
    pub channel_id: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_id: "songmap.now-playing".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive. `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "songmap=info".to_string(),
        }
    }
}
