use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_songmap_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SONGMAP_CONFIG_PATH", "/tmp/songmap-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/songmap-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("songmap")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("songmap")
            .join("config.toml")
    );
}

#[test]
fn defaults_wrap_and_auto_advance() {
    let s = Settings::default();
    assert_eq!(s.playback.boundary, BoundaryPolicy::Wrap);
    assert!(s.playback.auto_advance);
    assert_eq!(s.audio.backend, EngineBackend::Rodio);
    assert!(s.notification.enabled);
    assert!(s.catalog.path.is_none());
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_zero_poll_interval_and_blank_channel() {
    let mut s = Settings::default();
    s.playback.poll_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.notification.channel_id = "   ".to_string();
    assert!(s.validate().unwrap_err().contains("channel_id"));
}

#[test]
fn settings_load_from_config_file_and_parse_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[catalog]
path = "/srv/songs/catalog.toml"
media_dir = "/srv/songs"

[playback]
boundary = "stop"
auto_advance = false
poll_interval_ms = 50

[audio]
backend = "headless"
quit_fade_out_ms = 0

[notification]
enabled = false
channel_id = "player-slot"

[logging]
filter = "songmap=debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SONGMAP_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SONGMAP__PLAYBACK__BOUNDARY");

    let s = Settings::load().unwrap();
    assert_eq!(
        s.catalog.path.as_deref(),
        Some(std::path::Path::new("/srv/songs/catalog.toml"))
    );
    assert_eq!(s.catalog.media_dir, std::path::PathBuf::from("/srv/songs"));
    assert_eq!(s.playback.boundary, BoundaryPolicy::Clamp);
    assert!(!s.playback.auto_advance);
    assert_eq!(s.playback.poll_interval_ms, 50);
    assert_eq!(s.audio.backend, EngineBackend::Silent);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert!(!s.notification.enabled);
    assert_eq!(s.notification.channel_id, "player-slot");
    assert_eq!(s.logging.filter, "songmap=debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
boundary = "wrap"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SONGMAP_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SONGMAP__PLAYBACK__BOUNDARY", "clamp");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.boundary, BoundaryPolicy::Clamp);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "SONGMAP_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );
    let _g2 = EnvGuard::remove("SONGMAP__PLAYBACK__BOUNDARY");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.boundary, BoundaryPolicy::Wrap);
    assert_eq!(s.notification.channel_id, "songmap.now-playing");
}
