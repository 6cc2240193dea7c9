use crate::config;

/// Load settings, falling back to defaults on any error.
///
/// Runs before logging is installed, so problems go to stderr directly.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("songmap: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("songmap: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
