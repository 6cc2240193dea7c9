use std::path::{Path, PathBuf};
use std::time::Duration;

/// Handle to the audio resource behind a track.
///
/// The engine resolves it; nothing else looks inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef(PathBuf);

impl AudioRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// One playlist entry. Identity is its position in the playlist; titles are
/// display text only and may repeat.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub title: String,
    pub duration_label: String,
    pub comment: String,
    pub country_code: String,
    pub audio: AudioRef,
}

impl Track {
    /// Parse `duration_label` (`m:ss` or `h:mm:ss`) back into a `Duration`.
    pub fn duration(&self) -> Option<Duration> {
        parse_duration_label(&self.duration_label)
    }
}

pub(crate) fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

pub(crate) fn parse_duration_label(label: &str) -> Option<Duration> {
    let mut secs: u64 = 0;
    let mut parts = 0;
    for part in label.trim().split(':') {
        let n: u64 = part.trim().parse().ok()?;
        secs = secs.checked_mul(60)?.checked_add(n)?;
        parts += 1;
    }
    if !(2..=3).contains(&parts) {
        return None;
    }
    Some(Duration::from_secs(secs))
}
