//! The playlist store: a fixed, ordered catalog of tracks loaded once.
//!
//! The catalog is a TOML document with one `[[track]]` table per song. When no
//! catalog path is configured the catalog bundled into the binary is used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lofty::file::AudioFile;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CatalogSettings;

use super::model::{AudioRef, Track, format_duration};

const BUNDLED_CATALOG: &str = include_str!("../../assets/catalog.toml");

/// Label shown when a track's length is unknown.
pub const UNKNOWN_DURATION: &str = "--:--";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog contains no tracks")]
    Empty,

    #[error("catalog entry {index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "track")]
    tracks: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    title: String,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    comment: String,
    country: String,
    audio: PathBuf,
}

/// Immutable, ordered list of tracks. Cloning shares the same storage.
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    tracks: Arc<[Track]>,
}

impl PlaylistStore {
    /// Load the configured catalog, or the bundled one.
    pub fn load(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let text = match &settings.path {
            Some(path) => std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?,
            None => BUNDLED_CATALOG.to_string(),
        };
        let store = Self::parse(&text, &settings.media_dir)?;
        info!(
            tracks = store.len(),
            source = ?settings.path.as_deref().unwrap_or(Path::new("<bundled>")),
            "playlist loaded"
        );
        Ok(store)
    }

    /// Parse catalog text, resolving relative audio references against `media_dir`.
    pub fn parse(text: &str, media_dir: &Path) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;

        let mut tracks = Vec::with_capacity(file.tracks.len());
        for (index, entry) in file.tracks.into_iter().enumerate() {
            tracks.push(entry_to_track(index, entry, media_dir)?);
        }
        Self::from_tracks(tracks)
    }

    /// Build a store from already materialized tracks.
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        if tracks.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self {
            tracks: tracks.into(),
        })
    }

    /// Number of tracks. Never zero.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

fn entry_to_track(
    index: usize,
    entry: CatalogEntry,
    media_dir: &Path,
) -> Result<Track, CatalogError> {
    let title = entry.title.trim().to_string();
    if title.is_empty() {
        return Err(CatalogError::InvalidEntry {
            index,
            reason: "title is empty".to_string(),
        });
    }

    let country_code = entry.country.trim().to_ascii_uppercase();
    if country_code.len() != 2 || !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CatalogError::InvalidEntry {
            index,
            reason: format!("country {:?} is not a two-letter code", entry.country),
        });
    }

    let audio_path = if entry.audio.is_absolute() {
        entry.audio
    } else {
        media_dir.join(entry.audio)
    };

    let duration_label = match entry.duration.map(|d| d.trim().to_string()) {
        Some(d) if !d.is_empty() => d,
        _ => read_duration_label(&audio_path).unwrap_or_else(|| UNKNOWN_DURATION.to_string()),
    };

    Ok(Track {
        title,
        duration_label,
        comment: entry.comment.trim().to_string(),
        country_code,
        audio: AudioRef::new(audio_path),
    })
}

/// Read the track length from the audio file's properties.
fn read_duration_label(path: &Path) -> Option<String> {
    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let label = format_duration(tagged.properties().duration());
            debug!(?path, %label, "read duration");
            Some(label)
        }
        Err(e) => {
            warn!(?path, error = %e, "could not read duration");
            None
        }
    }
}
