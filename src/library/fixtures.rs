//! Playlists for tests.

use super::{AudioRef, PlaylistStore, Track};

const COUNTRIES: [&str; 5] = ["BR", "MX", "JP", "FR", "IT"];

pub fn track(title: &str, country: &str) -> Track {
    Track {
        title: title.to_string(),
        duration_label: "3:00".to_string(),
        comment: format!("about {title}"),
        country_code: country.to_string(),
        audio: AudioRef::new(format!("/music/{}.mp3", title.to_lowercase())),
    }
}

/// A playlist with one track per title, countries cycling through a few codes.
pub fn store(titles: &[&str]) -> PlaylistStore {
    let tracks = titles
        .iter()
        .enumerate()
        .map(|(i, t)| track(t, COUNTRIES[i % COUNTRIES.len()]))
        .collect();
    PlaylistStore::from_tracks(tracks).expect("fixture playlist is non-empty")
}

/// A playlist of `n` tracks titled `T0`, `T1`, ...
pub fn numbered(n: usize) -> PlaylistStore {
    let titles: Vec<String> = (0..n).map(|i| format!("T{i}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    store(&refs)
}
