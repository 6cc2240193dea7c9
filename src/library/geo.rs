//! Country lookups used by the map surface.
//!
//! Coordinates are the capital city of each country, which is where the map
//! drops the marker for a song from that country.

use super::catalog::PlaylistStore;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A map marker for one track. Markers carry the track index so a marker
/// selection resolves to a playlist position without comparing titles.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub index: usize,
    pub title: String,
    pub position: Option<LatLng>,
}

const COUNTRIES: &[(&str, f64, f64)] = &[
    ("AR", -34.6037, -58.3816),
    ("AU", -35.2809, 149.1300),
    ("BR", -15.7939, -47.8828),
    ("CA", 45.4215, -75.6972),
    ("CL", -33.4489, -70.6693),
    ("CN", 39.9042, 116.4074),
    ("CO", 4.7110, -74.0721),
    ("CU", 23.1136, -82.3666),
    ("DE", 52.5200, 13.4050),
    ("EG", 30.0444, 31.2357),
    ("ES", 40.4168, -3.7038),
    ("FR", 48.8566, 2.3522),
    ("GB", 51.5074, -0.1278),
    ("GR", 37.9838, 23.7275),
    ("IE", 53.3498, -6.2603),
    ("IN", 28.6139, 77.2090),
    ("IT", 41.9028, 12.4964),
    ("JM", 18.0179, -76.8099),
    ("JP", 35.6762, 139.6503),
    ("KR", 37.5665, 126.9780),
    ("MX", 19.4326, -99.1332),
    ("NG", 9.0765, 7.3986),
    ("PT", 38.7223, -9.1393),
    ("RU", 55.7558, 37.6173),
    ("SE", 59.3293, 18.0686),
    ("SN", 14.7167, -17.4677),
    ("TR", 39.9334, 32.8597),
    ("US", 38.9072, -77.0369),
    ("ZA", -25.7479, 28.2293),
];

/// Coordinates for an ISO 3166-1 alpha-2 country code (case-insensitive).
pub fn coordinates(country_code: &str) -> Option<LatLng> {
    let code = country_code.trim();
    COUNTRIES
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|&(_, lat, lng)| LatLng { lat, lng })
}

/// Resource key of the flag drawn next to a song, e.g. `flag_br`.
pub fn flag_key(country_code: &str) -> String {
    format!("flag_{}", country_code.trim().to_ascii_lowercase())
}

impl PlaylistStore {
    /// One marker per track, in playlist order.
    pub fn markers(&self) -> Vec<Marker> {
        self.tracks()
            .iter()
            .enumerate()
            .map(|(index, t)| Marker {
                index,
                title: t.title.clone(),
                position: coordinates(&t.country_code),
            })
            .collect()
    }

    /// Where the map camera starts: the first track's country.
    pub fn initial_camera(&self) -> Option<LatLng> {
        self.tracks()
            .first()
            .and_then(|t| coordinates(&t.country_code))
    }
}
