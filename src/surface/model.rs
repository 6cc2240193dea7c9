use std::fmt;

use crate::library::LatLng;

/// Which screen a surface stands in for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceKind {
    /// The host screen listing every song.
    List,
    /// The map screen with one marker per song.
    Map,
}

impl SurfaceKind {
    pub fn token(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Switch to another surface, handing it a playlist index.
///
/// The index is the only thing that crosses from one surface to the next.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub to: SurfaceKind,
    pub index: usize,
}

/// What the map shows for a chosen marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDetails {
    pub index: usize,
    pub title: String,
    pub duration_label: String,
    pub comment: String,
    pub position: Option<LatLng>,
    pub flag_key: String,
}
