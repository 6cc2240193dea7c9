//! Playlist store: track model, catalog loading and map lookups.

mod catalog;
mod geo;
mod model;

pub use catalog::{CatalogError, PlaylistStore, UNKNOWN_DURATION};
pub use geo::{LatLng, Marker, coordinates, flag_key};
pub use model::{AudioRef, Track};

#[cfg(test)]
pub(crate) mod fixtures;
