//! Configuration loader and schema types.
//!
//! This module exposes the settings that drive the playlist store, the
//! controller process, the playback engine, notifications and logging.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
