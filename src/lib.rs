//! songmap: one playback controller shared by a song list and a world map.
//!
//! Surfaces never touch playback state directly. They ask an
//! [`player::AttachmentPoint`] for a lease and drive the controller through
//! the [`player::AttachmentHandle`] it hands back.

pub mod audio;
pub mod config;
pub mod library;
pub mod notify;
pub mod player;
pub mod runtime;
pub mod surface;
