//! The list and map screens, minus the rendering.
//!
//! A surface owns nothing but its binding slot. Until the attachment point
//! has delivered a handle every control fails with `LifecycleMisuse`.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::library::{LatLng, Marker, PlaylistStore, coordinates, flag_key};
use crate::player::{
    AttachmentHandle, AttachmentPoint, Departure, PlayerError, Result, Snapshot,
};

mod model;

pub use model::{MarkerDetails, Navigation, SurfaceKind};

type Binding = Arc<Mutex<Option<AttachmentHandle>>>;

pub struct Surface {
    kind: SurfaceKind,
    playlist: PlaylistStore,
    /// Index handed over by the surface we came from.
    nav_index: usize,
    binding: Binding,
}

impl Surface {
    pub fn new(kind: SurfaceKind, playlist: PlaylistStore, nav_index: usize) -> Self {
        Self {
            kind,
            playlist,
            nav_index,
            binding: Arc::new(Mutex::new(None)),
        }
    }

    pub fn list(playlist: PlaylistStore, nav_index: usize) -> Self {
        Self::new(SurfaceKind::List, playlist, nav_index)
    }

    pub fn map(playlist: PlaylistStore, nav_index: usize) -> Self {
        Self::new(SurfaceKind::Map, playlist, nav_index)
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Ask `point` for a handle without waiting for it.
    ///
    /// The returned receiver fires once the surface is bound. A list surface
    /// also selects its navigation index first, which starts playback.
    pub fn start(&self, point: &AttachmentPoint) -> Receiver<()> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let binding = self.binding.clone();
        let kind = self.kind;
        let nav_index = self.nav_index;

        point.connect(kind.token(), move |handle| {
            info!(surface = %kind, lease = %handle.lease(), "bound");
            if kind == SurfaceKind::List {
                if let Err(e) = handle.select_by_index(nav_index as i64) {
                    warn!(surface = %kind, index = nav_index, error = %e, "initial selection failed");
                }
            }
            *binding.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
            let _ = ready_tx.send(());
        });
        ready_rx
    }

    pub fn is_bound(&self) -> bool {
        self.binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn handle(&self) -> Result<AttachmentHandle> {
        self.binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| PlayerError::misuse(format!("{} surface is not bound", self.kind)))
    }

    pub fn play(&self) -> Result<Snapshot> {
        self.handle()?.play()
    }

    pub fn pause(&self) -> Result<Snapshot> {
        self.handle()?.pause()
    }

    pub fn stop(&self) -> Result<Snapshot> {
        self.handle()?.stop()
    }

    pub fn next(&self) -> Result<Snapshot> {
        self.handle()?.next()
    }

    pub fn previous(&self) -> Result<Snapshot> {
        self.handle()?.previous()
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        self.handle()?.snapshot()
    }

    /// Play the song in list row `row` (zero-based).
    pub fn play_row(&self, row: i64) -> Result<Snapshot> {
        self.handle()?.select_by_index(row)
    }

    /// Show `row`'s song on the map.
    pub fn view_on_map(&self, row: usize) -> Result<Navigation> {
        self.checked(row)?;
        debug!(row, "view on map");
        Ok(Navigation {
            to: SurfaceKind::Map,
            index: row,
        })
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.playlist.markers()
    }

    /// Where the map camera opens: the handed-over song's country, else the
    /// first song's.
    pub fn camera(&self) -> Option<LatLng> {
        self.playlist
            .get(self.nav_index)
            .and_then(|t| coordinates(&t.country_code))
            .or_else(|| self.playlist.initial_camera())
    }

    /// Details for the marker at `index`. Does not touch playback.
    pub fn choose_marker(&self, index: usize) -> Result<MarkerDetails> {
        self.checked(index)?;
        let track = &self.playlist.tracks()[index];
        Ok(MarkerDetails {
            index,
            title: track.title.clone(),
            duration_label: track.duration_label.clone(),
            comment: track.comment.clone(),
            position: coordinates(&track.country_code),
            flag_key: flag_key(&track.country_code),
        })
    }

    pub fn play_marker(&self, index: usize) -> Result<Snapshot> {
        let handle = self.handle()?;
        self.checked(index)?;
        handle.select_by_index(index as i64)
    }

    /// Back to the list, carrying whatever is playing now.
    pub fn back(&self) -> Result<Navigation> {
        let index = self.handle()?.current_index()?;
        Ok(Navigation {
            to: SurfaceKind::List,
            index,
        })
    }

    /// Release this surface's lease.
    pub fn finish(&self, point: &AttachmentPoint, departure: Departure) -> Result<()> {
        let handle = self
            .binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| PlayerError::misuse(format!("{} surface is not bound", self.kind)))?;
        point.disconnect(&handle, departure)
    }

    fn checked(&self, index: usize) -> Result<usize> {
        if index < self.playlist.len() {
            Ok(index)
        } else {
            Err(PlayerError::OutOfRange {
                index: index as i64,
                len: self.playlist.len(),
            })
        }
    }
}
