use std::sync::mpsc::{self, Sender};

use super::error::{PlayerError, Result};
use super::types::{Command, Control, LeaseId, PlaybackStatus, SharedState, Snapshot, lock_published};

/// A surface's lease on the shared controller.
///
/// The handle is a reference to the controller, never a copy of its state.
/// Clones share the same lease; once the lease is released through
/// `AttachmentPoint::disconnect` every clone fails with `LifecycleMisuse`.
#[derive(Debug, Clone)]
pub struct AttachmentHandle {
    lease: LeaseId,
    token: String,
    tx: Sender<Command>,
    shared: SharedState,
}

impl AttachmentHandle {
    pub(crate) fn new(lease: LeaseId, token: String, tx: Sender<Command>, shared: SharedState) -> Self {
        Self {
            lease,
            token,
            tx,
            shared,
        }
    }

    pub fn lease(&self) -> LeaseId {
        self.lease
    }

    /// The surface this lease was issued to.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn play(&self) -> Result<Snapshot> {
        self.control(Control::Play)
    }

    pub fn pause(&self) -> Result<Snapshot> {
        self.control(Control::Pause)
    }

    pub fn stop(&self) -> Result<Snapshot> {
        self.control(Control::Stop)
    }

    pub fn select_by_index(&self, index: i64) -> Result<Snapshot> {
        self.control(Control::Select(index))
    }

    pub fn next(&self) -> Result<Snapshot> {
        self.control(Control::Next)
    }

    pub fn previous(&self) -> Result<Snapshot> {
        self.control(Control::Previous)
    }

    pub fn current_index(&self) -> Result<usize> {
        self.snapshot().map(|s| s.index)
    }

    pub fn current_status(&self) -> Result<PlaybackStatus> {
        self.snapshot().map(|s| s.status)
    }

    /// Index and status read together under one lock.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let s = lock_published(&self.shared);
        if !s.running {
            return Err(PlayerError::misuse("controller is not running"));
        }
        if !s.leases.contains_key(&self.lease) {
            return Err(PlayerError::misuse(format!("{} is not attached", self.lease)));
        }
        Ok(s.snapshot)
    }

    /// Send a control and wait for the controller to apply it. Controls from
    /// every handle queue on the same channel and apply one at a time.
    pub fn control(&self, control: Control) -> Result<Snapshot> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Command::Control {
                lease: self.lease,
                control,
                reply: reply_tx,
            })
            .map_err(|_| PlayerError::misuse("controller is not running"))?;
        reply_rx
            .recv()
            .map_err(|_| PlayerError::misuse("controller stopped before replying"))?
    }

    /// Release the lease. Replies with the number of leases left.
    pub(crate) fn detach(&self) -> Result<usize> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Command::Detach {
                lease: self.lease,
                reply: reply_tx,
            })
            .map_err(|_| PlayerError::misuse("controller is not running"))?;
        reply_rx
            .recv()
            .map_err(|_| PlayerError::misuse("controller stopped before replying"))?
    }

    pub(crate) fn belongs_to(&self, shared: &SharedState) -> bool {
        std::sync::Arc::ptr_eq(&self.shared, shared)
    }
}
