//! How surfaces get hold of the controller.
//!
//! `connect` never blocks: the request goes to a binder thread that starts
//! the controller process if none is running, registers a lease and hands the
//! resulting handle to the surface's ready callback.

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use crate::audio::EngineFactory;
use crate::library::PlaylistStore;
use crate::notify::PublisherFactory;

use super::error::{PlayerError, Result};
use super::handle::AttachmentHandle;
use super::thread::{ControllerOptions, ControllerProcess};
use super::types::Departure;

/// Everything needed to (re)start the controller process.
#[derive(Clone)]
pub struct Launcher {
    pub playlist: PlaylistStore,
    pub engine_factory: EngineFactory,
    pub publisher_factory: PublisherFactory,
    pub options: ControllerOptions,
}

impl Launcher {
    fn launch(&self) -> Result<ControllerProcess> {
        ControllerProcess::spawn(
            self.playlist.clone(),
            self.engine_factory.clone(),
            (self.publisher_factory)(),
            self.options.clone(),
        )
    }
}

type ReadyCallback = Box<dyn FnOnce(AttachmentHandle) + Send>;

struct BindRequest {
    token: String,
    on_ready: ReadyCallback,
}

type ProcessSlot = Arc<Mutex<Option<ControllerProcess>>>;

fn lock_slot(slot: &ProcessSlot) -> MutexGuard<'_, Option<ControllerProcess>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct AttachmentPoint {
    requests: Option<Sender<BindRequest>>,
    binder: Option<JoinHandle<()>>,
    process: ProcessSlot,
}

impl AttachmentPoint {
    pub fn new(launcher: Launcher) -> Self {
        let (tx, rx) = mpsc::channel::<BindRequest>();
        let process: ProcessSlot = Arc::new(Mutex::new(None));

        let slot = process.clone();
        let binder = thread::spawn(move || {
            for req in rx {
                let handle = {
                    let mut guard = lock_slot(&slot);
                    bind(&launcher, &mut guard, &req.token)
                };
                // The callback runs with the slot unlocked: it is free to
                // issue controls or even disconnect.
                match handle {
                    Ok(handle) => (req.on_ready)(handle),
                    Err(e) => error!(surface = %req.token, error = %e, "connect failed"),
                }
            }
            debug!("binder exiting");
        });

        Self {
            requests: Some(tx),
            binder: Some(binder),
            process,
        }
    }

    /// Request a handle for the surface named `token`. Returns immediately;
    /// `on_ready` runs exactly once, on the binder thread, if attaching succeeds.
    pub fn connect<F>(&self, token: impl Into<String>, on_ready: F)
    where
        F: FnOnce(AttachmentHandle) + Send + 'static,
    {
        let token = token.into();
        debug!(surface = %token, "connect requested");
        let sent = self.requests.as_ref().is_some_and(|tx| {
            tx.send(BindRequest {
                token: token.clone(),
                on_ready: Box::new(on_ready),
            })
            .is_ok()
        });
        if !sent {
            error!(surface = %token, "connect after shutdown");
        }
    }

    /// Release `handle`'s lease. When `departure` is `Finishing` and this was
    /// the last lease, the controller process is torn down too.
    ///
    /// Disconnecting the same lease twice fails with `LifecycleMisuse`.
    pub fn disconnect(&self, handle: &AttachmentHandle, departure: Departure) -> Result<()> {
        let remaining = handle.detach()?;
        info!(surface = %handle.token(), ?departure, remaining, "disconnected");

        if departure != Departure::Finishing || remaining > 0 {
            return Ok(());
        }

        let mut guard = lock_slot(&self.process);
        // A connect may have raced in between; only tear down the process
        // this handle came from, and only while it is still unleased.
        let idle = guard
            .as_ref()
            .is_some_and(|p| handle.belongs_to(&p.shared) && p.lease_count() == 0);
        if idle {
            if let Some(mut process) = guard.take() {
                process.stop();
            }
        }
        Ok(())
    }

    /// Whether a controller process is currently alive.
    pub fn is_running(&self) -> bool {
        lock_slot(&self.process)
            .as_ref()
            .is_some_and(ControllerProcess::is_running)
    }

    /// Stop accepting connects, wait for pending ones, tear the controller down.
    pub fn shutdown(&mut self) {
        drop(self.requests.take());
        if let Some(binder) = self.binder.take() {
            if binder.join().is_err() {
                error!("binder thread panicked");
            }
        }
        if let Some(mut process) = lock_slot(&self.process).take() {
            process.stop();
        }
    }
}

impl Drop for AttachmentPoint {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Attach to the running process, starting one first if needed.
fn bind(
    launcher: &Launcher,
    slot: &mut Option<ControllerProcess>,
    token: &str,
) -> Result<AttachmentHandle> {
    if !slot.as_ref().is_some_and(ControllerProcess::is_running) {
        if let Some(mut dead) = slot.take() {
            dead.stop();
        }
        info!(surface = %token, "starting controller");
        *slot = Some(launcher.launch()?);
    }

    let Some(process) = slot.as_ref() else {
        return Err(PlayerError::misuse("controller failed to start"));
    };
    let lease = process.attach(token)?;
    Ok(AttachmentHandle::new(
        lease,
        token.to_string(),
        process.tx.clone(),
        process.shared.clone(),
    ))
}
