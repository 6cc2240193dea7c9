use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::audio::EngineFactory;
use crate::config::BoundaryPolicy;
use crate::library::PlaylistStore;
use crate::notify::{NotificationPublisher, NowPlaying};

use super::error::{PlayerError, Result};
use super::state::Player;
use super::types::{Command, LeaseId, Published, SharedState, lock_published};

/// Knobs the controller process runs with.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub boundary: BoundaryPolicy,
    pub auto_advance: bool,
    pub poll_interval: Duration,
    pub fade_out: Duration,
    pub notification_id: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::Wrap,
            auto_advance: true,
            poll_interval: Duration::from_millis(200),
            fade_out: Duration::ZERO,
            notification_id: "songmap.now-playing".to_string(),
        }
    }
}

/// A running controller thread and the channel into it.
pub(crate) struct ControllerProcess {
    pub tx: Sender<Command>,
    pub shared: SharedState,
    fade_out: Duration,
    join: Option<JoinHandle<()>>,
}

impl ControllerProcess {
    /// Start the controller thread. Returns once the engine has been built
    /// on that thread, or with the engine's error if it could not be.
    pub fn spawn(
        playlist: PlaylistStore,
        engine_factory: EngineFactory,
        publisher: Box<dyn NotificationPublisher>,
        options: ControllerOptions,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let shared: SharedState = Arc::new(Mutex::new(Published::default()));
        let fade_out = options.fade_out;

        let shared_for_thread = shared.clone();
        let join = thread::spawn(move || {
            let engine = match engine_factory() {
                Ok(engine) => engine,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let player = Player::new(
                playlist,
                engine,
                options.boundary,
                options.notification_id.clone(),
            );
            lock_published(&shared_for_thread).running = true;
            let _ = ready_tx.send(Ok(()));
            run(player, rx, shared_for_thread, publisher, &options);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("controller started");
                Ok(Self {
                    tx,
                    shared,
                    fade_out,
                    join: Some(join),
                })
            }
            Ok(Err(source)) => {
                let _ = join.join();
                error!(error = %source, "controller start-up failed: no engine");
                Err(PlayerError::EngineUnavailable(source))
            }
            Err(_) => {
                let _ = join.join();
                Err(PlayerError::misuse("controller thread exited during start-up"))
            }
        }
    }

    pub fn is_running(&self) -> bool {
        lock_published(&self.shared).running
    }

    pub fn lease_count(&self) -> usize {
        lock_published(&self.shared).leases.len()
    }

    /// Register a lease for `token`.
    pub fn attach(&self, token: &str) -> Result<LeaseId> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Command::Attach {
                token: token.to_string(),
                reply: reply_tx,
            })
            .map_err(|_| PlayerError::misuse("controller is not running"))?;
        reply_rx
            .recv()
            .map_err(|_| PlayerError::misuse("controller stopped while attaching"))
    }

    /// Ask the thread to fade out and exit, then wait for it. Idempotent.
    pub fn stop(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        let _ = self.tx.send(Command::Shutdown {
            fade_out: self.fade_out,
        });
        if join.join().is_err() {
            error!("controller thread panicked");
        }
        info!("controller stopped");
    }
}

impl Drop for ControllerProcess {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    mut player: Player,
    rx: Receiver<Command>,
    shared: SharedState,
    mut publisher: Box<dyn NotificationPublisher>,
    options: &ControllerOptions,
) {
    let mut next_lease: u64 = 1;
    publish(&shared, &player);

    loop {
        match rx.recv_timeout(options.poll_interval) {
            Ok(cmd) => match cmd {
                Command::Attach { token, reply } => {
                    let lease = LeaseId(next_lease);
                    next_lease += 1;
                    let count = {
                        let mut s = lock_published(&shared);
                        s.leases.insert(lease, token.clone());
                        s.leases.len()
                    };
                    info!(%lease, surface = %token, leases = count, "attached");
                    let _ = reply.send(lease);
                }

                Command::Detach { lease, reply } => {
                    let result = {
                        let mut s = lock_published(&shared);
                        match s.leases.remove(&lease) {
                            Some(token) => {
                                info!(%lease, surface = %token, leases = s.leases.len(), "detached");
                                Ok(s.leases.len())
                            }
                            None => Err(PlayerError::misuse(format!("{lease} is not attached"))),
                        }
                    };
                    if let Err(e) = &result {
                        warn!(error = %e, "detach rejected");
                    }
                    let _ = reply.send(result);
                }

                Command::Control {
                    lease,
                    control,
                    reply,
                } => {
                    let attached = lock_published(&shared).leases.contains_key(&lease);
                    let result = if attached {
                        debug!(%lease, ?control, "control");
                        let outcome = player.apply(control);
                        // State goes out before anyone hears about the change.
                        publish(&shared, &player);
                        announce(publisher.as_mut(), &outcome);
                        outcome.map(|_| player.snapshot())
                    } else {
                        warn!(%lease, ?control, "control from a detached lease");
                        Err(PlayerError::misuse(format!("{lease} is not attached")))
                    };
                    let _ = reply.send(result);
                }

                Command::Shutdown { fade_out } => {
                    player.shutdown(fade_out);
                    retire(&shared, &player);
                    break;
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                // Periodic end-of-track check.
                if let Some(outcome) = player.poll_track_end(options.auto_advance) {
                    publish(&shared, &player);
                    announce(publisher.as_mut(), &outcome);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                player.shutdown(Duration::ZERO);
                retire(&shared, &player);
                break;
            }
        }
    }
}

fn publish(shared: &SharedState, player: &Player) {
    lock_published(shared).snapshot = player.snapshot();
}

fn retire(shared: &SharedState, player: &Player) {
    let mut s = lock_published(shared);
    s.snapshot = player.snapshot();
    s.leases.clear();
    s.running = false;
}

fn announce(
    publisher: &mut dyn NotificationPublisher,
    outcome: &Result<Option<NowPlaying>>,
) {
    match outcome {
        Ok(Some(event)) => publisher.on_now_playing(event),
        Ok(None) => {}
        Err(e @ PlayerError::EngineFailure { index, .. }) => publisher.on_playback_error(*index, e),
        Err(_) => {}
    }
}
