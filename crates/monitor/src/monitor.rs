//! Monitor handle: lifecycle, configuration swaps, and status snapshots.

use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use regwatch_probe::{Prober, Target, TcpProber};

use crate::STOP_GRACE;
use crate::config::{ConfigError, PollConfig};
use crate::poll::{self, PollContext};
use crate::types::{ChangeFn, ConnectionState, StatusSnapshot};

/// Background connectivity monitor for a single target.
///
/// Starts in the stopped state. [`start`](Self::start) announces the first
/// observation unconditionally and then reports only transitions; the state
/// is forgotten again on [`stop`](Self::stop).
pub struct Monitor {
    ctx: PollContext,
    config_tx: watch::Sender<PollConfig>,
    worker: Mutex<Option<Worker>>,
    /// Dangles once the current worker task is gone.
    alive: std::sync::Mutex<Weak<()>>,
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Monitor {
    /// Creates a monitor that probes with a real TCP connect.
    pub fn new(config: PollConfig, on_change: ChangeFn) -> Self {
        Self::with_prober(config, Arc::new(TcpProber), on_change)
    }

    /// Creates a monitor with a custom [`Prober`].
    pub fn with_prober(config: PollConfig, prober: Arc<dyn Prober>, on_change: ChangeFn) -> Self {
        let (config_tx, _) = watch::channel(config);
        Self {
            ctx: PollContext {
                prober,
                on_change: Arc::new(on_change),
                state: Arc::new(RwLock::new(ConnectionState::default())),
                in_flight: Arc::new(RwLock::new(None)),
            },
            config_tx,
            worker: Mutex::new(None),
            alive: std::sync::Mutex::new(Weak::new()),
        }
    }

    /// Probes once, announces the result, and starts the background cadence.
    ///
    /// The initial probe runs on the caller's task, so this returns only after
    /// the first announcement has been delivered. Calling it while running is
    /// a no-op.
    pub async fn start(&self) {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            debug!("connection monitor already running");
            return;
        }

        // Subscribe before the first probe so a config swap racing with it
        // still wakes the worker.
        let mut config_rx = self.config_tx.subscribe();
        let config = config_rx.borrow_and_update().clone();

        self.ctx.reset_state();
        poll::tick(&self.ctx, &config).await;

        let cancel = CancellationToken::new();
        let token = Arc::new(());
        self.set_alive(Arc::downgrade(&token));
        let handle = tokio::spawn({
            let ctx = self.ctx.clone();
            let cancel = cancel.clone();
            async move {
                let _token = token;
                poll::poll_loop(ctx, config_rx, cancel).await;
            }
        });
        *worker = Some(Worker { cancel, handle });

        info!(
            addr = %config.target(),
            interval_secs = config.interval().as_secs_f64(),
            timeout_secs = config.timeout().as_secs_f64(),
            "connection monitor started"
        );
    }

    /// Stops the cadence and forgets the connection state.
    ///
    /// An in-flight probe is allowed to finish. If the worker has not exited
    /// within the probe timeout plus [`STOP_GRACE`] (for example because the
    /// change callback is stuck) it is aborted.
    pub async fn stop(&self) {
        let mut worker = self.worker.lock().await;
        let Some(Worker { cancel, mut handle }) = worker.take() else {
            return;
        };

        cancel.cancel();
        // A probe started before a config swap may still run under its older,
        // longer timeout.
        let current = self.config_tx.borrow().timeout();
        let bound = self.ctx.in_flight_timeout().map_or(current, |t| t.max(current)) + STOP_GRACE;

        match tokio::time::timeout(bound, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "poll worker terminated abnormally"),
            Err(_) => {
                warn!(
                    bound_secs = bound.as_secs_f64(),
                    "poll worker did not stop in time, aborting"
                );
                handle.abort();
            }
        }

        self.set_alive(Weak::new());
        self.ctx.reset_state();
        info!("connection monitor stopped");
    }

    /// Returns `true` while a poll worker is alive, i.e. after
    /// [`start`](Self::start) has completed and until [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.alive
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .strong_count()
            > 0
    }

    fn set_alive(&self, alive: Weak<()>) {
        *self.alive.lock().unwrap_or_else(PoisonError::into_inner) = alive;
    }

    /// Replaces the target and interval for subsequent ticks.
    ///
    /// The current timeout is kept, shortened to the new interval if needed.
    /// The connection state is not reset, so a new target whose reachability
    /// differs from the old one produces a change announcement.
    pub fn update_config(&self, target: Target, interval: Duration) -> Result<(), ConfigError> {
        let next = self
            .config_tx
            .borrow()
            .with_target_and_interval(target, interval)?;
        self.replace_config(next);
        Ok(())
    }

    /// Atomically swaps the whole poll configuration.
    ///
    /// A running worker wakes up and probes the new target immediately; a
    /// probe already in flight finishes against the old target.
    pub fn replace_config(&self, config: PollConfig) {
        info!(
            addr = %config.target(),
            interval_secs = config.interval().as_secs_f64(),
            timeout_secs = config.timeout().as_secs_f64(),
            "monitor configuration updated"
        );
        self.config_tx.send_replace(config);
    }

    /// Returns the current configuration.
    pub fn config(&self) -> PollConfig {
        self.config_tx.borrow().clone()
    }

    /// Non-blocking view of the last observation and active configuration.
    pub fn status(&self) -> StatusSnapshot {
        let state = self.ctx.snapshot();
        let config = self.config_tx.borrow();
        StatusSnapshot {
            running: self.is_running(),
            connected: state.connected,
            last_checked_at: state.last_checked_at,
            target: config.target().clone(),
            interval: config.interval(),
            timeout: config.timeout(),
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.cancel.cancel();
        }
    }
}
