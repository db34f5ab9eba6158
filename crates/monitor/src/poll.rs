//! Poll worker: one probe per tick, callback only on transitions.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use regwatch_probe::{Prober, Target};

use crate::config::PollConfig;
use crate::types::{ChangeEvent, ChangeFn, ConnectionState};

/// State shared between the [`Monitor`](crate::Monitor) handle and its worker.
#[derive(Clone)]
pub(crate) struct PollContext {
    pub(crate) prober: Arc<dyn Prober>,
    pub(crate) on_change: Arc<ChangeFn>,
    pub(crate) state: Arc<RwLock<ConnectionState>>,
    /// Timeout of the probe currently running, if any.
    pub(crate) in_flight: Arc<RwLock<Option<Duration>>>,
}

impl PollContext {
    pub(crate) fn snapshot(&self) -> ConnectionState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn in_flight_timeout(&self) -> Option<Duration> {
        *self.in_flight.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_in_flight(&self, timeout: Option<Duration>) {
        *self.in_flight.write().unwrap_or_else(PoisonError::into_inner) = timeout;
    }

    pub(crate) fn reset_state(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = ConnectionState::default();
    }
}

/// Runs the cadence until `cancel` fires or the config sender is dropped.
///
/// Cancellation is only observed between ticks; an in-flight probe always
/// runs to completion. A config replacement wakes the worker early so the
/// new target is checked right away.
pub(crate) async fn poll_loop(
    ctx: PollContext,
    mut config_rx: watch::Receiver<PollConfig>,
    cancel: CancellationToken,
) {
    loop {
        let interval = config_rx.borrow().interval();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            changed = config_rx.changed() => {
                if changed.is_err() {
                    debug!("monitor handle dropped, stopping poll worker");
                    break;
                }
                debug!("configuration replaced, probing immediately");
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let config = config_rx.borrow_and_update().clone();
        tick(&ctx, &config).await;
    }

    debug!("poll worker exited");
}

/// Probes once and announces the result if it differs from the stored state.
pub(crate) async fn tick(ctx: &PollContext, config: &PollConfig) {
    ctx.set_in_flight(Some(config.timeout()));
    let connected = guarded_probe(ctx.prober.as_ref(), config.target(), config.timeout()).await;
    ctx.set_in_flight(None);
    let now = Utc::now();

    let changed = ctx
        .state
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .observe(connected, now);

    if changed {
        info!(addr = %config.target(), connected, "connection state changed");
        notify(
            &ctx.on_change,
            ChangeEvent {
                connected,
                timestamp: now,
            },
        );
    } else {
        trace!(addr = %config.target(), connected, "connection state unchanged");
    }
}

/// Runs the prober, turning a panic or an overrun of the timeout into `false`.
///
/// The `probe` call itself happens inside the guarded future, so a prober
/// that panics before returning its future is caught as well.
async fn guarded_probe(prober: &dyn Prober, target: &Target, timeout: Duration) -> bool {
    let attempt = AssertUnwindSafe(async { prober.probe(target, timeout).await }).catch_unwind();

    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(connected)) => connected,
        Ok(Err(payload)) => {
            warn!(addr = %target, reason = panic_message(&*payload), "probe panicked");
            false
        }
        Err(_) => {
            debug!(addr = %target, "probe overran its timeout");
            false
        }
    }
}

/// Invokes the change callback; a panicking observer is logged, not fatal.
fn notify(on_change: &ChangeFn, event: ChangeEvent) {
    if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(|| on_change(event))) {
        error!(
            connected = event.connected,
            reason = panic_message(&*payload),
            "change callback panicked"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use regwatch_probe::ProbeFuture;

    struct Fixed(bool);

    impl Prober for Fixed {
        fn probe<'a>(&'a self, _: &'a Target, _: Duration) -> ProbeFuture<'a> {
            let result = self.0;
            Box::pin(async move { result })
        }
    }

    struct Panics;

    fn explode() -> bool {
        panic!("socket layer exploded")
    }

    impl Prober for Panics {
        fn probe<'a>(&'a self, _: &'a Target, _: Duration) -> ProbeFuture<'a> {
            Box::pin(async { explode() })
        }
    }

    struct PanicsOnCall;

    impl Prober for PanicsOnCall {
        fn probe<'a>(&'a self, _: &'a Target, _: Duration) -> ProbeFuture<'a> {
            panic!("could not build connect future")
        }
    }

    struct Hangs;

    impl Prober for Hangs {
        fn probe<'a>(&'a self, _: &'a Target, _: Duration) -> ProbeFuture<'a> {
            Box::pin(std::future::pending::<bool>())
        }
    }

    fn config() -> PollConfig {
        PollConfig::new(
            Target::new("192.168.1.155", 4999).unwrap(),
            Duration::from_secs(5),
            Duration::from_secs(3),
        )
        .unwrap()
    }

    fn context(prober: impl Prober, on_change: ChangeFn) -> PollContext {
        PollContext {
            prober: Arc::new(prober),
            on_change: Arc::new(on_change),
            state: Arc::new(RwLock::new(ConnectionState::default())),
            in_flight: Arc::new(RwLock::new(None)),
        }
    }

    #[tokio::test]
    async fn tick_announces_first_observation() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let ctx = context(
            Fixed(false),
            Box::new(move |e| sink.lock().unwrap().push(e.connected)),
        );

        tick(&ctx, &config()).await;

        assert_eq!(*events.lock().unwrap(), vec![false]);
        assert_eq!(ctx.snapshot().connected, Some(false));
        assert!(ctx.snapshot().last_checked_at.is_some());
    }

    #[tokio::test]
    async fn tick_is_silent_when_unchanged() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let ctx = context(
            Fixed(true),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tick(&ctx, &config()).await;
        let first_check = ctx.snapshot().last_checked_at;
        tick(&ctx, &config()).await;
        tick(&ctx, &config()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(ctx.snapshot().last_checked_at >= first_check);
    }

    #[tokio::test]
    async fn panicking_probe_reads_as_disconnected() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let ctx = context(Panics, Box::new(move |e| sink.lock().unwrap().push(e.connected)));

        tick(&ctx, &config()).await;

        assert_eq!(*events.lock().unwrap(), vec![false]);
    }

    #[tokio::test]
    async fn prober_panicking_on_call_reads_as_disconnected() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let ctx = context(
            PanicsOnCall,
            Box::new(move |e| sink.lock().unwrap().push(e.connected)),
        );

        tick(&ctx, &config()).await;
        tick(&ctx, &config()).await;

        assert_eq!(*events.lock().unwrap(), vec![false]);
        assert_eq!(ctx.in_flight_timeout(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_timeout_tracks_running_probe() {
        let ctx = context(Hangs, Box::new(|_| {}));
        let worker = ctx.clone();
        let handle = tokio::spawn(async move { tick(&worker, &config()).await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ctx.in_flight_timeout(), Some(Duration::from_secs(3)));

        handle.await.unwrap();
        assert_eq!(ctx.in_flight_timeout(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_probe_is_cut_off_at_timeout() {
        let ctx = context(Hangs, Box::new(|_| {}));

        let started = tokio::time::Instant::now();
        tick(&ctx, &config()).await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));
        assert_eq!(ctx.snapshot().connected, Some(false));
    }

    #[tokio::test]
    async fn panicking_callback_does_not_poison_state() {
        let ctx = context(Fixed(true), Box::new(|_| panic!("observer bug")));

        tick(&ctx, &config()).await;

        assert_eq!(ctx.snapshot().connected, Some(true));
    }

    #[tokio::test]
    async fn reset_state_returns_to_unknown() {
        let ctx = context(Fixed(true), Box::new(|_| {}));
        tick(&ctx, &config()).await;

        ctx.reset_state();

        assert_eq!(ctx.snapshot(), ConnectionState::default());
    }

    #[test]
    fn panic_message_extracts_strings() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*payload), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*payload), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*payload), "unknown panic");
    }
}
