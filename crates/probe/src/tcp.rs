//! TCP connect probe.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::target::Target;

/// A boxed future returned by [`Prober::probe`].
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// Reachability check used by the poll loop.
///
/// Implementations must resolve to `false` for every failure mode and must
/// not retry internally; the poll loop's cadence is the retry policy.
pub trait Prober: Send + Sync + 'static {
    /// Returns `true` if `target` accepted a connection within `timeout`.
    fn probe<'a>(&'a self, target: &'a Target, timeout: Duration) -> ProbeFuture<'a>;
}

/// [`Prober`] backed by a real TCP handshake.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl Prober for TcpProber {
    fn probe<'a>(&'a self, target: &'a Target, timeout: Duration) -> ProbeFuture<'a> {
        Box::pin(probe(target, timeout))
    }
}

/// Attempts one TCP connection to `target`, bounded by `timeout`.
///
/// Name resolution counts against the timeout. The socket is closed as soon
/// as the handshake completes; on timeout the pending connect is dropped,
/// which releases the socket as well.
pub async fn probe(target: &Target, timeout: Duration) -> bool {
    let connect = TcpStream::connect((target.host(), target.port()));

    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => {
            drop(stream);
            trace!(addr = %target, "probe connected");
            true
        }
        Ok(Err(e)) => {
            debug!(addr = %target, error = %e, "probe failed");
            false
        }
        Err(_) => {
            debug!(addr = %target, timeout_ms = timeout.as_millis() as u64, "probe timed out");
            false
        }
    }
}
