//! Public types for the connection monitor.

use std::time::Duration;

use chrono::{DateTime, Utc};
use regwatch_probe::Target;

/// Callback invoked on the poll worker with each reachability announcement.
pub type ChangeFn = Box<dyn Fn(ChangeEvent) + Send + Sync + 'static>;

/// Last observed reachability of the target.
///
/// `connected` is `None` until the first probe after `start()` completes and
/// again once the monitor is stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: Option<bool>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl ConnectionState {
    /// Records a probe result. Returns `true` if it differs from the previous
    /// observation (including the first observation after "unknown").
    pub(crate) fn observe(&mut self, connected: bool, at: DateTime<Utc>) -> bool {
        self.last_checked_at = Some(at);
        let changed = self.connected != Some(connected);
        self.connected = Some(connected);
        changed
    }
}

/// A reachability announcement handed to the [`ChangeFn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub connected: bool,
    pub timestamp: DateTime<Utc>,
}

/// Point-in-time view of the monitor for on-demand display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub running: bool,
    pub connected: Option<bool>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub target: Target,
    pub interval: Duration,
    pub timeout: Duration,
}
