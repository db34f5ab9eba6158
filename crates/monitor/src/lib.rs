//! Connectivity watchdog for a single networked device.
//!
//! [`Monitor`] probes a [`Target`] on a fixed cadence and reports through a
//! single callback only when reachability flips. The first observation after
//! [`Monitor::start`] is always announced so observers can initialise their
//! display.
//!
//! The callback runs on the poll worker. It should be quick: a slow callback
//! delays the next tick by however long it takes.

mod config;
mod monitor;
mod poll;
pub mod types;

pub use config::{ConfigError, PollConfig};
pub use monitor::Monitor;
pub use regwatch_probe::{ProbeFuture, Prober, Target, TargetError, TcpProber};
pub use types::{ChangeEvent, ChangeFn, ConnectionState, StatusSnapshot};

/// Extra time `stop()` waits beyond the probe timeout before aborting the worker.
pub const STOP_GRACE: std::time::Duration = std::time::Duration::from_secs(1);
