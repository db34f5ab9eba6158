//! TCP reachability probe for the regwatch connectivity watchdog.
//!
//! A probe opens one TCP connection to a [`Target`], bounded by a timeout,
//! and reports whether the three-way handshake completed. No payload is
//! exchanged and every failure mode collapses to `false`.
//!
//! The [`Prober`] trait is the seam the poll loop uses, so tests can swap in
//! scripted results without touching the network.

mod target;
mod tcp;

pub use target::{Target, TargetError};
pub use tcp::{ProbeFuture, Prober, TcpProber, probe};
