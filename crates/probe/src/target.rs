//! The device address a probe connects to.

use std::fmt;
use std::str::FromStr;

/// Errors produced when building or parsing a [`Target`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("host cannot be empty")]
    EmptyHost,

    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("missing port (expected host:port)")]
    MissingPort,

    #[error("port must be between 1 and 65535, got {0:?}")]
    InvalidPort(String),
}

/// Host and port of the monitored device.
///
/// The host may be an IP literal or a name that resolves through the system
/// resolver at probe time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    host: String,
    port: u16,
}

impl Target {
    /// Creates a target, rejecting an empty host and port 0.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, TargetError> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return Err(TargetError::EmptyHost);
        }
        if port == 0 {
            return Err(TargetError::InvalidPort(port.to_string()));
        }
        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Target {
    type Err = TargetError;

    /// Parses `host:port`, with IPv6 literals written as `[addr]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s.trim().rsplit_once(':').ok_or(TargetError::MissingPort)?;
        let host = host.trim();

        let host = match host.strip_prefix('[') {
            Some(rest) => rest
                .strip_suffix(']')
                .ok_or_else(|| TargetError::InvalidHost(host.to_string()))?,
            None if host.contains(':') => return Err(TargetError::InvalidHost(host.to_string())),
            None => host,
        };

        let port = port.trim();
        let port: u16 = port
            .parse()
            .map_err(|_| TargetError::InvalidPort(port.to_string()))?;

        Target::new(host, port)
    }
}
