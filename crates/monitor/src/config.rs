//! Poll cadence configuration.

use std::time::Duration;

use regwatch_probe::Target;

/// Errors produced when building a [`PollConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("check interval must be greater than zero")]
    ZeroInterval,

    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,

    #[error("probe timeout ({timeout:?}) exceeds check interval ({interval:?})")]
    TimeoutExceedsInterval { timeout: Duration, interval: Duration },
}

/// What to probe and how often.
///
/// Always valid once built: both durations are non-zero and the timeout never
/// exceeds the interval, so probes cannot pile up behind each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    target: Target,
    interval: Duration,
    timeout: Duration,
}

impl PollConfig {
    pub fn new(target: Target, interval: Duration, timeout: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if timeout > interval {
            return Err(ConfigError::TimeoutExceedsInterval { timeout, interval });
        }
        Ok(Self {
            target,
            interval,
            timeout,
        })
    }

    /// Builds a replacement config with a new target and interval, keeping the
    /// current timeout but shortening it if it would exceed the new interval.
    pub fn with_target_and_interval(
        &self,
        target: Target,
        interval: Duration,
    ) -> Result<Self, ConfigError> {
        Self::new(target, interval, self.timeout.min(interval))
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::new("192.168.1.155", 4999).unwrap()
    }

    #[test]
    fn valid_config() {
        let config =
            PollConfig::new(target(), Duration::from_secs(5), Duration::from_secs(3)).unwrap();
        assert_eq!(config.target().port(), 4999);
        assert_eq!(config.interval(), Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn timeout_equal_to_interval_is_allowed() {
        assert!(PollConfig::new(target(), Duration::from_secs(1), Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn rejects_zero_durations() {
        assert_eq!(
            PollConfig::new(target(), Duration::ZERO, Duration::from_secs(1)),
            Err(ConfigError::ZeroInterval)
        );
        assert_eq!(
            PollConfig::new(target(), Duration::from_secs(1), Duration::ZERO),
            Err(ConfigError::ZeroTimeout)
        );
    }

    #[test]
    fn rejects_timeout_longer_than_interval() {
        let err = PollConfig::new(target(), Duration::from_secs(1), Duration::from_secs(3))
            .unwrap_err();
        assert!(matches!(err, ConfigError::TimeoutExceedsInterval { .. }));
    }

    #[test]
    fn with_target_and_interval_clamps_timeout() {
        let config =
            PollConfig::new(target(), Duration::from_secs(5), Duration::from_secs(3)).unwrap();
        let other = Target::new("10.0.0.7", 9100).unwrap();

        let shorter = config
            .with_target_and_interval(other.clone(), Duration::from_secs(1))
            .unwrap();
        assert_eq!(shorter.target(), &other);
        assert_eq!(shorter.timeout(), Duration::from_secs(1));

        let longer = config
            .with_target_and_interval(other, Duration::from_secs(30))
            .unwrap();
        assert_eq!(longer.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn with_target_and_interval_rejects_zero_interval() {
        let config =
            PollConfig::new(target(), Duration::from_secs(5), Duration::from_secs(3)).unwrap();
        assert_eq!(
            config.with_target_and_interval(target(), Duration::ZERO),
            Err(ConfigError::ZeroInterval)
        );
    }
}
