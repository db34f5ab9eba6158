//! Monitor settings management.
//!
//! Settings are stored as TOML:
//! - Unix: `~/.config/regwatch/config.toml`
//! - Windows: `%APPDATA%/regwatch/config.toml`

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regwatch_monitor::{PollConfig, Target};
use serde::{Deserialize, Serialize};

/// A single problem found by [`Settings::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("IP address cannot be empty")]
    EmptyAddress,

    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("port must be between 1 and 65535")]
    InvalidPort,

    #[error("check interval must be at least 1 second")]
    IntervalTooShort,

    #[error("timeout must be at least 1 second")]
    TimeoutTooShort,
}

/// Monitor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Name shown in the tray tooltip and menu.
    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// IP address of the monitored device.
    #[serde(default = "default_ip_address")]
    pub ip_address: String,

    /// TCP port of the monitored device (4999 is the Datecs default).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between checks.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,

    /// Seconds to wait for a connection; capped at the check interval.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_device_name() -> String {
    "Cash Register".into()
}

fn default_ip_address() -> String {
    "192.168.1.155".into()
}

fn default_port() -> u16 {
    4999
}

fn default_check_interval() -> u64 {
    5
}

fn default_timeout() -> u64 {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            ip_address: default_ip_address(),
            port: default_port(),
            check_interval: default_check_interval(),
            timeout: default_timeout(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or writes and returns defaults if missing.
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            let settings = Settings::default();
            settings.save(path)?;
            Ok(settings)
        }
    }

    /// Saves the settings to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Returns every problem with the current values.
    pub fn validate(&self) -> Vec<SettingsError> {
        let mut errors = Vec::new();

        let ip = self.ip_address.trim();
        if ip.is_empty() {
            errors.push(SettingsError::EmptyAddress);
        } else if ip.parse::<IpAddr>().is_err() {
            errors.push(SettingsError::InvalidAddress(ip.to_string()));
        }

        if self.port == 0 {
            errors.push(SettingsError::InvalidPort);
        }
        if self.check_interval < 1 {
            errors.push(SettingsError::IntervalTooShort);
        }
        if self.timeout < 1 {
            errors.push(SettingsError::TimeoutTooShort);
        }

        errors
    }

    /// Builds the monitor configuration, capping the timeout at the interval.
    pub fn poll_config(&self) -> anyhow::Result<PollConfig> {
        let errors = self.validate();
        if !errors.is_empty() {
            let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("invalid settings: {}", reasons.join("; "));
        }

        if self.timeout > self.check_interval {
            tracing::debug!(
                timeout = self.timeout,
                check_interval = self.check_interval,
                "timeout exceeds check interval, capping"
            );
        }

        let target = Target::new(self.ip_address.trim(), self.port)?;
        let interval = Duration::from_secs(self.check_interval);
        let timeout = Duration::from_secs(self.timeout.min(self.check_interval));
        Ok(PollConfig::new(target, interval, timeout)?)
    }
}

/// Returns the platform-specific settings file path.
pub fn default_path() -> anyhow::Result<PathBuf> {
    #[cfg(unix)]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("regwatch")
            .join("config.toml"))
    }

    #[cfg(windows)]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("regwatch").join("config.toml"))
    }

    #[cfg(not(any(unix, windows)))]
    {
        Ok(PathBuf::from("regwatch").join("config.toml"))
    }
}
