//! Runtime settings.
//!
//! The settings file doubles as the fan policy source: whatever
//! `fan_control` holds is the policy the host wants applied.

use serde::{Deserialize, Serialize};

use crate::control::ControlPolicy;
use crate::device::{DEFAULT_STARTUP_SYNC_ATTEMPTS, DeviceOptions};
use crate::error::{AquaError, Result};

/// Smallest accepted poll interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Main settings file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// HID path of the device. First known device when unset.
    #[serde(default)]
    pub device_path: Option<String>,

    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Reads allowed while waiting for the first valid report
    #[serde(default = "default_startup_sync_attempts")]
    pub startup_sync_attempts: u32,

    /// Expose alarm/mode/version slots
    #[serde(default)]
    pub diagnostics_enabled: bool,

    #[serde(default)]
    pub fan_control: ControlPolicy,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_startup_sync_attempts() -> u32 {
    DEFAULT_STARTUP_SYNC_ATTEMPTS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_path: None,
            poll_interval_ms: default_poll_interval_ms(),
            startup_sync_attempts: default_startup_sync_attempts(),
            diagnostics_enabled: false,
            fan_control: ControlPolicy::default(),
        }
    }
}

impl Settings {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(AquaError::InvalidConfig(format!(
                "poll_interval_ms must be at least {}, got {}",
                MIN_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }

        if self.startup_sync_attempts == 0 {
            return Err(AquaError::InvalidConfig(
                "startup_sync_attempts must be at least 1".into(),
            ));
        }

        if let ControlPolicy::Software(percent) = self.fan_control
            && !(0.0..=100.0).contains(&percent)
        {
            return Err(AquaError::InvalidConfig(format!(
                "fan_control percent must be 0-100, got {}",
                percent
            )));
        }

        Ok(())
    }

    /// Options for opening a device with these settings.
    pub fn device_options(&self) -> DeviceOptions {
        DeviceOptions {
            startup_sync_attempts: self.startup_sync_attempts,
            diagnostics_enabled: self.diagnostics_enabled,
            initial_policy: self.fan_control,
        }
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}
