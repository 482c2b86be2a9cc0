//! Firmware version staleness check.

/// Oldest firmware the decoder has been checked against.
pub const FIRMWARE_MIN_TESTED: u16 = 1008;

/// Firmware version recommended to users running something older.
pub const FIRMWARE_RECOMMENDED: u16 = 1018;

/// Result of checking a firmware version. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareStatus {
    Ok,
    Untested(u16),
}

impl FirmwareStatus {
    pub fn check(version: u16) -> Self {
        if version < FIRMWARE_MIN_TESTED {
            FirmwareStatus::Untested(version)
        } else {
            FirmwareStatus::Ok
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FirmwareStatus::Ok)
    }
}

impl std::fmt::Display for FirmwareStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FirmwareStatus::Ok => write!(f, "Status: OK"),
            FirmwareStatus::Untested(version) => write!(
                f,
                "Status: Untested Firmware Version {}! Please consider Updating to Version {}",
                version, FIRMWARE_RECOMMENDED
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_warns() {
        let status = FirmwareStatus::check(1007);
        assert!(!status.is_ok());
        let msg = status.to_string();
        assert!(msg.contains("1007"));
        assert!(msg.contains("1018"));
    }

    #[test]
    fn test_threshold_is_ok() {
        assert_eq!(FirmwareStatus::check(1008).to_string(), "Status: OK");
        assert_eq!(FirmwareStatus::check(1018), FirmwareStatus::Ok);
    }
}
