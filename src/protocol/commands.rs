//! Report identifiers and command builders for the Aquastream XT.
//!
//! The status report layout is known; the fan-control write format is not.
//! Command building is kept here so that the gap lives in one place.

use crate::control::FanCommand;
use crate::error::{AquaError, Result};

// =============================================================================
// Constants
// =============================================================================

/// Aquacomputer Vendor ID.
pub const AQUACOMPUTER_VID: u16 = 0x0C70;

/// Aquastream XT Product ID.
pub const AQUASTREAM_XT_PID: u16 = 0xF0B6;

/// Feature report id of the periodic status report.
pub const REPORT_ID_STATUS: u8 = 0x04;

/// Minimum length of a status report holding every known field.
pub const STATUS_REPORT_LENGTH: usize = 66;

/// Buffer size used for feature report reads.
///
/// Larger than the known layout so trailing bytes never truncate a read.
pub const FEATURE_BUFFER_LENGTH: usize = 128;

// =============================================================================
// Command Builders
// =============================================================================

/// Build the feature report carrying a fan command.
///
/// # Errors
/// Always returns `NotSupported`: the control write layout of this device has
/// not been reverse-engineered, and guessing it could reconfigure the pump.
pub fn build_fan_command(command: FanCommand) -> Result<Vec<u8>> {
    let what = match command {
        FanCommand::Clear => "returning the fan to firmware control".to_string(),
        FanCommand::Duty(duty) => format!("setting fan duty byte {}", duty),
    };

    Err(AquaError::NotSupported(format!(
        "{} (fan-control write protocol is not known for Aquastream XT)",
        what
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_commands_are_not_supported() {
        assert!(matches!(
            build_fan_command(FanCommand::Clear),
            Err(AquaError::NotSupported(_))
        ));

        match build_fan_command(FanCommand::Duty(128)) {
            Err(AquaError::NotSupported(msg)) => assert!(msg.contains("128")),
            other => panic!("expected NotSupported, got {:?}", other),
        }
    }

    #[test]
    fn test_report_fits_feature_buffer() {
        assert!(STATUS_REPORT_LENGTH <= FEATURE_BUFFER_LENGTH);
    }
}
