//! HID protocol implementation for the Aquacomputer Aquastream XT.
//!
//! This module contains the report constants, the status report decoder,
//! flag/variant resolution and the firmware check. Offsets come from
//! observing the 0x04 feature report on real units.

pub mod commands;
pub mod firmware;
pub mod flags;
pub mod report;

pub use commands::*;
pub use firmware::{FIRMWARE_MIN_TESTED, FIRMWARE_RECOMMENDED, FirmwareStatus};
pub use flags::{PumpAlarms, PumpMode, Variant};
pub use report::{ControllerState, DecodedSample, Diagnostics, decode, is_status_report};
