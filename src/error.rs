//! Custom error types for Aquacomputer devices.
//!
//! This module provides fine-grained error handling for device communication,
//! report decoding, and configuration validation.

use thiserror::Error;

/// Main error type for Aquacomputer device operations.
#[derive(Error, Debug)]
pub enum AquaError {
    /// Buffer is too small to contain the known field layout.
    #[error("Report too short: {len} bytes, expected at least {expected}")]
    ShortBuffer { len: usize, expected: usize },

    /// Leading byte is not the status report id.
    ///
    /// The device intermittently hands back stale or partial reports, so this
    /// only means "skip this poll".
    #[error("Unexpected report type {0:#04x}")]
    UnexpectedReportType(u8),

    /// HID communication error.
    #[error("HID communication error: {0}")]
    HidError(#[from] hidapi::HidError),

    /// The requested operation has no known protocol encoding.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Device not found during enumeration.
    #[error("Aquastream XT not found. Check USB connection and permissions.")]
    DeviceNotFound,

    /// Vendor/product pair has no driver.
    #[error("No driver for device {vendor_id:04x}:{product_id:04x}")]
    UnknownDevice { vendor_id: u16, product_id: u16 },

    /// Timeout waiting for a valid status report.
    #[error("Timeout waiting for a valid status report after {0} reads")]
    Timeout(u32),

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Settings file could not be read, parsed, or written.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AquaError {
    /// Whether the caller should simply retry on the next poll.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AquaError::UnexpectedReportType(_))
    }
}

/// Result type alias for Aquacomputer operations.
pub type Result<T> = std::result::Result<T, AquaError>;
