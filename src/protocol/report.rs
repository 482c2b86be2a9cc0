//! Status report decoding for the Aquastream XT.
//!
//! Turns the 0x04 feature report into physical quantities. All multi-byte
//! fields are little-endian at fixed offsets.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{AquaError, Result};
use crate::protocol::commands::{REPORT_ID_STATUS, STATUS_REPORT_LENGTH};
use crate::protocol::flags::{PumpAlarms, PumpMode, Variant};

// =============================================================================
// Field Offsets
// =============================================================================

/// External fan voltage (u16, /61 V).
const OFFSET_FAN_VOLTAGE: usize = 7;
/// Pump voltage (u16, /61 V).
const OFFSET_PUMP_VOLTAGE: usize = 9;
/// Pump current (i16).
const OFFSET_PUMP_CURRENT: usize = 11;
/// External fan VRM temperature (u16, /100 °C).
const OFFSET_TEMP_FAN_VRM: usize = 13;
/// External temperature sensor (u16, /100 °C).
const OFFSET_TEMP_EXTERNAL: usize = 15;
/// Internal water temperature (u16, /100 °C).
const OFFSET_TEMP_WATER: usize = 17;
/// Pump period (i16).
const OFFSET_PUMP_PERIOD: usize = 19;
/// Pump max period (u16).
const OFFSET_PUMP_MAX_PERIOD: usize = 21;
/// Internal flow sensor (u32, raw).
const OFFSET_PUMP_FLOW: usize = 23;
/// External fan RPM (u32).
const OFFSET_FAN_RPM: usize = 27;
/// External fan control duty (u8, 0-255).
const OFFSET_FAN_DUTY: usize = 31;
const OFFSET_ALARMS: usize = 32;
const OFFSET_MODES: usize = 33;
const OFFSET_CONTROLLER_OUT: usize = 34;
const OFFSET_CONTROLLER_I: usize = 38;
const OFFSET_CONTROLLER_P: usize = 42;
const OFFSET_CONTROLLER_D: usize = 46;
const OFFSET_FIRMWARE: usize = 50;
const OFFSET_BOOTLOADER: usize = 52;
const OFFSET_HARDWARE: usize = 54;
const OFFSET_UNKNOWN_1: usize = 56;
const OFFSET_UNKNOWN_2: usize = 57;
const OFFSET_SERIAL: usize = 58;
const OFFSET_PUBLIC_KEY: usize = 60;
const PUBLIC_KEY_LENGTH: usize = 6;

// =============================================================================
// Scale Factors
// =============================================================================

const VOLTAGE_DIVISOR: f32 = 61.0;
const POWER_DIVISOR: f32 = 625.0;
const TEMPERATURE_DIVISOR: f32 = 100.0;
/// Pump period ticks per second.
const PERIOD_CLOCK_HZ: f32 = 750_000.0;

// =============================================================================
// Decoded Structures
// =============================================================================

/// Physical measurements from one valid status report.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSample {
    /// External fan voltage in volts.
    pub fan_voltage: f32,
    /// Pump voltage in volts.
    pub pump_voltage: f32,
    /// Pump power in watts (voltage x current).
    pub pump_power: f32,
    /// External fan VRM temperature in Celsius.
    pub temp_fan_vrm: f32,
    /// External temperature sensor in Celsius.
    pub temp_external: f32,
    /// Internal water temperature in Celsius.
    pub temp_water: f32,
    /// Pump frequency in Hz. `None` when the period field is zero.
    pub pump_frequency: Option<f32>,
    /// Maximum pump frequency in Hz. `None` when the max period field is zero.
    pub pump_max_frequency: Option<f32>,
    /// Pump speed, always `pump_frequency * 60`.
    pub pump_rpm: Option<f32>,
    /// Internal flow sensor count. The unit is unverified, so it stays raw.
    pub pump_flow: u32,
    /// External fan speed in RPM.
    pub fan_rpm: u32,
    /// External fan control output as percentage (0-100).
    pub fan_control_percent: f32,
    pub diagnostics: Diagnostics,
}

/// Fields only exposed when diagnostics are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub alarms: PumpAlarms,
    pub modes: PumpMode,
    /// Raw mode byte, including bits with no known meaning.
    pub mode_flags: u8,
    pub controller: ControllerState,
    pub firmware_version: u16,
    pub bootloader_version: u16,
    pub hardware_version: u16,
    pub unknown: [u8; 2],
    pub serial_number: u16,
    pub public_key: [u8; PUBLIC_KEY_LENGTH],
}

/// Internal fan controller registers. Meaning unverified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerState {
    pub output: u32,
    pub i: i32,
    pub p: i32,
    pub d: i32,
}

impl Diagnostics {
    /// Hardware variant from the mode byte.
    pub fn variant(&self) -> Variant {
        Variant::from_mode_flags(self.mode_flags)
    }

    /// Public key fragment as dash-separated hex, e.g. `0A-1B-2C-3D-4E-5F`.
    pub fn public_key_hex(&self) -> String {
        self.public_key
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join("-")
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Check the report id without decoding anything.
///
/// Used during startup synchronization to wait for the first real report.
pub fn is_status_report(buf: &[u8]) -> bool {
    buf.first() == Some(&REPORT_ID_STATUS)
}

/// Convert a pump period to a frequency; a zero period has no frequency.
fn period_to_frequency(period: f32) -> Option<f32> {
    if period == 0.0 {
        None
    } else {
        Some(PERIOD_CLOCK_HZ / period)
    }
}

impl DecodedSample {
    /// Decode a status feature report.
    ///
    /// # Arguments
    /// * `buf` - Raw feature report, report id included at index 0
    ///
    /// # Errors
    /// - `ShortBuffer` if the buffer is empty or shorter than the known layout
    /// - `UnexpectedReportType` if byte 0 is not 0x04 (checked before length)
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let Some(&report_id) = buf.first() else {
            return Err(AquaError::ShortBuffer {
                len: 0,
                expected: STATUS_REPORT_LENGTH,
            });
        };

        if report_id != REPORT_ID_STATUS {
            return Err(AquaError::UnexpectedReportType(report_id));
        }

        if buf.len() < STATUS_REPORT_LENGTH {
            return Err(AquaError::ShortBuffer {
                len: buf.len(),
                expected: STATUS_REPORT_LENGTH,
            });
        }

        let u16_at = |offset: usize| LittleEndian::read_u16(&buf[offset..offset + 2]);
        let i16_at = |offset: usize| LittleEndian::read_i16(&buf[offset..offset + 2]);
        let u32_at = |offset: usize| LittleEndian::read_u32(&buf[offset..offset + 4]);
        let i32_at = |offset: usize| LittleEndian::read_i32(&buf[offset..offset + 4]);

        let fan_voltage = u16_at(OFFSET_FAN_VOLTAGE) as f32 / VOLTAGE_DIVISOR;
        let pump_voltage = u16_at(OFFSET_PUMP_VOLTAGE) as f32 / VOLTAGE_DIVISOR;
        let pump_current = i16_at(OFFSET_PUMP_CURRENT) as f32;
        let pump_power = pump_voltage * pump_current / POWER_DIVISOR;

        let temp_fan_vrm = u16_at(OFFSET_TEMP_FAN_VRM) as f32 / TEMPERATURE_DIVISOR;
        let temp_external = u16_at(OFFSET_TEMP_EXTERNAL) as f32 / TEMPERATURE_DIVISOR;
        let temp_water = u16_at(OFFSET_TEMP_WATER) as f32 / TEMPERATURE_DIVISOR;

        let pump_frequency = period_to_frequency(i16_at(OFFSET_PUMP_PERIOD) as f32);
        let pump_rpm = pump_frequency.map(|hz| hz * 60.0);
        let pump_max_frequency = period_to_frequency(u16_at(OFFSET_PUMP_MAX_PERIOD) as f32);

        let fan_control_percent = buf[OFFSET_FAN_DUTY] as f32 * 100.0 / u8::MAX as f32;

        let mode_flags = buf[OFFSET_MODES];
        let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
        public_key.copy_from_slice(&buf[OFFSET_PUBLIC_KEY..OFFSET_PUBLIC_KEY + PUBLIC_KEY_LENGTH]);

        let diagnostics = Diagnostics {
            alarms: PumpAlarms::from_bits_retain(buf[OFFSET_ALARMS]),
            modes: PumpMode::from_bits_truncate(mode_flags),
            mode_flags,
            controller: ControllerState {
                output: u32_at(OFFSET_CONTROLLER_OUT),
                i: i32_at(OFFSET_CONTROLLER_I),
                p: i32_at(OFFSET_CONTROLLER_P),
                d: i32_at(OFFSET_CONTROLLER_D),
            },
            firmware_version: u16_at(OFFSET_FIRMWARE),
            bootloader_version: u16_at(OFFSET_BOOTLOADER),
            hardware_version: u16_at(OFFSET_HARDWARE),
            unknown: [buf[OFFSET_UNKNOWN_1], buf[OFFSET_UNKNOWN_2]],
            serial_number: u16_at(OFFSET_SERIAL),
            public_key,
        };

        Ok(DecodedSample {
            fan_voltage,
            pump_voltage,
            pump_power,
            temp_fan_vrm,
            temp_external,
            temp_water,
            pump_frequency,
            pump_max_frequency,
            pump_rpm,
            pump_flow: u32_at(OFFSET_PUMP_FLOW),
            fan_rpm: u32_at(OFFSET_FAN_RPM),
            fan_control_percent,
            diagnostics,
        })
    }

    /// Firmware version field of this report.
    pub fn firmware_version(&self) -> u16 {
        self.diagnostics.firmware_version
    }

    /// Hardware variant from the mode byte of this report.
    pub fn variant(&self) -> Variant {
        self.diagnostics.variant()
    }
}

/// Free-function form of [`DecodedSample::decode`].
pub fn decode(buf: &[u8]) -> Result<DecodedSample> {
    DecodedSample::decode(buf)
}

fn fmt_optional(value: Option<f32>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

impl std::fmt::Display for DecodedSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "+-----------------------------------+")?;
        writeln!(f, "|      Aquastream XT Status         |")?;
        writeln!(f, "+-----------------------------------+")?;
        writeln!(f, "|  Water Temp:     {:>7.2} C        |", self.temp_water)?;
        writeln!(f, "|  External Temp:  {:>7.2} C        |", self.temp_external)?;
        writeln!(f, "|  Fan VRM Temp:   {:>7.2} C        |", self.temp_fan_vrm)?;
        writeln!(f, "+-----------------------------------+")?;
        writeln!(f, "|  Pump Voltage:   {:>7.2} V        |", self.pump_voltage)?;
        writeln!(f, "|  Pump Power:     {:>7.2} W        |", self.pump_power)?;
        writeln!(
            f,
            "|  Pump Freq:      {:>7} Hz       |",
            fmt_optional(self.pump_frequency, 1)
        )?;
        writeln!(
            f,
            "|  Pump Max Freq:  {:>7} Hz       |",
            fmt_optional(self.pump_max_frequency, 1)
        )?;
        writeln!(
            f,
            "|  Pump Speed:     {:>7} RPM      |",
            fmt_optional(self.pump_rpm, 0)
        )?;
        writeln!(f, "|  Pump Flow:      {:>7} (raw)    |", self.pump_flow)?;
        writeln!(f, "+-----------------------------------+")?;
        writeln!(f, "|  Fan Voltage:    {:>7.2} V        |", self.fan_voltage)?;
        writeln!(f, "|  Fan Speed:      {:>7} RPM      |", self.fan_rpm)?;
        writeln!(
            f,
            "|  Fan Control:    {:>7.1} %        |",
            self.fan_control_percent
        )?;
        writeln!(f, "+-----------------------------------+")?;
        Ok(())
    }
}
