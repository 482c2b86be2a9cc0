//! Aquacomputer Aquastream XT device implementation.
//!
//! Polls the 0x04 status feature report, keeps the latest decoded sample, and
//! runs the fan control policy for the external fan output.

use log::{debug, info, warn};

use crate::control::{ControlEvent, ControlPolicy, transition};
use crate::device::transport::Transport;
use crate::device::{Device, DeviceOptions, PollOutcome};
use crate::error::{AquaError, Result};
use crate::protocol::{
    DecodedSample, FEATURE_BUFFER_LENGTH, FirmwareStatus, REPORT_ID_STATUS, Variant,
    build_fan_command, is_status_report,
};
use crate::sensors::{Reading, SensorId, SensorKind, SensorSink, SensorSlot};

// =============================================================================
// Sensor Layout
// =============================================================================

const fn slot(kind: SensorKind, index: u8, key: &'static str, name: &'static str) -> SensorSlot {
    SensorSlot {
        id: SensorId::new(kind, index),
        key,
        name,
    }
}

pub const SLOT_FAN_VOLTAGE: SensorSlot =
    slot(SensorKind::Voltage, 1, "fan_voltage", "External Fan");
pub const SLOT_PUMP_VOLTAGE: SensorSlot = slot(SensorKind::Voltage, 2, "pump_voltage", "Pump");
pub const SLOT_PUMP_POWER: SensorSlot = slot(SensorKind::Power, 0, "pump_power", "Pump");
pub const SLOT_TEMP_FAN_VRM: SensorSlot =
    slot(SensorKind::Temperature, 0, "temp_fan_vrm", "External Fan VRM");
pub const SLOT_TEMP_EXTERNAL: SensorSlot =
    slot(SensorKind::Temperature, 1, "temp_external", "External");
pub const SLOT_TEMP_WATER: SensorSlot =
    slot(SensorKind::Temperature, 2, "temp_water", "Internal Water");
pub const SLOT_PUMP_FREQUENCY: SensorSlot =
    slot(SensorKind::Frequency, 0, "pump_frequency", "Pump Frequency");
pub const SLOT_PUMP_MAX_FREQUENCY: SensorSlot =
    slot(SensorKind::Frequency, 1, "pump_max_frequency", "Pump MaxFrequency");
pub const SLOT_FAN_RPM: SensorSlot = slot(SensorKind::Fan, 0, "fan_rpm", "External Fan");
pub const SLOT_PUMP_RPM: SensorSlot = slot(SensorKind::Fan, 1, "pump_rpm", "Pump");
pub const SLOT_PUMP_FLOW: SensorSlot = slot(SensorKind::Flow, 0, "pump_flow", "Pump");
pub const SLOT_FAN_CONTROL: SensorSlot =
    slot(SensorKind::Control, 0, "fan_control_percent", "External Fan");

pub const SLOT_DIAG_ALARMS: SensorSlot = slot(SensorKind::Debug, 0, "diag_alarms", "Alarms");
pub const SLOT_DIAG_MODES: SensorSlot = slot(SensorKind::Debug, 1, "diag_modes", "Modes");
pub const SLOT_DIAG_CONTROLLER: SensorSlot =
    slot(SensorKind::Debug, 2, "diag_controller", "Controller");
pub const SLOT_DIAG_VERSIONS: SensorSlot = slot(SensorKind::Debug, 3, "diag_versions", "Version");
pub const SLOT_DIAG_IDENTITY: SensorSlot =
    slot(SensorKind::Debug, 4, "diag_identity", "Identity");

// =============================================================================
// AquastreamXt
// =============================================================================

/// Aquastream XT device handle.
///
/// # Example
///
/// ```no_run
/// use aquacomputer_rust_devices::device::{AquastreamXt, Device, DeviceOptions, HidTransport};
/// use aquacomputer_rust_devices::protocol::{AQUACOMPUTER_VID, AQUASTREAM_XT_PID};
///
/// let api = hidapi::HidApi::new()?;
/// let transport = HidTransport::open_ids(&api, AQUACOMPUTER_VID, AQUASTREAM_XT_PID)?;
/// let mut pump = AquastreamXt::open(transport, &DeviceOptions::default())?;
///
/// pump.poll()?;
/// println!("{}", pump.sample());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AquastreamXt<T: Transport> {
    transport: T,
    sample: DecodedSample,
    policy: ControlPolicy,
    diagnostics_enabled: bool,
}

impl<T: Transport> AquastreamXt<T> {
    /// Open the device over `transport`.
    ///
    /// Reads until the first valid status report arrives (bounded by
    /// `options.startup_sync_attempts`), then applies the initial policy once.
    /// Reports of another type and partial status reports use up an attempt.
    ///
    /// # Errors
    /// - `Timeout` if no valid report arrives within the attempt budget
    /// - transport errors, unmodified
    pub fn open(transport: T, options: &DeviceOptions) -> Result<Self> {
        let sample = Self::synchronize(&transport, options.startup_sync_attempts)?;

        let firmware = FirmwareStatus::check(sample.firmware_version());
        if !firmware.is_ok() {
            warn!("{}: {}", transport.path(), firmware);
        }

        let mut device = Self {
            transport,
            sample,
            policy: ControlPolicy::Unmanaged,
            diagnostics_enabled: options.diagnostics_enabled,
        };

        info!(
            "Opened {} at {} (firmware {})",
            device.name(),
            device.transport.path(),
            device.sample.firmware_version()
        );

        match device.apply_policy(options.initial_policy) {
            Ok(()) => {}
            Err(AquaError::NotSupported(reason)) => {
                warn!("Initial fan policy {} not sent: {}", device.policy, reason);
            }
            Err(e) => return Err(e),
        }

        Ok(device)
    }

    fn synchronize(transport: &T, attempts: u32) -> Result<DecodedSample> {
        for attempt in 1..=attempts {
            let mut buf = [0u8; FEATURE_BUFFER_LENGTH];
            let read = transport.read_feature_report(REPORT_ID_STATUS, &mut buf)?;
            let report = &buf[..read.min(buf.len())];

            if !is_status_report(report) {
                continue;
            }

            match DecodedSample::decode(report) {
                Ok(sample) => {
                    debug!("Status report synchronized after {} read(s)", attempt);
                    return Ok(sample);
                }
                // Partial reports happen; wait for a complete one
                Err(AquaError::ShortBuffer { len, .. }) => {
                    debug!("Skipping partial status report ({} bytes)", len);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AquaError::Timeout(attempts))
    }

    /// Latest successfully decoded sample.
    pub fn sample(&self) -> &DecodedSample {
        &self.sample
    }

    /// Hardware variant from the latest report.
    pub fn variant(&self) -> Variant {
        self.sample.variant()
    }

    /// Firmware check against the latest report.
    pub fn firmware_status(&self) -> FirmwareStatus {
        FirmwareStatus::check(self.sample.firmware_version())
    }

    pub fn set_diagnostics_enabled(&mut self, enabled: bool) {
        self.diagnostics_enabled = enabled;
    }

    /// Release the transport.
    pub fn close(self) -> T {
        self.transport
    }

    fn publish_diagnostics(&self, sink: &mut dyn SensorSink) {
        let diag = &self.sample.diagnostics;
        let controller = diag.controller;

        let entries = [
            (
                SLOT_DIAG_ALARMS,
                Some(diag.alarms.bits() as f32),
                format!("Alarms: {}", diag.alarms),
            ),
            (
                SLOT_DIAG_MODES,
                Some(diag.mode_flags as f32),
                format!("Modes: {}", diag.modes),
            ),
            (
                SLOT_DIAG_CONTROLLER,
                None,
                format!(
                    "Controller - Out: {} I: {} P: {} D: {}",
                    controller.output, controller.i, controller.p, controller.d
                ),
            ),
            (
                SLOT_DIAG_VERSIONS,
                None,
                format!(
                    "Version - Firmware: {} Bootloader: {} Hardware: {}",
                    diag.firmware_version, diag.bootloader_version, diag.hardware_version
                ),
            ),
            (
                SLOT_DIAG_IDENTITY,
                None,
                format!(
                    "Unk1: {} Unk2: {} SerialNumber: {} PublicKey: {}",
                    diag.unknown[0],
                    diag.unknown[1],
                    diag.serial_number,
                    diag.public_key_hex()
                ),
            ),
        ];

        for (slot, value, detail) in entries {
            sink.write(Reading {
                slot,
                value,
                detail: Some(detail),
            });
        }
    }
}

impl<T: Transport> Device for AquastreamXt<T> {
    fn name(&self) -> String {
        format!("Aquastream XT {}", self.variant())
    }

    fn identifier(&self) -> &str {
        self.transport.path()
    }

    fn poll(&mut self) -> Result<PollOutcome> {
        let mut buf = [0u8; FEATURE_BUFFER_LENGTH];
        let read = self
            .transport
            .read_feature_report(REPORT_ID_STATUS, &mut buf)?;

        match DecodedSample::decode(&buf[..read.min(buf.len())]) {
            Ok(sample) => {
                debug!("Decoded sample: {:?}", sample);
                self.sample = sample;
                Ok(PollOutcome::Updated)
            }
            Err(e) if e.is_recoverable() => {
                debug!("Skipping poll: {}", e);
                Ok(PollOutcome::Stale)
            }
            Err(e) => Err(e),
        }
    }

    fn policy(&self) -> ControlPolicy {
        self.policy
    }

    fn handle_event(&mut self, event: ControlEvent) -> Result<()> {
        let (next, command) = transition(self.policy, event);
        if next != self.policy {
            info!("Fan control policy: {} -> {}", self.policy, next);
        }
        self.policy = next;

        let Some(command) = command else {
            return Ok(());
        };

        let report = build_fan_command(command)?;
        self.transport.write_feature_report(&report)
    }

    fn publish(&self, sink: &mut dyn SensorSink) {
        let s = &self.sample;
        let values = [
            (SLOT_FAN_VOLTAGE, Some(s.fan_voltage)),
            (SLOT_PUMP_VOLTAGE, Some(s.pump_voltage)),
            (SLOT_PUMP_POWER, Some(s.pump_power)),
            (SLOT_TEMP_FAN_VRM, Some(s.temp_fan_vrm)),
            (SLOT_TEMP_EXTERNAL, Some(s.temp_external)),
            (SLOT_TEMP_WATER, Some(s.temp_water)),
            (SLOT_PUMP_FREQUENCY, s.pump_frequency),
            (SLOT_PUMP_MAX_FREQUENCY, s.pump_max_frequency),
            (SLOT_PUMP_RPM, s.pump_rpm),
            (SLOT_PUMP_FLOW, Some(s.pump_flow as f32)),
            (SLOT_FAN_RPM, Some(s.fan_rpm as f32)),
            (SLOT_FAN_CONTROL, Some(s.fan_control_percent)),
        ];

        for (slot, value) in values {
            sink.write(Reading {
                slot,
                value,
                detail: None,
            });
        }

        if self.diagnostics_enabled {
            self.publish_diagnostics(sink);
        }
    }

    fn status(&self) -> String {
        self.firmware_status().to_string()
    }
}

impl<T: Transport> std::fmt::Debug for AquastreamXt<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AquastreamXt")
            .field("path", &self.transport.path())
            .field("policy", &self.policy)
            .field("diagnostics_enabled", &self.diagnostics_enabled)
            .finish_non_exhaustive()
    }
}
