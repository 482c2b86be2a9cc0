//! Device abstraction layer for Aquacomputer controllers.
//!
//! Every supported controller implements [`Device`]; [`DeviceModel`] maps a
//! USB vendor/product pair to its implementation at runtime.

pub mod aquastream;
pub mod transport;

use hidapi::HidApi;

use crate::control::{ControlEvent, ControlPolicy};
use crate::error::{AquaError, Result};
use crate::protocol::{AQUACOMPUTER_VID, AQUASTREAM_XT_PID};
use crate::sensors::SensorSink;

pub use aquastream::AquastreamXt;
pub use transport::{HidTransport, Transport};

/// Default number of reads allowed while waiting for the first valid report.
pub const DEFAULT_STARTUP_SYNC_ATTEMPTS: u32 = 100;

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new sample replaced the previous one.
    Updated,
    /// The report was not a status report; the previous sample is kept.
    Stale,
}

/// Options applied when opening a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceOptions {
    pub startup_sync_attempts: u32,
    pub diagnostics_enabled: bool,
    /// Policy applied once right after the device is opened.
    pub initial_policy: ControlPolicy,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            startup_sync_attempts: DEFAULT_STARTUP_SYNC_ATTEMPTS,
            diagnostics_enabled: false,
            initial_policy: ControlPolicy::Unmanaged,
        }
    }
}

/// Capabilities shared by every supported controller.
pub trait Device {
    /// Display name, including the detected variant.
    fn name(&self) -> String;

    /// Stable identifier (device path).
    fn identifier(&self) -> &str;

    /// Read and decode one report.
    ///
    /// A non-status report yields `PollOutcome::Stale`; transport errors are
    /// returned unmodified.
    fn poll(&mut self) -> Result<PollOutcome>;

    /// Current fan control policy.
    fn policy(&self) -> ControlPolicy;

    /// Run a policy event through the control state machine and send the
    /// resulting command. The policy is updated even if sending fails.
    fn handle_event(&mut self, event: ControlEvent) -> Result<()>;

    /// Switch to `policy`.
    fn apply_policy(&mut self, policy: ControlPolicy) -> Result<()> {
        self.handle_event(ControlEvent::ModeChanged(policy))
    }

    /// Write the latest sample into `sink`.
    fn publish(&self, sink: &mut dyn SensorSink);

    /// Human readable health line.
    fn status(&self) -> String;
}

// =============================================================================
// Device Models
// =============================================================================

/// Controllers this crate has a driver for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceModel {
    AquastreamXt,
}

/// (vendor id, product id, model)
const KNOWN_MODELS: &[(u16, u16, DeviceModel)] =
    &[(AQUACOMPUTER_VID, AQUASTREAM_XT_PID, DeviceModel::AquastreamXt)];

impl DeviceModel {
    /// Look up the driver for a vendor/product pair.
    pub fn from_ids(vendor_id: u16, product_id: u16) -> Option<Self> {
        KNOWN_MODELS
            .iter()
            .find(|(vid, pid, _)| *vid == vendor_id && *pid == product_id)
            .map(|(_, _, model)| *model)
    }

    /// Vendor and product id of this model.
    pub fn ids(&self) -> (u16, u16) {
        KNOWN_MODELS
            .iter()
            .find(|(_, _, model)| model == self)
            .map(|(vid, pid, _)| (*vid, *pid))
            .unwrap_or((0, 0))
    }

    /// Open a device of this model over an existing transport.
    pub fn open(
        &self,
        transport: HidTransport,
        options: &DeviceOptions,
    ) -> Result<Box<dyn Device>> {
        match self {
            DeviceModel::AquastreamXt => Ok(Box::new(AquastreamXt::open(transport, options)?)),
        }
    }
}

impl std::fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceModel::AquastreamXt => write!(f, "Aquastream XT"),
        }
    }
}

/// A connected device with a known driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub path: String,
    pub model: DeviceModel,
    pub serial: Option<String>,
}

/// List connected devices of any known model.
pub fn list_devices() -> Result<Vec<DeviceEntry>> {
    let api = HidApi::new().map_err(AquaError::HidError)?;

    Ok(known_devices(api.device_list().map(|info| {
        (
            info.vendor_id(),
            info.product_id(),
            info.path().to_string_lossy().into_owned(),
            info.serial_number().map(String::from),
        )
    })))
}

/// Keep entries with a driver, one per path.
fn known_devices(
    infos: impl IntoIterator<Item = (u16, u16, String, Option<String>)>,
) -> Vec<DeviceEntry> {
    let mut devices: Vec<DeviceEntry> = infos
        .into_iter()
        .filter_map(|(vendor_id, product_id, path, serial)| {
            DeviceModel::from_ids(vendor_id, product_id).map(|model| DeviceEntry {
                path,
                model,
                serial,
            })
        })
        .collect();
    devices.dedup_by(|a, b| a.path == b.path);
    devices
}

/// Open a supported device.
///
/// With a path, the model is chosen from the device's own ids. Without one,
/// the first device of any known model is used.
///
/// # Errors
/// - `UnknownDevice` if the device at `path` has no driver
/// - `DeviceNotFound` if no known device is connected
pub fn open_device(path: Option<&str>, options: &DeviceOptions) -> Result<Box<dyn Device>> {
    let api = HidApi::new().map_err(AquaError::HidError)?;

    if let Some(path) = path {
        let transport = HidTransport::open_path(&api, path)?;
        let (vendor_id, product_id) = transport.ids()?;
        let model = DeviceModel::from_ids(vendor_id, product_id).ok_or(AquaError::UnknownDevice {
            vendor_id,
            product_id,
        })?;
        return model.open(transport, options);
    }

    for (vendor_id, product_id, model) in KNOWN_MODELS {
        match HidTransport::open_ids(&api, *vendor_id, *product_id) {
            Ok(transport) => return model.open(transport, options),
            Err(AquaError::DeviceNotFound) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(AquaError::DeviceNotFound)
}
