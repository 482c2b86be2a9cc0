//! Feature report transport.
//!
//! The device code only needs two blocking calls; [`HidTransport`] provides
//! them over `hidapi`, tests provide scripted fakes.

use std::ffi::CString;

use hidapi::{HidApi, HidDevice};

use crate::error::{AquaError, Result};

/// Blocking feature report I/O against one device.
pub trait Transport {
    /// Read feature report `report_id` into `buf`.
    ///
    /// On return `buf[0]` holds the report id the device actually answered
    /// with. Returns the number of bytes read.
    fn read_feature_report(&self, report_id: u8, buf: &mut [u8]) -> Result<usize>;

    /// Send a feature report. `data[0]` is the report id.
    fn write_feature_report(&self, data: &[u8]) -> Result<()>;

    /// Stable identifier of the underlying device (its path).
    fn path(&self) -> &str;
}

/// `hidapi` backed transport.
pub struct HidTransport {
    device: HidDevice,
    path: String,
}

impl HidTransport {
    /// Open a device by its HID path.
    pub fn open_path(api: &HidApi, path: &str) -> Result<Self> {
        let c_path = CString::new(path)
            .map_err(|_| AquaError::InvalidInput(format!("Invalid device path: {}", path)))?;
        let device = api.open_path(&c_path).map_err(AquaError::HidError)?;

        Ok(Self {
            device,
            path: path.to_string(),
        })
    }

    /// Open the first device with the given ids.
    pub fn open_ids(api: &HidApi, vendor_id: u16, product_id: u16) -> Result<Self> {
        let info = api
            .device_list()
            .find(|info| info.vendor_id() == vendor_id && info.product_id() == product_id)
            .ok_or(AquaError::DeviceNotFound)?;

        let device = info.open_device(api).map_err(AquaError::HidError)?;

        Ok(Self {
            device,
            path: info.path().to_string_lossy().into_owned(),
        })
    }

    /// Vendor and product id of the opened device.
    pub fn ids(&self) -> Result<(u16, u16)> {
        let info = self.device.get_device_info().map_err(AquaError::HidError)?;
        Ok((info.vendor_id(), info.product_id()))
    }
}

impl Transport for HidTransport {
    fn read_feature_report(&self, report_id: u8, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Err(AquaError::InvalidInput(
                "Feature report buffer must not be empty".into(),
            ));
        }

        buf[0] = report_id;
        let read = self
            .device
            .get_feature_report(buf)
            .map_err(AquaError::HidError)?;
        Ok(read)
    }

    fn write_feature_report(&self, data: &[u8]) -> Result<()> {
        self.device
            .send_feature_report(data)
            .map_err(AquaError::HidError)
    }

    fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for HidTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidTransport")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
