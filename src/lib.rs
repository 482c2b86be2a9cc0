//! Aquacomputer Rust Devices Library
//!
//! A Rust driver for the Aquacomputer Aquastream XT pump/fan controller.
//!
//! # Features
//!
//! - Decode the 0x04 status feature report (voltages, power, temperatures,
//!   pump frequency/RPM, flow, fan RPM and duty)
//! - Detect the hardware variant and flag untested firmware
//! - Track the fan control policy (unmanaged / firmware default / software)
//! - Publish readings into a sensor registry
//!
//! # Example
//!
//! ```no_run
//! use aquacomputer_rust_devices::device::{Device, open_device};
//! use aquacomputer_rust_devices::sensors::SensorRegistry;
//! use aquacomputer_rust_devices::storage;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = storage::load_settings()?;
//!     let mut pump = open_device(settings.device_path.as_deref(), &settings.device_options())?;
//!     println!("Connected! {} ({})", pump.name(), pump.status());
//!
//!     let mut registry = SensorRegistry::new();
//!     pump.poll()?;
//!     pump.publish(&mut registry);
//!     println!("{}", registry);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod control;
pub mod device;
pub mod error;
pub mod protocol;
pub mod sensors;
pub mod storage;
pub mod utils;

// Re-exports for convenience
pub use control::{ControlEvent, ControlPolicy, FanCommand};
pub use device::{AquastreamXt, Device, PollOutcome};
pub use error::{AquaError, Result};
pub use protocol::DecodedSample;
