//! Sensor registry glue.
//!
//! Devices write decoded values into named slots; the host reads them back.

mod registry;

pub use registry::{Reading, SensorId, SensorKind, SensorRegistry, SensorSink, SensorSlot};
