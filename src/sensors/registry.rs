//! Sensor slots keyed by a stable (kind, index) identifier.

use std::collections::BTreeMap;

/// Physical kind of a sensor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensorKind {
    Voltage,
    Power,
    Temperature,
    Frequency,
    Fan,
    Flow,
    Control,
    Debug,
}

impl SensorKind {
    /// Unit suffix for display.
    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Voltage => "V",
            SensorKind::Power => "W",
            SensorKind::Temperature => "°C",
            SensorKind::Frequency => "Hz",
            SensorKind::Fan => "RPM",
            SensorKind::Flow => "raw",
            SensorKind::Control => "%",
            SensorKind::Debug => "",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SensorKind::Voltage => "Voltage",
            SensorKind::Power => "Power",
            SensorKind::Temperature => "Temperature",
            SensorKind::Frequency => "Frequency",
            SensorKind::Fan => "Fan",
            SensorKind::Flow => "Flow",
            SensorKind::Control => "Control",
            SensorKind::Debug => "Debug",
        };
        f.pad(name)
    }
}

/// Stable identity of a slot across polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SensorId {
    pub kind: SensorKind,
    pub index: u8,
}

impl SensorId {
    pub const fn new(kind: SensorKind, index: u8) -> Self {
        Self { kind, index }
    }
}

/// Static description of one slot a device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSlot {
    pub id: SensorId,
    /// Machine-readable key, e.g. `pump_voltage`.
    pub key: &'static str,
    /// Display name, e.g. `Pump`.
    pub name: &'static str,
}

/// One value written into a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub slot: SensorSlot,
    /// `None` when the device reported no meaningful value this poll.
    pub value: Option<f32>,
    /// Free-form text, used by diagnostic slots.
    pub detail: Option<String>,
}

/// Destination for decoded readings, owned by the monitoring host.
pub trait SensorSink {
    fn write(&mut self, reading: Reading);
}

/// Simple in-memory sink: the latest reading per slot.
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    readings: BTreeMap<SensorId, Reading>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SensorId) -> Option<&Reading> {
        self.readings.get(&id)
    }

    /// Look up a reading by its key.
    pub fn by_key(&self, key: &str) -> Option<&Reading> {
        self.readings.values().find(|r| r.slot.key == key)
    }

    /// Value of a slot, if it exists and holds one.
    pub fn value(&self, key: &str) -> Option<f32> {
        self.by_key(key).and_then(|r| r.value)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// All readings ordered by (kind, index).
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.values()
    }
}

impl SensorSink for SensorRegistry {
    fn write(&mut self, reading: Reading) {
        self.readings.insert(reading.slot.id, reading);
    }
}

impl std::fmt::Display for SensorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for reading in self.iter() {
            let slot = &reading.slot;
            let value = reading
                .value
                .map(|v| format!("{:.2} {}", v, slot.id.kind.unit()))
                .unwrap_or_else(|| "-".to_string());
            write!(
                f,
                "{:<12} {:>2}  {:<20} {:>14}",
                slot.id.kind, slot.id.index, slot.name, value
            )?;
            if let Some(detail) = &reading.detail {
                write!(f, "  {}", detail)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER: SensorSlot = SensorSlot {
        id: SensorId::new(SensorKind::Temperature, 2),
        key: "temp_water",
        name: "Internal Water",
    };

    #[test]
    fn test_write_replaces_slot() {
        let mut registry = SensorRegistry::new();
        registry.write(Reading {
            slot: WATER,
            value: Some(30.0),
            detail: None,
        });
        registry.write(Reading {
            slot: WATER,
            value: Some(31.5),
            detail: None,
        });

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.value("temp_water"), Some(31.5));
        assert_eq!(
            registry.get(WATER.id).map(|r| r.slot.name),
            Some("Internal Water")
        );
    }

    #[test]
    fn test_missing_value() {
        let mut registry = SensorRegistry::new();
        registry.write(Reading {
            slot: WATER,
            value: None,
            detail: None,
        });
        assert!(registry.by_key("temp_water").is_some());
        assert_eq!(registry.value("temp_water"), None);
        assert_eq!(registry.value("nope"), None);
    }

    #[test]
    fn test_ordering_by_kind_then_index() {
        let a = SensorId::new(SensorKind::Voltage, 2);
        let b = SensorId::new(SensorKind::Temperature, 0);
        let c = SensorId::new(SensorKind::Voltage, 1);
        let mut ids = vec![b, a, c];
        ids.sort();
        assert_eq!(ids, vec![c, a, b]);
    }
}
