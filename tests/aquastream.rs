//! Drives `AquastreamXt` through a scripted transport.

use std::cell::RefCell;
use std::collections::VecDeque;

use aquacomputer_rust_devices::control::{ControlEvent, ControlPolicy};
use aquacomputer_rust_devices::device::{
    AquastreamXt, Device, DeviceOptions, PollOutcome, Transport,
};
use aquacomputer_rust_devices::error::{AquaError, Result};
use aquacomputer_rust_devices::protocol::{FirmwareStatus, Variant};
use aquacomputer_rust_devices::sensors::{SensorKind, SensorRegistry};

/// Replays canned feature reports and records writes.
struct ScriptedTransport {
    reads: RefCell<VecDeque<std::result::Result<Vec<u8>, String>>>,
    writes: RefCell<Vec<Vec<u8>>>,
}

impl ScriptedTransport {
    fn new(reads: Vec<std::result::Result<Vec<u8>, String>>) -> Self {
        Self {
            reads: RefCell::new(reads.into()),
            writes: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for ScriptedTransport {
    fn read_feature_report(&self, _report_id: u8, buf: &mut [u8]) -> Result<usize> {
        match self.reads.borrow_mut().pop_front() {
            Some(Ok(report)) => {
                let len = report.len().min(buf.len());
                buf[..len].copy_from_slice(&report[..len]);
                Ok(len)
            }
            Some(Err(message)) => Err(AquaError::HidError(hidapi::HidError::HidApiError {
                message,
            })),
            None => Err(AquaError::HidError(hidapi::HidError::HidApiError {
                message: "script exhausted".into(),
            })),
        }
    }

    fn write_feature_report(&self, data: &[u8]) -> Result<()> {
        self.writes.borrow_mut().push(data.to_vec());
        Ok(())
    }

    fn path(&self) -> &str {
        "test://aquastream"
    }
}

/// Status report with the given water temperature and pump voltage raw values.
fn status_report(temp_water: u16, pump_voltage: u16) -> Vec<u8> {
    let mut buf = vec![0u8; 66];
    buf[0] = 0x04;
    buf[9..11].copy_from_slice(&pump_voltage.to_le_bytes());
    buf[11..13].copy_from_slice(&6250i16.to_le_bytes());
    buf[17..19].copy_from_slice(&temp_water.to_le_bytes());
    buf[19..21].copy_from_slice(&15000i16.to_le_bytes());
    buf[33] = 0b0000_0100;
    buf[50..52].copy_from_slice(&1018u16.to_le_bytes());
    buf
}

fn stale_report() -> Vec<u8> {
    let mut buf = vec![0u8; 66];
    buf[0] = 0x01;
    buf
}

#[test]
fn test_open_waits_for_status_report() {
    let transport = ScriptedTransport::new(vec![
        Ok(stale_report()),
        Ok(vec![]),
        Ok(status_report(3000, 610)),
    ]);

    let device = AquastreamXt::open(transport, &DeviceOptions::default()).unwrap();
    assert_eq!(device.sample().temp_water, 30.0);
    assert_eq!(device.sample().pump_voltage, 10.0);
    assert_eq!(device.sample().pump_power, 100.0);
    assert_eq!(device.variant(), Variant::Ultra);
    assert_eq!(device.name(), "Aquastream XT Ultra");
    assert_eq!(device.firmware_status(), FirmwareStatus::Ok);
    assert_eq!(device.policy(), ControlPolicy::Unmanaged);

    // Unmanaged never writes
    let transport = device.close();
    assert!(transport.writes.borrow().is_empty());
}

#[test]
fn test_open_gives_up_after_attempt_budget() {
    let transport = ScriptedTransport::new(vec![Ok(stale_report()); 3]);
    let options = DeviceOptions {
        startup_sync_attempts: 3,
        ..DeviceOptions::default()
    };

    assert!(matches!(
        AquastreamXt::open(transport, &options),
        Err(AquaError::Timeout(3))
    ));
}

#[test]
fn test_open_skips_partial_status_report() {
    let transport = ScriptedTransport::new(vec![
        Ok(vec![0x04, 0x00, 0x00]),
        Ok(status_report(3000, 610)),
    ]);

    let device = AquastreamXt::open(transport, &DeviceOptions::default()).unwrap();
    assert_eq!(device.sample().temp_water, 30.0);
    assert_eq!(device.sample().pump_voltage, 10.0);
}

#[test]
fn test_open_times_out_on_partial_reports() {
    let transport = ScriptedTransport::new(vec![Ok(vec![0x04; 10]); 2]);
    let options = DeviceOptions {
        startup_sync_attempts: 2,
        ..DeviceOptions::default()
    };

    assert!(matches!(
        AquastreamXt::open(transport, &options),
        Err(AquaError::Timeout(2))
    ));
}

#[test]
fn test_open_propagates_io_error() {
    let transport = ScriptedTransport::new(vec![Err("unplugged".into())]);

    match AquastreamXt::open(transport, &DeviceOptions::default()) {
        Err(AquaError::HidError(e)) => assert!(e.to_string().contains("unplugged")),
        other => panic!("expected HidError, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_stale_poll_keeps_previous_sample() {
    let transport = ScriptedTransport::new(vec![
        Ok(status_report(3000, 610)),
        Ok(status_report(3125, 610)),
        Ok(stale_report()),
    ]);
    let mut device = AquastreamXt::open(transport, &DeviceOptions::default()).unwrap();

    assert_eq!(device.poll().unwrap(), PollOutcome::Updated);
    assert_eq!(device.sample().temp_water, 31.25);

    assert_eq!(device.poll().unwrap(), PollOutcome::Stale);
    assert_eq!(device.sample().temp_water, 31.25);
}

#[test]
fn test_short_report_is_an_error() {
    let transport = ScriptedTransport::new(vec![
        Ok(status_report(3000, 610)),
        Ok(vec![0x04, 0x00, 0x00]),
    ]);
    let mut device = AquastreamXt::open(transport, &DeviceOptions::default()).unwrap();

    assert!(matches!(
        device.poll(),
        Err(AquaError::ShortBuffer { len: 3, .. })
    ));
    assert_eq!(device.sample().temp_water, 30.0);
}

#[test]
fn test_initial_policy_is_applied_once() {
    let transport = ScriptedTransport::new(vec![Ok(status_report(3000, 610))]);
    let options = DeviceOptions {
        initial_policy: ControlPolicy::Software(150.0),
        ..DeviceOptions::default()
    };

    // The command cannot be encoded, but opening still succeeds
    let device = AquastreamXt::open(transport, &options).unwrap();
    assert_eq!(device.policy(), ControlPolicy::Software(100.0));
    assert!(device.close().writes.borrow().is_empty());
}

#[test]
fn test_policy_commands_are_not_supported() {
    let transport = ScriptedTransport::new(vec![Ok(status_report(3000, 610))]);
    let mut device = AquastreamXt::open(transport, &DeviceOptions::default()).unwrap();

    assert!(matches!(
        device.apply_policy(ControlPolicy::FirmwareDefault),
        Err(AquaError::NotSupported(_))
    ));
    assert_eq!(device.policy(), ControlPolicy::FirmwareDefault);

    // Value edits outside software mode do nothing
    assert!(device
        .handle_event(ControlEvent::SoftwareValueChanged(40.0))
        .is_ok());
    assert_eq!(device.policy(), ControlPolicy::FirmwareDefault);

    assert!(matches!(
        device.apply_policy(ControlPolicy::Software(-5.0)),
        Err(AquaError::NotSupported(_))
    ));
    assert_eq!(device.policy(), ControlPolicy::Software(0.0));

    assert!(device.apply_policy(ControlPolicy::Unmanaged).is_ok());
    assert!(device.close().writes.borrow().is_empty());
}

#[test]
fn test_publish_writes_registry_slots() {
    let transport = ScriptedTransport::new(vec![Ok(status_report(3000, 610))]);
    let mut device = AquastreamXt::open(transport, &DeviceOptions::default()).unwrap();

    let mut registry = SensorRegistry::new();
    device.publish(&mut registry);

    assert_eq!(registry.len(), 12);
    assert_eq!(registry.value("pump_voltage"), Some(10.0));
    assert_eq!(registry.value("pump_power"), Some(100.0));
    assert_eq!(registry.value("temp_water"), Some(30.0));
    assert_eq!(registry.value("pump_frequency"), Some(50.0));
    assert_eq!(registry.value("pump_rpm"), Some(3000.0));
    // Max period is zero in this report
    assert!(registry.by_key("pump_max_frequency").is_some());
    assert_eq!(registry.value("pump_max_frequency"), None);

    let water = registry.by_key("temp_water").unwrap();
    assert_eq!(water.slot.id.kind, SensorKind::Temperature);
    assert_eq!(water.slot.id.index, 2);
    assert_eq!(water.slot.name, "Internal Water");

    assert!(registry.by_key("diag_versions").is_none());

    device.set_diagnostics_enabled(true);
    device.publish(&mut registry);
    assert_eq!(registry.len(), 17);
    assert_eq!(registry.value("diag_modes"), Some(4.0));
    let versions = registry.by_key("diag_versions").unwrap();
    assert!(versions.detail.as_ref().unwrap().contains("Firmware: 1018"));
}

#[test]
fn test_old_firmware_warns_but_opens() {
    let mut report = status_report(3000, 610);
    report[50..52].copy_from_slice(&1007u16.to_le_bytes());
    let transport = ScriptedTransport::new(vec![Ok(report)]);

    let device = AquastreamXt::open(transport, &DeviceOptions::default()).unwrap();
    let status = device.status();
    assert!(status.contains("1007"));
    assert!(status.contains("1018"));
}
