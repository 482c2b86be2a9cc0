//! Fan control policy state machine.
//!
//! A fan output is either left alone, handed to the firmware, or driven by a
//! software percentage. Policy changes arrive as [`ControlEvent`]s and
//! [`transition`] decides what, if anything, to send to the device.

use serde::{Deserialize, Serialize};

/// Who drives the fan output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", content = "percent", rename_all = "snake_case")]
pub enum ControlPolicy {
    /// No policy established yet. Never issues a command.
    #[default]
    Unmanaged,
    /// Device firmware manages the fan on its own.
    FirmwareDefault,
    /// Software-driven duty percentage (0-100).
    Software(f32),
}

/// Policy change delivered by the settings layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// The control mode was switched (or re-applied).
    ModeChanged(ControlPolicy),
    /// The software percentage was edited. Ignored outside software mode.
    SoftwareValueChanged(f32),
}

/// What to send to the device after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanCommand {
    /// Release the fan back to firmware control.
    Clear,
    /// Drive the fan at a device duty byte (0-255).
    Duty(u8),
}

/// Clamp a percentage into 0-100. NaN clamps to 0.
pub fn clamp_percent(percent: f32) -> f32 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Convert a percentage to a device duty byte: `round(p * 255 / 100)`.
///
/// This is the exact rational form of `round(p * 2.55)`; multiplying by the
/// f32 literal `2.55` would round 50% down to 127 instead of 128.
pub fn percent_to_duty(percent: f32) -> u8 {
    (clamp_percent(percent) * 255.0 / 100.0).round() as u8
}

impl ControlPolicy {
    /// The policy with any software value clamped to 0-100.
    pub fn normalized(self) -> Self {
        match self {
            ControlPolicy::Software(percent) => ControlPolicy::Software(clamp_percent(percent)),
            other => other,
        }
    }

    /// Command that puts the device into this policy.
    pub fn command(&self) -> Option<FanCommand> {
        match self {
            ControlPolicy::Unmanaged => None,
            ControlPolicy::FirmwareDefault => Some(FanCommand::Clear),
            ControlPolicy::Software(percent) => Some(FanCommand::Duty(percent_to_duty(*percent))),
        }
    }

    pub fn is_software(&self) -> bool {
        matches!(self, ControlPolicy::Software(_))
    }
}

impl std::fmt::Display for ControlPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlPolicy::Unmanaged => write!(f, "Unmanaged"),
            ControlPolicy::FirmwareDefault => write!(f, "Firmware default"),
            ControlPolicy::Software(percent) => write!(f, "Software ({:.0}%)", percent),
        }
    }
}

/// Apply an event to the current policy.
///
/// Returns the new policy and the command to send, if any.
pub fn transition(
    current: ControlPolicy,
    event: ControlEvent,
) -> (ControlPolicy, Option<FanCommand>) {
    match event {
        ControlEvent::ModeChanged(next) => {
            let next = next.normalized();
            (next, next.command())
        }
        ControlEvent::SoftwareValueChanged(percent) => {
            if current.is_software() {
                let next = ControlPolicy::Software(clamp_percent(percent));
                (next, next.command())
            } else {
                (current, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_software_clamps_high() {
        let (policy, cmd) = transition(
            ControlPolicy::Unmanaged,
            ControlEvent::ModeChanged(ControlPolicy::Software(150.0)),
        );
        assert_eq!(policy, ControlPolicy::Software(100.0));
        assert_eq!(cmd, Some(FanCommand::Duty(255)));
    }

    #[test]
    fn test_software_clamps_low() {
        let (policy, cmd) = transition(
            ControlPolicy::FirmwareDefault,
            ControlEvent::ModeChanged(ControlPolicy::Software(-5.0)),
        );
        assert_eq!(policy, ControlPolicy::Software(0.0));
        assert_eq!(cmd, Some(FanCommand::Duty(0)));
    }

    #[test]
    fn test_software_rounding() {
        assert_eq!(percent_to_duty(50.0), 128);
        assert_eq!(percent_to_duty(40.0), 102);
        assert_eq!(percent_to_duty(1.0), 3);
        assert_eq!(percent_to_duty(f32::NAN), 0);
        assert_eq!(percent_to_duty(f32::INFINITY), 255);
    }

    #[test]
    fn test_firmware_default_clears() {
        for from in [
            ControlPolicy::Unmanaged,
            ControlPolicy::FirmwareDefault,
            ControlPolicy::Software(70.0),
        ] {
            let (policy, cmd) =
                transition(from, ControlEvent::ModeChanged(ControlPolicy::FirmwareDefault));
            assert_eq!(policy, ControlPolicy::FirmwareDefault);
            assert_eq!(cmd, Some(FanCommand::Clear));
        }
    }

    #[test]
    fn test_unmanaged_never_commands() {
        let (policy, cmd) = transition(
            ControlPolicy::Software(30.0),
            ControlEvent::ModeChanged(ControlPolicy::Unmanaged),
        );
        assert_eq!(policy, ControlPolicy::Unmanaged);
        assert_eq!(cmd, None);
    }

    #[test]
    fn test_value_change_in_software_mode() {
        let (policy, cmd) = transition(
            ControlPolicy::Software(30.0),
            ControlEvent::SoftwareValueChanged(60.0),
        );
        assert_eq!(policy, ControlPolicy::Software(60.0));
        assert_eq!(cmd, Some(FanCommand::Duty(153)));
    }

    #[test]
    fn test_value_change_ignored_outside_software_mode() {
        for from in [ControlPolicy::Unmanaged, ControlPolicy::FirmwareDefault] {
            let (policy, cmd) = transition(from, ControlEvent::SoftwareValueChanged(60.0));
            assert_eq!(policy, from);
            assert_eq!(cmd, None);
        }
    }

    #[test]
    fn test_policy_serde() {
        let json = serde_json::to_string(&ControlPolicy::Software(40.0)).unwrap();
        assert_eq!(json, r#"{"mode":"software","percent":40.0}"#);

        let policy: ControlPolicy = serde_json::from_str(r#"{"mode":"firmware_default"}"#).unwrap();
        assert_eq!(policy, ControlPolicy::FirmwareDefault);
    }
}
