//! Turns policy snapshots into discrete events.
//!
//! The settings file only stores the current policy. Re-reading it on each
//! tick and diffing against the last snapshot yields the same mode-changed /
//! value-changed events an interactive UI would raise.

use super::policy::{ControlEvent, ControlPolicy};

#[derive(Debug, Clone, Default)]
pub struct PolicyTracker {
    last: Option<ControlPolicy>,
}

impl PolicyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-applied policy.
    pub fn with_initial(policy: ControlPolicy) -> Self {
        Self { last: Some(policy) }
    }

    /// Compare a fresh snapshot with the previous one.
    ///
    /// The first snapshot is always reported as a mode change.
    pub fn observe(&mut self, snapshot: ControlPolicy) -> Option<ControlEvent> {
        let event = match (self.last, snapshot) {
            (Some(ControlPolicy::Software(old)), ControlPolicy::Software(new)) => {
                (old != new).then_some(ControlEvent::SoftwareValueChanged(new))
            }
            (Some(old), new)
                if std::mem::discriminant(&old) == std::mem::discriminant(&new) =>
            {
                None
            }
            (_, new) => Some(ControlEvent::ModeChanged(new)),
        };

        self.last = Some(snapshot);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_snapshot_is_mode_change() {
        let mut tracker = PolicyTracker::new();
        assert_eq!(
            tracker.observe(ControlPolicy::Unmanaged),
            Some(ControlEvent::ModeChanged(ControlPolicy::Unmanaged))
        );
    }

    #[test]
    fn test_unchanged_snapshot_is_silent() {
        let mut tracker = PolicyTracker::with_initial(ControlPolicy::FirmwareDefault);
        assert_eq!(tracker.observe(ControlPolicy::FirmwareDefault), None);

        let mut tracker = PolicyTracker::with_initial(ControlPolicy::Software(40.0));
        assert_eq!(tracker.observe(ControlPolicy::Software(40.0)), None);
    }

    #[test]
    fn test_value_edit() {
        let mut tracker = PolicyTracker::with_initial(ControlPolicy::Software(40.0));
        assert_eq!(
            tracker.observe(ControlPolicy::Software(55.0)),
            Some(ControlEvent::SoftwareValueChanged(55.0))
        );
        assert_eq!(tracker.observe(ControlPolicy::Software(55.0)), None);
    }

    #[test]
    fn test_mode_switch() {
        let mut tracker = PolicyTracker::with_initial(ControlPolicy::Software(40.0));
        assert_eq!(
            tracker.observe(ControlPolicy::FirmwareDefault),
            Some(ControlEvent::ModeChanged(ControlPolicy::FirmwareDefault))
        );
        assert_eq!(
            tracker.observe(ControlPolicy::Software(10.0)),
            Some(ControlEvent::ModeChanged(ControlPolicy::Software(10.0)))
        );
    }
}
