//! Fan control module.
//!
//! Provides the control policy state machine and the snapshot tracker that
//! feeds it events from the settings file.

mod policy;
mod tracker;

pub use policy::{
    ControlEvent, ControlPolicy, FanCommand, clamp_percent, percent_to_duty, transition,
};
pub use tracker::PolicyTracker;
