//! Alarm and mode bit flags, and hardware variant resolution.

use bitflags::bitflags;

bitflags! {
    /// Alarm byte (offset 32). Only populated when alarm interpretation is
    /// enabled in the vendor software.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
    pub struct PumpAlarms: u8 {
        const SENSOR1 = 1 << 0;
        const SENSOR2 = 1 << 1;
        const PUMP = 1 << 2;
        const FAN = 1 << 3;
        const FLOW = 1 << 4;
        const FAN_SHORT = 1 << 5;
        const FAN_TEMP90 = 1 << 6;
        const FAN_TEMP70 = 1 << 7;
    }
}

bitflags! {
    /// Mode byte (offset 33): which optional capabilities are unlocked.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
    pub struct PumpMode: u8 {
        const PUMP_ADVANCED = 1 << 0;
        const FAN_AMPLIFIER = 1 << 1;
        const FAN_CONTROLLER = 1 << 2;
    }
}

/// Render set flag names as `A | B`, or `None` when empty.
fn flag_names<I: Iterator<Item = (&'static str, T)>, T>(names: I) -> String {
    let names: Vec<_> = names.map(|(name, _)| name).collect();
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(" | ")
    }
}

impl std::fmt::Display for PumpAlarms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", flag_names(self.iter_names()))
    }
}

impl std::fmt::Display for PumpMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", flag_names(self.iter_names()))
    }
}

// =============================================================================
// Variant
// =============================================================================

/// Hardware variant derived from the mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Standard,
    Advanced,
    Ultra,
    UltraInternalFlow,
}

impl Variant {
    /// Classify a mode byte.
    ///
    /// This is a precedence chain, not a union: the advanced pump bit wins over
    /// everything, then the fan controller, then the fan amplifier.
    pub fn from_mode_flags(mode_flags: u8) -> Self {
        let mode = PumpMode::from_bits_truncate(mode_flags);

        if mode.contains(PumpMode::PUMP_ADVANCED) {
            Variant::UltraInternalFlow
        } else if mode.contains(PumpMode::FAN_CONTROLLER) {
            Variant::Ultra
        } else if mode.contains(PumpMode::FAN_AMPLIFIER) {
            Variant::Advanced
        } else {
            Variant::Standard
        }
    }

    /// Get variant name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Standard => "Standard",
            Variant::Advanced => "Advanced",
            Variant::Ultra => "Ultra",
            Variant::UltraInternalFlow => "Ultra + Internal Flow Sensor",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
