//! Parsing utilities for CLI arguments and configuration values.

use crate::control::ControlPolicy;
use crate::error::{AquaError, Result};

// =============================================================================
// Fan Policy Parsing
// =============================================================================

/// Parse a fan policy name into a ControlPolicy.
///
/// # Arguments
/// * `name` - "default", "unmanaged", "software:XX" or a bare percentage
///
/// # Example
/// ```
/// use aquacomputer_rust_devices::utils::parsing::parse_fan_policy;
/// use aquacomputer_rust_devices::control::ControlPolicy;
///
/// let policy = parse_fan_policy("default").unwrap();
/// assert_eq!(policy, ControlPolicy::FirmwareDefault);
///
/// let software = parse_fan_policy("software:75").unwrap();
/// assert_eq!(software, ControlPolicy::Software(75.0));
/// ```
pub fn parse_fan_policy(name: &str) -> Result<ControlPolicy> {
    let lower = name.trim().to_lowercase();

    match lower.as_str() {
        "default" | "firmware" => return Ok(ControlPolicy::FirmwareDefault),
        "unmanaged" | "none" => return Ok(ControlPolicy::Unmanaged),
        _ => {}
    }

    let value = lower.strip_prefix("software:").unwrap_or(&lower);
    parse_percent(value)
        .map(ControlPolicy::Software)
        .map_err(|e| match e {
            AquaError::InvalidInput(reason) => AquaError::InvalidInput(format!(
                "Unknown fan policy '{}' ({}). Use: default, unmanaged, or software:XX",
                name, reason
            )),
            other => other,
        })
}

/// Parse a fan percentage in 0-100, with or without a trailing `%`.
///
/// # Example
/// ```
/// use aquacomputer_rust_devices::utils::parsing::parse_percent;
///
/// assert_eq!(parse_percent("40%").unwrap(), 40.0);
/// assert!(parse_percent("140").is_err());
/// ```
pub fn parse_percent(value: &str) -> Result<f32> {
    let trimmed = value.trim();
    let percent: f32 = trimmed
        .trim_end_matches('%')
        .parse()
        .map_err(|_| AquaError::InvalidInput(format!("'{}' is not a number", trimmed)))?;

    if !(0.0..=100.0).contains(&percent) {
        return Err(AquaError::InvalidInput(format!(
            "{} is out of range 0-100",
            percent
        )));
    }

    Ok(percent)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_policies() {
        assert_eq!(
            parse_fan_policy("Default").unwrap(),
            ControlPolicy::FirmwareDefault
        );
        assert_eq!(
            parse_fan_policy("firmware").unwrap(),
            ControlPolicy::FirmwareDefault
        );
        assert_eq!(
            parse_fan_policy("UNMANAGED").unwrap(),
            ControlPolicy::Unmanaged
        );
    }

    #[test]
    fn test_parse_software() {
        assert_eq!(
            parse_fan_policy("software:40").unwrap(),
            ControlPolicy::Software(40.0)
        );
        assert_eq!(
            parse_fan_policy("62.5%").unwrap(),
            ControlPolicy::Software(62.5)
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_fan_policy("turbo").is_err());
        assert!(parse_fan_policy("software:").is_err());
        assert!(parse_fan_policy("software:101").is_err());
        assert!(parse_fan_policy("-5").is_err());
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("0").unwrap(), 0.0);
        assert_eq!(parse_percent(" 100% ").unwrap(), 100.0);
        assert_eq!(parse_percent("33.5").unwrap(), 33.5);
        assert!(parse_percent("").is_err());
        assert!(parse_percent("fast").is_err());
        assert!(parse_percent("100.5").is_err());
        assert!(parse_percent("NaN").is_err());
    }
}
