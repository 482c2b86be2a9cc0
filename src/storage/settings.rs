//! Settings storage and persistence.
//!
//! Cross-platform: uses the appropriate config directory for each OS.

use std::path::{Path, PathBuf};

use log::info;

use crate::config::Settings;
use crate::control::ControlPolicy;
use crate::error::{AquaError, Result};

// =============================================================================
// Config Path
// =============================================================================

const APP_NAME: &str = "aquacomputer-rust";
const CONFIG_FILE: &str = "config.json";

/// Get the configuration directory path.
/// - Linux: ~/.config/aquacomputer-rust/
/// - Windows: %APPDATA%\aquacomputer-rust\
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| AquaError::InvalidConfig("Could not find config directory".into()))
}

/// Get the full path to the settings file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

// =============================================================================
// Storage Functions
// =============================================================================

/// Load settings from `path`. A missing file yields defaults.
pub fn load_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| AquaError::InvalidConfig(format!("Failed to read settings: {}", e)))?;

    let settings: Settings = serde_json::from_str(&content)
        .map_err(|e| AquaError::InvalidConfig(format!("Failed to parse settings: {}", e)))?;

    settings.validate()?;
    Ok(settings)
}

/// Save settings to `path`, creating parent directories as needed.
pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    settings.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AquaError::InvalidConfig(format!("Failed to create config dir: {}", e))
        })?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AquaError::InvalidConfig(format!("Failed to serialize settings: {}", e)))?;

    std::fs::write(path, content)
        .map_err(|e| AquaError::InvalidConfig(format!("Failed to write settings: {}", e)))?;

    Ok(())
}

/// Load settings from the default location.
pub fn load_settings() -> Result<Settings> {
    load_from(&get_config_path()?)
}

/// Save settings to the default location.
pub fn save_settings(settings: &Settings) -> Result<()> {
    save_to(&get_config_path()?, settings)
}

/// Persist a new fan policy at `path`, keeping the other settings.
pub fn update_fan_policy_at(path: &Path, policy: ControlPolicy) -> Result<Settings> {
    let mut settings = load_from(path)?;
    settings.fan_control = policy.normalized();
    save_to(path, &settings)?;
    info!("Stored fan policy {} in {:?}", settings.fan_control, path);
    Ok(settings)
}

/// Persist a new fan policy in the default settings file.
pub fn update_fan_policy(policy: ControlPolicy) -> Result<Settings> {
    update_fan_policy_at(&get_config_path()?, policy)
}
