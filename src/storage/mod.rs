//! Settings persistence module.
//!
//! Handles saving and loading the settings file to/from disk.

pub mod settings;

// Re-export commonly used items
pub use settings::*;
