pub mod dump;
pub mod parsing;

// Re-export commonly used items
pub use dump::hex_rows;
pub use parsing::{parse_fan_policy, parse_percent};
