//! Utility functions for display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_count, format_money, format_optional, format_percent, truncate};
