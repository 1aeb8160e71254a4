//! Stderr output formatting
//!
//! Stdout carries the JSON response only, so everything here is for stderr.

use console::Emoji;

// Re-export style
pub use console::style;

pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");

/// Line announcing where the run log lives
pub fn format_log_location(path: &std::path::Path) -> String {
    format!("{}Logging to {}", INFO, style(path.display()).for_stderr().dim())
}

/// Concise failure line for stderr
pub fn format_failure(error: &dyn std::fmt::Display) -> String {
    format!("{}{}", CROSS, style(error).for_stderr().red())
}
