//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying spinners and formatted
//! messages to the user.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Output settings taken from the global flags
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub quiet: bool,
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, verbose: u8) -> Self {
        Self { quiet, verbose }
    }

    /// Make these settings visible to the print helpers
    pub fn apply_global(self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
    }

    /// Log filter directive for this verbosity
    pub fn log_level(self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

pub fn print_success(message: &str) {
    if !is_quiet() {
        println!("\x1b[32m{}\x1b[0m {message}", status::SUCCESS);
    }
}

/// Errors are printed even when quiet
pub fn print_error(message: &str) {
    eprintln!("\x1b[31m{}\x1b[0m {message}", status::ERROR);
}

pub fn print_info(message: &str) {
    if !is_quiet() {
        println!("\x1b[34m{}\x1b[0m {message}", status::INFO);
    }
}

/// Indented detail line under a previous message
pub fn print_detail(message: &str) {
    if !is_quiet() {
        println!("  {message}");
    }
}

/// A progress line of one package
pub fn print_progress(package: &str, line: &str) {
    if !is_quiet() {
        println!("\x1b[2m[{package}]\x1b[0m {line}");
    }
}

/// Create a spinner for operations with unknown duration
///
/// Hidden when quiet.
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Print a top-level error with its cause chain
pub fn display_error(error: &anyhow::Error) {
    print_error(&error.to_string());
    for cause in error.chain().skip(1) {
        print_detail(&format!("caused by: {cause}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_verbosity() {
        assert_eq!(OutputConfig::new(false, 0).log_level(), tracing::Level::WARN);
        assert_eq!(OutputConfig::new(false, 1).log_level(), tracing::Level::INFO);
        assert_eq!(OutputConfig::new(false, 3).log_level(), tracing::Level::DEBUG);
    }
}
