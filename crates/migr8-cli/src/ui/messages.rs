//! Status message functions for terminal output.

use owo_colors::OwoColorize;

use super::colors_enabled;

fn line(glyph: String, plain: &str, message: &str) {
    if colors_enabled() {
        eprintln!("{glyph} {message}");
    } else {
        eprintln!("{plain} {message}");
    }
}

/// Print a success message to stderr.
pub fn success(message: &str) {
    line("✓".green().bold().to_string(), "✓", message);
}

/// Print an info message to stderr.
///
/// ```no_run
/// use migr8_cli::ui::info;
///
/// info("Detected @sentry/react 7.100.0");
/// ```
pub fn info(message: &str) {
    line("ℹ".blue().bold().to_string(), "ℹ", message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    line("⚠".yellow().bold().to_string(), "⚠", message);
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    line("✗".red().bold().to_string(), "✗", message);
}
