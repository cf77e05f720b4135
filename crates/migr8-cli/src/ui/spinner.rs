//! Spinner shown while a rule runs.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Spinner for a task without known duration.
///
/// ```no_run
/// use migr8_cli::ui::Spinner;
///
/// let spinner = Spinner::new("Migrate Hub usage");
/// spinner.finish("Migrate Hub usage: 3 files changed");
/// ```
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create and start a spinner; it stays hidden in CI and non-TTY output
    pub fn new(message: &str) -> Self {
        let visible = console::user_attended_stderr() && !super::is_ci();
        let pb = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_strings(&["◐", "◓", "◑", "◒", "●"]));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    /// Whether the spinner draws anything
    pub fn is_hidden(&self) -> bool {
        self.pb.is_hidden()
    }

    /// Finish with a green checkmark.
    pub fn finish(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {}", "✓".green(), message));
    }

    /// Finish with a red X.
    pub fn fail(&self, message: &str) {
        self.pb.finish_with_message(format!("{} {}", "✗".red(), message));
    }
}
