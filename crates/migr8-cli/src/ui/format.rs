//! Durations and the per-rule summary.

use std::path::Path;
use std::time::Duration;

use migr8_core::{RuleOutcome, TransformReport};

use super::{error, info, success, warning};

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use migr8_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// One line describing a successful report
pub fn report_line(name: &str, report: &TransformReport, dry_run: bool) -> String {
    let verb = if dry_run { "would change" } else { "changed" };
    if report.modified.is_empty() && report.created.is_empty() {
        return format!("{name}: nothing to do");
    }
    let mut line = format!("{name}: {} {verb}", plural(report.modified.len(), "file"));
    if !report.created.is_empty() {
        line.push_str(&format!(", {} created", plural(report.created.len(), "file")));
    }
    line
}

/// Print what every rule did, relative to `root`
pub fn print_summary(outcomes: &[RuleOutcome], root: &Path, dry_run: bool) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(report) => {
                let line = report_line(outcome.name, report, dry_run);
                if report.is_noop() {
                    info(&line);
                } else {
                    success(&line);
                }
                for path in &report.created {
                    info(&format!("  created {}", display(path, root)));
                }
                for (path, reason) in &report.skipped {
                    warning(&format!("  skipped {}: {reason}", display(path, root)));
                }
                for note in &report.notes {
                    info(&format!("  {note}"));
                }
            }
            Err(message) => error(&format!("{} failed: {message}", outcome.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_report_line() {
        let report = TransformReport {
            modified: vec![PathBuf::from("a.js"), PathBuf::from("b.js")],
            created: vec![PathBuf::from("instrument.js")],
            ..TransformReport::default()
        };
        assert_eq!(
            report_line("Move", &report, false),
            "Move: 2 files changed, 1 file created"
        );
        assert_eq!(
            report_line("Hub", &TransformReport::default(), true),
            "Hub: nothing to do"
        );

        let one = TransformReport {
            modified: vec![PathBuf::from("a.js")],
            ..TransformReport::default()
        };
        assert_eq!(report_line("Hub", &one, true), "Hub: 1 file would change");
    }
}
