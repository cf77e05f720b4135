//! Checks before anything is rewritten: a git repository to undo changes
//! with, and an SDK that still needs migrating.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, bail};
use inquire::Confirm;
use migr8_core::DetectedSdk;

use crate::error::{CliError, Result};
use crate::ui;

/// Whether prompts can be shown
pub fn is_interactive() -> bool {
    console::user_attended() && !ui::is_ci()
}

fn git_work_tree(cwd: &Path) -> anyhow::Result<bool> {
    let output = Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(cwd)
        .output()
        .context("failed to run git")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("not a git repository") {
            return Ok(false);
        }
        bail!("git rev-parse failed: {}", stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
}

/// Whether `cwd` is inside a git work tree; `false` when git is unusable
pub fn is_git_repo(cwd: &Path) -> bool {
    match git_work_tree(cwd) {
        Ok(inside) => inside,
        Err(err) => {
            tracing::debug!("{err:#}");
            false
        }
    }
}

/// Ask a yes/no question; cancelling the prompt cancels the run
pub fn confirm(message: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new(message).with_default(default).prompt()?)
}

/// Make sure changes can be reviewed and reverted
pub fn check_git(cwd: &Path, skip: bool, yes: bool) -> Result<()> {
    if skip || yes || is_git_repo(cwd) {
        return Ok(());
    }
    if !is_interactive() {
        return Err(CliError::Preflight {
            message: format!("{} is not inside a git repository", cwd.display()),
            hint: "Commit your project to git first, or pass --skip-git-checks".to_string(),
        });
    }
    ui::warning("You are not inside a git repository. migr8 rewrites files in place.");
    if confirm("Do you want to continue anyway?", false)? {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

/// Ask before migrating a project that already uses v8 or later
pub fn check_version(sdk: &DetectedSdk, yes: bool) -> Result<()> {
    if !sdk.is_migrated() || yes {
        return Ok(());
    }
    let message = format!(
        "It seems {} is already on version {}. Do you want to run the migration anyway?",
        sdk.package,
        sdk.version.as_deref().unwrap_or("8")
    );
    if !is_interactive() {
        return Err(CliError::Preflight {
            message: format!("{} is already on v8 or later", sdk.package),
            hint: "Pass --yes to run the migration anyway".to_string(),
        });
    }
    if confirm(&message, false)? {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_and_yes_bypass_git_check() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(check_git(temp.path(), true, false).is_ok());
        assert!(check_git(temp.path(), false, true).is_ok());
    }

    #[test]
    fn test_v7_passes_version_check() {
        let sdk = DetectedSdk::new("@sentry/react", Some("^7.100.0".to_string()));
        assert!(check_version(&sdk, false).is_ok());
        let unknown = DetectedSdk::new("@sentry/react", None);
        assert!(check_version(&unknown, false).is_ok());
    }

    #[test]
    fn test_v8_needs_yes() {
        let sdk = DetectedSdk::new("@sentry/node", Some("^8.0.0".to_string()));
        assert!(check_version(&sdk, true).is_ok());
    }
}
