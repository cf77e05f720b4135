//! Package manager detection and command planning

use std::path::Path;
use std::process::Command;

use crate::error::{MigrateError, Result};

/// The package manager a project uses, judged by its lockfile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Yarn,
    Pnpm,
    Npm,
}

impl PackageManager {
    /// `yarn.lock` means yarn, `pnpm-lock.yaml` means pnpm, anything else npm
    pub fn detect(cwd: &Path) -> Self {
        if cwd.join("yarn.lock").exists() {
            Self::Yarn
        } else if cwd.join("pnpm-lock.yaml").exists() {
            Self::Pnpm
        } else {
            Self::Npm
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Npm => "npm",
        }
    }

    /// Arguments installing `packages`, as a dev dependency when `dev`
    pub fn add_args(self, packages: &[&str], dev: bool) -> Vec<String> {
        let mut args = vec![match self {
            Self::Yarn | Self::Pnpm => "add".to_string(),
            Self::Npm => "install".to_string(),
        }];
        args.extend(packages.iter().map(|p| p.to_string()));
        if matches!(self, Self::Yarn | Self::Npm) {
            args.push("--caret".to_string());
        }
        if dev {
            args.push(
                match self {
                    Self::Yarn => "--dev",
                    Self::Pnpm | Self::Npm => "--save-dev",
                }
                .to_string(),
            );
        }
        args
    }

    /// Arguments uninstalling `packages`
    pub fn remove_args(self, packages: &[&str]) -> Vec<String> {
        let mut args = vec![match self {
            Self::Yarn | Self::Pnpm => "remove".to_string(),
            Self::Npm => "uninstall".to_string(),
        }];
        args.extend(packages.iter().map(|p| p.to_string()));
        args
    }
}

/// Run the package manager in `cwd`
///
/// A non-zero exit status is an error carrying the command's stderr.
pub fn run_command(manager: PackageManager, args: &[String], cwd: &Path) -> Result<()> {
    let program = manager.program();
    tracing::info!("running {program} {}", args.join(" "));
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| MigrateError::io(cwd, e))?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(MigrateError::internal(format!(
        "`{program} {}` failed with {}: {}",
        args.join(" "),
        output.status,
        stderr.trim()
    )))
}
