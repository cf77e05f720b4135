//! Subcommands and their arguments.

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the migration over the project
    Run(RunArgs),

    /// List the available rules
    List,
}

/// Arguments of `migr8 run`
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Glob patterns of files to migrate, relative to the working directory
    ///
    /// Defaults to every JavaScript, TypeScript, Vue and Svelte file.
    #[arg(value_name = "PATTERNS")]
    pub patterns: Vec<String>,

    /// Glob patterns of files to leave alone (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// SDK package to migrate, e.g. @sentry/react; detected from package.json by default
    #[arg(long, value_name = "PKG")]
    pub sdk: Option<String>,

    /// Installed SDK version; detected from package.json by default
    #[arg(long, value_name = "VER")]
    pub sdk_version: Option<String>,

    /// Project directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Do not check for a git repository
    #[arg(long)]
    pub skip_git_checks: bool,

    /// Rule id to run (repeatable); see `migr8 list`
    #[arg(long = "rule", value_name = "ID", conflicts_with = "all")]
    pub rules: Vec<String>,

    /// Run every rule without asking
    #[arg(long)]
    pub all: bool,

    /// Show what would change without writing files or running the package manager
    #[arg(long)]
    pub dry_run: bool,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
