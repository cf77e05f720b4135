//! migr8 CLI - migrate Sentry JavaScript SDK usage from v7 to v8.
//!
//! This crate is the orchestration layer around `migr8-core`. It parses
//! flags, merges configuration, finds the files to migrate, checks the
//! environment, and reports what each rule did.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing with clap
//! - [`config`] - Layered configuration (defaults, config file, environment, flags)
//! - [`discovery`] - Glob based file discovery honouring `.gitignore`
//! - [`preflight`] - Git and SDK version checks before anything is rewritten
//! - [`commands`] - `run` and `list`
//! - [`error`] - Error types with actionable hints
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - Status lines and spinners

pub mod cli;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logger;
pub mod preflight;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
