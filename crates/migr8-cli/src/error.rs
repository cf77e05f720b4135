//! Error handling for the migr8 CLI.
//!
//! `CliError` is what commands return. Problems the user can fix carry a
//! "Hint:" line. Errors from the transformer engine keep their
//! `miette::Diagnostic` so they render with code and help text.
//!
//! # Example
//!
//! ```rust,no_run
//! use migr8_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_manifest(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Run migr8 from the root of your project")
//! }
//! ```

use std::path::PathBuf;

use migr8_core::MigrateError;
use miette::Report;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure inside the transformer engine
    #[error(transparent)]
    Core(#[from] MigrateError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The environment is not safe to migrate in
    #[error("{message}\n\nHint: {hint}")]
    Preflight { message: String, hint: String },

    /// The user declined to continue or cancelled a prompt
    #[error("Run cancelled")]
    Cancelled,

    /// An interactive prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

impl From<inquire::InquireError> for CliError {
    fn from(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => CliError::Cancelled,
            other => CliError::Prompt(other.to_string()),
        }
    }
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value failed to load or validate
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// A `--rule` or `rules` entry names no known rule
    #[error("Unknown rule '{0}'\n\nHint: Run 'migr8 list' to see the available rules")]
    UnknownRule(String),

    /// A file or ignore pattern is not a valid glob
    #[error("Invalid glob pattern '{pattern}': {reason}\n\nHint: Patterns use glob syntax, e.g. 'src/**/*.{{js,ts}}'")]
    InvalidPattern { pattern: String, reason: String },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a "Hint:" line to the error
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error with a message
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{err}\n\nHint: {hint}"))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}

/// Convert a `CliError` into a report for printing
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Core(e) => Report::new(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_rule_has_hint() {
        let msg = ConfigError::UnknownRule("huh".to_string()).to_string();
        assert!(msg.contains("Unknown rule 'huh'"));
        assert!(msg.contains("Hint: Run 'migr8 list'"));
    }

    #[test]
    fn test_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "sdk".to_string(),
            value: "react".to_string(),
            hint: "Use a package name like @sentry/react".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'sdk': react"));
        assert!(msg.contains("Hint: Use a package name"));
    }

    #[test]
    fn test_cli_error_from_core_error() {
        let err: CliError = MigrateError::internal("broken").into();
        assert!(matches!(err, CliError::Core(_)));
        assert_eq!(err.to_string(), "broken");
    }

    #[test]
    fn test_prompt_cancel_is_cancelled() {
        let err: CliError = inquire::InquireError::OperationCanceled.into();
        assert!(matches!(err, CliError::Cancelled));
        let err: CliError = inquire::InquireError::NotTTY.into();
        assert!(matches!(err, CliError::Prompt(_)));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let err = result.with_path("/project/package.json").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_with_hint_and_context() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::UnknownRule("x".to_string()));
        let msg = result.context("Selecting rules").unwrap_err().to_string();
        assert!(msg.starts_with("Selecting rules: Configuration error: Unknown rule 'x'"));

        let result: Result<()> = Err(CliError::Custom("no files".to_string()));
        let msg = result.with_hint("Check your patterns").unwrap_err().to_string();
        assert!(msg.contains("Hint: Check your patterns"));
    }
}
