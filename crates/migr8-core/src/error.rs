//! Error types for the transformer engine

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while rewriting sources or inspecting a project
#[derive(Error, Debug, Diagnostic)]
pub enum MigrateError {
    /// Source text could not be parsed
    #[error("Failed to parse {}: {reason}", path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<source>".to_string()))]
    #[diagnostic(
        code(migr8::core::parse),
        help("The file is skipped for this rule; other files and rules still run")
    )]
    Parse {
        path: Option<PathBuf>,
        reason: String,
    },

    /// Two recorded edits touch the same bytes
    #[error("Overlapping edits at {first_start}..{first_end} and {second_start}..{second_end}")]
    #[diagnostic(code(migr8::core::overlapping_edits))]
    OverlappingEdits {
        first_start: u32,
        first_end: u32,
        second_start: u32,
        second_end: u32,
    },

    /// Embedded script blocks could not be located
    #[error("Cannot extract script blocks from {}: {reason}", path.display())]
    #[diagnostic(code(migr8::core::extract))]
    Extract { path: PathBuf, reason: String },

    /// Dependency manifest is missing fields or malformed
    #[error("Invalid manifest {}: {reason}", path.display())]
    #[diagnostic(code(migr8::core::manifest))]
    Manifest { path: PathBuf, reason: String },

    /// A package name pattern is not a valid regular expression
    #[error("Invalid package pattern '{pattern}': {source}")]
    #[diagnostic(code(migr8::core::invalid_pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// File system failure
    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(migr8::core::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rule hit a state it cannot handle
    #[error("{context}")]
    #[diagnostic(code(migr8::core::internal))]
    Internal { context: String },
}

impl MigrateError {
    /// Create a Parse error without a file path
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            path: None,
            reason: reason.into(),
        }
    }

    /// Attach a file path to a Parse error; other variants are returned unchanged
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Parse { path: None, reason } => Self::Parse {
                path: Some(path.into()),
                reason,
            },
            other => other,
        }
    }

    /// Create an Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a Manifest error
    pub fn manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(context: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
        }
    }

    /// Whether this error only means "this file could not be read as code"
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Extract { .. })
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, MigrateError>;
