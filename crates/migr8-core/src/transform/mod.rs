//! Rule traits, options and per-rule reports
//!
//! Every migration is a [`Transformer`]. Rules that only rewrite source text
//! implement the narrower [`SourceRule`] and get the file loop from
//! [`SourceTransformer`]: reading, routing through the source wrapper,
//! skipping unparseable files, and writing changed ones.

mod pipeline;
mod registry;
mod runner;

pub use pipeline::{changed, edit_pass, rewrite_pass};
pub use registry::{discover, find};
pub use runner::{RuleOutcome, run_all, run_rule};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{MigrateError, Result};
use crate::sdk::is_server_sdk;
use crate::wrapper::{SourceUnit, wrap};

/// Inputs every rule receives
#[derive(Debug, Clone, Default)]
pub struct TransformerOptions {
    /// Detected or user-selected SDK package, e.g. `@sentry/browser`
    pub sdk: Option<String>,
    /// Version range of the SDK as written in `package.json`
    pub sdk_version: Option<String>,
    /// Project root; manifest rules run the package manager here
    pub cwd: PathBuf,
    pub debug: bool,
    /// Compute rewrites without writing files or running commands
    pub dry_run: bool,
}

impl TransformerOptions {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    pub fn with_sdk(mut self, sdk: impl Into<String>) -> Self {
        self.sdk = Some(sdk.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn sdk(&self) -> Option<&str> {
        self.sdk.as_deref()
    }

    pub fn is_server_sdk(&self) -> bool {
        self.sdk().is_some_and(is_server_sdk)
    }
}

/// What one rule did to the file set
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformReport {
    /// Files that were (or in a dry run, would be) rewritten
    pub modified: Vec<PathBuf>,
    pub unchanged: usize,
    /// Files left alone because they could not be parsed, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Files the rule created
    pub created: Vec<PathBuf>,
    /// Free-form notes for the user, e.g. package-manager commands
    pub notes: Vec<String>,
}

impl TransformReport {
    pub fn is_noop(&self) -> bool {
        self.modified.is_empty() && self.created.is_empty() && self.notes.is_empty()
    }
}

/// A migration step over the project
pub trait Transformer: Send + Sync {
    /// Kebab-case identifier used on the command line
    fn id(&self) -> &'static str;

    /// Human readable name
    fn name(&self) -> &'static str;

    fn transform(&self, files: &[PathBuf], options: &TransformerOptions)
    -> Result<TransformReport>;
}

/// A rule that rewrites script source one unit at a time
pub trait SourceRule: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Whether the rule looks at this file at all
    fn applies_to(&self, path: &Path, options: &TransformerOptions) -> bool {
        let _ = (path, options);
        true
    }

    /// New text for the unit, or `None` when nothing changed
    fn rewrite(&self, unit: &SourceUnit<'_>, options: &TransformerOptions)
    -> Result<Option<String>>;

    /// Hook for rules that create files next to the ones they rewrite
    fn after_file(
        &self,
        path: &Path,
        options: &TransformerOptions,
        report: &mut TransformReport,
    ) -> Result<()> {
        let _ = (path, options, report);
        Ok(())
    }
}

/// Runs a [`SourceRule`] over every file
pub struct SourceTransformer<R>(pub R);

impl<R: SourceRule> SourceTransformer<R> {
    fn transform_file(
        &self,
        path: &Path,
        options: &TransformerOptions,
        report: &mut TransformReport,
    ) -> Result<()> {
        let rule = &self.0;
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(path = %path.display(), "cannot read file: {err}");
                report.skipped.push((path.to_path_buf(), err.to_string()));
                return Ok(());
            }
        };

        match wrap(path, &source, |unit| rule.rewrite(unit, options)) {
            Ok(Some(output)) => {
                tracing::debug!(rule = rule.id(), path = %path.display(), "rewrote file");
                if !options.dry_run {
                    fs::write(path, output).map_err(|e| MigrateError::io(path, e))?;
                }
                report.modified.push(path.to_path_buf());
            }
            Ok(None) => report.unchanged += 1,
            Err(err) if err.is_parse_failure() => {
                let err = err.with_path(path);
                tracing::warn!(rule = rule.id(), "{err}");
                report.skipped.push((path.to_path_buf(), err.to_string()));
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }
}

impl<R: SourceRule> Transformer for SourceTransformer<R> {
    fn id(&self) -> &'static str {
        self.0.id()
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn transform(
        &self,
        files: &[PathBuf],
        options: &TransformerOptions,
    ) -> Result<TransformReport> {
        let mut report = TransformReport::default();
        for path in files {
            if !self.0.applies_to(path, options) {
                continue;
            }
            self.transform_file(path, options, &mut report)?;
            self.0.after_file(path, options, &mut report)?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Shout;

    impl SourceRule for Shout {
        fn id(&self) -> &'static str {
            "shout"
        }

        fn name(&self) -> &'static str {
            "Shout"
        }

        fn rewrite(
            &self,
            unit: &SourceUnit<'_>,
            _options: &TransformerOptions,
        ) -> Result<Option<String>> {
            if unit.source.contains("@@") {
                return Err(MigrateError::parse("unexpected token"));
            }
            Ok(unit
                .source
                .contains("hello")
                .then(|| unit.source.replace("hello", "HELLO")))
        }
    }

    #[test]
    fn rewrites_and_counts_files() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        let c = dir.path().join("c.js");
        fs::write(&a, "hello();").unwrap();
        fs::write(&b, "bye();").unwrap();
        fs::write(&c, "@@ hello").unwrap();

        let options = TransformerOptions::new(dir.path());
        let report = SourceTransformer(Shout)
            .transform(&[a.clone(), b.clone(), c.clone()], &options)
            .unwrap();

        assert_eq!(report.modified, vec![a.clone()]);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(fs::read_to_string(&a).unwrap(), "HELLO();");
        assert_eq!(fs::read_to_string(&c).unwrap(), "@@ hello");
    }

    #[test]
    fn dry_run_leaves_files_alone() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.js");
        fs::write(&a, "hello();").unwrap();

        let options = TransformerOptions::new(dir.path()).with_dry_run(true);
        let report = SourceTransformer(Shout)
            .transform(std::slice::from_ref(&a), &options)
            .unwrap();

        assert_eq!(report.modified, vec![a.clone()]);
        assert_eq!(fs::read_to_string(&a).unwrap(), "hello();");
    }
}
