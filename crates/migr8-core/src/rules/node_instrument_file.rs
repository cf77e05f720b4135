//! Moving `@sentry/node` initialization into `instrument.<ext>`
//!
//! In v8 the SDK must be initialized before anything else is imported. The
//! init call moves into a sibling file together with copies of the file's
//! imports and requires; both files are then pruned of what they no longer
//! use, and the original file loads the new one first.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use oxc_ast::ast::Statement;
use oxc_span::{GetSpan, Span};
use regex::{Regex, RegexBuilder};

use crate::edit::EditSet;
use crate::error::{MigrateError, Result};
use crate::imports::{
    StatementKind, has_package_import, package_statements, prune_unused, reference_sites,
    top_of_file,
};
use crate::matchers::{sentry_init_call, unwrap_expression};
use crate::parser::{Module, ParseOptions, with_module};
use crate::text::statement_removal_span;
use crate::transform::{TransformReport, Transformer, TransformerOptions, edit_pass};

const NODE_PACKAGE: &str = "@sentry/node";
const INSTRUMENT_MODULE: &str = "./instrument";
const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

/// File names that suggest Sentry setup already lives in its own file
fn looks_like_setup_file(path: &Path) -> bool {
    static SETUP: OnceLock<Regex> = OnceLock::new();
    let regex = SETUP.get_or_init(|| {
        RegexBuilder::new(r"(instrument)|(tracing)|(sentry)|(trace)(\w|)*\.(\w+)$")
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|_| unreachable!("static pattern is valid"))
    });
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| regex.is_match(name))
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SCRIPT_EXTENSIONS.contains(&e))
}

/// `instrument.<ext>` next to `path`
pub fn instrument_path(path: &Path) -> PathBuf {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("js");
    path.with_file_name(format!("instrument.{extension}"))
}

/// The two texts an extraction produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentPlan {
    /// Where the init call goes
    pub path: PathBuf,
    pub instrument: String,
    /// The original file without the init call
    pub rewritten: String,
}

struct Extraction {
    instrument: String,
    edits: EditSet,
    /// Packages whose bindings the init call used
    init_packages: Vec<String>,
}

fn extract(module: &Module<'_, '_>) -> Option<Extraction> {
    let init = sentry_init_call(module)?;
    // Only a top-level `init(...);` can move without breaking the code around it.
    let statement = module.program.body.iter().find_map(|stmt| match stmt {
        Statement::ExpressionStatement(s)
            if unwrap_expression(&s.expression).span() == init.call.span =>
        {
            Some(s.span)
        }
        _ => None,
    })?;

    let statements = package_statements(module, |_| true);
    let esm = statements
        .iter()
        .any(|s| s.package == NODE_PACKAGE && s.kind == StatementKind::Import);

    let mut lines: Vec<&str> = statements
        .iter()
        .filter(|s| !s.is_side_effect_only())
        .map(|s| module.text(s.span))
        .collect();
    lines.push(module.text(statement));
    let instrument = format!("{}\n", lines.join("\n"));

    let inside = |span: &Span| statement.start <= span.start && span.end <= statement.end;
    let mut init_packages: Vec<String> = statements
        .iter()
        .filter(|s| {
            s.locals().any(|binding| {
                binding.symbol.is_some_and(|symbol| {
                    let sites = reference_sites(module, symbol);
                    sites.plain.iter().chain(&sites.shorthand).any(inside)
                })
            })
        })
        .map(|s| s.package.clone())
        .collect();
    init_packages.dedup();

    let literal = module.string_literal(INSTRUMENT_MODULE);
    let bootstrap = if esm {
        format!("import {literal};\n")
    } else {
        format!("require({literal});\n")
    };

    let source = module.source;
    let mut removal = statement_removal_span(source, statement);
    // Do not leave two blank lines where the call was.
    if source[..removal.start as usize].ends_with("\n\n")
        && source[removal.end as usize..].starts_with('\n')
    {
        removal.end += 1;
    }

    let mut edits = EditSet::new();
    edits.insert(top_of_file(module), bootstrap);
    edits.remove(removal);

    Some(Extraction {
        instrument,
        edits,
        init_packages,
    })
}

/// Compute the extraction for one file without touching the disk
///
/// `None` when the file does not import the Node SDK, is itself named like a
/// setup file, or has no top-level init call.
pub fn plan_instrument_file(path: &Path, source: &str) -> Result<Option<InstrumentPlan>> {
    if !has_package_import(source, NODE_PACKAGE) || looks_like_setup_file(path) {
        return Ok(None);
    }

    let options = ParseOptions::from_path(path);
    let Some(extraction) = with_module(source, options, extract)? else {
        return Ok(None);
    };

    let rewritten = extraction.edits.apply(source)?;
    let packages = extraction.init_packages;
    let rewritten = edit_pass(&rewritten, options, |module| {
        prune_unused(module, |p| packages.iter().any(|q| q == p))
    })?;
    let instrument = edit_pass(&extraction.instrument, options, |module| {
        prune_unused(module, |_| true)
    })?;

    Ok(Some(InstrumentPlan {
        path: instrument_path(path),
        instrument,
        rewritten,
    }))
}

/// Moves the `@sentry/node` init call into `instrument.<ext>`
pub struct NodeInstrumentFile;

impl NodeInstrumentFile {
    fn transform_file(
        &self,
        path: &Path,
        options: &TransformerOptions,
        report: &mut TransformReport,
    ) -> Result<()> {
        let target = instrument_path(path);
        if target.exists() || report.created.contains(&target) {
            tracing::debug!(path = %target.display(), "instrument file already exists");
            report.unchanged += 1;
            return Ok(());
        }

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(path = %path.display(), "cannot read file: {err}");
                report.skipped.push((path.to_path_buf(), err.to_string()));
                return Ok(());
            }
        };

        let plan = match plan_instrument_file(path, &source) {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                report.unchanged += 1;
                return Ok(());
            }
            Err(err) if err.is_parse_failure() => {
                let err = err.with_path(path);
                tracing::warn!(rule = self.id(), "{err}");
                report.skipped.push((path.to_path_buf(), err.to_string()));
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        if !options.dry_run {
            fs::write(&plan.path, &plan.instrument).map_err(|e| MigrateError::io(&plan.path, e))?;
            fs::write(path, &plan.rewritten).map_err(|e| MigrateError::io(path, e))?;
        }
        tracing::info!(
            "moved Sentry.init from {} to {}",
            path.display(),
            plan.path.display()
        );
        report.created.push(plan.path);
        report.modified.push(path.to_path_buf());
        Ok(())
    }
}

impl Transformer for NodeInstrumentFile {
    fn id(&self) -> &'static str {
        "node-instrument-file"
    }

    fn name(&self) -> &'static str {
        "Move @sentry/node config into instrument.js file"
    }

    fn transform(&self, files: &[PathBuf], options: &TransformerOptions) -> Result<TransformReport> {
        let mut report = TransformReport::default();
        if options.sdk() != Some(NODE_PACKAGE) {
            return Ok(report);
        }

        for path in files.iter().filter(|p| is_script(p)) {
            self.transform_file(path, options, &mut report)?;
        }
        if !report.created.is_empty() {
            report.notes.push(
                "Load the instrument file before anything else: `node --import ./instrument.mjs app.mjs` (ESM) or `node --require ./instrument.js app.js` (CommonJS)"
                    .to_string(),
            );
        }
        Ok(report)
    }
}
