//! `@sentry/hub` imports split between the SDK and `@sentry/core`

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::edit::EditSet;
use crate::error::Result;
use crate::imports::{StatementKind, dedupe, has_package_import, package_statements};
use crate::parser::Module;
use crate::sdk::PackageManager;
use crate::text::indent_at;
use crate::transform::{
    SourceRule, SourceTransformer, TransformReport, Transformer, TransformerOptions, changed,
    edit_pass, rewrite_pass,
};
use crate::wrapper::SourceUnit;

use super::manifest::{editable_manifest, run_package_manager};

const HUB_PACKAGE: &str = "@sentry/hub";
const CORE_PACKAGE: &str = "@sentry/core";

/// Exports of `@sentry/hub` that no SDK package re-exports
const CORE_ONLY: &[&str] = &[
    "getMainCarrier",
    "setHubOnCarrier",
    "SessionFlusher",
    "closeSession",
    "makeSession",
    "updateSession",
    "Carrier",
    "Layer",
];

/// Edits for every hub statement, and whether any of them now needs core
fn split_hub_imports(module: &Module<'_, '_>, sdk: &str) -> (EditSet, bool) {
    let mut edits = EditSet::new();
    let mut needs_core = false;

    for stmt in package_statements(module, |p| p == HUB_PACKAGE) {
        if stmt.unsupported {
            continue;
        }

        // Namespaces and requires go to core whole: which members they use is
        // not worth working out.
        if stmt.is_namespace_only() || stmt.kind == StatementKind::Require {
            edits.replace(stmt.source_span, module.string_literal(CORE_PACKAGE));
            needs_core = true;
            continue;
        }
        if stmt.namespace.is_some() || stmt.default.is_some() || !stmt.has_named() {
            continue;
        }

        let (core, rest): (Vec<_>, Vec<_>) = stmt
            .named
            .iter()
            .partition(|spec| CORE_ONLY.contains(&spec.imported.as_str()));
        let keyword = if stmt.type_only { "import type" } else { "import" };
        let mut replacement = Vec::new();
        for (specs, package) in [(&core, CORE_PACKAGE), (&rest, sdk)] {
            if specs.is_empty() {
                continue;
            }
            let list = specs
                .iter()
                .map(|spec| module.text(spec.span))
                .collect::<Vec<_>>()
                .join(", ");
            replacement.push(format!(
                "{keyword} {{ {list} }} from {};",
                module.string_literal(package)
            ));
        }
        needs_core |= !core.is_empty();

        let separator = format!("\n{}", indent_at(module.source, stmt.span.start));
        edits.replace(stmt.span, replacement.join(&separator));
    }
    (edits, needs_core)
}

struct HubImportSource<'f> {
    needs_core: &'f AtomicBool,
}

impl SourceRule for HubImportSource<'_> {
    fn id(&self) -> &'static str {
        "rewrite-hub-imports"
    }

    fn name(&self) -> &'static str {
        "Remove `@sentry/hub` imports"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, options: &TransformerOptions) -> Result<Option<String>> {
        let Some(sdk) = options.sdk() else {
            return Ok(None);
        };
        if !has_package_import(unit.source, HUB_PACKAGE) {
            return Ok(None);
        }

        let (output, needs_core) = rewrite_pass(unit.source, unit.parse_options, |module| {
            Ok(split_hub_imports(module, sdk))
        })?;
        let output = edit_pass(&output, unit.parse_options, |module| dedupe(module, sdk, None))?;
        let output = edit_pass(&output, unit.parse_options, |module| {
            dedupe(module, CORE_PACKAGE, None)
        })?;

        if needs_core {
            self.needs_core.store(true, Ordering::Relaxed);
        }
        Ok(changed(unit.source, output))
    }
}

/// Moves `@sentry/hub` imports to the SDK, or to `@sentry/core` for the APIs
/// only core still exports, and installs `@sentry/core` when it ends up used
pub struct RewriteHubImports;

impl Transformer for RewriteHubImports {
    fn id(&self) -> &'static str {
        "rewrite-hub-imports"
    }

    fn name(&self) -> &'static str {
        "Remove `@sentry/hub` imports"
    }

    fn transform(&self, files: &[PathBuf], options: &TransformerOptions) -> Result<TransformReport> {
        if options.sdk().is_none() {
            tracing::debug!("no SDK selected, skipping");
            return Ok(TransformReport::default());
        }

        let needs_core = AtomicBool::new(false);
        let mut report = SourceTransformer(HubImportSource {
            needs_core: &needs_core,
        })
        .transform(files, options)?;

        if !needs_core.load(Ordering::Relaxed) {
            return Ok(report);
        }
        match editable_manifest(options)? {
            Some(manifest) if manifest.has_package(CORE_PACKAGE) => {
                tracing::debug!("{CORE_PACKAGE} already installed");
            }
            Some(_) => {
                let args = PackageManager::detect(&options.cwd).add_args(&[CORE_PACKAGE], false);
                run_package_manager(options, args, &mut report);
            }
            None => report
                .notes
                .push(format!("add `{CORE_PACKAGE}` to the dependencies of the package using it")),
        }
        Ok(report)
    }
}
