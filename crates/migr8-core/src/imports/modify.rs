//! Adding and removing specifiers of one package

use oxc_ast::ast::Statement;
use oxc_span::{GetSpan, Span};

use super::bindings::is_referenced;
use super::{PackageStatement, StatementKind, package_statements};
use crate::edit::EditSet;
use crate::parser::Module;
use crate::text::{
    append_list_items, line_end_inclusive, list_items_removal_spans, statement_removal_span,
};

/// Add and remove named bindings of `package`
///
/// Names in `add` that some statement already imports are skipped; the rest
/// are appended to the first named import (or destructured require) of the
/// package. Without one, a new statement is inserted after the existing
/// imports, as an `import` in ES modules and a `require` otherwise.
///
/// Names in `remove` are dropped only once nothing references them, and a
/// statement left without bindings is removed.
pub fn modify_imports(
    module: &Module<'_, '_>,
    package: &str,
    add: &[&str],
    remove: &[&str],
) -> EditSet {
    let statements: Vec<PackageStatement> = package_statements(module, |p| p == package)
        .into_iter()
        .filter(|s| !s.type_only && !s.unsupported)
        .collect();

    let mut additions: Vec<String> = Vec::new();
    for name in add {
        let bound = statements
            .iter()
            .flat_map(|s| s.named.iter())
            .any(|spec| spec.imported == *name);
        if !bound && !additions.iter().any(|a| a == name) {
            additions.push((*name).to_string());
        }
    }

    let mut edits = EditSet::new();
    let mut target_taken = additions.is_empty();

    for stmt in &statements {
        let removed: Vec<usize> = stmt
            .named
            .iter()
            .enumerate()
            .filter(|(_, spec)| {
                remove.contains(&spec.imported.as_str())
                    && !spec.local.symbol.is_some_and(|s| is_referenced(module, s))
            })
            .map(|(i, _)| i)
            .collect();
        let emptied = !removed.is_empty()
            && removed.len() == stmt.named.len()
            && stmt.namespace.is_none()
            && stmt.default.is_none();

        if let Some(container) = stmt
            .named_container
            .filter(|_| !target_taken && stmt.namespace.is_none())
        {
            target_taken = true;
            if emptied {
                // Everything else goes, so the new names take over the braces.
                edits.replace(container, format!("{{ {} }}", additions.join(", ")));
                continue;
            }
            for span in list_items_removal_spans(&stmt.named_spans(), &removed) {
                edits.remove(span);
            }
            let (at, text) = append_list_items(
                module.source,
                container.start,
                &stmt.named_spans(),
                &additions,
            );
            edits.insert(at, text);
            tracing::debug!(package, names = ?additions, "added specifiers");
            continue;
        }

        if emptied {
            edits.remove(statement_removal_span(module.source, stmt.span));
        } else if stmt.default.is_some() && removed.len() == stmt.named.len() && !removed.is_empty()
        {
            // `import D, { x } from 'p'` keeps `import D from 'p'`.
            if let (Some(default), Some(container)) = (&stmt.default, stmt.named_container) {
                edits.remove(Span::new(default.span.end, container.end));
            }
        } else {
            for span in list_items_removal_spans(&stmt.named_spans(), &removed) {
                edits.remove(span);
            }
        }
    }

    if !target_taken {
        let (at, text) = new_statement(module, package, &statements, &additions);
        edits.insert(at, text);
        tracing::debug!(package, names = ?additions, "inserted import statement");
    }

    edits
}

/// Offset and text of a fresh statement binding `names` from `package`
fn new_statement(
    module: &Module<'_, '_>,
    package: &str,
    statements: &[PackageStatement],
    names: &[String],
) -> (u32, String) {
    let body = &module.program.body;
    let last_import = body
        .iter()
        .filter(|s| matches!(s, Statement::ImportDeclaration(_)))
        .map(GetSpan::span)
        .last();

    let esm = match statements.first() {
        Some(stmt) => stmt.kind == StatementKind::Import,
        None => {
            last_import.is_some()
                || !package_statements(module, |_| true)
                    .iter()
                    .any(|s| s.kind == StatementKind::Require)
        }
    };

    let anchor = statements
        .last()
        .map(|s| s.span)
        .or(last_import)
        .or_else(|| package_statements(module, |_| true).last().map(|s| s.span));

    let source_literal = module.string_literal(package);
    let statement = if esm {
        format!("import {{ {} }} from {source_literal};", names.join(", "))
    } else {
        format!("const {{ {} }} = require({source_literal});", names.join(", "))
    };

    let at = match anchor {
        Some(span) => line_end_inclusive(module.source, span.end),
        None => top_of_file(module),
    };
    let needs_newline = at > 0 && !module.source[..at as usize].ends_with('\n');
    let text = if needs_newline {
        format!("\n{statement}\n")
    } else {
        format!("{statement}\n")
    };
    (at, text)
}

/// First offset after a hashbang line and directive prologue
pub(crate) fn top_of_file(module: &Module<'_, '_>) -> u32 {
    let after = module
        .program
        .directives
        .last()
        .map(|d| d.span.end)
        .or_else(|| module.program.hashbang.as_ref().map(|h| h.span.end));
    match after {
        Some(end) => line_end_inclusive(module.source, end),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, with_module};

    fn run(source: &str, add: &[&str], remove: &[&str]) -> String {
        with_module(source, ParseOptions::default(), |m| {
            modify_imports(m, "@sentry/browser", add, remove)
                .apply(source)
                .unwrap()
        })
        .unwrap()
    }

    #[test]
    fn swaps_unreferenced_specifier() {
        let source = "import { getCurrentHub, init } from '@sentry/browser';\ncaptureException(e);\ninit({});\n";
        assert_eq!(
            run(source, &["captureException"], &["getCurrentHub"]),
            "import { init, captureException } from '@sentry/browser';\ncaptureException(e);\ninit({});\n"
        );
    }

    #[test]
    fn keeps_referenced_specifier() {
        let source = "import { getCurrentHub } from '@sentry/browser';\nconst hub = getCurrentHub();\n";
        assert_eq!(
            run(source, &["getClient"], &["getCurrentHub"]),
            "import { getCurrentHub, getClient } from '@sentry/browser';\nconst hub = getCurrentHub();\n"
        );
    }

    #[test]
    fn replaces_emptied_list() {
        let source = "import { getCurrentHub } from '@sentry/browser';\nsetTag('a', 'b');\n";
        assert_eq!(
            run(source, &["setTag"], &["getCurrentHub"]),
            "import { setTag } from '@sentry/browser';\nsetTag('a', 'b');\n"
        );
    }

    #[test]
    fn skips_names_already_imported() {
        let source = "import { setTag } from '@sentry/browser';\nsetTag('a', 'b');\n";
        assert_eq!(run(source, &["setTag"], &[]), source);
    }

    #[test]
    fn removes_emptied_statement() {
        let source = "import { init } from '@sentry/browser';\nimport { getCurrentHub } from '@sentry/browser';\ninit({});\n";
        assert_eq!(
            run(source, &[], &["getCurrentHub"]),
            "import { init } from '@sentry/browser';\ninit({});\n"
        );
    }

    #[test]
    fn inserts_statement_next_to_namespace_import() {
        let source = "import * as Sentry from '@sentry/browser';\nimport React from \"react\";\n";
        assert_eq!(
            run(source, &["setTag"], &[]),
            "import * as Sentry from '@sentry/browser';\nimport { setTag } from '@sentry/browser';\nimport React from \"react\";\n"
        );
    }

    #[test]
    fn inserts_require_in_commonjs() {
        let source = "'use strict';\nconst express = require(\"express\");\napp.use(x);";
        assert_eq!(
            run(source, &["setTag"], &[]),
            "'use strict';\nconst express = require(\"express\");\nconst { setTag } = require(\"@sentry/browser\");\napp.use(x);"
        );
    }

    #[test]
    fn adds_to_destructured_require() {
        let source = "const { init } = require('@sentry/browser');\n";
        assert_eq!(
            run(source, &["setUser"], &[]),
            "const { init, setUser } = require('@sentry/browser');\n"
        );
    }
}
