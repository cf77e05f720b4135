//! Pointing imports and requires at a different package

use oxc_ast::ast::CallExpression;
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;

use super::{StatementHandle, StatementKind, package_statements};
use crate::edit::EditSet;
use crate::matchers::required_package;
use crate::parser::Module;

struct RequireFinder<'p> {
    package: &'p str,
    literals: Vec<Span>,
}

impl<'a> Visit<'a> for RequireFinder<'_> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some((package, span)) = required_package(call) {
            if package == self.package {
                self.literals.push(span);
            }
        }
        walk::walk_call_expression(self, call);
    }
}

fn quoted_like(original: &str, value: &str) -> String {
    let quote = original.chars().next().filter(|c| *c == '"' || *c == '\'').unwrap_or('\'');
    format!("{quote}{value}{quote}")
}

/// Rewrite every `import ... from 'old'` and `require('old')` to `new`
///
/// Returns the edits plus handles of the top-level statements that now bind
/// `new` because of the rewrite, for a follow-up [`dedupe`](super::dedupe).
/// Requires nested inside functions are retargeted too but have no handle.
pub fn retarget(module: &Module<'_, '_>, old: &str, new: &str) -> (EditSet, Vec<StatementHandle>) {
    let mut edits = EditSet::new();
    let mut touched = Vec::new();

    let mut literals = Vec::new();
    for stmt in package_statements(module, |p| p == old) {
        touched.push(stmt.handle);
        if stmt.kind == StatementKind::Import {
            literals.push(stmt.source_span);
        }
    }

    let mut finder = RequireFinder {
        package: old,
        literals: Vec::new(),
    };
    walk::walk_program(&mut finder, module.program);
    literals.extend(finder.literals);

    literals.sort_by_key(|s| s.start);
    literals.dedup();
    for span in literals {
        edits.replace(span, quoted_like(module.text(span), new));
    }

    (edits, touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, with_module};

    fn run(source: &str, old: &str, new: &str) -> (String, Vec<StatementHandle>) {
        with_module(source, ParseOptions::default(), |m| {
            let (edits, touched) = retarget(m, old, new);
            (edits.apply(source).unwrap(), touched)
        })
        .unwrap()
    }

    #[test]
    fn retargets_imports_and_requires() {
        let source = r#"import { BrowserTracing } from '@sentry/tracing';
import * as Sentry from "@sentry/browser";
const Tracing = require("@sentry/tracing");
function lazy() {
  return require('@sentry/tracing');
}
"#;
        let (out, touched) = run(source, "@sentry/tracing", "@sentry/browser");
        assert_eq!(
            out,
            r#"import { BrowserTracing } from '@sentry/browser';
import * as Sentry from "@sentry/browser";
const Tracing = require("@sentry/browser");
function lazy() {
  return require('@sentry/browser');
}
"#
        );
        assert_eq!(touched, vec![StatementHandle(0), StatementHandle(2)]);
    }

    #[test]
    fn leaves_other_packages_alone() {
        let source = "import { x } from '@sentry/tracing-extra';\n";
        let (out, touched) = run(source, "@sentry/tracing", "@sentry/browser");
        assert_eq!(out, source);
        assert!(touched.is_empty());
    }

    #[test]
    fn moves_side_effect_imports() {
        let (out, touched) = run("import '@sentry/tracing';\n", "@sentry/tracing", "@sentry/node");
        assert_eq!(out, "import '@sentry/node';\n");
        assert_eq!(touched, vec![StatementHandle(0)]);
    }
}
