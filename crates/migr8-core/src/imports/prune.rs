//! Removing imports nothing refers to

use oxc_span::Span;

use super::bindings::is_referenced;
use super::{LocalBinding, package_statements};
use crate::edit::EditSet;
use crate::parser::Module;
use crate::text::{list_items_removal_spans, statement_removal_span};

fn unused(module: &Module<'_, '_>, binding: &LocalBinding) -> bool {
    binding.symbol.is_some_and(|s| !is_referenced(module, s))
}

/// Remove unused bindings from statements importing packages accepted by
/// `filter`
///
/// Specifiers and destructured properties go one by one; a statement whose
/// every binding is unused is removed whole. Side-effect imports and bare
/// `require()` calls bind nothing and are kept.
pub fn prune_unused(module: &Module<'_, '_>, filter: impl Fn(&str) -> bool) -> EditSet {
    let mut edits = EditSet::new();
    for stmt in package_statements(module, filter) {
        if stmt.unsupported || stmt.is_side_effect_only() {
            continue;
        }

        let namespace_unused = stmt.namespace.as_ref().is_none_or(|b| unused(module, b));
        let default_unused = stmt.default.as_ref().is_none_or(|b| unused(module, b));
        let removed: Vec<usize> = stmt
            .named
            .iter()
            .enumerate()
            .filter(|(_, spec)| unused(module, &spec.local))
            .map(|(i, _)| i)
            .collect();
        let named_unused = removed.len() == stmt.named.len();

        if namespace_unused && default_unused && named_unused {
            tracing::debug!(package = %stmt.package, "removing unused import");
            edits.remove(statement_removal_span(module.source, stmt.span));
            continue;
        }

        if named_unused && !stmt.named.is_empty() {
            // Only a default binding can share a statement with named ones.
            if let (Some(default), Some(container)) = (&stmt.default, stmt.named_container) {
                edits.remove(Span::new(default.span.end, container.end));
            }
            continue;
        }

        for span in list_items_removal_spans(&stmt.named_spans(), &removed) {
            edits.remove(span);
        }
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, with_module};

    fn run(source: &str) -> String {
        with_module(source, ParseOptions::default(), |m| {
            prune_unused(m, |_| true).apply(source).unwrap()
        })
        .unwrap()
    }

    #[test]
    fn removes_unused_statements_and_specifiers() {
        let source = r#"import * as Sentry from '@sentry/node';
import express from 'express';
import { a, b, c } from './util';
const { d, e: f } = require('./other');
const path = require('path');

Sentry.init({ dsn: b });
console.log(f);
"#;
        assert_eq!(
            run(source),
            r#"import * as Sentry from '@sentry/node';
import { b } from './util';
const { e: f } = require('./other');

Sentry.init({ dsn: b });
console.log(f);
"#
        );
    }

    #[test]
    fn keeps_side_effect_imports() {
        let source = "import './instrument';\nrequire('./tracing');\nimport 'zone.js';\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn drops_named_part_next_to_used_default() {
        let source = "import React, { useState } from 'react';\nReact.render();\n";
        assert_eq!(run(source), "import React from 'react';\nReact.render();\n");
    }

    #[test]
    fn type_positions_count_as_references() {
        let source = "import { Options } from '@sentry/types';\nconst o: Options = {};\n";
        assert_eq!(run(source), source);
    }
}
