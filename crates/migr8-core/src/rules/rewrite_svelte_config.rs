//! `svelte.config.js`: preprocessor out, `withSentryConfig` in

use std::path::Path;

use oxc_ast::ast::{
    ArrayExpression, ArrayExpressionElement, CallExpression, Expression, ExpressionStatement,
    Statement,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::{GetSpan, Span};

use crate::edit::EditSet;
use crate::error::Result;
use crate::imports::{has_package_import, modify_imports, namespace_local};
use crate::matchers::match_call;
use crate::parser::Module;
use crate::text::{list_items_removal_spans, statement_removal_span};
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass, rewrite_pass};
use crate::wrapper::SourceUnit;

const SVELTE_SDKS: [&str; 2] = ["@sentry/svelte", "@sentry/sveltekit"];
const CONFIG_FILE: &str = "svelte.config.js";
const PREPROCESSOR: &str = "componentTrackingPreprocessor";
const WRAPPER: &str = "withSentryConfig";

struct PreprocessorRemover<'s, 'm, 'a> {
    module: &'s Module<'m, 'a>,
    namespace: Option<&'s str>,
    edits: EditSet,
}

impl PreprocessorRemover<'_, '_, '_> {
    fn is_preprocessor(&self, call: &CallExpression<'_>) -> bool {
        let Some(m) = match_call(call).filter(|m| m.name == PREPROCESSOR) else {
            return false;
        };
        match (self.namespace, &m.receiver) {
            (Some(ns), Some(receiver)) => receiver.identifier() == Some(ns),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<'a> Visit<'a> for PreprocessorRemover<'_, '_, 'a> {
    fn visit_array_expression(&mut self, array: &ArrayExpression<'a>) {
        let spans: Vec<_> = array.elements.iter().map(GetSpan::span).collect();
        let remove: Vec<usize> = array
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, ArrayExpressionElement::CallExpression(call) if self.is_preprocessor(call)))
            .map(|(i, _)| i)
            .collect();
        if remove.is_empty() {
            return walk::walk_array_expression(self, array);
        }
        if remove.len() == spans.len() {
            // `[pre()]` becomes `[]`
            if let (Some(first), Some(last)) = (spans.first(), spans.last()) {
                self.edits.remove(Span::new(first.start, last.end));
            }
        } else {
            for span in list_items_removal_spans(&spans, &remove) {
                self.edits.remove(span);
            }
        }
        for (index, element) in array.elements.iter().enumerate() {
            if !remove.contains(&index) {
                self.visit_array_expression_element(element);
            }
        }
    }

    fn visit_expression_statement(&mut self, stmt: &ExpressionStatement<'a>) {
        if let Expression::CallExpression(call) = &stmt.expression {
            if self.is_preprocessor(call) {
                self.edits
                    .remove(statement_removal_span(self.module.source, stmt.span));
                return;
            }
        }
        walk::walk_expression_statement(self, stmt);
    }
}

/// Removes the preprocessor and wraps the default export; reports whether a
/// bare `withSentryConfig` was introduced
fn rewrite_config(module: &Module<'_, '_>, sdk: &str) -> (EditSet, bool) {
    let namespace = namespace_local(module, sdk);
    let mut remover = PreprocessorRemover {
        module,
        namespace: namespace.as_deref(),
        edits: EditSet::new(),
    };
    walk::walk_program(&mut remover, module.program);
    let mut edits = remover.edits;

    let declaration = module.program.body.iter().find_map(|stmt| match stmt {
        Statement::ExportDefaultDeclaration(decl) => Some(decl.declaration.span()),
        _ => None,
    });
    let Some(declaration) = declaration else {
        return (edits, false);
    };
    if module.text(declaration).contains("withSentryConfig(") {
        return (edits, false);
    }

    // Two insertions so edits inside the exported value stay valid.
    let callee = match &namespace {
        Some(ns) => format!("{ns}.{WRAPPER}"),
        None => WRAPPER.to_string(),
    };
    edits.insert(declaration.start, format!("{callee}("));
    edits.insert(declaration.end, ")");
    (edits, namespace.is_none())
}

/// Replaces `componentTrackingPreprocessor()` with a `withSentryConfig(...)`
/// wrapper around the exported Svelte config
pub struct RewriteSvelteConfig;

impl SourceRule for RewriteSvelteConfig {
    fn id(&self) -> &'static str {
        "rewrite-svelte-config"
    }

    fn name(&self) -> &'static str {
        "Rewrite Svelte Config"
    }

    fn applies_to(&self, path: &Path, options: &TransformerOptions) -> bool {
        path.file_name().is_some_and(|name| name == CONFIG_FILE)
            && options.sdk().is_some_and(|sdk| SVELTE_SDKS.contains(&sdk))
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, options: &TransformerOptions) -> Result<Option<String>> {
        let Some(sdk) = options.sdk().filter(|sdk| SVELTE_SDKS.contains(sdk)) else {
            return Ok(None);
        };
        if !has_package_import(unit.source, sdk) {
            return Ok(None);
        }

        let (output, bare) = rewrite_pass(unit.source, unit.parse_options, |module| {
            Ok(rewrite_config(module, sdk))
        })?;
        let output = edit_pass(&output, unit.parse_options, |module| {
            let add: &[&str] = if bare { &[WRAPPER] } else { &[] };
            modify_imports(module, sdk, add, &[PREPROCESSOR])
        })?;
        Ok(changed(unit.source, output))
    }
}
