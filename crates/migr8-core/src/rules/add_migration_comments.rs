//! Markers for v7 APIs without an automatic replacement

use oxc_ast::ast::{CallExpression, NewExpression};
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;

use crate::edit::EditSet;
use crate::error::Result;
use crate::marker::add_marker;
use crate::matchers::{match_call, match_new};
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass};
use crate::wrapper::SourceUnit;

const START_INACTIVE_SPAN: &str = "Use `startInactiveSpan()` instead - see https://github.com/getsentry/sentry-javascript/blob/develop/docs/v8-new-performance-apis.md";

const METHOD_MESSAGES: &[(&str, &str)] = &[
    ("startTransaction", START_INACTIVE_SPAN),
    ("startChild", START_INACTIVE_SPAN),
    (
        "makeMain",
        "Use `setCurrentClient()` instead - see https://github.com/getsentry/sentry-javascript/blob/develop/docs/v8-initializing.md",
    ),
    (
        "getActiveTransaction",
        "Use `getActiveSpan()` instead. If you use this only to start a child, use `startInactiveSpan({ onlyIfParent: true })` instead - see https://github.com/getsentry/sentry-javascript/blob/develop/docs/v8-new-performance-apis.md",
    ),
];

const NEW_HUB_MESSAGE: &str = "Use `new Scope()` instead - see https://github.com/getsentry/sentry-javascript/blob/develop/docs/v8-initializing.md";

#[derive(Default)]
struct Targets(Vec<(Span, &'static str)>);

impl<'a> Visit<'a> for Targets {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(m) = match_call(call) {
            if let Some((_, message)) = METHOD_MESSAGES.iter().find(|(name, _)| *name == m.name) {
                self.0.push((m.span, *message));
            }
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_new_expression(&mut self, new: &NewExpression<'a>) {
        if match_new(new).is_some_and(|m| m.name == "Hub" && m.qualifier.len() <= 1) {
            self.0.push((new.span, NEW_HUB_MESSAGE));
        }
        walk::walk_new_expression(self, new);
    }
}

/// Leaves a marker on `startTransaction`, `startChild`, `makeMain`,
/// `getActiveTransaction` and `new Hub()`
pub struct AddMigrationComments;

impl SourceRule for AddMigrationComments {
    fn id(&self) -> &'static str {
        "add-migration-comments"
    }

    fn name(&self) -> &'static str {
        "Add migration comments"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, _options: &TransformerOptions) -> Result<Option<String>> {
        let output = edit_pass(unit.source, unit.parse_options, |module| {
            let mut targets = Targets::default();
            walk::walk_program(&mut targets, module.program);

            let mut edits = EditSet::new();
            for (span, message) in targets.0 {
                add_marker(&mut edits, module, span, message);
            }
            edits
        })?;
        Ok(changed(unit.source, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{assert_rewrite, assert_unchanged};

    #[test]
    fn marks_deprecated_calls() {
        let options = TransformerOptions::default();
        assert_rewrite(
            &AddMigrationComments,
            &options,
            r#"function doSomething() {
  const transaction = Sentry.startTransaction({ name: 'test' });
  const span = transaction.startChild({ op: 'x' });
  span.finish();
}
"#,
            &format!(
                r#"function doSomething() {{
  // TODO(sentry): {START_INACTIVE_SPAN}
  const transaction = Sentry.startTransaction({{ name: 'test' }});
  // TODO(sentry): {START_INACTIVE_SPAN}
  const span = transaction.startChild({{ op: 'x' }});
  span.finish();
}}
"#
            ),
        );
    }

    #[test]
    fn marks_new_hub_and_property_values() {
        let options = TransformerOptions::default();
        assert_rewrite(
            &AddMigrationComments,
            &options,
            "const x = {\n  hub: new Sentry.Hub(client),\n};\nmakeMain(hub);\n",
            &format!(
                "const x = {{\n  // TODO(sentry): {NEW_HUB_MESSAGE}\n  hub: new Sentry.Hub(client),\n}};\n// TODO(sentry): {}\nmakeMain(hub);\n",
                METHOD_MESSAGES[2].1
            ),
        );
    }

    #[test]
    fn leaves_other_code_alone() {
        assert_unchanged(
            &AddMigrationComments,
            &TransformerOptions::default(),
            "Sentry.startSpan({ name: 'a' }, () => {});\nnew Scope();\n",
        );
    }
}
