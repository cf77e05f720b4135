//! Hub method calls to top-level API calls

use oxc_ast::ast::CallExpression;
use oxc_ast_visit::{Visit, walk};

use super::target_sdk;
use crate::edit::EditSet;
use crate::error::Result;
use crate::imports::{dedupe, has_sentry_import, modify_imports};
use crate::marker::add_marker;
use crate::matchers::{Receiver, looks_like_hub, match_call};
use crate::parser::Module;
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass, rewrite_pass};
use crate::wrapper::SourceUnit;

/// Hub methods with a top-level equivalent, and that equivalent
const HUB_METHODS: &[(&str, &str)] = &[
    ("withScope", "withScope"),
    ("getClient", "getClient"),
    ("getScope", "getCurrentScope"),
    ("getIsolationScope", "getIsolationScope"),
    ("captureException", "captureException"),
    ("captureMessage", "captureMessage"),
    ("captureEvent", "captureEvent"),
    ("addBreadcrumb", "addBreadcrumb"),
    ("setUser", "setUser"),
    ("setTags", "setTags"),
    ("setExtra", "setExtra"),
    ("setContext", "setContext"),
    ("getIntegration", "getIntegration"),
    ("captureSession", "captureSession"),
    ("startSession", "startSession"),
    ("endSession", "endSession"),
];

const NOT_MIGRATED: &str = "Could not automatically migrate - see https://github.com/getsentry/sentry-javascript/blob/develop/MIGRATION.md#deprecate-hub";

fn top_level_equivalent(method: &str) -> Option<&'static str> {
    HUB_METHODS
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, to)| *to)
}

struct HubRewriter<'s, 'm, 'a> {
    module: &'s Module<'m, 'a>,
    edits: EditSet,
    /// Top-level functions now called bare, in first-use order
    used: Vec<&'static str>,
    /// Marked or rewritten at least one call
    touched: bool,
}

impl<'a> Visit<'a> for HubRewriter<'_, '_, 'a> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(m) = match_call(call) {
            // `hub.x()` / `getCurrentHub().x()` become `x()`, and
            // `NS.getCurrentHub().x()` becomes `NS.x()`.
            let prefix = match &m.receiver {
                Some(receiver) if looks_like_hub(receiver) => Some(None),
                Some(Receiver::NamespacedAccessor {
                    namespace,
                    accessor,
                    ..
                }) if accessor == "getCurrentHub" => Some(Some(namespace.clone())),
                _ => None,
            };

            if let Some(namespace) = prefix {
                self.touched = true;
                match top_level_equivalent(&m.name) {
                    Some(to) => {
                        match namespace {
                            Some(ns) => self.edits.replace(m.callee_span, format!("{ns}.{to}")),
                            None => {
                                self.edits.replace(m.callee_span, to);
                                if !self.used.contains(&to) {
                                    self.used.push(to);
                                }
                            }
                        }
                        tracing::debug!(method = %m.name, to, "rewrote hub call");
                    }
                    None => {
                        add_marker(&mut self.edits, self.module, m.span, NOT_MIGRATED);
                    }
                }
            }
        }
        walk::walk_call_expression(self, call);
    }
}

/// Rewrites calls on the current hub to top-level API calls
///
/// Methods without a top-level equivalent (`bindClient`, `pushScope`,
/// `popScope`, `run`, ...) get a marker instead.
pub struct Hub;

impl SourceRule for Hub {
    fn id(&self) -> &'static str {
        "hub"
    }

    fn name(&self) -> &'static str {
        "Migrate Hub usage"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, options: &TransformerOptions) -> Result<Option<String>> {
        if !has_sentry_import(unit.source) {
            return Ok(None);
        }

        let (output, (touched, used, sdk)) =
            rewrite_pass(unit.source, unit.parse_options, |module| {
                let mut rewriter = HubRewriter {
                    module,
                    edits: EditSet::new(),
                    used: Vec::new(),
                    touched: false,
                };
                walk::walk_program(&mut rewriter, module.program);
                let sdk = target_sdk(options, module);
                Ok((rewriter.edits, (rewriter.touched, rewriter.used, sdk)))
            })?;

        let Some(sdk) = sdk.filter(|_| touched) else {
            return Ok(changed(unit.source, output));
        };

        let output = edit_pass(&output, unit.parse_options, |module| {
            modify_imports(module, &sdk, &used, &["getCurrentHub"])
        })?;
        let output = edit_pass(&output, unit.parse_options, |module| {
            dedupe(module, &sdk, None)
        })?;
        Ok(changed(unit.source, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{assert_rewrite, assert_unchanged, sdk};

    #[test]
    fn rewrites_hub_calls_and_swaps_import() {
        assert_rewrite(
            &Hub,
            &sdk("@sentry/browser"),
            r#"import { getCurrentHub } from '@sentry/browser';

function doSomething() {
  getCurrentHub().captureException(error);
  const scope = getCurrentHub().getScope();
  getCurrentHub().withScope(scope => {
    getCurrentHub().setUser({ name: 'Anne' });
  });
}
"#,
            r#"import { captureException, getCurrentScope, withScope, setUser } from '@sentry/browser';

function doSomething() {
  captureException(error);
  const scope = getCurrentScope();
  withScope(scope => {
    setUser({ name: 'Anne' });
  });
}
"#,
        );
    }

    #[test]
    fn marks_methods_without_equivalent() {
        assert_rewrite(
            &Hub,
            &sdk("@sentry/browser"),
            r#"const { getCurrentHub } = require('@sentry/browser');

function doSomething() {
  getCurrentHub().bindClient(client);
  const scope2 = getCurrentHub().pushScope();
  const hub = getCurrentHub();
  const otherHubHere = getCurrentHub();
  hub.setExtra({});
  otherHubHere.captureEvent({});
}
"#,
            &format!(
                r#"const {{ getCurrentHub, setExtra, captureEvent }} = require('@sentry/browser');

function doSomething() {{
  // TODO(sentry): {NOT_MIGRATED}
  getCurrentHub().bindClient(client);
  // TODO(sentry): {NOT_MIGRATED}
  const scope2 = getCurrentHub().pushScope();
  const hub = getCurrentHub();
  const otherHubHere = getCurrentHub();
  setExtra({{}});
  captureEvent({{}});
}}
"#
            ),
        );
    }

    #[test]
    fn namespaced_hub_calls_stay_namespaced() {
        assert_rewrite(
            &Hub,
            &sdk("@sentry/browser"),
            "import * as Sentry from '@sentry/browser';\nSentry.getCurrentHub().captureMessage('hi');\nSentry.getCurrentHub().getScope().setTag('a', 'b');\n",
            "import * as Sentry from '@sentry/browser';\nSentry.captureMessage('hi');\nSentry.getCurrentScope().setTag('a', 'b');\n",
        );
    }

    #[test]
    fn leaves_other_receivers_alone() {
        assert_unchanged(
            &Hub,
            &sdk("@sentry/browser"),
            "import * as Sentry from '@sentry/browser';\nclient.captureException(e);\nSentry.captureException(e);\n",
        );
    }
}
