//! Integration classes to functional integrations

use oxc_ast::ast::{CallExpression, Expression, NewExpression};
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;

use super::target_sdk;
use crate::edit::EditSet;
use crate::error::Result;
use crate::imports::{
    dedupe, has_sentry_import, modify_imports, package_statements, replace_imported,
};
use crate::matchers::match_new;
use crate::parser::Module;
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass, rewrite_pass};
use crate::wrapper::SourceUnit;

/// Package the v7 integration classes came from besides the SDKs
pub const INTEGRATIONS_PACKAGE: &str = "@sentry/integrations";

/// Named export of v7 SDKs holding the integration classes
const INTEGRATIONS_KEY: &str = "Integrations";

/// Integration class and its functional replacement
pub const INTEGRATION_FUNCTIONS: &[(&str, &str)] = &[
    // Browser
    ("BrowserTracing", "browserTracingIntegration"),
    ("Replay", "replayIntegration"),
    ("Feedback", "feedbackIntegration"),
    ("Breadcrumbs", "breadcrumbsIntegration"),
    ("TryCatch", "browserApiErrorsIntegration"),
    ("GlobalHandlers", "globalHandlersIntegration"),
    ("HttpContext", "httpContextIntegration"),
    // Core
    ("InboundFilters", "inboundFiltersIntegration"),
    ("FunctionToString", "functionToStringIntegration"),
    ("LinkedErrors", "linkedErrorsIntegration"),
    ("ModuleMetadata", "moduleMetadataIntegration"),
    ("RequestData", "requestDataIntegration"),
    // @sentry/integrations
    ("CaptureConsole", "captureConsoleIntegration"),
    ("Debug", "debugIntegration"),
    ("Dedupe", "dedupeIntegration"),
    ("ExtraErrorData", "extraErrorDataIntegration"),
    ("ReportingObserver", "reportingObserverIntegration"),
    ("RewriteFrames", "rewriteFramesIntegration"),
    ("SessionTiming", "sessionTimingIntegration"),
    ("ContextLines", "contextLinesIntegration"),
    ("HttpClient", "httpClientIntegration"),
    // Node
    ("Console", "consoleIntegration"),
    ("Http", "httpIntegration"),
    ("OnUncaughtException", "onUncaughtExceptionIntegration"),
    ("OnUnhandledRejection", "onUnhandledRejectionIntegration"),
    ("Modules", "modulesIntegration"),
    ("Context", "nodeContextIntegration"),
    ("LocalVariables", "localVariablesIntegration"),
    ("Undici", "nodeFetchIntegration"),
    ("Spotlight", "spotlightIntegration"),
    ("Anr", "anrIntegration"),
    ("Hapi", "hapiIntegration"),
];

/// Function replacing integration class `class`
pub fn integration_function(class: &str) -> Option<&'static str> {
    INTEGRATION_FUNCTIONS
        .iter()
        .find(|(c, _)| *c == class)
        .map(|(_, f)| *f)
}

/// Local name of `Integrations` taken by name from `sdk`
fn integrations_local(module: &Module<'_, '_>, sdk: &str) -> Option<String> {
    package_statements(module, |p| p == sdk)
        .into_iter()
        .flat_map(|s| s.named)
        .find(|spec| spec.imported == INTEGRATIONS_KEY)
        .map(|spec| spec.local.name)
}

struct IntegrationRewriter<'s> {
    /// Local name of a named `Integrations` import
    integrations: Option<&'s str>,
    edits: EditSet,
    /// Functions now called bare through the `Integrations` import
    used: Vec<&'static str>,
}

impl IntegrationRewriter<'_> {
    fn use_bare(&mut self, function: &'static str) {
        if !self.used.contains(&function) {
            self.used.push(function);
        }
    }
}

impl<'a> Visit<'a> for IntegrationRewriter<'_> {
    fn visit_new_expression(&mut self, new: &NewExpression<'a>) {
        if let Some(m) = match_new(new) {
            if let Some(function) = integration_function(&m.name) {
                let prefix = match m.qualifier.as_slice() {
                    [] => Some(String::new()),
                    [ns] if Some(ns.as_str()) == self.integrations => {
                        self.use_bare(function);
                        Some(String::new())
                    }
                    [ns] => Some(format!("{ns}.")),
                    [ns, sub] if sub == INTEGRATIONS_KEY => Some(format!("{ns}.")),
                    _ => None,
                };
                if let Some(prefix) = prefix {
                    let parens = if m.has_parens { "" } else { "()" };
                    self.edits.replace(
                        Span::new(m.span.start, m.callee_span.end),
                        format!("{prefix}{function}{parens}"),
                    );
                    tracing::debug!(class = %m.name, function, "replaced integration class");
                }
            }
        }
        walk::walk_new_expression(self, new);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        // `Integrations.browserTracingIntegration()`
        if let (Expression::StaticMemberExpression(member), Some(local)) =
            (&call.callee, self.integrations)
        {
            if let Expression::Identifier(object) = &member.object {
                let function = INTEGRATION_FUNCTIONS
                    .iter()
                    .map(|(_, f)| *f)
                    .find(|f| *f == member.property.name.as_str());
                if let (true, Some(function)) = (object.name.as_str() == local, function) {
                    self.edits.replace(member.span, function);
                    self.use_bare(function);
                }
            }
        }
        walk::walk_call_expression(self, call);
    }
}

/// Replaces integration classes with their functional counterparts
pub struct Integrations;

impl SourceRule for Integrations {
    fn id(&self) -> &'static str {
        "integrations"
    }

    fn name(&self) -> &'static str {
        "Use functional integrations instead of integration classes"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, options: &TransformerOptions) -> Result<Option<String>> {
        if !has_sentry_import(unit.source) {
            return Ok(None);
        }

        let (output, (used, sdk)) = rewrite_pass(unit.source, unit.parse_options, |module| {
            let sdk = target_sdk(options, module);
            let local = sdk.as_deref().and_then(|sdk| integrations_local(module, sdk));
            let mut rewriter = IntegrationRewriter {
                integrations: local.as_deref(),
                edits: EditSet::new(),
                used: Vec::new(),
            };
            walk::walk_program(&mut rewriter, module.program);
            Ok((rewriter.edits, (rewriter.used, sdk)))
        })?;

        let Some(sdk) = sdk else {
            return Ok(changed(unit.source, output));
        };

        let output = edit_pass(&output, unit.parse_options, |module| {
            let mut edits = replace_imported(module, &sdk, INTEGRATION_FUNCTIONS);
            if sdk != INTEGRATIONS_PACKAGE {
                edits.extend(replace_imported(
                    module,
                    INTEGRATIONS_PACKAGE,
                    INTEGRATION_FUNCTIONS,
                ));
            }
            edits
        })?;
        let output = if used.is_empty() {
            output
        } else {
            let output = edit_pass(&output, unit.parse_options, |module| {
                modify_imports(module, &sdk, &used, &[INTEGRATIONS_KEY])
            })?;
            edit_pass(&output, unit.parse_options, |module| dedupe(module, &sdk, None))?
        };
        Ok(changed(unit.source, output))
    }
}
