//! Renamed `@sentry/utils` exports

use oxc_ast::ast::{CallExpression, Expression, IdentifierReference};
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;

use crate::edit::EditSet;
use crate::error::Result;
use crate::imports::{dedupe, has_package_import, replace_function_calls, replace_imported};
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass, rewrite_pass};
use crate::wrapper::SourceUnit;

const UTILS_PACKAGE: &str = "@sentry/utils";

const RENAMED_FUNCTIONS: &[(&str, &str)] = &[("severityFromString", "severityLevelFromString")];

#[derive(Default)]
struct UtilRewriter {
    edits: EditSet,
    global_object: bool,
    timestamp: bool,
}

impl<'a> Visit<'a> for UtilRewriter {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        // `getGlobalObject()` is now a constant
        match &call.callee {
            Expression::Identifier(ident) if ident.name.as_str() == "getGlobalObject" => {
                self.edits.replace(call.span, "GLOBAL_OBJ");
                self.global_object = true;
                return;
            }
            Expression::StaticMemberExpression(member)
                if member.property.name.as_str() == "getGlobalObject" =>
            {
                self.edits.replace(
                    Span::new(member.property.span.start, call.span.end),
                    "GLOBAL_OBJ",
                );
                self.global_object = true;
                walk::walk_expression(self, &member.object);
                return;
            }
            _ => {}
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        if ident.name.as_str() == "timestampWithMs" {
            self.edits.replace(ident.span, "timestampInSeconds");
            self.timestamp = true;
        }
    }
}

/// Renames `severityFromString`, `getGlobalObject` and `timestampWithMs`
pub struct UtilExports;

impl SourceRule for UtilExports {
    fn id(&self) -> &'static str {
        "util-exports"
    }

    fn name(&self) -> &'static str {
        "Util Exports v7>v8"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, _options: &TransformerOptions) -> Result<Option<String>> {
        if !has_package_import(unit.source, UTILS_PACKAGE) {
            return Ok(None);
        }

        let output = edit_pass(unit.source, unit.parse_options, |module| {
            replace_function_calls(module, UTILS_PACKAGE, RENAMED_FUNCTIONS)
        })?;

        let (output, renames) = rewrite_pass(&output, unit.parse_options, |module| {
            let mut rewriter = UtilRewriter::default();
            walk::walk_program(&mut rewriter, module.program);
            let mut renames = RENAMED_FUNCTIONS.to_vec();
            if rewriter.global_object {
                renames.push(("getGlobalObject", "GLOBAL_OBJ"));
            }
            if rewriter.timestamp {
                renames.push(("timestampWithMs", "timestampInSeconds"));
            }
            Ok((rewriter.edits, renames))
        })?;

        let output = edit_pass(&output, unit.parse_options, |module| {
            replace_imported(module, UTILS_PACKAGE, &renames)
        })?;
        let output = edit_pass(&output, unit.parse_options, |module| {
            dedupe(module, UTILS_PACKAGE, None)
        })?;
        Ok(changed(unit.source, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{assert_rewrite, assert_unchanged};

    #[test]
    fn renames_util_exports() {
        assert_rewrite(
            &UtilExports,
            &TransformerOptions::default(),
            r#"import { severityFromString, getGlobalObject, timestampWithMs } from '@sentry/utils';

const level = severityFromString('warn');
const global = getGlobalObject();
const now = timestampWithMs();
"#,
            r#"import { severityLevelFromString, GLOBAL_OBJ, timestampInSeconds } from '@sentry/utils';

const level = severityLevelFromString('warn');
const global = GLOBAL_OBJ;
const now = timestampInSeconds();
"#,
        );
    }

    #[test]
    fn keeps_namespace_on_member_access() {
        assert_rewrite(
            &UtilExports,
            &TransformerOptions::default(),
            "import * as SentryUtils from '@sentry/utils';\nconst g = SentryUtils.getGlobalObject<Window>();\nSentryUtils.severityFromString('x');\n",
            "import * as SentryUtils from '@sentry/utils';\nconst g = SentryUtils.GLOBAL_OBJ;\nSentryUtils.severityLevelFromString('x');\n",
        );
    }

    #[test]
    fn ignores_files_without_utils() {
        assert_unchanged(
            &UtilExports,
            &TransformerOptions::default(),
            "import { init } from '@sentry/browser';\nconst g = getGlobalObject();\n",
        );
    }
}
