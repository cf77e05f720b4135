//! `Severity` and `SpanStatus` enum members to string literals

use oxc_ast::ast::{Expression, StaticMemberExpression};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::SymbolId;
use rustc_hash::FxHashSet;

use crate::edit::EditSet;
use crate::error::Result;
use crate::imports::{
    collect_bindings, has_sentry_import, modify_imports, package_statements, resolved_symbol,
};
use crate::parser::Module;
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass, rewrite_pass};
use crate::wrapper::SourceUnit;

const SPAN_STATUS: &[(&str, &str)] = &[
    ("Ok", "ok"),
    ("DeadlineExceeded", "deadline_exceeded"),
    ("Unauthenticated", "unauthenticated"),
    ("PermissionDenied", "permission_denied"),
    ("NotFound", "not_found"),
    ("ResourceExhausted", "resource_exhausted"),
    ("InvalidArgument", "invalid_argument"),
    ("Unimplemented", "unimplemented"),
    ("Unavailable", "unavailable"),
    ("InternalError", "internal_error"),
    ("UnknownError", "unknown_error"),
    ("Cancelled", "cancelled"),
    ("AlreadyExists", "already_exists"),
    ("FailedPrecondition", "failed_precondition"),
    ("Aborted", "aborted"),
    ("OutOfRange", "out_of_range"),
    ("DataLoss", "data_loss"),
];

const SEVERITY: &[(&str, &str)] = &[
    ("Fatal", "fatal"),
    ("Error", "error"),
    ("Warning", "warning"),
    ("Log", "log"),
    ("Info", "info"),
    ("Debug", "debug"),
];

const ENUMS: &[(&str, &[(&str, &str)])] = &[("Severity", SEVERITY), ("SpanStatus", SPAN_STATUS)];

/// Namespace and default imports of `@sentry/*` packages
fn sentry_namespaces(module: &Module<'_, '_>) -> FxHashSet<SymbolId> {
    package_statements(module, |p| p.starts_with("@sentry/"))
        .iter()
        .flat_map(|stmt| stmt.namespace.iter().chain(stmt.default.iter()))
        .filter_map(|b| b.symbol)
        .collect()
}

struct EnumRewriter<'s, 'm, 'a> {
    module: &'s Module<'m, 'a>,
    /// Qualifiers accepted in `NS.Enum.Member`
    namespaces: FxHashSet<SymbolId>,
    edits: EditSet,
    /// Enums with at least one member replaced
    converted: Vec<&'static str>,
}

impl EnumRewriter<'_, '_, '_> {
    /// Enum name and member of `Enum.Member`, or of `NS.Enum.Member` when `NS`
    /// is a Sentry namespace
    fn enum_member<'b>(&self, member: &'b StaticMemberExpression<'_>) -> Option<(&'b str, &'b str)> {
        let name = match &member.object {
            Expression::Identifier(ident) => ident.name.as_str(),
            Expression::StaticMemberExpression(inner) => match &inner.object {
                Expression::Identifier(qualifier)
                    if resolved_symbol(self.module, qualifier)
                        .is_some_and(|s| self.namespaces.contains(&s)) =>
                {
                    inner.property.name.as_str()
                }
                _ => return None,
            },
            _ => return None,
        };
        Some((name, member.property.name.as_str()))
    }
}

impl<'a> Visit<'a> for EnumRewriter<'_, '_, 'a> {
    fn visit_static_member_expression(&mut self, member: &StaticMemberExpression<'a>) {
        if let Some((name, value)) = self.enum_member(member) {
            let mapped = ENUMS.iter().find(|(e, _)| *e == name).and_then(|(e, values)| {
                values
                    .iter()
                    .find(|(v, _)| *v == value)
                    .map(|(_, literal)| (*e, *literal))
            });
            if let Some((enum_name, literal)) = mapped {
                self.edits
                    .replace(member.span, self.module.string_literal(literal));
                if !self.converted.contains(&enum_name) {
                    self.converted.push(enum_name);
                }
                return;
            }
        }
        walk::walk_static_member_expression(self, member);
    }
}

/// Drop enum imports from `@sentry/*` packages once nothing refers to them
fn remove_enum_imports(module: &Module<'_, '_>, enums: &[&str]) -> EditSet {
    let mut packages: Vec<String> = collect_bindings(module, |p| p.starts_with("@sentry/"))
        .into_iter()
        .filter(|b| b.imported.as_deref().is_some_and(|i| enums.contains(&i)))
        .map(|b| b.package)
        .collect();
    packages.sort();
    packages.dedup();

    let mut edits = EditSet::new();
    for package in packages {
        edits.extend(modify_imports(module, &package, &[], enums));
    }
    edits
}

/// Replaces `Severity.*` and `SpanStatus.*` with their string values
pub struct ConvertEnums;

impl SourceRule for ConvertEnums {
    fn id(&self) -> &'static str {
        "convert-enums"
    }

    fn name(&self) -> &'static str {
        "Convert Enums to String Literals"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, _options: &TransformerOptions) -> Result<Option<String>> {
        if !has_sentry_import(unit.source) {
            return Ok(None);
        }

        let (output, converted) = rewrite_pass(unit.source, unit.parse_options, |module| {
            let mut rewriter = EnumRewriter {
                module,
                namespaces: sentry_namespaces(module),
                edits: EditSet::new(),
                converted: Vec::new(),
            };
            walk::walk_program(&mut rewriter, module.program);
            Ok((rewriter.edits, rewriter.converted))
        })?;

        let output = if converted.is_empty() {
            output
        } else {
            edit_pass(&output, unit.parse_options, |module| {
                remove_enum_imports(module, &converted)
            })?
        };
        Ok(changed(unit.source, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{assert_rewrite, assert_unchanged};

    #[test]
    fn converts_members_and_drops_import() {
        assert_rewrite(
            &ConvertEnums,
            &TransformerOptions::default(),
            r#"import { Severity, SpanStatus, captureMessage } from '@sentry/browser';

captureMessage('boom', Severity.Warning);
span.setStatus(SpanStatus.DeadlineExceeded);
"#,
            r#"import { captureMessage } from '@sentry/browser';

captureMessage('boom', 'warning');
span.setStatus('deadline_exceeded');
"#,
        );
    }

    #[test]
    fn keeps_import_with_unknown_members_or_type_uses() {
        assert_rewrite(
            &ConvertEnums,
            &TransformerOptions::default(),
            r#"const { Severity } = require("@sentry/node");
import type { SpanStatus as Status } from "@sentry/types";
import { SpanStatus } from "@sentry/node";
log(Severity.Critical, Severity.Error);
function f(s: SpanStatus | Status) {
  return s === SpanStatus.Ok;
}
"#,
            r#"const { Severity } = require("@sentry/node");
import type { SpanStatus as Status } from "@sentry/types";
import { SpanStatus } from "@sentry/node";
log(Severity.Critical, "error");
function f(s: SpanStatus | Status) {
  return s === "ok";
}
"#,
        );
    }

    #[test]
    fn converts_namespaced_members() {
        assert_rewrite(
            &ConvertEnums,
            &TransformerOptions::default(),
            "import * as Sentry from '@sentry/react';\nSentry.captureMessage('x', Sentry.Severity.Fatal);\n",
            "import * as Sentry from '@sentry/react';\nSentry.captureMessage('x', 'fatal');\n",
        );
    }

    #[test]
    fn other_namespaces_keep_their_enums() {
        assert_unchanged(
            &ConvertEnums,
            &TransformerOptions::default(),
            "import * as Sentry from '@sentry/react';\nimport * as Log from './log';\nLog.Severity.Error;\nfunction f(Sentry) {\n  return Sentry.Severity.Error;\n}\n",
        );
    }

    #[test]
    fn ignores_files_without_sentry() {
        assert_unchanged(
            &ConvertEnums,
            &TransformerOptions::default(),
            "import { Severity } from './log';\nlog(Severity.Error);\n",
        );
    }
}
