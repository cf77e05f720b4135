//! `configureScope(cb)` to `getCurrentScope()`

use oxc_ast::ast::{
    Argument, BindingPatternKind, CallExpression, Expression, FormalParameters, FunctionBody,
    Statement,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::{GetSpan, Span};

use super::target_sdk;
use crate::edit::EditSet;
use crate::error::Result;
use crate::imports::{
    has_sentry_import, is_referenced, modify_imports, package_statements, replace_imported,
};
use crate::parser::Module;
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass, rewrite_pass};
use crate::wrapper::SourceUnit;

/// A `(scope) => ...` or `function (scope) { ... }` callback
struct ScopeCallback<'b, 'a> {
    param: &'b str,
    body: &'b FunctionBody<'a>,
    /// Arrow function with an expression body
    expression: bool,
}

fn scope_callback<'b, 'a>(arguments: &'b [Argument<'a>]) -> Option<ScopeCallback<'b, 'a>> {
    let (params, body, expression): (&FormalParameters<'a>, &FunctionBody<'a>, bool) =
        match arguments.first()? {
            Argument::ArrowFunctionExpression(arrow) => {
                (&*arrow.params, &*arrow.body, arrow.expression)
            }
            Argument::FunctionExpression(func) => (&*func.params, func.body.as_deref()?, false),
            _ => return None,
        };
    let BindingPatternKind::BindingIdentifier(ident) = &params.items.first()?.pattern.kind else {
        return None;
    };
    Some(ScopeCallback {
        param: ident.name.as_str(),
        body,
        expression,
    })
}

/// The body's only statement when it is a call `scope.method(...)`
fn single_scope_call<'b, 'a>(callback: &ScopeCallback<'b, 'a>) -> Option<&'b CallExpression<'a>> {
    let [Statement::ExpressionStatement(stmt)] = &callback.body.statements[..] else {
        return None;
    };
    let Expression::CallExpression(call) = &stmt.expression else {
        return None;
    };
    match &call.callee {
        Expression::StaticMemberExpression(member) => match &member.object {
            Expression::Identifier(object) if object.name.as_str() == callback.param => Some(call),
            _ => None,
        },
        _ => None,
    }
}

struct ScopeRewriter<'s, 'm, 'a> {
    module: &'s Module<'m, 'a>,
    edits: EditSet,
    /// Bare `getCurrentScope()` calls were introduced
    introduced: bool,
}

impl ScopeRewriter<'_, '_, '_> {
    /// Replacement for `configureScope(callback)` reading the scope through
    /// `accessor`, e.g. `getCurrentScope()` or `hub.getScope()`
    fn replacement(&self, callback: &ScopeCallback<'_, '_>, accessor: &str) -> Option<String> {
        if let Some(call) = single_scope_call(callback) {
            let Expression::StaticMemberExpression(member) = &call.callee else {
                return None;
            };
            let rest = self.module.text(Span::new(member.object.span().end, call.span.end));
            return Some(format!("{accessor}{rest}"));
        }
        if callback.expression {
            return None;
        }

        let body = callback.body.span;
        let declaration = format!("const {} = {accessor};", callback.param);
        let Some(first) = callback.body.statements.first() else {
            return Some(format!("{{ {declaration} }}"));
        };
        let inner = self.module.text(Span::new(body.start + 1, body.end - 1));
        let lead = self.module.text(Span::new(body.start + 1, first.span().start));
        let prefix = match lead.rfind('\n') {
            Some(newline) => format!("\n{}{declaration}", &lead[newline + 1..]),
            None => format!(" {declaration}"),
        };
        Some(format!("{{{prefix}{inner}}}"))
    }
}

impl<'a> Visit<'a> for ScopeRewriter<'_, '_, 'a> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        let accessor = match &call.callee {
            Expression::Identifier(ident) if ident.name.as_str() == "configureScope" => {
                Some((String::from("getCurrentScope()"), true))
            }
            Expression::StaticMemberExpression(member)
                if member.property.name.as_str() == "configureScope" =>
            {
                let object = self.module.text(member.object.span());
                let method = if object.to_lowercase().contains("hub") {
                    "getScope"
                } else {
                    "getCurrentScope"
                };
                Some((format!("{object}.{method}()"), false))
            }
            _ => None,
        };

        if let Some((accessor, bare)) = accessor {
            if let Some(text) = scope_callback(&call.arguments)
                .and_then(|callback| self.replacement(&callback, &accessor))
            {
                self.edits.replace(call.span, text);
                self.introduced |= bare;
                return;
            }
        }
        walk::walk_call_expression(self, call);
    }
}

/// Import fixup: `configureScope` becomes `getCurrentScope` once nothing
/// calls it any more
fn fix_imports(module: &Module<'_, '_>, sdk: &str, introduced: bool) -> EditSet {
    let still_used = package_statements(module, |p| p == sdk)
        .iter()
        .flat_map(|s| s.named.iter())
        .any(|spec| {
            spec.imported == "configureScope"
                && spec.local.symbol.is_some_and(|s| is_referenced(module, s))
        });
    if !still_used {
        let edits = replace_imported(module, sdk, &[("configureScope", "getCurrentScope")]);
        if !edits.is_empty() || !introduced {
            return edits;
        }
    }
    if introduced {
        modify_imports(module, sdk, &["getCurrentScope"], &[])
    } else {
        EditSet::new()
    }
}

/// Rewrites `configureScope` callbacks to read the scope directly
pub struct ConfigureScope;

impl SourceRule for ConfigureScope {
    fn id(&self) -> &'static str {
        "configure-scope"
    }

    fn name(&self) -> &'static str {
        "Use getCurrentScope() instead of configureScope()"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, options: &TransformerOptions) -> Result<Option<String>> {
        if !has_sentry_import(unit.source) || !unit.source.contains("configureScope") {
            return Ok(None);
        }

        let (output, (introduced, sdk)) = rewrite_pass(unit.source, unit.parse_options, |module| {
            let mut rewriter = ScopeRewriter {
                module,
                edits: EditSet::new(),
                introduced: false,
            };
            walk::walk_program(&mut rewriter, module.program);
            Ok((rewriter.edits, (rewriter.introduced, target_sdk(options, module))))
        })?;

        let output = match sdk {
            Some(sdk) => edit_pass(&output, unit.parse_options, |module| {
                fix_imports(module, &sdk, introduced)
            })?,
            None => output,
        };
        Ok(changed(unit.source, output))
    }
}
