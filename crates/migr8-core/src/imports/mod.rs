//! Import/require normalizer
//!
//! Finds how a file binds a package (ES imports, CommonJS requires) and
//! rewrites those bindings: pointing them at another package, folding several
//! statements for one package into one, renaming, adding and removing
//! specifiers, and pruning unused ones.
//!
//! Only top-level statements are considered. Shapes the normalizer does not
//! understand (re-exports, nested destructuring, string-named imports) are
//! reported as unsupported and left alone.

mod bindings;
mod dedupe;
mod modify;
mod prune;
mod rename;
mod retarget;

pub use bindings::{ReferenceSites, is_referenced, reference_sites};
pub(crate) use bindings::resolved_symbol;
pub use dedupe::{dedupe, dedupe_identifiers};
pub use modify::modify_imports;
pub(crate) use modify::top_of_file;
pub use prune::prune_unused;
pub use rename::{replace_function_calls, replace_imported};
pub use retarget::retarget;

use std::sync::OnceLock;

use oxc_ast::ast::{
    BindingPatternKind, Expression, ImportDeclaration, ImportDeclarationSpecifier,
    ModuleExportName, Statement, VariableDeclaration,
};
use oxc_semantic::SymbolId;
use oxc_span::{GetSpan, Span};
use regex::{Regex, RegexBuilder};

use crate::error::{MigrateError, Result};
use crate::matchers::{property_key_name, required_package};
use crate::parser::Module;

/// Default package pattern: any package in the `@sentry` scope
pub const SENTRY_PACKAGE_PATTERN: &str = "@sentry/(.+)";

/// Index of a top-level statement in a parsed program
///
/// Handles stay valid across a re-parse as long as no statement was added or
/// removed in between, which holds for retargeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementHandle(pub usize);

/// How a binding was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationForm {
    /// `import { a } from 'p'` / `import { a as b } from 'p'`
    Named,
    /// `import * as NS from 'p'`
    Namespace,
    /// `import D from 'p'`
    Default,
    /// `const { a, b: c } = require('p')`
    CommonJsDestructure,
    /// `const NS = require('p')`
    CommonJsNamespace,
}

/// One identifier bound from a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub package: String,
    /// Exported name, `None` for namespace and default forms
    pub imported: Option<String>,
    pub local: String,
    pub form: DeclarationForm,
    pub statement: StatementHandle,
}

/// Fast textual check for an import or require of a package
///
/// `pattern` is a regular expression for the package name: an exact name
/// (escape it with [`regex::escape`]) or a scoped wildcard such as
/// [`SENTRY_PACKAGE_PATTERN`]. Matching is case-insensitive and multi-line.
pub fn has_import_or_require(source: &str, pattern: &str) -> Result<bool> {
    let regex = RegexBuilder::new(&format!(
        r#"from\s*['"]{pattern}['"]|require\(\s*['"]{pattern}['"]\s*\)"#
    ))
    .case_insensitive(true)
    .multi_line(true)
    .build()
    .map_err(|source| MigrateError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(regex.is_match(source))
}

/// Whether the source imports or requires the given package exactly
pub fn has_package_import(source: &str, package: &str) -> bool {
    has_import_or_require(source, &regex::escape(package)).unwrap_or(false)
}

/// Whether the source imports or requires any `@sentry/*` package
pub fn has_sentry_import(source: &str) -> bool {
    static SENTRY: OnceLock<Regex> = OnceLock::new();
    let regex = SENTRY.get_or_init(|| {
        RegexBuilder::new(r#"from\s*['"]@sentry/(.+)['"]|require\(\s*['"]@sentry/(.+)['"]\s*\)"#)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .unwrap_or_else(|_| unreachable!("static pattern is valid"))
    });
    regex.is_match(source)
}

/// A local name bound by a package statement
#[derive(Debug, Clone)]
pub(crate) struct LocalBinding {
    pub name: String,
    pub symbol: Option<SymbolId>,
    pub span: Span,
}

/// A named specifier (`a`, `a as b`) or destructured property (`a`, `a: b`)
#[derive(Debug, Clone)]
pub(crate) struct NamedSpecifier {
    pub span: Span,
    pub imported: String,
    pub imported_span: Span,
    pub local: LocalBinding,
}

impl NamedSpecifier {
    pub fn is_aliased(&self) -> bool {
        self.imported != self.local.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatementKind {
    Import,
    Require,
}

/// Everything the normalizer needs to know about one top-level statement
/// binding a package
#[derive(Debug, Clone)]
pub(crate) struct PackageStatement {
    pub handle: StatementHandle,
    pub span: Span,
    pub kind: StatementKind,
    pub package: String,
    /// Span of the package string literal, quotes included
    pub source_span: Span,
    pub namespace: Option<LocalBinding>,
    pub default: Option<LocalBinding>,
    pub named: Vec<NamedSpecifier>,
    /// Span of the `{ ... }` holding named specifiers
    pub named_container: Option<Span>,
    /// `import type ...`
    pub type_only: bool,
    /// Some part of the statement has a shape the normalizer leaves alone
    pub unsupported: bool,
}

impl PackageStatement {
    pub fn is_side_effect_only(&self) -> bool {
        self.namespace.is_none() && self.default.is_none() && self.named.is_empty()
    }

    /// `import * as NS` or `const NS = require()` and nothing else
    pub fn is_namespace_only(&self) -> bool {
        self.namespace.is_some() && self.default.is_none() && self.named.is_empty()
    }

    pub fn has_named(&self) -> bool {
        !self.named.is_empty()
    }

    pub fn named_spans(&self) -> Vec<Span> {
        self.named.iter().map(|s| s.span).collect()
    }

    /// All local names bound by this statement
    pub fn locals(&self) -> impl Iterator<Item = &LocalBinding> {
        self.namespace
            .iter()
            .chain(self.default.iter())
            .chain(self.named.iter().map(|s| &s.local))
    }
}

fn local_binding(ident: &oxc_ast::ast::BindingIdentifier<'_>) -> LocalBinding {
    LocalBinding {
        name: ident.name.to_string(),
        symbol: ident.symbol_id.get(),
        span: ident.span,
    }
}

fn import_statement(
    module: &Module<'_, '_>,
    index: usize,
    decl: &ImportDeclaration<'_>,
) -> PackageStatement {
    let mut stmt = PackageStatement {
        handle: StatementHandle(index),
        span: decl.span,
        kind: StatementKind::Import,
        package: decl.source.value.to_string(),
        source_span: decl.source.span,
        namespace: None,
        default: None,
        named: Vec::new(),
        named_container: None,
        type_only: decl.import_kind.is_type(),
        unsupported: false,
    };

    for specifier in decl.specifiers.iter().flatten() {
        match specifier {
            ImportDeclarationSpecifier::ImportSpecifier(spec) => {
                let imported = match &spec.imported {
                    ModuleExportName::IdentifierName(name) => name.name.to_string(),
                    ModuleExportName::IdentifierReference(name) => name.name.to_string(),
                    ModuleExportName::StringLiteral(_) => {
                        stmt.unsupported = true;
                        continue;
                    }
                };
                stmt.named.push(NamedSpecifier {
                    span: spec.span,
                    imported,
                    imported_span: spec.imported.span(),
                    local: local_binding(&spec.local),
                });
            }
            ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
                stmt.default = Some(local_binding(&spec.local));
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
                stmt.namespace = Some(local_binding(&spec.local));
            }
        }
    }

    if let Some(first) = stmt.named.first() {
        let text = module.text(Span::new(decl.span.start, first.span.start));
        if let Some(brace) = text.rfind('{') {
            let open = decl.span.start + brace as u32;
            let close = module.text(Span::new(first.span.start, decl.source.span.start)).rfind('}');
            if let Some(close) = close {
                stmt.named_container = Some(Span::new(open, first.span.start + close as u32 + 1));
            }
        }
    }
    stmt
}

fn require_statement(index: usize, decl: &VariableDeclaration<'_>) -> Option<PackageStatement> {
    let [declarator] = &decl.declarations[..] else {
        return None;
    };
    let Some(Expression::CallExpression(call)) = &declarator.init else {
        return None;
    };
    let (package, source_span) = required_package(call)?;

    let mut stmt = PackageStatement {
        handle: StatementHandle(index),
        span: decl.span,
        kind: StatementKind::Require,
        package: package.to_string(),
        source_span,
        namespace: None,
        default: None,
        named: Vec::new(),
        named_container: None,
        type_only: false,
        unsupported: false,
    };

    match &declarator.id.kind {
        BindingPatternKind::BindingIdentifier(ident) => {
            stmt.namespace = Some(local_binding(ident));
        }
        BindingPatternKind::ObjectPattern(pattern) => {
            stmt.named_container = Some(pattern.span);
            if pattern.rest.is_some() {
                stmt.unsupported = true;
            }
            for prop in &pattern.properties {
                let key = if prop.computed {
                    None
                } else {
                    property_key_name(&prop.key)
                };
                match (key, &prop.value.kind) {
                    (Some(key), BindingPatternKind::BindingIdentifier(local)) => {
                        stmt.named.push(NamedSpecifier {
                            span: prop.span,
                            imported: key.to_string(),
                            imported_span: prop.key.span(),
                            local: local_binding(local),
                        });
                    }
                    _ => stmt.unsupported = true,
                }
            }
        }
        _ => return None,
    }
    Some(stmt)
}

/// Top-level statements importing or requiring a package accepted by `filter`
pub(crate) fn package_statements(
    module: &Module<'_, '_>,
    filter: impl Fn(&str) -> bool,
) -> Vec<PackageStatement> {
    module
        .program
        .body
        .iter()
        .enumerate()
        .filter_map(|(index, stmt)| match stmt {
            Statement::ImportDeclaration(decl) => Some(import_statement(module, index, decl)),
            Statement::VariableDeclaration(decl) => require_statement(index, decl),
            _ => None,
        })
        .filter(|stmt| filter(&stmt.package))
        .collect()
}

/// Every binding the module takes from packages accepted by `filter`
pub fn collect_bindings(
    module: &Module<'_, '_>,
    filter: impl Fn(&str) -> bool,
) -> Vec<ImportBinding> {
    let mut out = Vec::new();
    for stmt in package_statements(module, filter) {
        let (namespace_form, named_form) = match stmt.kind {
            StatementKind::Import => (DeclarationForm::Namespace, DeclarationForm::Named),
            StatementKind::Require => (
                DeclarationForm::CommonJsNamespace,
                DeclarationForm::CommonJsDestructure,
            ),
        };
        if let Some(ns) = &stmt.namespace {
            out.push(ImportBinding {
                package: stmt.package.clone(),
                imported: None,
                local: ns.name.clone(),
                form: namespace_form,
                statement: stmt.handle,
            });
        }
        if let Some(default) = &stmt.default {
            out.push(ImportBinding {
                package: stmt.package.clone(),
                imported: None,
                local: default.name.clone(),
                form: DeclarationForm::Default,
                statement: stmt.handle,
            });
        }
        for spec in &stmt.named {
            out.push(ImportBinding {
                package: stmt.package.clone(),
                imported: Some(spec.imported.clone()),
                local: spec.local.name.clone(),
                form: named_form,
                statement: stmt.handle,
            });
        }
    }
    out
}

/// Whether the module binds anything from `package`
pub fn imports_package(module: &Module<'_, '_>, package: &str) -> bool {
    !package_statements(module, |p| p == package).is_empty()
}

/// Local name of the first namespace-style binding of `package`
pub fn namespace_local(module: &Module<'_, '_>, package: &str) -> Option<String> {
    package_statements(module, |p| p == package)
        .into_iter()
        .find_map(|s| s.namespace.map(|ns| ns.name))
}
