//! Use sites of an import binding
//!
//! Sites are found through the semantic model, so a local variable that
//! shadows an import is never mistaken for it.

use oxc_ast::ast::{
    ExportSpecifier, Expression, IdentifierReference, ModuleExportName, ObjectProperty,
};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::{ScopeId, SymbolId};
use oxc_span::{GetSpan, Span};

use crate::edit::EditSet;
use crate::parser::Module;

/// Where a binding is referenced, split by how the site must be rewritten
#[derive(Debug, Default, Clone)]
pub struct ReferenceSites {
    /// Plain expression or type positions: replace the identifier text
    pub plain: Vec<Span>,
    /// Shorthand object properties `{ name }`: expand to `name: replacement`
    pub shorthand: Vec<Span>,
    /// Local export specifiers `export { name }` / `export { name as other }`,
    /// with the exported name
    pub exported: Vec<(Span, String)>,
    /// Assignments to the binding
    pub writes: usize,
    /// Scope of every site, in visit order
    pub scopes: Vec<ScopeId>,
}

impl ReferenceSites {
    pub fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.shorthand.is_empty() && self.exported.is_empty()
    }

    pub fn count(&self) -> usize {
        self.plain.len() + self.shorthand.len() + self.exported.len()
    }

    /// Whether every site can be pointed at a member expression like `NS.name`
    ///
    /// Export specifiers only accept identifiers, so they block it.
    pub fn accepts_member_expression(&self) -> bool {
        self.exported.is_empty() && self.writes == 0
    }

    /// Whether `name` resolves to `symbol` from every site
    ///
    /// A site inside a scope that declares its own `name` cannot be pointed at
    /// `name.member` without changing what it refers to.
    pub fn all_see(&self, module: &Module<'_, '_>, name: &str, symbol: SymbolId) -> bool {
        self.scopes
            .iter()
            .all(|&scope| module.scoping().find_binding(scope, name) == Some(symbol))
    }

    /// Record edits pointing every site at `replacement`
    ///
    /// `name` is the binding's current name; it is kept as the property key of
    /// shorthand properties. Export specifiers keep their exported name.
    pub fn repoint(&self, edits: &mut EditSet, name: &str, replacement: &str) {
        for span in &self.plain {
            edits.replace(*span, replacement);
        }
        for span in &self.shorthand {
            edits.replace(*span, format!("{name}: {replacement}"));
        }
        for (span, exported) in &self.exported {
            if exported == replacement {
                edits.replace(*span, replacement);
            } else {
                edits.replace(*span, format!("{replacement} as {exported}"));
            }
        }
    }
}

struct SiteCollector<'s, 'm, 'a> {
    module: &'s Module<'m, 'a>,
    symbol: SymbolId,
    sites: ReferenceSites,
}

impl SiteCollector<'_, '_, '_> {
    fn resolves(&mut self, ident: &IdentifierReference<'_>) -> bool {
        let Some(reference_id) = ident.reference_id.get() else {
            return false;
        };
        let reference = self.module.scoping().get_reference(reference_id);
        if reference.symbol_id() != Some(self.symbol) {
            return false;
        }
        if reference.is_write() {
            self.sites.writes += 1;
        }
        let scope = self.module.semantic.nodes().get_node(reference.node_id()).scope_id();
        self.sites.scopes.push(scope);
        true
    }
}

impl<'a> Visit<'a> for SiteCollector<'_, '_, '_> {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        if self.resolves(ident) {
            self.sites.plain.push(ident.span);
        }
    }

    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        if prop.shorthand {
            if let Expression::Identifier(ident) = &prop.value {
                if self.resolves(ident) {
                    self.sites.shorthand.push(ident.span);
                }
                return;
            }
        }
        walk::walk_object_property(self, prop);
    }

    fn visit_export_specifier(&mut self, spec: &ExportSpecifier<'a>) {
        if let ModuleExportName::IdentifierReference(ident) = &spec.local {
            if self.resolves(ident) {
                let exported = self.module.text(spec.exported.span()).to_string();
                self.sites.exported.push((spec.span, exported));
            }
        }
    }
}

/// Symbol an identifier reference resolves to, if any
pub(crate) fn resolved_symbol(
    module: &Module<'_, '_>,
    ident: &IdentifierReference<'_>,
) -> Option<SymbolId> {
    let reference_id = ident.reference_id.get()?;
    module.scoping().get_reference(reference_id).symbol_id()
}

/// Every use site of `symbol` in the module
pub fn reference_sites(module: &Module<'_, '_>, symbol: SymbolId) -> ReferenceSites {
    let mut collector = SiteCollector {
        module,
        symbol,
        sites: ReferenceSites::default(),
    };
    walk::walk_program(&mut collector, module.program);
    collector.sites
}

/// Whether `symbol` is referenced anywhere besides its own declaration
pub fn is_referenced(module: &Module<'_, '_>, symbol: SymbolId) -> bool {
    !module
        .scoping()
        .get_resolved_reference_ids(symbol)
        .is_empty()
}
