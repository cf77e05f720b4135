//! Renaming imported names and the calls that use them

use oxc_ast::ast::{CallExpression, Expression};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::SymbolId;
use rustc_hash::FxHashSet;

use super::bindings::{reference_sites, resolved_symbol};
use super::{imports_package, package_statements};
use crate::edit::EditSet;
use crate::parser::Module;
use crate::text::list_items_removal_spans;

fn lookup<'r>(renames: &[(&str, &'r str)], name: &str) -> Option<&'r str> {
    renames
        .iter()
        .find(|(old, _)| *old == name)
        .map(|(_, new)| *new)
}

/// Rename imported names of `package` according to `renames`
///
/// An unaliased specifier is renamed together with every use of its binding.
/// An aliased one (`old as local`, `{ old: local }`) only has its imported
/// name changed, so the alias and its uses stay as they are. When the new name
/// is already bound by the same statement, the renamed specifier is dropped
/// instead of producing a duplicate.
pub fn replace_imported(
    module: &Module<'_, '_>,
    package: &str,
    renames: &[(&str, &str)],
) -> EditSet {
    let mut edits = EditSet::new();
    for stmt in package_statements(module, |p| p == package) {
        let mut bound: FxHashSet<String> =
            stmt.named.iter().map(|s| s.local.name.clone()).collect();
        let mut removed = Vec::new();

        for (index, spec) in stmt.named.iter().enumerate() {
            let Some(new) = lookup(renames, &spec.imported) else {
                continue;
            };
            if spec.is_aliased() {
                edits.replace(spec.imported_span, new);
                continue;
            }
            if let Some(symbol) = spec.local.symbol {
                reference_sites(module, symbol).repoint(&mut edits, &spec.local.name, new);
            }
            if bound.contains(new) {
                removed.push(index);
            } else {
                edits.replace(spec.span, new);
                bound.insert(new.to_string());
            }
            tracing::debug!(package, from = %spec.imported, to = new, "renamed import");
        }

        for span in list_items_removal_spans(&stmt.named_spans(), &removed) {
            edits.remove(span);
        }
    }
    edits
}

struct CallRenamer<'s, 'm, 'a, 'r> {
    module: &'s Module<'m, 'a>,
    renames: &'s [(&'r str, &'r str)],
    named: FxHashSet<SymbolId>,
    namespaces: FxHashSet<SymbolId>,
    edits: EditSet,
}

impl<'a> Visit<'a> for CallRenamer<'_, '_, '_, '_> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        match &call.callee {
            Expression::Identifier(ident) => {
                if let Some(new) = lookup(self.renames, &ident.name) {
                    if resolved_symbol(self.module, ident).is_some_and(|s| self.named.contains(&s))
                    {
                        self.edits.replace(ident.span, new);
                    }
                }
            }
            Expression::StaticMemberExpression(member) => {
                if let (Expression::Identifier(object), Some(new)) =
                    (&member.object, lookup(self.renames, &member.property.name))
                {
                    if resolved_symbol(self.module, object)
                        .is_some_and(|s| self.namespaces.contains(&s))
                    {
                        self.edits.replace(member.property.span, new);
                    }
                }
            }
            _ => {}
        }
        walk::walk_call_expression(self, call);
    }
}

/// Rename calls of functions imported from `package`
///
/// Bare calls are renamed when the callee is an unaliased import of the
/// package; member calls when the receiver is the package's namespace (or
/// default) binding. Nothing happens when the package is not imported.
pub fn replace_function_calls(
    module: &Module<'_, '_>,
    package: &str,
    renames: &[(&str, &str)],
) -> EditSet {
    if !imports_package(module, package) {
        return EditSet::new();
    }

    let mut named = FxHashSet::default();
    let mut namespaces = FxHashSet::default();
    for stmt in package_statements(module, |p| p == package) {
        namespaces.extend(
            stmt.namespace
                .iter()
                .chain(stmt.default.iter())
                .filter_map(|b| b.symbol),
        );
        named.extend(
            stmt.named
                .iter()
                .filter(|s| !s.is_aliased())
                .filter_map(|s| s.local.symbol),
        );
    }

    let mut renamer = CallRenamer {
        module,
        renames,
        named,
        namespaces,
        edits: EditSet::new(),
    };
    walk::walk_program(&mut renamer, module.program);
    renamer.edits
}
