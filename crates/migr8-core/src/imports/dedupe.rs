//! Collapsing several import statements for one package into one

use rustc_hash::FxHashSet;

use super::bindings::reference_sites;
use super::{LocalBinding, PackageStatement, StatementHandle, StatementKind, package_statements};
use crate::edit::EditSet;
use crate::parser::Module;
use crate::text::{append_list_items, list_items_removal_spans, statement_removal_span};

/// Fold every import of `package` into a single statement
///
/// With a namespace import present, the other statements' specifiers are
/// rewritten to `NS.name` at each use site and the statements dropped; a
/// second namespace alias is replaced by the first. Otherwise named
/// specifiers are appended to the first named import. Donors that are
/// namespace imports are left alone in that case.
///
/// A donor statement is skipped whole whenever one of its bindings cannot be
/// moved safely: an aliased specifier, a default import, an assignment to the
/// binding, or a local name that collides with the survivor.
///
/// `donors` restricts which statements may be folded; `None` means all.
pub fn dedupe(
    module: &Module<'_, '_>,
    package: &str,
    donors: Option<&[StatementHandle]>,
) -> EditSet {
    let statements: Vec<PackageStatement> = package_statements(module, |p| p == package)
        .into_iter()
        .filter(|s| s.kind == StatementKind::Import && !s.type_only)
        .collect();

    let mut edits = EditSet::new();
    if statements.len() < 2 {
        return edits;
    }

    let may_donate = |s: &PackageStatement| donors.is_none_or(|d| d.contains(&s.handle));

    if let Some(survivor) = statements.iter().find(|s| s.namespace.is_some()) {
        let Some(namespace) = survivor.namespace.as_ref() else {
            return edits;
        };
        for donor in statements
            .iter()
            .filter(|s| s.handle != survivor.handle && may_donate(s))
        {
            if let Some(donor_edits) = absorb_into_namespace(module, namespace, donor) {
                tracing::debug!(
                    package,
                    statement = donor.handle.0,
                    "folded import into namespace {}",
                    namespace.name
                );
                edits.extend(donor_edits);
            }
        }
    } else if let Some(survivor) = statements.iter().find(|s| s.has_named()) {
        let mut appended: Vec<String> = Vec::new();
        let mut bound: FxHashSet<(String, String)> = survivor
            .named
            .iter()
            .map(|s| (s.imported.clone(), s.local.name.clone()))
            .collect();

        for donor in statements
            .iter()
            .filter(|s| s.handle != survivor.handle && may_donate(s))
        {
            // A namespace donor has no safe place in a named import.
            if donor.namespace.is_some()
                || donor.default.is_some()
                || donor.unsupported
                || donor.is_side_effect_only()
            {
                continue;
            }

            let collides = donor.named.iter().any(|spec| {
                bound.iter().any(|(imported, local)| {
                    (imported == &spec.imported) != (local == &spec.local.name)
                })
            });
            if collides {
                tracing::debug!(
                    package,
                    statement = donor.handle.0,
                    "local name collision, leaving import in place"
                );
                continue;
            }

            for spec in &donor.named {
                if bound.insert((spec.imported.clone(), spec.local.name.clone())) {
                    appended.push(module.text(spec.span).to_string());
                }
            }
            edits.remove(statement_removal_span(module.source, donor.span));
        }

        if !appended.is_empty() {
            if let Some(container) = survivor.named_container {
                let (at, text) = append_list_items(
                    module.source,
                    container.start,
                    &survivor.named_spans(),
                    &appended,
                );
                edits.insert(at, text);
            }
        }
    }

    edits
}

fn absorb_into_namespace(
    module: &Module<'_, '_>,
    survivor: &LocalBinding,
    donor: &PackageStatement,
) -> Option<EditSet> {
    if donor.unsupported || donor.default.is_some() || donor.is_side_effect_only() {
        return None;
    }
    let namespace = survivor.name.as_str();
    let namespace_symbol = survivor.symbol?;

    let mut edits = EditSet::new();

    if let Some(other) = &donor.namespace {
        if donor.has_named() {
            return None;
        }
        let sites = reference_sites(module, other.symbol?);
        if sites.writes > 0 || !sites.all_see(module, namespace, namespace_symbol) {
            return None;
        }
        sites.repoint(&mut edits, &other.name, namespace);
    } else {
        for spec in &donor.named {
            if spec.is_aliased() {
                return None;
            }
            let sites = reference_sites(module, spec.local.symbol?);
            if !sites.accepts_member_expression()
                || !sites.all_see(module, namespace, namespace_symbol)
            {
                return None;
            }
            sites.repoint(
                &mut edits,
                &spec.local.name,
                &format!("{namespace}.{}", spec.imported),
            );
        }
    }

    edits.remove(statement_removal_span(module.source, donor.span));
    Some(edits)
}

/// Drop specifiers that bind a local name already bound earlier in the same
/// statement, as left behind by renaming
pub fn dedupe_identifiers(module: &Module<'_, '_>, package: &str) -> EditSet {
    let mut edits = EditSet::new();
    for stmt in package_statements(module, |p| p == package) {
        let mut seen = FxHashSet::default();
        let duplicates: Vec<usize> = stmt
            .named
            .iter()
            .enumerate()
            .filter(|(_, spec)| !seen.insert(spec.local.name.as_str()))
            .map(|(i, _)| i)
            .collect();
        if duplicates.is_empty() {
            continue;
        }
        for span in list_items_removal_spans(&stmt.named_spans(), &duplicates) {
            edits.remove(span);
        }
    }
    edits
}
