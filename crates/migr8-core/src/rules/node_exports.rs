//! Node `Handlers.*` utilities to top-level exports

use oxc_ast::ast::{Expression, StaticMemberExpression, TSTypeName, TSTypeReference};
use oxc_ast_visit::{Visit, walk};

use crate::edit::EditSet;
use crate::error::Result;
use crate::imports::{has_package_import, modify_imports, package_statements};
use crate::parser::Module;
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass, rewrite_pass};
use crate::wrapper::SourceUnit;

const NODE_PACKAGE: &str = "@sentry/node";
const HANDLERS: &str = "Handlers";

struct HandlersRewriter {
    /// Local name of a named `Handlers` import
    handlers: String,
    /// Namespace bindings of the Node SDK
    namespaces: Vec<String>,
    edits: EditSet,
    /// Names now used bare
    added: Vec<&'static str>,
}

impl HandlersRewriter {
    fn add(&mut self, name: &'static str) {
        if !self.added.contains(&name) {
            self.added.push(name);
        }
    }

    fn is_namespace(&self, name: &str) -> bool {
        self.namespaces.iter().any(|ns| ns == name)
    }
}

impl<'a> Visit<'a> for HandlersRewriter {
    fn visit_static_member_expression(&mut self, member: &StaticMemberExpression<'a>) {
        if member.property.name.as_str() == "extractRequestData" {
            match &member.object {
                // `Handlers.extractRequestData`
                Expression::Identifier(object) if object.name.as_str() == self.handlers => {
                    self.edits.replace(member.span, "extractRequestData");
                    self.add("extractRequestData");
                    return;
                }
                // `Sentry.Handlers.extractRequestData`
                Expression::StaticMemberExpression(inner)
                    if inner.property.name.as_str() == HANDLERS =>
                {
                    if let Expression::Identifier(ns) = &inner.object {
                        if self.is_namespace(&ns.name) {
                            self.edits.replace(inner.span, ns.name.as_str());
                            return;
                        }
                    }
                }
                _ => {}
            }
        }
        walk::walk_static_member_expression(self, member);
    }

    fn visit_ts_type_reference(&mut self, reference: &TSTypeReference<'a>) {
        if let TSTypeName::QualifiedName(name) = &reference.type_name {
            if name.right.name.as_str() == "ExpressRequest" {
                match &name.left {
                    TSTypeName::IdentifierReference(left) if left.name.as_str() == self.handlers => {
                        self.edits.replace(name.span, "PolymorphicRequest");
                        self.add("PolymorphicRequest");
                    }
                    TSTypeName::QualifiedName(left) if left.right.name.as_str() == HANDLERS => {
                        if let TSTypeName::IdentifierReference(ns) = &left.left {
                            if self.is_namespace(&ns.name) {
                                self.edits
                                    .replace(name.span, format!("{}.PolymorphicRequest", ns.name));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        walk::walk_ts_type_reference(self, reference);
    }
}

fn handlers_rewriter(module: &Module<'_, '_>) -> HandlersRewriter {
    let statements = package_statements(module, |p| p == NODE_PACKAGE);
    let handlers = statements
        .iter()
        .flat_map(|s| s.named.iter())
        .find(|spec| spec.imported == HANDLERS)
        .map_or_else(|| HANDLERS.to_string(), |spec| spec.local.name.clone());
    let namespaces = statements
        .iter()
        .flat_map(|s| s.namespace.iter().chain(s.default.iter()))
        .map(|b| b.name.clone())
        .collect();
    HandlersRewriter {
        handlers,
        namespaces,
        edits: EditSet::new(),
        added: Vec::new(),
    }
}

/// Moves `extractRequestData` and `ExpressRequest` out of `Handlers`
///
/// Other `Handlers` members (`ParseRequestOptions`, `parseRequest`, ...) have
/// no direct replacement and keep the `Handlers` import alive.
pub struct NodeExports;

impl SourceRule for NodeExports {
    fn id(&self) -> &'static str {
        "node-exports"
    }

    fn name(&self) -> &'static str {
        "Node Handler Utils v7>v8"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, _options: &TransformerOptions) -> Result<Option<String>> {
        if !has_package_import(unit.source, NODE_PACKAGE) {
            return Ok(None);
        }

        let (output, added) = rewrite_pass(unit.source, unit.parse_options, |module| {
            let mut rewriter = handlers_rewriter(module);
            walk::walk_program(&mut rewriter, module.program);
            Ok((rewriter.edits, rewriter.added))
        })?;

        let output = if added.is_empty() {
            output
        } else {
            edit_pass(&output, unit.parse_options, |module| {
                modify_imports(module, NODE_PACKAGE, &added, &[HANDLERS])
            })?
        };
        Ok(changed(unit.source, output))
    }
}
