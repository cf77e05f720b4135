//! Migration markers
//!
//! A marker is a `// TODO(sentry): ...` line comment left where a rule found
//! a deprecated API it could not rewrite safely. It goes above the nearest
//! node a reader would look at: the `const` declaration a call initializes,
//! the object property a call is the value of, or otherwise the enclosing
//! statement.

use oxc_ast::ast::{ObjectProperty, Statement, VariableDeclaration};
use oxc_ast_visit::{Visit, walk};
use oxc_span::{GetSpan, Span};

use crate::edit::EditSet;
use crate::parser::Module;
use crate::text::{indent_at, line_start};

/// Text every marker starts with
pub const MARKER_PREFIX: &str = "// TODO(sentry):";

/// The comment line for `message`, without indentation or newline
pub fn marker_comment(message: &str) -> String {
    format!("{MARKER_PREFIX} {message}")
}

struct AnchorFinder {
    target: Span,
    anchor: Option<Span>,
}

impl AnchorFinder {
    fn contains(&self, span: Span) -> bool {
        span.start <= self.target.start && self.target.end <= span.end
    }
}

impl<'a> Visit<'a> for AnchorFinder {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        let span = stmt.span();
        if !self.contains(span) {
            return;
        }
        self.anchor = Some(span);
        walk::walk_statement(self, stmt);
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration<'a>) {
        if decl
            .declarations
            .iter()
            .any(|d| d.init.as_ref().is_some_and(|init| init.span() == self.target))
        {
            self.anchor = Some(decl.span);
        }
        walk::walk_variable_declaration(self, decl);
    }

    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        if !self.contains(prop.span) {
            return;
        }
        if prop.value.span() == self.target {
            self.anchor = Some(prop.span);
        }
        walk::walk_object_property(self, prop);
    }
}

/// Span of the node a marker for the expression at `target` belongs to
pub fn marker_anchor(module: &Module<'_, '_>, target: Span) -> Span {
    let mut finder = AnchorFinder {
        target,
        anchor: None,
    };
    walk::walk_program(&mut finder, module.program);
    finder.anchor.unwrap_or(target)
}

/// Whether the comment lines directly above offset `line` already hold
/// `comment`
fn already_marked(source: &str, line: u32, comment: &str) -> bool {
    source[..line as usize]
        .lines()
        .rev()
        .map(str::trim)
        .take_while(|l| l.starts_with("//") || l.starts_with("/*") || l.starts_with('*'))
        .any(|l| l == comment)
}

/// Record a marker for the expression at `target`
///
/// Returns `false` when the marker is already present.
pub fn add_marker(edits: &mut EditSet, module: &Module<'_, '_>, target: Span, message: &str) -> bool {
    let anchor = marker_anchor(module, target);
    let at = line_start(module.source, anchor.start);
    let comment = marker_comment(message);
    if already_marked(module.source, at, &comment) {
        return false;
    }
    let indent = indent_at(module.source, anchor.start);
    edits.insert(at, format!("{indent}{comment}\n"));
    tracing::debug!(at, message, "added migration marker");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::bare_call;
    use crate::parser::{ParseOptions, with_module};
    use oxc_ast::ast::CallExpression;

    struct Calls(Vec<Span>);

    impl<'a> Visit<'a> for Calls {
        fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
            if bare_call(call, &["startTransaction"]).is_some() {
                self.0.push(call.span);
            }
            walk::walk_call_expression(self, call);
        }
    }

    fn mark(source: &str) -> String {
        with_module(source, ParseOptions::default(), |m| {
            let mut calls = Calls(Vec::new());
            walk::walk_program(&mut calls, m.program);
            let mut edits = EditSet::new();
            for span in calls.0 {
                add_marker(&mut edits, m, span, "Use `startSpan()` instead.");
            }
            edits.apply(source).unwrap()
        })
        .unwrap()
    }

    #[test]
    fn declaration_carries_marker_for_initializer() {
        let source = "function f() {\n  const tx = startTransaction({ name: 'a' });\n}\n";
        assert_eq!(
            mark(source),
            "function f() {\n  // TODO(sentry): Use `startSpan()` instead.\n  const tx = startTransaction({ name: 'a' });\n}\n"
        );
    }

    #[test]
    fn property_carries_marker_for_value() {
        let source = "const x = {\n  a: 1,\n  tx: startTransaction(),\n};\n";
        assert_eq!(
            mark(source),
            "const x = {\n  a: 1,\n  // TODO(sentry): Use `startSpan()` instead.\n  tx: startTransaction(),\n};\n"
        );
    }

    #[test]
    fn statement_carries_marker_otherwise() {
        let source = "if (a) {\n    startTransaction().finish();\n}\n";
        assert_eq!(
            mark(source),
            "if (a) {\n    // TODO(sentry): Use `startSpan()` instead.\n    startTransaction().finish();\n}\n"
        );
    }

    #[test]
    fn existing_marker_is_not_repeated() {
        let source = "function f() {\n  const tx = startTransaction({ name: 'a' });\n}\n";
        let once = mark(source);
        assert_eq!(mark(&once), once);
    }
}
