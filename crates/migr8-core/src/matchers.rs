//! Shape matchers over call, `new` and member expressions
//!
//! Matchers are pure: they look at one node and return the pieces a rule
//! needs (names and spans) or `None`. They never fail on unexpected shapes.

use oxc_ast::ast::{
    Argument, CallExpression, Expression, NewExpression, ObjectExpression, ObjectPropertyKind,
    PropertyKey, StaticMemberExpression,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::{GetSpan, Span};

use crate::imports::has_sentry_import;
use crate::parser::Module;

/// What sits in front of `.name` in a member call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// `obj.name()`
    Identifier { name: String, span: Span },
    /// `accessor().name()`, e.g. `getCurrentHub().name()`
    Accessor { accessor: String, span: Span },
    /// `NS.accessor().name()`, e.g. `Sentry.getCurrentHub().name()`
    NamespacedAccessor {
        namespace: String,
        accessor: String,
        span: Span,
    },
    /// Any other expression
    Other { span: Span },
}

impl Receiver {
    pub fn span(&self) -> Span {
        match self {
            Self::Identifier { span, .. }
            | Self::Accessor { span, .. }
            | Self::NamespacedAccessor { span, .. }
            | Self::Other { span } => *span,
        }
    }

    /// Identifier name when the receiver is a plain identifier
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A call whose callee is `name` or `receiver.name`
#[derive(Debug, Clone)]
pub struct CallMatch {
    pub span: Span,
    pub callee_span: Span,
    pub name: String,
    pub name_span: Span,
    pub receiver: Option<Receiver>,
    pub arguments: Vec<Span>,
}

impl CallMatch {
    pub fn is_bare(&self) -> bool {
        self.receiver.is_none()
    }
}

/// A `new` expression with up to two levels of qualification
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub span: Span,
    pub callee_span: Span,
    /// Class name, the last segment of the callee
    pub name: String,
    /// Qualifier segments in source order: `[]`, `["NS"]` or `["NS", "Sub"]`
    pub qualifier: Vec<String>,
    pub arguments: Vec<Span>,
    /// Whether the source spells an argument list (`new X` has none)
    pub has_parens: bool,
}

impl NewMatch {
    /// Outermost qualifier, the namespace the class was reached through
    pub fn namespace(&self) -> Option<&str> {
        self.qualifier.first().map(String::as_str)
    }
}

/// Strip parentheses and TypeScript-only wrappers
pub fn unwrap_expression<'b, 'a>(mut expr: &'b Expression<'a>) -> &'b Expression<'a> {
    loop {
        expr = match expr {
            Expression::ParenthesizedExpression(e) => &e.expression,
            Expression::TSAsExpression(e) => &e.expression,
            Expression::TSSatisfiesExpression(e) => &e.expression,
            Expression::TSNonNullExpression(e) => &e.expression,
            _ => return expr,
        };
    }
}

fn argument_spans(arguments: &[Argument<'_>]) -> Vec<Span> {
    arguments.iter().map(GetSpan::span).collect()
}

fn receiver_of(object: &Expression<'_>) -> Receiver {
    match object {
        Expression::Identifier(ident) => Receiver::Identifier {
            name: ident.name.to_string(),
            span: ident.span,
        },
        Expression::CallExpression(call) => match &call.callee {
            Expression::Identifier(ident) => Receiver::Accessor {
                accessor: ident.name.to_string(),
                span: call.span,
            },
            Expression::StaticMemberExpression(member) => match &member.object {
                Expression::Identifier(ns) => Receiver::NamespacedAccessor {
                    namespace: ns.name.to_string(),
                    accessor: member.property.name.to_string(),
                    span: call.span,
                },
                _ => Receiver::Other { span: call.span },
            },
            _ => Receiver::Other { span: call.span },
        },
        other => Receiver::Other { span: other.span() },
    }
}

/// Match `name(...)` or `receiver.name(...)`
pub fn match_call(call: &CallExpression<'_>) -> Option<CallMatch> {
    match &call.callee {
        Expression::Identifier(ident) => Some(CallMatch {
            span: call.span,
            callee_span: ident.span,
            name: ident.name.to_string(),
            name_span: ident.span,
            receiver: None,
            arguments: argument_spans(&call.arguments),
        }),
        Expression::StaticMemberExpression(member) => Some(CallMatch {
            span: call.span,
            callee_span: member.span,
            name: member.property.name.to_string(),
            name_span: member.property.span,
            receiver: Some(receiver_of(&member.object)),
            arguments: argument_spans(&call.arguments),
        }),
        _ => None,
    }
}

/// Match a bare call `X(...)` for any `X` in `names`
pub fn bare_call(call: &CallExpression<'_>, names: &[&str]) -> Option<CallMatch> {
    match_call(call).filter(|m| m.is_bare() && names.contains(&m.name.as_str()))
}

/// Match `obj.X(...)` for any receiver and any `X` in `names`
pub fn member_call(call: &CallExpression<'_>, names: &[&str]) -> Option<CallMatch> {
    match_call(call).filter(|m| !m.is_bare() && names.contains(&m.name.as_str()))
}

/// Heuristic for "this receiver is a hub"
///
/// True for an identifier whose name contains `hub` in any case, and for a
/// direct call of `getCurrentHub()`.
pub fn looks_like_hub(receiver: &Receiver) -> bool {
    match receiver {
        Receiver::Identifier { name, .. } => name.to_lowercase().contains("hub"),
        Receiver::Accessor { accessor, .. } => accessor == "getCurrentHub",
        _ => false,
    }
}

/// Match `new X(...)`, `new NS.X(...)` and `new NS.Sub.X(...)`
pub fn match_new(new: &NewExpression<'_>) -> Option<NewMatch> {
    let (name, qualifier) = match &new.callee {
        Expression::Identifier(ident) => (ident.name.to_string(), Vec::new()),
        Expression::StaticMemberExpression(member) => {
            let mut qualifier = Vec::new();
            match &member.object {
                Expression::Identifier(ns) => qualifier.push(ns.name.to_string()),
                Expression::StaticMemberExpression(inner) => match &inner.object {
                    Expression::Identifier(ns) => {
                        qualifier.push(ns.name.to_string());
                        qualifier.push(inner.property.name.to_string());
                    }
                    _ => return None,
                },
                _ => return None,
            }
            (member.property.name.to_string(), qualifier)
        }
        _ => return None,
    };

    let callee_span = new.callee.span();
    Some(NewMatch {
        span: new.span,
        callee_span,
        name,
        qualifier,
        arguments: argument_spans(&new.arguments),
        has_parens: new.span.end > callee_span.end,
    })
}

/// `X.Y` where `X` is a plain identifier: returns `(X, Y)`
pub fn static_member<'b>(member: &'b StaticMemberExpression<'_>) -> Option<(&'b str, &'b str)> {
    match &member.object {
        Expression::Identifier(ident) => Some((ident.name.as_str(), member.property.name.as_str())),
        _ => None,
    }
}

/// Package name of `require('pkg')`
pub fn required_package<'b>(call: &'b CallExpression<'_>) -> Option<(&'b str, Span)> {
    match &call.callee {
        Expression::Identifier(ident)
            if ident.name.as_str() == "require" && call.arguments.len() == 1 =>
        {
            match &call.arguments[0] {
                Argument::StringLiteral(lit) => Some((lit.value.as_str(), lit.span)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Static name of a property key (`a`, `'a'`, but not `[a]`)
pub fn property_key_name<'b>(key: &'b PropertyKey<'_>) -> Option<&'b str> {
    match key {
        PropertyKey::StaticIdentifier(ident) => Some(ident.name.as_str()),
        PropertyKey::StringLiteral(lit) => Some(lit.value.as_str()),
        _ => None,
    }
}

/// A non-computed `key: value` entry of an object literal
#[derive(Debug, Clone)]
pub struct PropertyMatch {
    pub key: String,
    pub span: Span,
    pub value_span: Span,
}

/// Plain properties of an object literal, spreads and computed keys excluded
pub fn object_properties(object: &ObjectExpression<'_>) -> Vec<PropertyMatch> {
    object
        .properties
        .iter()
        .filter_map(|prop| match prop {
            ObjectPropertyKind::ObjectProperty(p) if !p.computed => {
                property_key_name(&p.key).map(|key| PropertyMatch {
                    key: key.to_string(),
                    span: p.span,
                    value_span: p.value.span(),
                })
            }
            _ => None,
        })
        .collect()
}

/// Spans of every entry (including spreads) of an object literal
pub fn object_entry_spans(object: &ObjectExpression<'_>) -> Vec<Span> {
    object.properties.iter().map(GetSpan::span).collect()
}

/// First argument as an object literal
pub fn object_argument<'b, 'a>(arguments: &'b [Argument<'a>]) -> Option<&'b ObjectExpression<'a>> {
    match arguments.first()? {
        Argument::ObjectExpression(object) => Some(object),
        _ => None,
    }
}

/// An object literal passed as first argument
#[derive(Debug, Clone)]
pub struct ObjectArgument {
    pub span: Span,
    pub properties: Vec<PropertyMatch>,
    /// Every entry, spreads included, in source order
    pub entries: Vec<Span>,
}

impl ObjectArgument {
    pub fn from_arguments(arguments: &[Argument<'_>]) -> Option<Self> {
        object_argument(arguments).map(|object| Self {
            span: object.span,
            properties: object_properties(object),
            entries: object_entry_spans(object),
        })
    }

    pub fn property(&self, key: &str) -> Option<&PropertyMatch> {
        self.properties.iter().find(|p| p.key == key)
    }
}

/// The SDK initialization call of a file
#[derive(Debug, Clone)]
pub struct InitCall {
    pub call: CallMatch,
    pub options: Option<ObjectArgument>,
}

#[derive(Default)]
struct InitFinder {
    member: Option<InitCall>,
    bare: Option<InitCall>,
}

impl<'a> Visit<'a> for InitFinder {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(m) = match_call(call).filter(|m| m.name == "init") {
            let slot = match m.receiver.as_ref() {
                None => &mut self.bare,
                Some(r) if r.identifier() == Some("Sentry") => &mut self.member,
                Some(_) => return walk::walk_call_expression(self, call),
            };
            if slot.is_none() {
                *slot = Some(InitCall {
                    call: m,
                    options: ObjectArgument::from_arguments(&call.arguments),
                });
            }
        }
        walk::walk_call_expression(self, call);
    }
}

/// The first `Sentry.init(...)` call, or else the first bare `init(...)` in a
/// file that imports some `@sentry/*` package
pub fn sentry_init_call(module: &Module<'_, '_>) -> Option<InitCall> {
    let mut finder = InitFinder::default();
    walk::walk_program(&mut finder, module.program);
    finder
        .member
        .or_else(|| finder.bare.filter(|_| has_sentry_import(module.source)))
}

struct NewFinder<'n> {
    name: &'n str,
    qualified: Option<(NewMatch, Option<ObjectArgument>)>,
    bare: Option<(NewMatch, Option<ObjectArgument>)>,
}

impl<'a> Visit<'a> for NewFinder<'_> {
    fn visit_new_expression(&mut self, new: &NewExpression<'a>) {
        if let Some(m) = match_new(new).filter(|m| m.name == self.name) {
            let slot = if m.qualifier.is_empty() {
                &mut self.bare
            } else {
                &mut self.qualified
            };
            if slot.is_none() {
                *slot = Some((m, ObjectArgument::from_arguments(&new.arguments)));
            }
        }
        walk::walk_new_expression(self, new);
    }
}

/// The first `new NS.Name(...)` (any qualifier), or else the first
/// `new Name(...)`, with its options object
pub fn integration_new_expression(
    module: &Module<'_, '_>,
    name: &str,
) -> Option<(NewMatch, Option<ObjectArgument>)> {
    let mut finder = NewFinder {
        name,
        qualified: None,
        bare: None,
    };
    walk::walk_program(&mut finder, module.program);
    finder.qualified.or(finder.bare)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, with_module};
    use oxc_ast::ast::Statement;

    fn first_expression<R>(source: &str, f: impl FnOnce(&Expression<'_>) -> R) -> R {
        with_module(source, ParseOptions::default(), |m| match &m.program.body[0] {
            Statement::ExpressionStatement(stmt) => f(&stmt.expression),
            _ => panic!("expected expression statement"),
        })
        .unwrap()
    }

    #[test]
    fn matches_bare_and_member_calls() {
        first_expression("captureException(err)", |expr| {
            let Expression::CallExpression(call) = expr else { panic!() };
            let m = bare_call(call, &["captureException"]).unwrap();
            assert_eq!(m.arguments.len(), 1);
            assert!(member_call(call, &["captureException"]).is_none());
        });

        first_expression("MySentry.captureException(err, ctx)", |expr| {
            let Expression::CallExpression(call) = expr else { panic!() };
            let m = member_call(call, &["captureException"]).unwrap();
            assert_eq!(m.receiver.as_ref().unwrap().identifier(), Some("MySentry"));
            assert_eq!(m.arguments.len(), 2);
        });
    }

    #[test]
    fn recognises_hub_receivers() {
        first_expression("getCurrentHub().bindClient(client)", |expr| {
            let Expression::CallExpression(call) = expr else { panic!() };
            let m = match_call(call).unwrap();
            assert!(looks_like_hub(m.receiver.as_ref().unwrap()));
        });

        first_expression("myHubInstance.getScope()", |expr| {
            let Expression::CallExpression(call) = expr else { panic!() };
            let m = match_call(call).unwrap();
            assert!(looks_like_hub(m.receiver.as_ref().unwrap()));
        });

        first_expression("Sentry.getCurrentHub().getScope()", |expr| {
            let Expression::CallExpression(call) = expr else { panic!() };
            let m = match_call(call).unwrap();
            let receiver = m.receiver.unwrap();
            assert!(!looks_like_hub(&receiver));
            assert!(matches!(
                receiver,
                Receiver::NamespacedAccessor { ref namespace, ref accessor, .. }
                    if namespace == "Sentry" && accessor == "getCurrentHub"
            ));
        });

        first_expression("client.getScope()", |expr| {
            let Expression::CallExpression(call) = expr else { panic!() };
            let m = match_call(call).unwrap();
            assert!(!looks_like_hub(m.receiver.as_ref().unwrap()));
        });
    }

    #[test]
    fn matches_new_with_qualifiers() {
        first_expression("new BrowserTracing()", |expr| {
            let Expression::NewExpression(new) = expr else { panic!() };
            let m = match_new(new).unwrap();
            assert_eq!(m.name, "BrowserTracing");
            assert!(m.qualifier.is_empty());
            assert!(m.has_parens);
        });

        first_expression("new Sentry.Integrations.Http({ tracing: true })", |expr| {
            let Expression::NewExpression(new) = expr else { panic!() };
            let m = match_new(new).unwrap();
            assert_eq!(m.name, "Http");
            assert_eq!(m.qualifier, vec!["Sentry", "Integrations"]);
            assert_eq!(m.namespace(), Some("Sentry"));
            assert_eq!(m.arguments.len(), 1);
        });

        first_expression("new Replay", |expr| {
            let Expression::NewExpression(new) = expr else { panic!() };
            assert!(!match_new(new).unwrap().has_parens);
        });

        first_expression("new (getClass())()", |expr| {
            let Expression::NewExpression(new) = expr else { panic!() };
            assert!(match_new(new).is_none());
        });
    }

    #[test]
    fn matches_require_calls() {
        first_expression("require('@sentry/node')", |expr| {
            let Expression::CallExpression(call) = expr else { panic!() };
            assert_eq!(required_package(call).unwrap().0, "@sentry/node");
        });
        first_expression("require(name)", |expr| {
            let Expression::CallExpression(call) = expr else { panic!() };
            assert!(required_package(call).is_none());
        });
    }

    #[test]
    fn lists_plain_object_properties() {
        first_expression("({ a: 1, 'b': 2, [c]: 3, ...d })", |expr| {
            let Expression::ObjectExpression(object) = unwrap_expression(expr) else {
                panic!()
            };
            let keys: Vec<_> = object_properties(object).into_iter().map(|p| p.key).collect();
            assert_eq!(keys, vec!["a", "b"]);
            assert_eq!(object_entry_spans(object).len(), 4);
        });
    }

    #[test]
    fn finds_init_call() {
        let source = "import * as Sentry from '@sentry/node';\nfoo.init();\nSentry.init({ dsn: 'x', ...rest });\n";
        let init = with_module(source, ParseOptions::default(), sentry_init_call)
            .unwrap()
            .unwrap();
        assert_eq!(init.call.receiver.unwrap().identifier(), Some("Sentry"));
        let options = init.options.unwrap();
        assert!(options.property("dsn").is_some());
        assert_eq!(options.entries.len(), 2);

        let bare = "import { init } from '@sentry/vue';\ninit({});\n";
        assert!(with_module(bare, ParseOptions::default(), sentry_init_call).unwrap().is_some());

        let unrelated = "import { init } from './app';\ninit({});\n";
        assert!(with_module(unrelated, ParseOptions::default(), sentry_init_call).unwrap().is_none());
    }

    #[test]
    fn prefers_qualified_integration() {
        let source = "new BrowserTracing();\nnew Sentry.BrowserTracing({ tracingOrigins: ['a'] });\n";
        let (found, options) = with_module(source, ParseOptions::default(), |m| {
            integration_new_expression(m, "BrowserTracing")
        })
        .unwrap()
        .unwrap();
        assert_eq!(found.namespace(), Some("Sentry"));
        assert!(options.unwrap().property("tracingOrigins").is_some());
    }
}
