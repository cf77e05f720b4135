//! Replay privacy options to `block` / `ignore` / `mask` arrays, and Replay
//! sample rates to the init options

use std::sync::OnceLock;

use oxc_ast::ast::{ArrayExpressionElement, Expression, NewExpression, ObjectPropertyKind};
use oxc_ast_visit::{Visit, walk};
use oxc_span::{GetSpan, Span};
use regex::{Regex, RegexBuilder};

use crate::edit::EditSet;
use crate::error::Result;
use crate::marker::add_marker;
use crate::matchers::{
    PropertyMatch, integration_new_expression, match_new, object_argument, object_entry_spans,
    property_key_name, sentry_init_call,
};
use crate::parser::Module;
use crate::text::{append_list_items, indent_at, list_items_removal_spans};
use crate::transform::{SourceRule, TransformerOptions, changed, edit_pass, rewrite_pass};
use crate::wrapper::SourceUnit;

/// Target keys in the order they are appended
const TARGETS: [&str; 3] = ["block", "ignore", "mask"];

/// How a legacy string option turns into selectors
#[derive(Clone, Copy)]
enum Legacy {
    /// Comma separated selector list
    Selector,
    /// Single class name, becomes `.name`
    Class,
}

const LEGACY_OPTIONS: &[(&str, usize, Legacy)] = &[
    ("blockSelector", 0, Legacy::Selector),
    ("blockClass", 0, Legacy::Class),
    ("ignoreClass", 1, Legacy::Class),
    ("maskTextClass", 2, Legacy::Class),
    ("maskTextSelector", 2, Legacy::Selector),
];

/// Integration sample rates and the init options that replace them
const SAMPLE_RATES: [(&str, &str); 2] = [
    ("sessionSampleRate", "replaysSessionSampleRate"),
    ("errorSampleRate", "replaysOnErrorSampleRate"),
];

const SAMPLE_RATE_MARKER: &str = "Move `sessionSampleRate` and `errorSampleRate` into the init options as `replaysSessionSampleRate` and `replaysOnErrorSampleRate`.";

fn legacy_pattern() -> &'static Regex {
    static LEGACY: OnceLock<Regex> = OnceLock::new();
    LEGACY.get_or_init(|| {
        RegexBuilder::new(
            "(blockSelector)|(blockClass)|(ignoreClass)|(maskTextClass)|(maskTextSelector)|(sessionSampleRate)|(errorSampleRate)",
        )
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|_| unreachable!("static pattern is valid"))
    })
}

fn convert(value: &str, legacy: Legacy) -> Vec<String> {
    match legacy {
        Legacy::Selector => value.split(',').map(str::to_string).collect(),
        Legacy::Class if value.is_empty() => Vec::new(),
        Legacy::Class => vec![format!(".{value}")],
    }
}

struct ReplayRewriter<'s, 'm, 'a> {
    module: &'s Module<'m, 'a>,
    /// Whether `new NS.Replay(...)` exists; bare `new Replay(...)` is then ignored
    qualified: bool,
    edits: EditSet,
}

impl ReplayRewriter<'_, '_, '_> {
    fn migrate(&mut self, new: &NewExpression<'_>) {
        let Some(object) = object_argument(&new.arguments) else {
            return;
        };
        let entries = object_entry_spans(object);

        // Element texts per target; existing array items keep their source text.
        let mut targets: [Vec<String>; 3] = Default::default();
        let mut removed = Vec::new();
        let mut converted = false;

        for (index, prop) in object.properties.iter().enumerate() {
            let ObjectPropertyKind::ObjectProperty(prop) = prop else {
                continue;
            };
            if prop.computed {
                continue;
            }
            let Some(key) = property_key_name(&prop.key) else {
                continue;
            };

            match &prop.value {
                Expression::ArrayExpression(array) => {
                    if let Some(slot) = TARGETS.iter().position(|t| *t == key) {
                        targets[slot].extend(
                            array
                                .elements
                                .iter()
                                .filter(|e| !matches!(e, ArrayExpressionElement::Elision(_)))
                                .map(|e| self.module.text(e.span()).to_string()),
                        );
                        removed.push(index);
                    }
                }
                Expression::StringLiteral(literal) => {
                    if let Some((_, slot, legacy)) =
                        LEGACY_OPTIONS.iter().find(|(name, ..)| *name == key)
                    {
                        let values = convert(literal.value.as_str(), *legacy);
                        if matches!(legacy, Legacy::Selector) && values.len() == 1 {
                            // Unsplit selectors keep their escapes and quotes.
                            targets[*slot].push(self.module.text(literal.span).to_string());
                        } else {
                            targets[*slot]
                                .extend(values.iter().map(|v| self.module.string_literal(v)));
                        }
                        removed.push(index);
                        converted = true;
                    }
                }
                _ => {}
            }
        }

        // Arrays alone are already in the new shape.
        if !converted {
            return;
        }

        let additions: Vec<String> = TARGETS
            .iter()
            .zip(&targets)
            .filter(|(_, elements)| !elements.is_empty())
            .map(|(key, elements)| format!("{key}: [{}]", elements.join(", ")))
            .collect();

        let removals = list_items_removal_spans(&entries, &removed);
        if removals.is_empty() {
            // Every entry goes: the additions take their place.
            let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
                return;
            };
            let source = self.module.source;
            let separator = if source[object.span.start as usize..first.start as usize].contains('\n') {
                format!(",\n{}", indent_at(source, first.start))
            } else {
                ", ".to_string()
            };
            self.edits
                .replace(Span::new(first.start, last.end), additions.join(&separator));
            return;
        }

        for span in removals {
            self.edits.remove(span);
        }
        if !additions.is_empty() {
            let (at, text) =
                append_list_items(self.module.source, object.span.start, &entries, &additions);
            self.edits.insert(at, text);
        }
        tracing::debug!(span = ?new.span, "migrated replay privacy options");
    }
}

impl<'a> Visit<'a> for ReplayRewriter<'_, '_, 'a> {
    fn visit_new_expression(&mut self, new: &NewExpression<'a>) {
        if let Some(m) = match_new(new).filter(|m| m.name == "Replay") {
            if m.qualifier.is_empty() != self.qualified {
                self.migrate(new);
            }
        }
        walk::walk_new_expression(self, new);
    }
}

/// Move the first Replay integration's sample rates to the init options
///
/// Without an init call in the file the rates stay and get a marker. A rate
/// the init options already set is left where it is.
fn hoist_sample_rates(module: &Module<'_, '_>) -> EditSet {
    let mut edits = EditSet::new();
    let Some((new, Some(options))) = integration_new_expression(module, "Replay") else {
        return edits;
    };
    let moves: Vec<(usize, &PropertyMatch, &str)> = SAMPLE_RATES
        .iter()
        .filter_map(|(legacy, root)| {
            let property = options.property(legacy)?;
            let index = options.entries.iter().position(|e| *e == property.span)?;
            Some((index, property, *root))
        })
        .collect();
    if moves.is_empty() {
        return edits;
    }

    let Some(init_options) = sentry_init_call(module).and_then(|init| init.options) else {
        add_marker(&mut edits, module, new.span, SAMPLE_RATE_MARKER);
        return edits;
    };
    let moves: Vec<_> = moves
        .into_iter()
        .filter(|(_, _, root)| init_options.property(root).is_none())
        .collect();
    if moves.is_empty() {
        return edits;
    }

    let indices: Vec<usize> = moves.iter().map(|(index, ..)| *index).collect();
    let removals = list_items_removal_spans(&options.entries, &indices);
    if removals.is_empty() {
        if new.arguments.len() == 1 {
            edits.remove(options.span);
        } else {
            edits.replace(options.span, "{}");
        }
    } else {
        for span in removals {
            edits.remove(span);
        }
    }

    let additions: Vec<String> = moves
        .iter()
        .map(|(_, property, root)| format!("{root}: {}", module.text(property.value_span)))
        .collect();
    let (at, text) = append_list_items(
        module.source,
        init_options.span.start,
        &init_options.entries,
        &additions,
    );
    edits.insert(at, text);
    tracing::debug!(span = ?new.span, "hoisted replay sample rates");
    edits
}

/// Migrates `blockClass`, `blockSelector`, `ignoreClass`, `maskTextClass` and
/// `maskTextSelector` on Replay integrations, then moves `sessionSampleRate`
/// and `errorSampleRate` to the init options
///
/// Legacy values are merged after any existing `block`, `ignore` or `mask`
/// array, and the merged arrays are appended to the options object.
pub struct ReplayConfig;

impl SourceRule for ReplayConfig {
    fn id(&self) -> &'static str {
        "replay-config"
    }

    fn name(&self) -> &'static str {
        "Replay Config v7>v8"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, _options: &TransformerOptions) -> Result<Option<String>> {
        if !legacy_pattern().is_match(unit.source) {
            return Ok(None);
        }

        let (output, ()) = rewrite_pass(unit.source, unit.parse_options, |module| {
            let Some((found, _)) = integration_new_expression(module, "Replay") else {
                return Ok((EditSet::new(), ()));
            };
            let mut rewriter = ReplayRewriter {
                module,
                qualified: !found.qualifier.is_empty(),
                edits: EditSet::new(),
            };
            walk::walk_program(&mut rewriter, module.program);
            Ok((rewriter.edits, ()))
        })?;
        let output = edit_pass(&output, unit.parse_options, hoist_sample_rates)?;
        Ok(changed(unit.source, output))
    }
}
