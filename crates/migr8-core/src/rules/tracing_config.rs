//! Integration-level `tracePropagationTargets` to the init options

use crate::edit::EditSet;
use crate::error::Result;
use crate::matchers::{integration_new_expression, sentry_init_call};
use crate::parser::Module;
use crate::text::{append_list_items, list_item_removal_span};
use crate::transform::{SourceRule, TransformerOptions, changed, rewrite_pass};
use crate::wrapper::SourceUnit;

const TRACING_INTEGRATIONS: [&str; 3] = ["BrowserTracing", "Http", "Undici"];

/// Integration option names that become the root `tracePropagationTargets`
const TARGET_OPTIONS: [&str; 2] = ["tracePropagationTargets", "tracingOrigins"];

const ROOT_OPTION: &str = "tracePropagationTargets";

fn hoist_targets(module: &Module<'_, '_>) -> EditSet {
    let mut edits = EditSet::new();
    let Some(init) = sentry_init_call(module) else {
        return edits;
    };
    let Some(init_options) = init.options else {
        return edits;
    };
    if init_options.property(ROOT_OPTION).is_some() {
        tracing::debug!("init options already define {ROOT_OPTION}");
        return edits;
    }

    // Only one value can land at the root: the first integration that has one.
    for name in TRACING_INTEGRATIONS {
        let Some((new, Some(options))) = integration_new_expression(module, name) else {
            continue;
        };
        let Some((index, property)) = options
            .properties
            .iter()
            .find(|p| TARGET_OPTIONS.contains(&p.key.as_str()))
            .and_then(|p| {
                let index = options.entries.iter().position(|e| *e == p.span)?;
                Some((index, p))
            })
        else {
            continue;
        };

        if options.entries.len() == 1 && new.arguments.len() == 1 {
            edits.remove(options.span);
        } else {
            edits.remove(list_item_removal_span(&options.entries, index));
        }

        let value = module.text(property.value_span);
        let (at, text) = append_list_items(
            module.source,
            init_options.span.start,
            &init_options.entries,
            &[format!("{ROOT_OPTION}: {value}")],
        );
        edits.insert(at, text);
        tracing::debug!(integration = name, option = %property.key, "hoisted trace propagation targets");
        break;
    }
    edits
}

/// Moves `tracePropagationTargets` (or `tracingOrigins`) from `BrowserTracing`,
/// `Http` or `Undici` options into the init options
pub struct TracingConfig;

impl SourceRule for TracingConfig {
    fn id(&self) -> &'static str {
        "tracing-config"
    }

    fn name(&self) -> &'static str {
        "Tracing Config v7>v8"
    }

    fn rewrite(&self, unit: &SourceUnit<'_>, _options: &TransformerOptions) -> Result<Option<String>> {
        if !TARGET_OPTIONS.iter().any(|o| unit.source.contains(o)) {
            return Ok(None);
        }

        let (output, ()) = rewrite_pass(unit.source, unit.parse_options, |module| {
            Ok((hoist_targets(module), ()))
        })?;
        Ok(changed(unit.source, output))
    }
}
