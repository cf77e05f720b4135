//! Sequential rule runner
//!
//! Rules run one after another over the whole file set. A rule that fails,
//! by error or by panic, is reported and the next rule still runs.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::time::Instant;

use super::{TransformReport, Transformer, TransformerOptions};

/// Result of running one rule
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub id: &'static str,
    pub name: &'static str,
    pub result: Result<TransformReport, String>,
}

impl RuleOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}

/// Run one rule, turning errors and panics into a failed outcome
pub fn run_rule(
    rule: &dyn Transformer,
    files: &[PathBuf],
    options: &TransformerOptions,
) -> RuleOutcome {
    let started = Instant::now();
    tracing::info!(rule = rule.id(), "running {}", rule.name());

    let result = match catch_unwind(AssertUnwindSafe(|| rule.transform(files, options))) {
        Ok(Ok(report)) => Ok(report),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    };

    match &result {
        Ok(report) => tracing::info!(
            rule = rule.id(),
            modified = report.modified.len(),
            skipped = report.skipped.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "finished"
        ),
        Err(message) => tracing::error!(rule = rule.id(), "failed: {message}"),
    }

    RuleOutcome {
        id: rule.id(),
        name: rule.name(),
        result,
    }
}

/// Run `rules` in order over `files`
///
/// `on_outcome` sees every outcome as soon as its rule finishes.
pub fn run_all<'r>(
    rules: impl IntoIterator<Item = &'r dyn Transformer>,
    files: &[PathBuf],
    options: &TransformerOptions,
    mut on_outcome: impl FnMut(&RuleOutcome),
) -> Vec<RuleOutcome> {
    rules
        .into_iter()
        .map(|rule| {
            let outcome = run_rule(rule, files, options);
            on_outcome(&outcome);
            outcome
        })
        .collect()
}
