//! `migr8 list`

use std::io::Write;

use crate::error::Result;

/// Print every rule id with its display name, in run order
pub fn execute() -> Result<()> {
    let rules = migr8_core::discover();
    let width = rules.iter().map(|r| r.id().len()).max().unwrap_or(0);

    let mut out = std::io::stdout().lock();
    for rule in &rules {
        writeln!(out, "{:<width$}  {}", rule.id(), rule.name())?;
    }
    Ok(())
}
