//! One parse, one edit set, one new text
//!
//! Rules rewrite in passes: a rewrite pass over the parsed unit, then an
//! import fixup pass over a fresh parse of the rewritten text. Spans never
//! cross a pass boundary.

use crate::edit::EditSet;
use crate::error::Result;
use crate::parser::{Module, ParseOptions, with_module};

/// Parse `source`, collect edits plus a by-product, and apply the edits
pub fn rewrite_pass<T>(
    source: &str,
    options: ParseOptions,
    f: impl FnOnce(&Module<'_, '_>) -> Result<(EditSet, T)>,
) -> Result<(String, T)> {
    let (edits, value) = with_module(source, options, f)??;
    let output = if edits.is_empty() {
        source.to_string()
    } else {
        edits.apply(source)?
    };
    Ok((output, value))
}

/// Parse `source`, collect edits, and apply them
pub fn edit_pass(
    source: &str,
    options: ParseOptions,
    f: impl FnOnce(&Module<'_, '_>) -> EditSet,
) -> Result<String> {
    let (output, ()) = rewrite_pass(source, options, |module| Ok((f(module), ())))?;
    Ok(output)
}

/// `Some(output)` when it differs from `original`
pub fn changed(original: &str, output: String) -> Option<String> {
    (output != original).then_some(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_span::Span;

    #[test]
    fn passes_chain() {
        let source = "a(); b();";
        let (first, calls) = rewrite_pass(source, ParseOptions::default(), |m| {
            let mut edits = EditSet::new();
            edits.replace(Span::new(0, 1), "x");
            Ok((edits, m.program.body.len()))
        })
        .unwrap();
        assert_eq!(first, "x(); b();");
        assert_eq!(calls, 2);

        let second = edit_pass(&first, ParseOptions::default(), |_| EditSet::new()).unwrap();
        assert_eq!(changed(source, second.clone()), Some(second));
        assert_eq!(changed(source, source.to_string()), None);
    }

    #[test]
    fn parse_errors_surface() {
        let err = edit_pass("let = ;", ParseOptions::default(), |_| EditSet::new()).unwrap_err();
        assert!(err.is_parse_failure());
    }
}
