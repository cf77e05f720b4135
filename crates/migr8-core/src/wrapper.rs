//! Source wrapper: runs a rewrite on a file or on each script block of a
//! component file

use std::path::Path;

use crate::error::Result;
use crate::extract::{DocumentKind, script_blocks};
use crate::parser::ParseOptions;

/// A piece of script a rule rewrites: a whole source file or one `<script>`
/// block of a component
#[derive(Debug, Clone, Copy)]
pub struct SourceUnit<'a> {
    /// File the script comes from
    pub path: &'a Path,
    pub source: &'a str,
    pub parse_options: ParseOptions,
}

impl<'a> SourceUnit<'a> {
    /// A whole source file, parsed according to its extension
    pub fn file(path: &'a Path, source: &'a str) -> Self {
        Self {
            path,
            source,
            parse_options: ParseOptions::from_path(path),
        }
    }
}

/// Run `rewrite` over the script in `source`
///
/// Plain source files are handed over whole. For `.vue` and `.svelte` files
/// every script block is rewritten on its own and spliced back, leaving the
/// markup around it byte-for-byte intact. A block that fails to parse stays
/// as it is. A component whose blocks cannot be located is left unchanged.
pub fn wrap<F>(path: &Path, source: &str, mut rewrite: F) -> Result<Option<String>>
where
    F: FnMut(&SourceUnit<'_>) -> Result<Option<String>>,
{
    let kind = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(DocumentKind::from_extension);
    let Some(kind) = kind else {
        return rewrite(&SourceUnit::file(path, source));
    };

    let blocks = match script_blocks(source, kind) {
        Ok(blocks) => blocks,
        Err(err) => {
            tracing::warn!(path = %path.display(), "{err}, leaving file unchanged");
            return Ok(None);
        }
    };

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut changed = false;

    for block in &blocks {
        let unit = SourceUnit {
            path,
            source: block.content,
            parse_options: ParseOptions::from_lang(block.lang),
        };
        let replacement = match rewrite(&unit) {
            Ok(replacement) => replacement,
            Err(err) if err.is_parse_failure() => {
                tracing::debug!(path = %path.display(), offset = block.start, "{err}");
                None
            }
            Err(err) => return Err(err),
        };
        if let Some(text) = replacement {
            output.push_str(&source[cursor..block.start]);
            output.push_str(&text);
            cursor = block.end();
            changed = true;
        }
    }

    if !changed {
        return Ok(None);
    }
    output.push_str(&source[cursor..]);
    Ok(Some(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrateError;

    fn upper_sentry(unit: &SourceUnit<'_>) -> Result<Option<String>> {
        if unit.source.contains("syntax error") {
            return Err(MigrateError::parse("bad"));
        }
        Ok(unit
            .source
            .contains("sentry")
            .then(|| unit.source.replace("sentry", "SENTRY")))
    }

    #[test]
    fn plain_files_are_passed_whole() {
        let out = wrap(Path::new("a.js"), "sentry();", upper_sentry).unwrap();
        assert_eq!(out.as_deref(), Some("SENTRY();"));
    }

    #[test]
    fn component_blocks_are_rewritten_in_place() {
        let vue = "<template><p>sentry</p></template>\n<script setup lang=\"ts\">\nsentry();\n</script>\n<script>\nother();\n</script>\n";
        let out = wrap(Path::new("App.vue"), vue, upper_sentry).unwrap();
        assert_eq!(
            out.as_deref(),
            Some("<template><p>sentry</p></template>\n<script setup lang=\"ts\">\nSENTRY();\n</script>\n<script>\nother();\n</script>\n")
        );
    }

    #[test]
    fn lang_attribute_selects_source_type() {
        let svelte = "<script lang=\"ts\">\nlet a: number;\n</script>";
        let mut seen = Vec::new();
        wrap(Path::new("A.svelte"), svelte, |unit| {
            seen.push(unit.parse_options.source_type.is_typescript());
            Ok(None)
        })
        .unwrap();
        assert_eq!(seen, vec![true]);
    }

    #[test]
    fn unparseable_blocks_and_documents_are_left_alone() {
        let vue = "<script>\nsyntax error sentry\n</script>\n<script setup>\nsentry();\n</script>";
        let out = wrap(Path::new("A.vue"), vue, upper_sentry).unwrap();
        assert_eq!(
            out.as_deref(),
            Some("<script>\nsyntax error sentry\n</script>\n<script setup>\nSENTRY();\n</script>")
        );

        let broken = "<script>\nsentry();\n";
        assert_eq!(wrap(Path::new("A.vue"), broken, upper_sentry).unwrap(), None);
    }
}
