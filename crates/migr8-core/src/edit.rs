//! Span-based text edits
//!
//! Rules never re-print a syntax tree. They record replacements against byte
//! spans of the text they parsed and apply them in a single pass, so every byte
//! outside an edited span survives untouched. A rewrite that records nothing
//! yields the input unchanged, which is what makes re-running a rule a no-op.

use oxc_span::Span;

use crate::error::{MigrateError, Result};

/// A single replacement of `start..end` with `text`
///
/// Insertions are edits with `start == end`; removals carry empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl Edit {
    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// An unordered batch of edits against one source text
#[derive(Debug, Default, Clone)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bytes covered by `span`
    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push(Edit {
            start: span.start,
            end: span.end,
            text: text.into(),
        });
    }

    /// Insert text at a byte offset
    pub fn insert(&mut self, at: u32, text: impl Into<String>) {
        self.edits.push(Edit {
            start: at,
            end: at,
            text: text.into(),
        });
    }

    /// Delete the bytes covered by `span`
    pub fn remove(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    pub fn extend(&mut self, other: EditSet) {
        self.edits.extend(other.edits);
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether some recorded edit already replaces or removes bytes inside `span`
    pub fn touches(&self, span: Span) -> bool {
        self.edits
            .iter()
            .any(|e| !e.is_insertion() && e.start < span.end && span.start < e.end)
    }

    /// Apply all edits to `source`
    ///
    /// Edits are sorted by position; identical duplicates collapse into one.
    /// Insertions at the same offset keep the order they were recorded in.
    pub fn apply(mut self, source: &str) -> Result<String> {
        // Stable sort keeps recording order for insertions sharing an offset.
        self.edits.sort_by_key(|e| (e.start, e.end));
        self.edits.dedup();

        let mut out = String::with_capacity(source.len() + 64);
        let mut cursor: u32 = 0;
        let mut last: Option<&Edit> = None;

        for edit in &self.edits {
            if edit.start < cursor || edit.end as usize > source.len() {
                let prev = last.map(|e| (e.start, e.end)).unwrap_or((0, cursor));
                return Err(MigrateError::OverlappingEdits {
                    first_start: prev.0,
                    first_end: prev.1,
                    second_start: edit.start,
                    second_end: edit.end,
                });
            }
            out.push_str(&source[cursor as usize..edit.start as usize]);
            out.push_str(&edit.text);
            cursor = edit.end;
            last = Some(edit);
        }
        out.push_str(&source[cursor as usize..]);
        Ok(out)
    }

    /// Apply edits and report `None` when the text did not change
    pub fn apply_if_changed(self, source: &str) -> Result<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }
        let output = self.apply(source)?;
        Ok((output != source).then_some(output))
    }
}
