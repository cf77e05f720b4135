//! Layout helpers for edits that add or remove whole lines and list items

use oxc_span::Span;

/// Byte offset of the start of the line containing `pos`
pub fn line_start(source: &str, pos: u32) -> u32 {
    let pos = (pos as usize).min(source.len());
    source[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0) as u32
}

/// Byte offset just past the newline ending the line containing `pos`
/// (or the end of the text)
pub fn line_end_inclusive(source: &str, pos: u32) -> u32 {
    let pos = (pos as usize).min(source.len());
    source[pos..]
        .find('\n')
        .map(|i| pos + i + 1)
        .unwrap_or(source.len()) as u32
}

/// Leading whitespace of the line containing `pos`
pub fn indent_at(source: &str, pos: u32) -> &str {
    let start = line_start(source, pos) as usize;
    let line = &source[start..];
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..width]
}

/// The span to delete when removing a whole statement
///
/// A statement that sits alone on its line takes the full line with it,
/// including the newline.
pub fn statement_removal_span(source: &str, span: Span) -> Span {
    let start = line_start(source, span.start);
    let before = &source[start as usize..span.start as usize];
    let end = line_end_inclusive(source, span.end);
    let after_end = if source[..end as usize].ends_with('\n') {
        end - 1
    } else {
        end
    };
    let after = &source[span.end as usize..after_end as usize];

    if before.trim().is_empty() && after.trim().is_empty() {
        Span::new(start, end)
    } else {
        span
    }
}

/// The span to delete when removing `items[index]` from a comma separated list
///
/// The separator goes with the item: the following one for all but the last
/// item, the preceding one for the last.
pub fn list_item_removal_span(items: &[Span], index: usize) -> Span {
    let item = items[index];
    if index + 1 < items.len() {
        Span::new(item.start, items[index + 1].start)
    } else if index > 0 {
        Span::new(items[index - 1].end, item.end)
    } else {
        item
    }
}

/// Removal spans for several items of one list, merged so they never overlap
pub fn list_items_removal_spans(items: &[Span], remove: &[usize]) -> Vec<Span> {
    let mut remove = remove.to_vec();
    remove.sort_unstable();
    remove.dedup();
    let keep: Vec<usize> = (0..items.len()).filter(|i| !remove.contains(i)).collect();
    if keep.is_empty() {
        return Vec::new();
    }

    let mut spans = Vec::new();
    for &index in &remove {
        let item = items[index];
        // Next kept item bounds the removal when there is one after us,
        // otherwise the removal eats back to the last kept item before us.
        let span = match keep.iter().find(|&&k| k > index) {
            Some(&next) => {
                // Only the first removed item of a run starts the span.
                if index > 0 && remove.contains(&(index - 1)) {
                    continue;
                }
                Span::new(item.start, items[next].start)
            }
            None => {
                if index + 1 < items.len() {
                    continue;
                }
                let prev = keep.iter().rev().find(|&&k| k < index).copied();
                match prev {
                    Some(prev) => Span::new(items[prev].end, item.end),
                    None => item,
                }
            }
        };
        spans.push(span);
    }
    spans
}

/// Where and what to insert to append `texts` as new last list items
///
/// Multi-line lists get each new item on its own line with the indentation
/// of the current last item.
pub fn append_list_items(
    source: &str,
    container_start: u32,
    items: &[Span],
    texts: &[String],
) -> (u32, String) {
    let Some(last) = items.last() else {
        return (container_start + 1, format!(" {} ", texts.join(", ")));
    };
    let gap_start = if items.len() > 1 {
        items[items.len() - 2].end
    } else {
        container_start
    };
    let multiline = source[gap_start as usize..last.start as usize].contains('\n');
    let separator = if multiline {
        format!(",\n{}", indent_at(source, last.start))
    } else {
        ", ".to_string()
    };
    let mut text = String::new();
    for item in texts {
        text.push_str(&separator);
        text.push_str(item);
    }
    (last.end, text)
}

/// `value` as a JavaScript string literal delimited by `quote`
pub fn quote_string(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Whether `source` between `start` and `end` is only whitespace
pub fn is_blank(source: &str, start: u32, end: u32) -> bool {
    source[start as usize..end as usize].trim().is_empty()
}
