//! `<script>` block scanner for Vue and Svelte components
//!
//! Finds the byte range of every script block's content so the wrapper can
//! rewrite it in place. The surrounding markup is never interpreted.

use memchr::memmem;

/// Largest component file the scanner accepts (10 MB)
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// Most script tags accepted in one component
pub const MAX_SCRIPT_TAGS: usize = 100;

/// Kind of component document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Vue,
    Svelte,
}

impl DocumentKind {
    /// Document kind for a file extension, `None` for plain source files
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "vue" => Some(Self::Vue),
            "svelte" => Some(Self::Svelte),
            _ => None,
        }
    }
}

/// Role of a script block inside its component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptRole {
    /// `<script setup>`
    VueSetup,
    /// Plain Vue `<script>`
    VueOptions,
    /// `<script context="module">` / `<script module>`
    SvelteModule,
    /// Per-instance Svelte `<script>`
    SvelteInstance,
}

/// One script block's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock<'a> {
    /// Content between the opening and closing tags
    pub content: &'a str,
    /// Byte offset of `content` in the document
    pub start: usize,
    pub role: ScriptRole,
    /// Value of the `lang` attribute, if any
    pub lang: Option<&'a str>,
}

impl ScriptBlock<'_> {
    pub fn end(&self) -> usize {
        self.start + self.content.len()
    }
}

/// Why a document could not be scanned
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("document too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("too many script tags (max: {max})")]
    TooManyScriptTags { max: usize },

    #[error("unclosed script tag at byte {position}")]
    UnclosedScriptTag { position: usize },
}

const OPEN_TAG: &[u8] = b"<script";
const CLOSE_TAG: &[u8] = b"</script>";

/// Every script block of a component, in document order
pub fn script_blocks(source: &str, kind: DocumentKind) -> Result<Vec<ScriptBlock<'_>>, ScanError> {
    if source.len() > MAX_DOCUMENT_SIZE {
        return Err(ScanError::TooLarge {
            size: source.len(),
            max: MAX_DOCUMENT_SIZE,
        });
    }

    let bytes = source.as_bytes();
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(found) = memmem::find(&bytes[cursor..], OPEN_TAG) {
        let tag_start = cursor + found;
        let attrs_start = tag_start + OPEN_TAG.len();
        cursor = attrs_start;

        // `<scripts>` or `<scripting>` are other elements.
        if bytes
            .get(attrs_start)
            .is_some_and(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/'))
        {
            continue;
        }

        let tag_end = closing_angle(bytes, attrs_start)
            .ok_or(ScanError::UnclosedScriptTag { position: tag_start })?;
        let attrs = &source[attrs_start..tag_end];
        let role = script_role(kind, attrs);
        let lang = attribute(attrs, "lang");

        if blocks.len() == MAX_SCRIPT_TAGS {
            return Err(ScanError::TooManyScriptTags {
                max: MAX_SCRIPT_TAGS,
            });
        }

        if bytes[tag_end - 1] == b'/' {
            cursor = tag_end + 1;
            blocks.push(ScriptBlock {
                content: "",
                start: cursor,
                role,
                lang,
            });
            continue;
        }

        let content_start = tag_end + 1;
        let content_end = memmem::find(&bytes[content_start..], CLOSE_TAG)
            .map(|pos| content_start + pos)
            .ok_or(ScanError::UnclosedScriptTag { position: tag_start })?;
        blocks.push(ScriptBlock {
            content: &source[content_start..content_end],
            start: content_start,
            role,
            lang,
        });
        cursor = content_end + CLOSE_TAG.len();
    }

    Ok(blocks)
}

/// Position of the `>` ending an opening tag, skipping quoted attribute values
fn closing_angle(bytes: &[u8], start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &byte) in bytes[start..].iter().enumerate() {
        match (byte, quote) {
            (b'"' | b'\'', None) => quote = Some(byte),
            (b, Some(q)) if b == q => quote = None,
            (b'>', None) => return Some(start + i),
            _ => {}
        }
    }
    None
}

fn script_role(kind: DocumentKind, attrs: &str) -> ScriptRole {
    let has_word = |word: &str| {
        attrs
            .split(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .any(|w| w == word)
    };
    match kind {
        DocumentKind::Vue if has_word("setup") => ScriptRole::VueSetup,
        DocumentKind::Vue => ScriptRole::VueOptions,
        DocumentKind::Svelte
            if attribute(attrs, "context") == Some("module") || has_word("module") =>
        {
            ScriptRole::SvelteModule
        }
        DocumentKind::Svelte => ScriptRole::SvelteInstance,
    }
}

/// Value of `name="..."`, `name='...'` or unquoted `name=value`
fn attribute<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let pattern = format!("{name}=");
    let pos = attrs.find(&pattern)?;
    let value = attrs[pos + pattern.len()..].trim_start();
    match value.chars().next()? {
        q @ ('"' | '\'') => {
            let rest = &value[1..];
            rest.find(q).map(|end| &rest[..end])
        }
        _ => {
            let end = value
                .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
                .unwrap_or(value.len());
            Some(&value[..end])
        }
    }
}
