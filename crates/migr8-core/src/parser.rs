//! Parser façade
//!
//! Every rewrite works on a [`Module`]: the source text, its OXC program, and
//! the semantic model used to resolve which identifier references belong to
//! which import binding. The AST lives in a per-call arena, so callers get
//! the module inside a closure and hand back owned data (usually an
//! [`EditSet`](crate::edit::EditSet)).

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, Expression, Program, Statement};
use oxc_parser::{Parser, ParserReturn};
use oxc_semantic::{Scoping, Semantic, SemanticBuilder};
use oxc_span::{SourceType, Span};

use crate::error::{MigrateError, Result};
use crate::text::quote_string;

/// Parse options for reading source code
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Source type (JavaScript, TypeScript, JSX, TSX)
    pub source_type: SourceType,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::tsx()
    }
}

impl ParseOptions {
    /// Detect the source type from a file extension, falling back to TSX
    pub fn from_path(path: &Path) -> Self {
        Self {
            source_type: SourceType::from_path(path).unwrap_or(SourceType::tsx()),
        }
    }

    /// Source type for a `<script lang="...">` block
    pub fn from_lang(lang: Option<&str>) -> Self {
        let source_type = match lang {
            Some("ts") => SourceType::ts(),
            Some("tsx") => SourceType::tsx(),
            Some("jsx") => SourceType::jsx(),
            _ => SourceType::mjs(),
        };
        Self { source_type }
    }

    /// Create parse options for TSX
    pub fn tsx() -> Self {
        Self {
            source_type: SourceType::tsx(),
        }
    }
}

/// A parsed source file plus its semantic model
pub struct Module<'m, 'a> {
    /// Original source text
    pub source: &'a str,
    /// The parsed AST program
    pub program: &'m Program<'a>,
    /// Scopes, symbols and resolved references
    pub semantic: &'m Semantic<'a>,
}

impl<'m, 'a> Module<'m, 'a> {
    /// Source text covered by a span
    pub fn text(&self, span: Span) -> &'a str {
        &self.source[span.start as usize..span.end as usize]
    }

    pub fn scoping(&self) -> &Scoping {
        self.semantic.scoping()
    }

    /// Quote character the file already uses for module specifiers
    pub fn quote(&self) -> char {
        for stmt in &self.program.body {
            let literal = match stmt {
                Statement::ImportDeclaration(decl) => Some(decl.source.span),
                Statement::VariableDeclaration(decl) => decl
                    .declarations
                    .iter()
                    .find_map(|d| match &d.init {
                        Some(Expression::CallExpression(call)) => match call.arguments.first() {
                            Some(Argument::StringLiteral(lit)) => Some(lit.span),
                            _ => None,
                        },
                        _ => None,
                    }),
                _ => None,
            };
            if let Some(span) = literal {
                if let Some(c @ ('\'' | '"')) = self.text(span).chars().next() {
                    return c;
                }
            }
        }
        '\''
    }

    /// Render a string literal in the file's quote style
    pub fn string_literal(&self, value: &str) -> String {
        quote_string(value, self.quote())
    }
}

/// Parse `source` and run `f` against the resulting module
///
/// Fails with [`MigrateError::Parse`] when the parser reports any error; rules
/// never rewrite a file they could not fully parse.
pub fn with_module<R>(
    source: &str,
    options: ParseOptions,
    f: impl FnOnce(&Module<'_, '_>) -> R,
) -> Result<R> {
    let allocator = Allocator::default();
    let ParserReturn {
        program,
        errors,
        panicked,
        ..
    } = Parser::new(&allocator, source, options.source_type).parse();

    if panicked || !errors.is_empty() {
        let reason = errors
            .iter()
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(MigrateError::parse(if reason.is_empty() {
            "parser aborted".to_string()
        } else {
            reason
        }));
    }

    let semantic_ret = SemanticBuilder::new().build(&program);
    let semantic = semantic_ret.semantic;

    let module = Module {
        source,
        program: &program,
        semantic: &semantic,
    };
    Ok(f(&module))
}
