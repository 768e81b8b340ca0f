//! The parser as a syntax tree provider for the resolver.

use bumpalo::Bump;
use rshape_ast::node::SourceFile;
use rshape_ast::SyntaxTreeProvider;

use crate::parser::Parser;

/// Parses files on demand. Syntax errors never fail a parse; they are logged
/// and the recovered tree is returned.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationParser;

impl DeclarationParser {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxTreeProvider for DeclarationParser {
    fn parse_source_file<'a>(&self, arena: &'a Bump, file_name: &str, source_text: &str) -> &'a SourceFile<'a> {
        let mut parser = Parser::new(arena, file_name, source_text);
        let source_file = parser.parse_source_file();
        let diagnostics = parser.take_diagnostics();
        if !diagnostics.is_empty() {
            tracing::debug!(
                file = file_name,
                errors = diagnostics.error_count(),
                "parsed with syntax errors"
            );
            for diagnostic in diagnostics.diagnostics() {
                tracing::trace!(%diagnostic, "syntax diagnostic");
            }
        }
        source_file
    }
}
