//! rshape_parser: Declaration-level parser for TypeScript modules.
//!
//! Builds an arena-allocated syntax tree of a module's imports, exports and
//! declarations together with the full type-expression grammar. Runtime code
//! is recognized only well enough to be skipped.

mod parser;
mod provider;
mod skip;
mod type_parser;
mod utilities;

use bumpalo::Bump;
use rshape_ast::node::{SourceFile, TypeNode};
use rshape_diagnostics::DiagnosticCollection;

pub use parser::Parser;
pub use provider::DeclarationParser;

/// Parse a whole file, returning the tree and the syntax diagnostics.
pub fn parse_source_file<'a>(
    arena: &'a Bump,
    file_name: &str,
    source_text: &str,
) -> (&'a SourceFile<'a>, DiagnosticCollection) {
    let mut parser = Parser::new(arena, file_name, source_text);
    let source_file = parser.parse_source_file();
    (source_file, parser.take_diagnostics())
}

/// Parse a standalone type expression such as `Props['size'] | undefined`.
pub fn parse_type_expression<'a>(
    arena: &'a Bump,
    file_name: &str,
    text: &str,
) -> Result<&'a TypeNode<'a>, DiagnosticCollection> {
    let mut parser = Parser::new(arena, file_name, text);
    let type_node = parser.parse_type_expression();
    let diagnostics = parser.take_diagnostics();
    if diagnostics.has_errors() {
        Err(diagnostics)
    } else {
        Ok(type_node)
    }
}
