//! The seam between the resolver and a parser.

use bumpalo::Bump;

use crate::node::SourceFile;

/// Produces syntax trees for source text.
///
/// Trees are allocated in the caller's arena and live as long as it does.
/// Implementations never fail: malformed input yields a partial tree whose
/// unparsable statements are `Statement::Unsupported`.
pub trait SyntaxTreeProvider {
    fn parse_source_file<'a>(&self, arena: &'a Bump, file_name: &str, source_text: &str) -> &'a SourceFile<'a>;
}
