//! rshape_ast: syntax tree definitions for declaration-level TypeScript.
//!
//! Defines the node types, the `SyntaxKind` enum, the flag types, and the
//! `SyntaxTreeProvider` seam through which the resolver obtains trees.

pub mod node;
pub mod provider;
pub mod syntax_kind;
pub mod types;

// Re-export key types
pub use node::*;
pub use provider::SyntaxTreeProvider;
pub use syntax_kind::SyntaxKind;
pub use types::*;

/// Comment text that marks the following type reference or heritage entry as
/// one the resolver should skip instead of failing on.
pub const IGNORE_DIRECTIVE: &str = "@rshape-ignore";
