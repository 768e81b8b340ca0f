//! rshape_core: Core utilities shared by the rshape crates.
//!
//! Provides arena helpers, text ranges, line maps, and the hash-map aliases
//! used by the scope tables and shape maps.

pub mod arena;
pub mod collections;
pub mod text;

// Re-export commonly used types
pub use arena::{alloc_slice, alloc_str};
pub use collections::{FxIndexMap, FxIndexSet};
pub use text::{LineMap, TextRange, TextSpan};
