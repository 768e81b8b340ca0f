//! Arena allocation helpers.
//!
//! Syntax trees are allocated from a bump arena owned by the host for the
//! lifetime of a resolution context. Nodes never run destructors, so anything
//! stored inside a node must be arena-allocated or `Copy`.

use bumpalo::Bump;

/// Move the contents of a `Vec` into the arena and return the slice.
#[inline]
pub fn alloc_slice<T>(arena: &Bump, items: Vec<T>) -> &[T] {
    if items.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(items)
}

/// Copy a string into the arena.
#[inline]
pub fn alloc_str<'a>(arena: &'a Bump, text: &str) -> &'a str {
    if text.is_empty() {
        return "";
    }
    arena.alloc_str(text)
}
