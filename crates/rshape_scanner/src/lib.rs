//! rshape_scanner: Tokenizer for TypeScript source text.
//!
//! Produces tokens for the declaration parser with support for:
//! - Cooked string and template literal values
//! - Canonical numeric literal text (`0x10` scans as `16`)
//! - Regular expression rescanning, so runtime code can be skipped safely
//! - Unicode identifiers
//! - The `@rshape-ignore` comment directive

mod char_codes;
mod scanner;

pub use scanner::{format_number, Scanner, ScannerState};
