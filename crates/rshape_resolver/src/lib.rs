//! rshape_resolver: Type resolution for component property declarations.
//!
//! Reduces TypeScript type expressions to runtime-checkable shapes:
//! - `scope`: per-file declaration, import and export tables
//! - `resolve`: name lookup across files and namespaces
//! - `decompose`: structural decomposition into property maps
//! - `keys`: reduction to finite sets of string keys
//! - `runtime`: reduction to runtime tags
//! - `assignable`: the narrow assignability check behind conditional types
//!
//! All entry points live on [`TypeResolutionContext`], which owns the caches.

pub mod assignable;
pub mod bindings;
pub mod context;
pub mod decompose;
pub mod error;
pub mod fs;
pub mod keys;
mod recursion;
pub mod resolve;
pub mod runtime;
pub mod scope;
pub mod shape;

pub use bindings::{Bindings, BoundType, ScopedType};
pub use context::{ModuleResolver, ResolveOptions, TypeResolutionContext};
pub use error::{Location, ResolveError};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use resolve::{ResolvedReference, Space};
pub use runtime::{RuntimeTag, RuntimeTags};
pub use scope::{Declaration, ExportBinding, FileScope, ImportBinding, ImportedName};
pub use shape::{CallSignature, DecomposedType, MergeKind, PropertyDescriptor, PropertyType};

/// Default ceiling on nested evaluation frames before resolution fails with
/// "type too complex".
pub const DEFAULT_MAX_DEPTH: u32 = 100;
