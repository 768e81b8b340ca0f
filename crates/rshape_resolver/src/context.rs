//! The resolution context: capabilities, options and caches.
//!
//! One context serves one compilation. It loads and parses files on demand
//! through its filesystem and syntax-tree provider, builds each file's scope
//! once, and memoizes resolved references and decompositions in side tables
//! keyed by node, scope and binding-set identity. All caches sit behind
//! `RefCell`s: evaluation is single-threaded and depth-first, and no borrow is
//! held across a recursive call.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bumpalo::Bump;
use rshape_ast::node::*;
use rshape_ast::syntax_kind::SyntaxKind;
use rshape_ast::SyntaxTreeProvider;
use rshape_core::arena::alloc_str;
use rshape_core::collections::{FxHashMap, FxIndexSet};
use rshape_core::text::TextRange;
use rshape_tspath::{is_relative_specifier, normalize_path, relative_import_candidates, resolve_relative_specifier};
use tracing::{debug, trace};

use crate::bindings::Bindings;
use crate::error::{Location, ResolveError};
use crate::fs::FileSystem;
use crate::recursion::{RecursionGuard, RecursionResult};
use crate::resolve::{LookupKey, ResolvedReference};
use crate::scope::{FileScope, ModuleSource};
use crate::shape::DecomposedType;
use crate::DEFAULT_MAX_DEPTH;

/// Resolves bare import specifiers (`vue`, `@scope/pkg/types`) to file paths.
pub trait ModuleResolver {
    fn resolve_module(&self, specifier: &str, importing_file: &str) -> Option<String>;
}

impl<F> ModuleResolver for F
where
    F: Fn(&str, &str) -> Option<String>,
{
    fn resolve_module(&self, specifier: &str, importing_file: &str) -> Option<String> {
        self(specifier, importing_file)
    }
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Maximum number of nested evaluation frames.
    pub max_depth: u32,
    /// Files whose global declarations are visible from every scope.
    pub global_type_files: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            global_type_files: Vec::new(),
        }
    }
}

/// Memo key: node identity, scope identity, binding-set identity.
pub(crate) type MemoKey = (usize, usize, usize);

/// A memoized value. The bindings are kept alive so their address cannot be
/// reused by another set while the entry exists.
pub(crate) struct Memo<'a, T> {
    _bindings: Bindings<'a>,
    pub(crate) value: T,
}

pub struct TypeResolutionContext<'a> {
    pub(crate) arena: &'a Bump,
    fs: Box<dyn FileSystem + 'a>,
    provider: Box<dyn SyntaxTreeProvider + 'a>,
    module_resolver: Option<Box<dyn ModuleResolver + 'a>>,
    pub(crate) options: ResolveOptions,

    files: RefCell<FxHashMap<String, &'a SourceFile<'a>>>,
    scopes: RefCell<FxHashMap<String, Rc<FileScope<'a>>>>,
    global_scopes: RefCell<FxHashMap<String, Rc<FileScope<'a>>>>,
    namespace_scopes: RefCell<FxHashMap<(usize, usize), Rc<FileScope<'a>>>>,
    import_sources: RefCell<FxHashMap<(String, String), String>>,
    dependencies: RefCell<FxIndexSet<String>>,
    literal_types: RefCell<FxHashMap<String, &'a TypeNode<'a>>>,

    pub(crate) reference_memo: RefCell<FxHashMap<MemoKey, Memo<'a, Option<ResolvedReference<'a>>>>>,
    pub(crate) decomposition_memo: RefCell<FxHashMap<MemoKey, Memo<'a, DecomposedType<'a>>>>,

    /// Name lookups on the current stack.
    pub(crate) resolving: RefCell<RecursionGuard<LookupKey<'a>>>,
    /// Reference expansions on the current stack.
    pub(crate) expanding: RefCell<RecursionGuard<MemoKey>>,
    depth: Cell<u32>,
}

impl<'a> TypeResolutionContext<'a> {
    pub fn new(
        arena: &'a Bump,
        fs: impl FileSystem + 'a,
        provider: impl SyntaxTreeProvider + 'a,
    ) -> Self {
        Self::with_options(arena, fs, provider, ResolveOptions::default())
    }

    pub fn with_options(
        arena: &'a Bump,
        fs: impl FileSystem + 'a,
        provider: impl SyntaxTreeProvider + 'a,
        options: ResolveOptions,
    ) -> Self {
        let max_depth = options.max_depth;
        Self {
            arena,
            fs: Box::new(fs),
            provider: Box::new(provider),
            module_resolver: None,
            options,
            files: RefCell::default(),
            scopes: RefCell::default(),
            global_scopes: RefCell::default(),
            namespace_scopes: RefCell::default(),
            import_sources: RefCell::default(),
            dependencies: RefCell::default(),
            literal_types: RefCell::default(),
            reference_memo: RefCell::default(),
            decomposition_memo: RefCell::default(),
            resolving: RefCell::new(RecursionGuard::new(max_depth)),
            expanding: RefCell::new(RecursionGuard::new(max_depth)),
            depth: Cell::new(0),
        }
    }

    pub fn register_module_resolver(&mut self, resolver: impl ModuleResolver + 'a) {
        self.module_resolver = Some(Box::new(resolver));
    }

    pub fn add_global_type_file(&mut self, path: &str) {
        let path = normalize_path(path);
        if !self.options.global_type_files.contains(&path) {
            self.options.global_type_files.push(path);
        }
        self.global_scopes.borrow_mut().clear();
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    // ========================================================================
    // Files and scopes
    // ========================================================================

    /// The parsed tree of a file. An unreadable file parses as empty.
    pub fn source_file(&self, path: &str) -> &'a SourceFile<'a> {
        let path = normalize_path(path);
        if let Some(&file) = self.files.borrow().get(&path) {
            return file;
        }
        let text = self.fs.read_file(&path).unwrap_or_else(|| {
            debug!(file = %path, "file unreadable, treating as empty");
            String::new()
        });
        let file = self.provider.parse_source_file(self.arena, &path, &text);
        debug!(file = %path, statements = file.statements.len(), "loaded file");
        self.files.borrow_mut().insert(path, file);
        file
    }

    /// The scope of a file, built once and cached by normalized path.
    pub fn file_scope(&self, path: &str) -> Rc<FileScope<'a>> {
        let path = normalize_path(path);
        if let Some(scope) = self.scopes.borrow().get(&path) {
            return Rc::clone(scope);
        }
        let file = self.source_file(&path);
        self.cache_scope(path, FileScope::build(self.arena, file))
    }

    /// The scope of a tree the host parsed itself.
    pub fn scope_for_source_file(&self, file: &'a SourceFile<'a>) -> Rc<FileScope<'a>> {
        let path = normalize_path(file.file_name);
        if let Some(scope) = self.scopes.borrow().get(&path) {
            return Rc::clone(scope);
        }
        self.files.borrow_mut().insert(path.clone(), file);
        self.cache_scope(path, FileScope::build(self.arena, file))
    }

    fn cache_scope(&self, path: String, scope: FileScope<'a>) -> Rc<FileScope<'a>> {
        debug!(
            file = %path,
            types = scope.types.len(),
            imports = scope.imports.len(),
            exports = scope.exports.len(),
            "built scope"
        );
        let scope = Rc::new(scope);
        self.scopes.borrow_mut().insert(path, Rc::clone(&scope));
        scope
    }

    /// Scopes of the registered global type files, in registration order.
    pub fn global_scopes(&self) -> Vec<Rc<FileScope<'a>>> {
        self.options
            .global_type_files
            .iter()
            .map(|path| {
                if let Some(scope) = self.global_scopes.borrow().get(path) {
                    return Rc::clone(scope);
                }
                let file = self.source_file(path);
                let scope = Rc::new(FileScope::build_global(self.arena, file));
                debug!(file = %path, types = scope.types.len(), "built global scope");
                self.global_scopes.borrow_mut().insert(path.clone(), Rc::clone(&scope));
                scope
            })
            .collect()
    }

    /// The member scope of a namespace declared in `parent`.
    pub fn namespace_scope(
        &self,
        parent: &Rc<FileScope<'a>>,
        declarations: &[&'a ModuleDeclaration<'a>],
    ) -> Rc<FileScope<'a>> {
        let first = declarations.first().map_or(0, |decl| *decl as *const ModuleDeclaration as usize);
        let key = (parent.id(), first);
        if let Some(scope) = self.namespace_scopes.borrow().get(&key) {
            return Rc::clone(scope);
        }
        let scope = Rc::new(FileScope::build_namespace(self.arena, parent, declarations));
        self.namespace_scopes.borrow_mut().insert(key, Rc::clone(&scope));
        scope
    }

    /// Resolve an import source to the imported file's scope.
    ///
    /// Relative specifiers probe a fixed list of candidates; bare specifiers go
    /// through the registered module resolver.
    pub fn import_scope(
        &self,
        scope: &FileScope<'a>,
        source: ModuleSource<'a>,
    ) -> Result<Rc<FileScope<'a>>, ResolveError> {
        let path = self.resolve_import_source(&scope.file_name, source)?;
        Ok(self.file_scope(&path))
    }

    fn resolve_import_source(&self, importing_file: &str, source: ModuleSource<'a>) -> Result<String, ResolveError> {
        let key = (importing_file.to_string(), source.specifier.to_string());
        if let Some(path) = self.import_sources.borrow().get(&key) {
            return Ok(path.clone());
        }

        let location = || Location::new(importing_file, source.range);
        let resolved = if is_relative_specifier(source.specifier) {
            let base = resolve_relative_specifier(importing_file, source.specifier);
            relative_import_candidates(&base)
                .into_iter()
                .find(|candidate| self.fs.file_exists(candidate))
        } else {
            let resolver = self.module_resolver.as_ref().ok_or_else(|| {
                ResolveError::ModuleResolverNotRegistered {
                    specifier: source.specifier.to_string(),
                    location: location(),
                }
            })?;
            resolver.resolve_module(source.specifier, importing_file)
        };
        let resolved = resolved.ok_or_else(|| ResolveError::ImportSourceNotFound {
            specifier: source.specifier.to_string(),
            location: location(),
        })?;

        let path = normalize_path(&self.fs.realpath(&resolved).unwrap_or(resolved));
        trace!(from = importing_file, specifier = source.specifier, to = %path, "resolved import source");
        self.dependencies.borrow_mut().insert(path.clone());
        self.import_sources.borrow_mut().insert(key, path.clone());
        Ok(path)
    }

    /// Files reached through imports so far, in discovery order.
    pub fn dependencies(&self) -> Vec<String> {
        self.dependencies.borrow().iter().cloned().collect()
    }

    /// Drop everything cached for a changed file.
    ///
    /// Scopes of other files stay cached, but all memo tables are cleared
    /// since their entries may have looked through the changed file.
    pub fn invalidate(&self, path: &str) {
        let path = normalize_path(path);
        let had_scope = self.scopes.borrow_mut().remove(&path).is_some();
        self.files.borrow_mut().remove(&path);
        self.global_scopes.borrow_mut().remove(&path);
        self.namespace_scopes.borrow_mut().clear();
        self.import_sources.borrow_mut().clear();
        self.reference_memo.borrow_mut().clear();
        self.decomposition_memo.borrow_mut().clear();
        self.resolving.borrow_mut().clear();
        self.expanding.borrow_mut().clear();
        debug!(file = %path, had_scope, "invalidated");
    }

    // ========================================================================
    // Evaluation helpers
    // ========================================================================

    pub(crate) fn location(&self, scope: &FileScope<'a>, range: TextRange) -> Location {
        Location::new(scope.file_name.clone(), range)
    }

    /// Run one nested evaluation step, failing once the depth ceiling is hit.
    pub(crate) fn frame<T>(
        &self,
        scope: &FileScope<'a>,
        range: TextRange,
        f: impl FnOnce() -> Result<T, ResolveError>,
    ) -> Result<T, ResolveError> {
        let depth = self.depth.get();
        if depth >= self.options.max_depth {
            return Err(self.too_complex(scope, range));
        }
        self.depth.set(depth + 1);
        let result = f();
        self.depth.set(depth);
        result
    }

    pub(crate) fn too_complex(&self, scope: &FileScope<'a>, range: TextRange) -> ResolveError {
        ResolveError::TooComplex {
            max_depth: self.options.max_depth,
            location: self.location(scope, range),
        }
    }

    /// Expand a reference once per `(key)` on the stack. A re-entrant
    /// expansion is a cycle and yields `on_cycle`.
    pub(crate) fn expand<T>(
        &self,
        key: MemoKey,
        scope: &FileScope<'a>,
        range: TextRange,
        on_cycle: impl FnOnce() -> T,
        f: impl FnOnce() -> Result<T, ResolveError>,
    ) -> Result<T, ResolveError> {
        let entered = self.expanding.borrow_mut().enter(key);
        match entered {
            RecursionResult::Entered => {
                let result = f();
                self.expanding.borrow_mut().leave(key);
                result
            }
            RecursionResult::Cycle => {
                trace!(file = %scope.file_name, ?range, "reference cycle cut");
                Ok(on_cycle())
            }
            RecursionResult::DepthExceeded => Err(self.too_complex(scope, range)),
        }
    }

    /// Number of cycles cut so far; compared before and after a computation to
    /// decide whether its result is complete.
    pub(crate) fn cycle_count(&self) -> u32 {
        self.expanding.borrow().cycles() + self.resolving.borrow().cycles()
    }

    pub(crate) fn memo<T>(bindings: &Bindings<'a>, value: T) -> Memo<'a, T> {
        Memo { _bindings: bindings.clone(), value }
    }

    /// An interned string literal type, used to bind mapped-type iteration
    /// variables to individual keys.
    pub(crate) fn literal_type(&self, key: &str) -> &'a TypeNode<'a> {
        if let Some(&node) = self.literal_types.borrow().get(key) {
            return node;
        }
        let text = alloc_str(self.arena, key);
        let node: &'a TypeNode<'a> = self.arena.alloc(TypeNode::LiteralType(LiteralTypeNode {
            data: NodeData::synthesized(SyntaxKind::LiteralType),
            literal: LiteralValue::String(text),
        }));
        self.literal_types.borrow_mut().insert(key.to_string(), node);
        node
    }
}
