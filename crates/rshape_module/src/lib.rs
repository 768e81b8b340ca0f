//! rshape_module: Module resolution for bare import specifiers.
//!
//! Finds the declaration file an import such as `vue` or `@scope/pkg/types`
//! refers to, following TypeScript's resolution strategies:
//! - `paths` mappings and `baseUrl`
//! - Node10 (classic node_modules walk-up with package.json `types`/`main`)
//! - Node16/NodeNext/Bundler (package.json `exports` with the `types` condition)
//! - Classic (TypeScript's original resolution)
//!
//! [`NodeModuleResolver`] plugs into the resolution context as its
//! [`ModuleResolver`].

mod package_json;
mod tsconfig;

use std::cell::RefCell;
use std::rc::Rc;

use rshape_core::collections::FxHashMap;
use rshape_resolver::{FileSystem, ModuleResolver};
use rshape_tspath::{
    combine_paths, get_directory_path, has_ts_file_extension, is_relative_specifier, normalize_path,
    remove_extension, resolve_relative_specifier, Extension,
};
use tracing::{debug, trace};

pub use package_json::{parse_package_json, PackageExports, PackageJson, EXPORT_CONDITIONS};
pub use tsconfig::{load_tsconfig, strip_json_comments, ConfigError};

/// Module resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleResolutionKind {
    Classic,
    Node10,
    Node16,
    NodeNext,
    #[default]
    Bundler,
}

impl ModuleResolutionKind {
    /// Whether package.json `exports` maps are honored.
    pub fn uses_exports(self) -> bool {
        matches!(self, ModuleResolutionKind::Node16 | ModuleResolutionKind::NodeNext | ModuleResolutionKind::Bundler)
    }
}

/// The result of resolving a module.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    /// The resolved file path.
    pub resolved_file_name: String,
    pub extension: Extension,
    /// Whether resolution went through node_modules.
    pub is_external_library_import: bool,
    /// The package.json consulted, if any.
    pub package_json_path: Option<String>,
}

impl ResolvedModule {
    fn local(path: String) -> Self {
        Self {
            extension: Extension::from_path(&path).unwrap_or(Extension::Ts),
            resolved_file_name: path,
            is_external_library_import: false,
            package_json_path: None,
        }
    }

    fn external(mut self, package_json_path: Option<&str>) -> Self {
        self.is_external_library_import = true;
        self.package_json_path = package_json_path.map(str::to_string);
        self
    }
}

/// Module resolution options.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolutionOptions {
    pub kind: ModuleResolutionKind,
    /// Absolute directory bare specifiers are also looked up in.
    pub base_url: Option<String>,
    /// `paths` patterns with their substitutions, in declaration order.
    pub paths: Vec<(String, Vec<String>)>,
    /// Directory `paths` substitutions resolve against when there is no
    /// `base_url`: the directory of the tsconfig declaring them.
    pub paths_base: Option<String>,
}

/// Extensions probed for declarations, in order.
const TS_EXTENSIONS: &[Extension] = &[Extension::Ts, Extension::Tsx, Extension::Dts];

/// Declaration files that stand next to an ESM/CJS entry point.
const DECLARATION_SUFFIXES: &[(&str, &[&str])] = &[(".mjs", &[".d.mts", ".mts"]), (".cjs", &[".d.cts", ".cts"])];

/// TypeScript extensions of ESM/CJS modules.
const MODULE_TS_SUFFIXES: &[&str] = &[".d.mts", ".d.cts", ".mts", ".cts"];

/// Split a module name into package name and subpath.
/// e.g. "@scope/pkg/sub/path" -> ("@scope/pkg", "sub/path")
/// e.g. "lodash/fp" -> ("lodash", "fp")
fn split_module_name(module_name: &str) -> (&str, &str) {
    let package_end = if module_name.starts_with('@') {
        module_name.match_indices('/').nth(1).map(|(i, _)| i)
    } else {
        module_name.find('/')
    };
    match package_end {
        Some(end) => (&module_name[..end], &module_name[end + 1..]),
        None => (module_name, ""),
    }
}

/// The `@types` package name for a package: `@scope/pkg` -> `scope__pkg`.
fn types_package_name(package_name: &str) -> String {
    match package_name.strip_prefix('@') {
        Some(scoped) => scoped.replacen('/', "__", 1),
        None => package_name.to_string(),
    }
}

/// Resolves bare specifiers against a project on a [`FileSystem`].
pub struct NodeModuleResolver<F> {
    fs: F,
    options: ModuleResolutionOptions,
    packages: RefCell<FxHashMap<String, Option<Rc<PackageJson>>>>,
}

impl<F: FileSystem> NodeModuleResolver<F> {
    pub fn new(fs: F, options: ModuleResolutionOptions) -> Self {
        Self { fs, options, packages: RefCell::default() }
    }

    pub fn options(&self) -> &ModuleResolutionOptions {
        &self.options
    }

    /// Resolve a module name imported from `containing_file`.
    pub fn resolve(&self, module_name: &str, containing_file: &str) -> Option<ResolvedModule> {
        trace!(module_name, containing_file, "resolving module");
        let resolved = self.try_path_mappings(module_name).or_else(|| match self.options.kind {
            ModuleResolutionKind::Classic => self.resolve_classic(module_name, containing_file),
            _ => self.resolve_node(module_name, containing_file),
        });
        match &resolved {
            Some(module) => debug!(module_name, file = %module.resolved_file_name, "resolved module"),
            None => debug!(module_name, containing_file, "module not found"),
        }
        resolved
    }

    // ========================================================================
    // File probing
    // ========================================================================

    fn try_file(&self, path: &str) -> Option<ResolvedModule> {
        let declaration_like =
            has_ts_file_extension(path) || MODULE_TS_SUFFIXES.iter().any(|suffix| path.ends_with(suffix));
        (declaration_like && self.fs.file_exists(path)).then(|| ResolvedModule::local(path.to_string()))
    }

    /// The path itself, then with each extension, then as a directory index.
    /// A JavaScript extension is swapped for its declaration counterparts.
    fn try_file_extensions(&self, candidate: &str) -> Option<ResolvedModule> {
        if let Some(resolved) = self.try_file(candidate) {
            return Some(resolved);
        }
        if MODULE_TS_SUFFIXES.iter().any(|suffix| candidate.ends_with(suffix)) {
            return None;
        }
        for (suffix, replacements) in DECLARATION_SUFFIXES {
            if let Some(stem) = candidate.strip_suffix(suffix) {
                return replacements.iter().find_map(|ext| self.try_file(&format!("{stem}{ext}")));
            }
        }
        let base = remove_extension(candidate);
        TS_EXTENSIONS
            .iter()
            .find_map(|ext| self.try_file(&format!("{base}{}", ext.as_str())))
            .or_else(|| {
                TS_EXTENSIONS
                    .iter()
                    .find_map(|ext| self.try_file(&format!("{candidate}/index{}", ext.as_str())))
            })
    }

    fn package_json(&self, path: &str) -> Option<Rc<PackageJson>> {
        if let Some(cached) = self.packages.borrow().get(path) {
            return cached.clone();
        }
        let package = self
            .fs
            .read_file(path)
            .and_then(|content| parse_package_json(&content))
            .map(Rc::new);
        self.packages.borrow_mut().insert(path.to_string(), package.clone());
        package
    }

    // ========================================================================
    // Strategies
    // ========================================================================

    /// `paths` patterns: an exact pattern first, then the wildcard pattern
    /// with the longest prefix.
    fn try_path_mappings(&self, module_name: &str) -> Option<ResolvedModule> {
        let base = self.options.base_url.as_deref().or(self.options.paths_base.as_deref())?;
        let exact = self
            .options
            .paths
            .iter()
            .find(|(pattern, _)| pattern == module_name)
            .map(|(_, substitutions)| (substitutions, ""));
        let wildcard = || {
            self.options
                .paths
                .iter()
                .filter_map(|(pattern, substitutions)| {
                    let (prefix, suffix) = pattern.split_once('*')?;
                    let rest = module_name.strip_prefix(prefix)?.strip_suffix(suffix)?;
                    Some((prefix.len(), substitutions, rest))
                })
                .max_by_key(|(prefix_len, ..)| *prefix_len)
                .map(|(_, substitutions, rest)| (substitutions, rest))
        };
        let (substitutions, rest) = exact.or_else(wildcard)?;
        substitutions.iter().find_map(|substitution| {
            let candidate = normalize_path(&combine_paths(base, &substitution.replace('*', rest)));
            self.try_file_extensions(&candidate)
        })
    }

    fn resolve_node(&self, module_name: &str, containing_file: &str) -> Option<ResolvedModule> {
        if is_relative_specifier(module_name) {
            return self.try_file_extensions(&resolve_relative_specifier(containing_file, module_name));
        }
        if let Some(base_url) = &self.options.base_url {
            let candidate = normalize_path(&combine_paths(base_url, module_name));
            if let Some(resolved) = self.try_file_extensions(&candidate) {
                return Some(resolved);
            }
        }
        self.resolve_node_modules(module_name, &get_directory_path(containing_file))
    }

    /// Walk up from `starting_dir` looking in each `node_modules`, trying the
    /// package itself before its `@types` counterpart.
    fn resolve_node_modules(&self, module_name: &str, starting_dir: &str) -> Option<ResolvedModule> {
        let (package_name, subpath) = split_module_name(module_name);
        let types_name = format!("@types/{}", types_package_name(package_name));
        let mut dir = starting_dir.to_string();
        loop {
            let node_modules = combine_paths(&dir, "node_modules");
            let found = self
                .load_package(&combine_paths(&node_modules, package_name), subpath)
                .or_else(|| self.load_package(&combine_paths(&node_modules, &types_name), subpath));
            if found.is_some() {
                return found;
            }
            let parent = get_directory_path(&dir);
            if parent == dir || parent.is_empty() {
                return None;
            }
            dir = parent;
        }
    }

    fn load_package(&self, package_dir: &str, subpath: &str) -> Option<ResolvedModule> {
        let package_json_path = combine_paths(package_dir, "package.json");
        let package = self.package_json(&package_json_path);

        if let Some(package) = &package {
            if let (true, Some(exports)) = (self.options.kind.uses_exports(), &package.exports) {
                let export_subpath = if subpath.is_empty() { ".".to_string() } else { format!("./{subpath}") };
                // A package with `exports` exposes nothing else.
                let target = exports.resolve(&export_subpath, EXPORT_CONDITIONS)?;
                let candidate = normalize_path(&combine_paths(package_dir, &target));
                return self
                    .try_file_extensions(&candidate)
                    .map(|resolved| resolved.external(Some(&package_json_path)));
            }
        }

        if !subpath.is_empty() {
            return self
                .try_file_extensions(&combine_paths(package_dir, subpath))
                .map(|resolved| resolved.external(package.as_ref().map(|_| package_json_path.as_str())));
        }

        if let Some(package) = &package {
            let entries = [package.types_entry(), package.main.as_deref()];
            for entry in entries.into_iter().flatten() {
                let candidate = normalize_path(&combine_paths(package_dir, entry));
                if let Some(resolved) = self.try_file_extensions(&candidate) {
                    return Some(resolved.external(Some(&package_json_path)));
                }
            }
        }

        TS_EXTENSIONS
            .iter()
            .find_map(|ext| self.try_file(&format!("{package_dir}/index{}", ext.as_str())))
            .map(|resolved| resolved.external(package.as_ref().map(|_| package_json_path.as_str())))
    }

    /// Relative names probe the TypeScript extensions next to the importer;
    /// bare names are looked up in each ancestor directory.
    fn resolve_classic(&self, module_name: &str, containing_file: &str) -> Option<ResolvedModule> {
        if is_relative_specifier(module_name) {
            let candidate = resolve_relative_specifier(containing_file, module_name);
            return TS_EXTENSIONS
                .iter()
                .find_map(|ext| self.try_file(&format!("{candidate}{}", ext.as_str())));
        }
        let mut dir = get_directory_path(containing_file);
        loop {
            let candidate = normalize_path(&combine_paths(&dir, module_name));
            let found = TS_EXTENSIONS
                .iter()
                .find_map(|ext| self.try_file(&format!("{candidate}{}", ext.as_str())));
            if found.is_some() {
                return found;
            }
            let parent = get_directory_path(&dir);
            if parent == dir || parent.is_empty() {
                return None;
            }
            dir = parent;
        }
    }
}

impl<F: FileSystem> ModuleResolver for NodeModuleResolver<F> {
    fn resolve_module(&self, specifier: &str, importing_file: &str) -> Option<String> {
        self.resolve(specifier, importing_file).map(|module| module.resolved_file_name)
    }
}
