//! Per-file scopes.
//!
//! A `FileScope` indexes the top-level statements of one file: the types and
//! values it declares, the names it imports and the names it exports. Building
//! a scope never fails and never looks at other files; re-exports are recorded
//! with their source and followed lazily by the resolver.

use std::fmt;
use std::rc::Rc;

use bumpalo::Bump;
use rshape_ast::node::*;
use rshape_ast::types::ModifierFlags;
use rshape_core::arena::alloc_slice;
use rshape_core::collections::FxIndexMap;
use rshape_core::text::TextRange;

/// A declaration a name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    /// All `interface` declarations of one name, in source order.
    Interface(&'a [&'a InterfaceDeclaration<'a>]),
    TypeAlias(&'a TypeAliasDeclaration<'a>),
    Class(&'a ClassDeclaration<'a>),
    Enum(&'a EnumDeclaration<'a>),
    /// All `namespace` declarations of one name, in source order.
    Namespace(&'a [&'a ModuleDeclaration<'a>]),
    Function(&'a FunctionDeclaration<'a>),
    Variable(&'a VariableDeclaration<'a>),

    // The remaining variants are produced by resolution only.
    /// A type argument substituted for a type parameter.
    TypeArgument(&'a TypeNode<'a>),
    /// A type parameter with nothing substituted for it.
    TypeParameter(&'a str),
    EnumMember(&'a EnumDeclaration<'a>, &'a EnumMember<'a>),
    /// `ns` in `import * as ns`. The resolved scope is the module's scope.
    ModuleNamespace,
}

impl<'a> Declaration<'a> {
    /// Address identity of the declaration; `0` for parameters and module
    /// namespaces, which are compared by name and scope instead.
    pub fn id(&self) -> usize {
        fn addr<T>(node: &T) -> usize {
            node as *const T as usize
        }
        match self {
            Declaration::Interface(group) => group.first().map_or(0, |decl| addr(*decl)),
            Declaration::TypeAlias(decl) => addr(*decl),
            Declaration::Class(decl) => addr(*decl),
            Declaration::Enum(decl) => addr(*decl),
            Declaration::Namespace(group) => group.first().map_or(0, |decl| addr(*decl)),
            Declaration::Function(decl) => addr(*decl),
            Declaration::Variable(decl) => addr(*decl),
            Declaration::TypeArgument(node) => addr(*node),
            Declaration::EnumMember(_, member) => addr(*member),
            Declaration::TypeParameter(_) | Declaration::ModuleNamespace => 0,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Interface(_) => "interface",
            Declaration::TypeAlias(_) => "type alias",
            Declaration::Class(_) => "class",
            Declaration::Enum(_) => "enum",
            Declaration::Namespace(_) => "namespace",
            Declaration::Function(_) => "function",
            Declaration::Variable(_) => "variable",
            Declaration::TypeArgument(_) => "type argument",
            Declaration::TypeParameter(_) => "type parameter",
            Declaration::EnumMember(..) => "enum member",
            Declaration::ModuleNamespace => "module namespace",
        }
    }
}

/// A module specifier as written, with its range for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSource<'a> {
    pub specifier: &'a str,
    pub range: TextRange,
}

impl<'a> ModuleSource<'a> {
    fn from_literal(literal: &StringLiteral<'a>) -> Self {
        Self { specifier: literal.text, range: literal.data.range }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportedName<'a> {
    Named(&'a str),
    Default,
    /// `import * as ns`
    Namespace,
}

#[derive(Debug, Clone, Copy)]
pub struct ImportBinding<'a> {
    pub source: ModuleSource<'a>,
    pub imported: ImportedName<'a>,
    pub is_type_only: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum ExportBinding<'a> {
    /// A local name (declaration or import) exported under some name.
    Local(&'a str),
    /// `export { name as x } from 'source'`
    ReExport { source: ModuleSource<'a>, name: &'a str },
    /// `export * as x from 'source'`
    Namespace { source: ModuleSource<'a> },
}

/// The scope of a file or of a namespace body.
pub struct FileScope<'a> {
    pub file_name: String,
    pub source: Option<&'a SourceFile<'a>>,
    /// Built from a global type file: only global declarations are recorded.
    pub is_global: bool,
    /// Inside a `.d.ts` file or a `declare namespace`: every member counts as
    /// exported.
    pub is_ambient: bool,
    /// The enclosing scope of a namespace body.
    pub parent: Option<Rc<FileScope<'a>>>,
    pub types: FxIndexMap<&'a str, Declaration<'a>>,
    pub values: FxIndexMap<&'a str, Declaration<'a>>,
    pub namespaces: FxIndexMap<&'a str, Declaration<'a>>,
    pub imports: FxIndexMap<&'a str, ImportBinding<'a>>,
    pub exports: FxIndexMap<&'a str, ExportBinding<'a>>,
    pub export_all_sources: Vec<ModuleSource<'a>>,
}

impl<'a> FileScope<'a> {
    /// The scope of a module file.
    pub fn build(arena: &'a Bump, source: &'a SourceFile<'a>) -> Self {
        let mut builder = ScopeBuilder::new(source.is_declaration_file);
        builder.add_statements(source.statements, false);
        builder.finish(arena, source.file_name.to_string(), Some(source), false, None)
    }

    /// The scope of a global type file. A script (no imports or exports)
    /// contributes all of its declarations; a module contributes only the
    /// contents of its `declare global { }` blocks.
    pub fn build_global(arena: &'a Bump, source: &'a SourceFile<'a>) -> Self {
        let mut builder = ScopeBuilder::new(true);
        if source.is_external_module() {
            for statement in source.statements {
                if let Statement::ModuleDeclaration(module) = statement {
                    if module.is_global_augmentation() {
                        builder.add_statements(module.statements(), true);
                    }
                }
            }
        } else {
            builder.add_statements(source.statements, true);
        }
        builder.finish(arena, source.file_name.to_string(), Some(source), true, None)
    }

    /// The member scope of one or more merged namespace declarations.
    pub fn build_namespace(
        arena: &'a Bump,
        parent: &Rc<FileScope<'a>>,
        declarations: &[&'a ModuleDeclaration<'a>],
    ) -> Self {
        let ambient = parent.is_ambient
            || declarations.iter().any(|decl| decl.data.has_modifier(ModifierFlags::AMBIENT));
        let mut builder = ScopeBuilder::new(ambient);
        for declaration in declarations {
            match &declaration.body {
                Some(ModuleBody::Block(block)) => builder.add_statements(block.statements, ambient),
                Some(ModuleBody::Namespace(inner)) => builder.add_module(inner, true),
                None => {}
            }
        }
        builder.finish(
            arena,
            parent.file_name.clone(),
            parent.source,
            parent.is_global,
            Some(Rc::clone(parent)),
        )
    }

    /// Address identity of the scope.
    pub fn id(&self) -> usize {
        self as *const Self as usize
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.values.is_empty()
            && self.namespaces.is_empty()
            && self.imports.is_empty()
            && self.exports.is_empty()
            && self.export_all_sources.is_empty()
    }
}

impl fmt::Debug for FileScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileScope")
            .field("file_name", &self.file_name)
            .field("is_global", &self.is_global)
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .field("namespaces", &self.namespaces.keys().collect::<Vec<_>>())
            .field("imports", &self.imports.keys().collect::<Vec<_>>())
            .field("exports", &self.exports.keys().collect::<Vec<_>>())
            .field("export_all_sources", &self.export_all_sources)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// The name given to anonymous default-exported declarations.
pub const DEFAULT_EXPORT: &str = "default";

#[derive(Default)]
struct ScopeBuilder<'a> {
    ambient: bool,
    types: FxIndexMap<&'a str, Declaration<'a>>,
    values: FxIndexMap<&'a str, Declaration<'a>>,
    interfaces: FxIndexMap<&'a str, Vec<&'a InterfaceDeclaration<'a>>>,
    namespaces: FxIndexMap<&'a str, Vec<&'a ModuleDeclaration<'a>>>,
    imports: FxIndexMap<&'a str, ImportBinding<'a>>,
    exports: FxIndexMap<&'a str, ExportBinding<'a>>,
    export_all_sources: Vec<ModuleSource<'a>>,
}

impl<'a> ScopeBuilder<'a> {
    fn new(ambient: bool) -> Self {
        Self { ambient, ..Self::default() }
    }

    fn add_statements(&mut self, statements: &'a [Statement<'a>], export_all: bool) {
        for statement in statements {
            self.add_statement(statement, export_all);
        }
    }

    fn add_statement(&mut self, statement: &'a Statement<'a>, export_all: bool) {
        match statement {
            Statement::ImportDeclaration(import) => self.add_import(import),
            Statement::ExportDeclaration(export) => self.add_export(export),
            Statement::ExportAssignment(assignment) => {
                if let (false, Expression::Identifier(id)) = (assignment.is_export_equals, assignment.expression) {
                    self.exports.insert(DEFAULT_EXPORT, ExportBinding::Local(id.text));
                }
            }
            Statement::InterfaceDeclaration(decl) => {
                let name = decl.name.text;
                self.interfaces.entry(name).or_default().push(decl);
                self.export_if(&decl.data, name, export_all);
            }
            Statement::TypeAliasDeclaration(decl) => {
                let name = decl.name.text;
                self.types.entry(name).or_insert(Declaration::TypeAlias(decl));
                self.export_if(&decl.data, name, export_all);
            }
            Statement::ClassDeclaration(decl) => {
                let name = decl.name.map_or(DEFAULT_EXPORT, |id| id.text);
                self.types.entry(name).or_insert(Declaration::Class(decl));
                self.values.entry(name).or_insert(Declaration::Class(decl));
                self.export_if(&decl.data, name, export_all);
            }
            Statement::EnumDeclaration(decl) => {
                let name = decl.name.text;
                self.types.entry(name).or_insert(Declaration::Enum(decl));
                self.values.entry(name).or_insert(Declaration::Enum(decl));
                self.export_if(&decl.data, name, export_all);
            }
            Statement::FunctionDeclaration(decl) => {
                let name = decl.name.map_or(DEFAULT_EXPORT, |id| id.text);
                self.values.entry(name).or_insert(Declaration::Function(decl));
                self.export_if(&decl.data, name, export_all);
            }
            Statement::VariableStatement(statement) => {
                for decl in statement.declaration_list.declarations {
                    if let Some(name) = decl.name.as_identifier() {
                        self.values.entry(name).or_insert(Declaration::Variable(decl));
                        self.export_if(&statement.data, name, export_all);
                    }
                }
            }
            Statement::ModuleDeclaration(decl) => {
                let exported = export_all || decl.data.has_modifier(ModifierFlags::EXPORT);
                self.add_module(decl, exported);
            }
            Statement::Unsupported(_) => {}
        }
    }

    /// Record a namespace. String-named ambient modules and global
    /// augmentations are not part of the file's own scope.
    fn add_module(&mut self, decl: &'a ModuleDeclaration<'a>, exported: bool) {
        let ModuleName::Identifier(id) = decl.name else {
            return;
        };
        if decl.is_global_augmentation() {
            return;
        }
        self.namespaces.entry(id.text).or_default().push(decl);
        if exported {
            self.exports.insert(id.text, ExportBinding::Local(id.text));
        }
    }

    fn export_if(&mut self, data: &NodeData, name: &'a str, export_all: bool) {
        if data.has_modifier(ModifierFlags::DEFAULT) {
            self.exports.insert(DEFAULT_EXPORT, ExportBinding::Local(name));
        } else if export_all || self.ambient && data.has_modifier(ModifierFlags::AMBIENT) {
            self.exports.entry(name).or_insert(ExportBinding::Local(name));
        } else if data.has_modifier(ModifierFlags::EXPORT) {
            self.exports.insert(name, ExportBinding::Local(name));
        }
    }

    fn add_import(&mut self, import: &'a ImportDeclaration<'a>) {
        let Some(clause) = &import.import_clause else {
            return;
        };
        let source = ModuleSource::from_literal(&import.module_specifier);
        if let Some(name) = clause.name {
            self.imports.insert(
                name.text,
                ImportBinding { source, imported: ImportedName::Default, is_type_only: clause.is_type_only },
            );
        }
        match &clause.named_bindings {
            Some(NamedImportBindings::NamespaceImport(ns)) => {
                self.imports.insert(
                    ns.name.text,
                    ImportBinding { source, imported: ImportedName::Namespace, is_type_only: clause.is_type_only },
                );
            }
            Some(NamedImportBindings::NamedImports(named)) => {
                for specifier in named.elements {
                    let imported = specifier.property_name.unwrap_or(specifier.name).text;
                    let imported = if imported == DEFAULT_EXPORT {
                        ImportedName::Default
                    } else {
                        ImportedName::Named(imported)
                    };
                    self.imports.insert(
                        specifier.name.text,
                        ImportBinding {
                            source,
                            imported,
                            is_type_only: clause.is_type_only || specifier.is_type_only,
                        },
                    );
                }
            }
            None => {}
        }
    }

    fn add_export(&mut self, export: &'a ExportDeclaration<'a>) {
        let source = export.module_specifier.as_ref().map(ModuleSource::from_literal);
        match (&export.export_clause, source) {
            (None, Some(source)) => self.export_all_sources.push(source),
            (None, None) => {}
            (Some(NamedExportBindings::NamespaceExport(ns)), Some(source)) => {
                self.exports.insert(ns.name.text, ExportBinding::Namespace { source });
            }
            (Some(NamedExportBindings::NamespaceExport(_)), None) => {}
            (Some(NamedExportBindings::NamedExports(named)), source) => {
                for specifier in named.elements {
                    let binding = match source {
                        Some(source) => ExportBinding::ReExport { source, name: specifier.local_name() },
                        None => ExportBinding::Local(specifier.local_name()),
                    };
                    self.exports.insert(specifier.name.text, binding);
                }
            }
        }
    }

    fn finish(
        self,
        arena: &'a Bump,
        file_name: String,
        source: Option<&'a SourceFile<'a>>,
        is_global: bool,
        parent: Option<Rc<FileScope<'a>>>,
    ) -> FileScope<'a> {
        let mut types = self.types;
        for (name, group) in self.interfaces {
            let group = Declaration::Interface(alloc_slice(arena, group));
            match types.get(name) {
                // An interface merged with a class keeps the class.
                Some(Declaration::Class(_)) => {}
                _ => {
                    types.insert(name, group);
                }
            }
        }
        let namespaces = self
            .namespaces
            .into_iter()
            .map(|(name, group)| (name, Declaration::Namespace(alloc_slice(arena, group))))
            .collect();
        FileScope {
            file_name,
            source,
            is_global,
            is_ambient: self.ambient,
            parent,
            types,
            values: self.values,
            namespaces,
            imports: self.imports,
            exports: self.exports,
            export_all_sources: self.export_all_sources,
        }
    }
}
