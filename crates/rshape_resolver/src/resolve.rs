//! Name resolution.
//!
//! A single name is looked up in the generic bindings, then the scope's own
//! declarations, its imports, its re-exported names, the enclosing namespace
//! scopes, and finally the global type files. A qualified name `A.B` resolves
//! `A` as a namespace (an imported module, a local namespace or an enum) and
//! then looks `B` up among its exports.

use std::fmt;
use std::rc::Rc;

use rshape_ast::node::*;
use rshape_ast::syntax_kind::SyntaxKind;
use rshape_core::arena::alloc_str;
use rshape_core::text::TextRange;
use tracing::trace;

use crate::bindings::{Bindings, BoundType, ScopedType};
use crate::context::TypeResolutionContext;
use crate::error::ResolveError;
use crate::recursion::RecursionResult;
use crate::scope::{Declaration, ExportBinding, FileScope, ImportedName, DEFAULT_EXPORT};

/// Which declaration space a name is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    Type,
    /// `typeof x` queries.
    Value,
    /// The left side of a qualified name.
    Namespace,
}

/// `(scope, name, space, through exports)`: a lookup in progress.
pub(crate) type LookupKey<'a> = (usize, &'a str, Space, bool);

/// A resolved name. The declaration must be interpreted in `scope` with
/// `bindings`, never in the scope the lookup started from.
#[derive(Clone)]
pub struct ResolvedReference<'a> {
    pub declaration: Declaration<'a>,
    pub scope: Rc<FileScope<'a>>,
    pub bindings: Bindings<'a>,
}

impl<'a> ResolvedReference<'a> {
    fn new(declaration: Declaration<'a>, scope: &Rc<FileScope<'a>>) -> Self {
        Self { declaration, scope: Rc::clone(scope), bindings: Bindings::empty() }
    }
}

impl fmt::Debug for ResolvedReference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedReference")
            .field("declaration", &self.declaration.kind_name())
            .field("file", &self.scope.file_name)
            .field("bindings", &self.bindings)
            .finish()
    }
}

/// Address identity of a node.
pub(crate) fn node_id<T>(node: &T) -> usize {
    node as *const T as usize
}

impl<'a> TypeResolutionContext<'a> {
    /// Resolve a dotted type name such as `Props` or `Types.Props` from `scope`.
    pub fn resolve_type_name(
        &self,
        name: &str,
        scope: &Rc<FileScope<'a>>,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        let parts: Vec<&'a str> = name.split('.').map(|part| alloc_str(self.arena, part)).collect();
        self.resolve(&parts, scope, &Bindings::empty(), Space::Type, TextRange::default())
    }

    /// Resolve the parts of a possibly qualified name.
    pub fn resolve(
        &self,
        parts: &[&'a str],
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
        space: Space,
        range: TextRange,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        let Some((first, rest)) = parts.split_first() else {
            return Ok(None);
        };
        if rest.is_empty() {
            return self.resolve_single(first, scope, bindings, space, range);
        }
        let head = self.resolve_single(first, scope, bindings, Space::Namespace, range)?;
        self.resolve_members(head, rest, space, range)
    }

    /// Walk `parts` as successive members starting from `head`. The last part
    /// is looked up in `space`, the others as namespaces.
    pub(crate) fn resolve_members(
        &self,
        head: Option<ResolvedReference<'a>>,
        parts: &[&'a str],
        space: Space,
        range: TextRange,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        let mut current = head;
        for (i, &part) in parts.iter().enumerate() {
            let Some(reference) = current else {
                return Ok(None);
            };
            let part_space = if i + 1 == parts.len() { space } else { Space::Namespace };
            current = self.resolve_member(&reference, part, part_space, range)?;
        }
        Ok(current)
    }

    /// A reference to a global built-in such as `Array`, `Promise` or
    /// `Uppercase`: a single name that resolves to no declaration.
    pub(crate) fn builtin_reference(
        &self,
        ty: &ScopedType<'a>,
    ) -> Result<Option<(&'a str, &'a TypeReferenceNode<'a>)>, ResolveError> {
        let node = ty.node.skip_parentheses();
        let TypeNode::TypeReference(reference) = node else {
            return Ok(None);
        };
        let Some(name) = reference.type_name.as_identifier() else {
            return Ok(None);
        };
        let resolved = self.resolve_reference(node_id(node), &reference.type_name, &ty.scope, &ty.bindings, Space::Type)?;
        Ok(resolved.is_none().then_some((name, reference)))
    }

    /// Resolve the name of a reference node, memoized per node, scope and
    /// bindings.
    pub(crate) fn resolve_reference(
        &self,
        node: usize,
        name: &EntityName<'a>,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
        space: Space,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        let key = (node, scope.id(), bindings.id());
        if let Some(memo) = self.reference_memo.borrow().get(&key) {
            return Ok(memo.value.clone());
        }
        let cycles = self.cycle_count();
        let result = self.resolve(&name.parts(), scope, bindings, space, name.range())?;
        trace!(
            name = %name.text(),
            file = %scope.file_name,
            found = result.as_ref().map(|r| r.declaration.kind_name()),
            "resolved reference"
        );
        if self.cycle_count() == cycles {
            self.reference_memo
                .borrow_mut()
                .insert(key, Self::memo(bindings, result.clone()));
        }
        Ok(result)
    }

    fn resolve_single(
        &self,
        name: &'a str,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
        space: Space,
        range: TextRange,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        if space == Space::Type {
            match bindings.get(name) {
                Some(BoundType::Type(bound)) => {
                    return Ok(Some(ResolvedReference {
                        declaration: Declaration::TypeArgument(bound.node),
                        scope: Rc::clone(&bound.scope),
                        bindings: bound.bindings.clone(),
                    }))
                }
                Some(BoundType::Parameter(parameter)) => {
                    return Ok(Some(ResolvedReference::new(Declaration::TypeParameter(*parameter), scope)))
                }
                None => {}
            }
        }

        let mut current = Some(Rc::clone(scope));
        while let Some(scope) = current {
            if let Some(found) = self.lookup(&scope, name, space, range)? {
                return Ok(Some(found));
            }
            current = scope.parent.clone();
        }

        for global in self.global_scopes() {
            if global.id() == scope.id() {
                continue;
            }
            if let Some(found) = self.lookup(&global, name, space, range)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn resolve_member(
        &self,
        reference: &ResolvedReference<'a>,
        name: &'a str,
        space: Space,
        range: TextRange,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        match reference.declaration {
            Declaration::Namespace(group) => {
                let members = self.namespace_scope(&reference.scope, group);
                self.resolve_export(&members, name, space, range)
            }
            Declaration::ModuleNamespace => self.resolve_export(&reference.scope, name, space, range),
            Declaration::Enum(decl) => Ok(decl
                .members
                .iter()
                .find(|member| member.name.static_text() == Some(name))
                .map(|member| ResolvedReference::new(Declaration::EnumMember(decl, member), &reference.scope))),
            _ => Ok(None),
        }
    }

    /// Run a lookup unless the same one is already in progress.
    fn guarded(
        &self,
        key: LookupKey<'a>,
        scope: &FileScope<'a>,
        range: TextRange,
        f: impl FnOnce() -> Result<Option<ResolvedReference<'a>>, ResolveError>,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        let entered = self.resolving.borrow_mut().enter(key);
        match entered {
            RecursionResult::Entered => {
                let result = f();
                self.resolving.borrow_mut().leave(key);
                result
            }
            RecursionResult::Cycle => Ok(None),
            RecursionResult::DepthExceeded => Err(self.too_complex(scope, range)),
        }
    }

    /// Look a name up among a scope's own declarations, imports and
    /// re-exports.
    fn lookup(
        &self,
        scope: &Rc<FileScope<'a>>,
        name: &'a str,
        space: Space,
        range: TextRange,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        self.guarded((scope.id(), name, space, false), scope, range, || {
            let local = match space {
                Space::Type => scope.types.get(name),
                Space::Value => scope.values.get(name),
                Space::Namespace => scope
                    .namespaces
                    .get(name)
                    .or_else(|| scope.types.get(name).filter(|decl| matches!(decl, Declaration::Enum(_)))),
            };
            if let Some(&declaration) = local {
                return Ok(Some(ResolvedReference::new(declaration, scope)));
            }

            if let Some(import) = scope.imports.get(name).copied() {
                let target = self.import_scope(scope, import.source)?;
                return match import.imported {
                    ImportedName::Namespace => Ok(Some(ResolvedReference::new(Declaration::ModuleNamespace, &target))),
                    ImportedName::Default => self.resolve_export(&target, DEFAULT_EXPORT, space, range),
                    ImportedName::Named(imported) => self.resolve_export(&target, imported, space, range),
                };
            }

            match scope.exports.get(name).copied() {
                Some(ExportBinding::ReExport { source, name: foreign }) => {
                    let target = self.import_scope(scope, source)?;
                    self.resolve_export(&target, foreign, space, range)
                }
                Some(ExportBinding::Namespace { source }) => {
                    let target = self.import_scope(scope, source)?;
                    Ok(Some(ResolvedReference::new(Declaration::ModuleNamespace, &target)))
                }
                Some(ExportBinding::Local(_)) | None => Ok(None),
            }
        })
    }

    /// Look a name up among a module's exports, following re-exports and
    /// `export *` sources.
    pub fn resolve_export(
        &self,
        scope: &Rc<FileScope<'a>>,
        name: &'a str,
        space: Space,
        range: TextRange,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        self.guarded((scope.id(), name, space, true), scope, range, || {
            match scope.exports.get(name).copied() {
                Some(ExportBinding::Local(local)) => return self.lookup(scope, local, space, range),
                Some(ExportBinding::ReExport { source, name: foreign }) => {
                    let target = self.import_scope(scope, source)?;
                    return self.resolve_export(&target, foreign, space, range);
                }
                Some(ExportBinding::Namespace { source }) => {
                    let target = self.import_scope(scope, source)?;
                    return Ok(Some(ResolvedReference::new(Declaration::ModuleNamespace, &target)));
                }
                None => {}
            }
            if name == DEFAULT_EXPORT {
                return Ok(None);
            }
            for source in scope.export_all_sources.iter().copied() {
                let target = self.import_scope(scope, source)?;
                if let Some(found) = self.resolve_export(&target, name, space, range)? {
                    return Ok(Some(found));
                }
            }
            Ok(None)
        })
    }

    // ========================================================================
    // Type arguments and aliases
    // ========================================================================

    /// Bind a declaration's type parameters for one use site: each parameter
    /// takes the site's type argument, else its default, else its constraint,
    /// else stays an opaque parameter. Defaults and constraints see the
    /// parameters bound before them.
    pub(crate) fn bind_type_parameters(
        &self,
        parameters: Option<&'a [TypeParameterDeclaration<'a>]>,
        arguments: Option<&'a [TypeNode<'a>]>,
        declaration_scope: &Rc<FileScope<'a>>,
        site_scope: &Rc<FileScope<'a>>,
        site_bindings: &Bindings<'a>,
    ) -> Bindings<'a> {
        let mut bindings = Bindings::empty();
        for (i, parameter) in parameters.unwrap_or_default().iter().enumerate() {
            let name = parameter.name.text;
            let bound = match (arguments.and_then(|args| args.get(i)), parameter.default, parameter.constraint) {
                (Some(argument), _, _) => BoundType::Type(ScopedType::new(argument, site_scope, site_bindings)),
                (None, Some(default), _) => BoundType::Type(ScopedType::new(default, declaration_scope, &bindings)),
                (None, None, Some(constraint)) => {
                    BoundType::Type(ScopedType::new(constraint, declaration_scope, &bindings))
                }
                (None, None, None) => BoundType::Parameter(name),
            };
            bindings = bindings.with(name, bound);
        }
        bindings
    }

    /// Follow parentheses, substituted type parameters and type aliases until
    /// reaching a node that is not a reference to one of them.
    pub(crate) fn expand_aliases(&self, ty: &ScopedType<'a>) -> Result<ScopedType<'a>, ResolveError> {
        let mut current = ty.skip_parentheses();
        for _ in 0..self.options.max_depth {
            let TypeNode::TypeReference(reference) = current.node else {
                return Ok(current);
            };
            let resolved = self.resolve_reference(
                node_id(current.node),
                &reference.type_name,
                &current.scope,
                &current.bindings,
                Space::Type,
            )?;
            current = match resolved {
                Some(ResolvedReference { declaration: Declaration::TypeArgument(node), scope, bindings }) => {
                    ScopedType { node, scope, bindings }.skip_parentheses()
                }
                Some(ResolvedReference { declaration: Declaration::TypeAlias(alias), scope, .. }) => {
                    let bindings = self.bind_type_parameters(
                        alias.type_parameters,
                        reference.type_arguments,
                        &scope,
                        &current.scope,
                        &current.bindings,
                    );
                    ScopedType { node: alias.type_node, scope, bindings }.skip_parentheses()
                }
                _ => return Ok(current),
            };
        }
        Err(self.too_complex(&ty.scope, ty.node.range()))
    }

    /// The members of a union after alias expansion, flattened. `never`
    /// members are dropped.
    pub(crate) fn flatten_union(&self, ty: &ScopedType<'a>) -> Result<Vec<ScopedType<'a>>, ResolveError> {
        self.frame(&ty.scope, ty.node.range(), || {
            let ty = self.expand_aliases(ty)?;
            match ty.node {
                TypeNode::UnionType(union) => {
                    let mut members = Vec::with_capacity(union.types.len());
                    for member in union.types {
                        members.extend(self.flatten_union(&ty.with_node(member))?);
                    }
                    Ok(members)
                }
                node if node.is_keyword(SyntaxKind::NeverKeyword) => Ok(Vec::new()),
                _ => Ok(vec![ty]),
            }
        })
    }
}
