//! Structural decomposition.
//!
//! Reduces a type expression to its properties and call signatures. References
//! are resolved and expanded with their type arguments bound; interfaces pull
//! in their heritage; mapped, indexed-access and conditional types are
//! evaluated with the key and assignability evaluators; a fixed catalogue of
//! utility types is understood when the name does not resolve to a local
//! declaration.

use std::rc::Rc;

use rshape_ast::node::*;
use rshape_ast::syntax_kind::SyntaxKind;
use rshape_ast::types::{ModifierFlags, NodeFlags};
use rshape_core::text::TextRange;
use tracing::debug;

use crate::bindings::{Bindings, BoundType, ScopedType};
use crate::context::TypeResolutionContext;
use crate::error::ResolveError;
use crate::resolve::{node_id, ResolvedReference, Space};
use crate::runtime::RuntimeTag;
use crate::scope::{Declaration, FileScope, ModuleSource};
use crate::shape::{merge_descriptors, CallSignature, DecomposedType, MergeKind, PropertyDescriptor, PropertyType};

/// Utility types understood without a declaration.
pub const SUPPORTED_UTILITY_TYPES: &[&str] = &[
    "Partial",
    "Required",
    "Readonly",
    "Pick",
    "Omit",
    "Record",
    "Extract",
    "Exclude",
    "InstanceType",
    "Awaited",
    "Parameters",
    "ReturnType",
    "NonNullable",
];

/// A place that names a type with optional type arguments: a type reference
/// or an entry of an `extends` clause.
#[derive(Clone, Copy)]
pub(crate) struct ReferenceSite<'a> {
    pub(crate) id: usize,
    pub(crate) name: EntityName<'a>,
    pub(crate) type_arguments: Option<&'a [TypeNode<'a>]>,
    /// Marked with the ignore directive.
    pub(crate) ignored: bool,
    pub(crate) range: TextRange,
}

impl<'a> ReferenceSite<'a> {
    pub(crate) fn of_type_reference(node: &'a TypeNode<'a>, reference: &'a TypeReferenceNode<'a>) -> Self {
        Self {
            id: node_id(node),
            name: reference.type_name,
            type_arguments: reference.type_arguments,
            ignored: reference.data.flags.contains(NodeFlags::IGNORE_DIRECTIVE),
            range: reference.data.range,
        }
    }

    fn of_heritage(entry: &'a ExpressionWithTypeArguments<'a>) -> Self {
        Self {
            id: node_id(entry),
            name: entry.expression,
            type_arguments: entry.type_arguments,
            ignored: entry.data.flags.contains(NodeFlags::IGNORE_DIRECTIVE),
            range: entry.data.range,
        }
    }
}

/// The key a property name spells, including computed string and numeric
/// literal keys. `None` for private names and other computed keys.
pub(crate) fn literal_key(name: &PropertyName<'_>) -> Option<String> {
    match name {
        PropertyName::Computed(computed) => match computed.expression {
            Expression::StringLiteral(lit) | Expression::NoSubstitutionTemplateLiteral(lit) => Some(lit.text.to_string()),
            Expression::NumericLiteral(lit) => Some(lit.text.to_string()),
            _ => None,
        },
        other => other.static_text().map(str::to_string),
    }
}

fn is_public_instance_member(data: &NodeData, name: &PropertyName<'_>) -> bool {
    !data.has_modifier(ModifierFlags::STATIC | ModifierFlags::NON_PUBLIC_ACCESSIBILITY_MODIFIER)
        && !matches!(name, PropertyName::PrivateIdentifier(_))
}

impl<'a> TypeResolutionContext<'a> {
    /// Decompose a type expression into its properties and call signatures.
    pub fn decompose(
        &self,
        node: &'a TypeNode<'a>,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        self.decompose_scoped(&ScopedType::new(node, scope, bindings))
    }

    /// Decompose the type a name in `scope` refers to, e.g. `Props` or
    /// `Types.Props`.
    pub fn decompose_named(&self, scope: &Rc<FileScope<'a>>, name: &str) -> Result<DecomposedType<'a>, ResolveError> {
        let reference = self
            .resolve_type_name(name, scope)?
            .ok_or_else(|| ResolveError::UnresolvableReference {
                name: name.to_string(),
                location: self.location(scope, TextRange::default()),
            })?;
        self.decompose_declaration(&reference, None, scope, &Bindings::empty())
    }

    /// Decompose the type of one property of a decomposition.
    pub fn decompose_property(&self, descriptor: &PropertyDescriptor<'a>) -> Result<DecomposedType<'a>, ResolveError> {
        match &descriptor.ty {
            PropertyType::Type(node) => self.decompose(node, &descriptor.scope, &descriptor.bindings),
            PropertyType::Signature(signature) => Ok(DecomposedType {
                calls: vec![CallSignature {
                    signature,
                    scope: Rc::clone(&descriptor.scope),
                    bindings: descriptor.bindings.clone(),
                }],
                ..DecomposedType::default()
            }),
            PropertyType::Untyped => Ok(DecomposedType::new()),
            PropertyType::Merged(MergeKind::Intersection, parts) => {
                let mut result = DecomposedType::new();
                for part in parts {
                    result = result.intersect(self.decompose_property(part)?);
                }
                Ok(result)
            }
            PropertyType::Merged(MergeKind::Union, parts) => {
                let shapes = parts.iter().map(|part| self.decompose_property(part));
                self.union_of_shapes(shapes)
            }
        }
    }

    pub(crate) fn decompose_scoped(&self, ty: &ScopedType<'a>) -> Result<DecomposedType<'a>, ResolveError> {
        let ty = ty.skip_parentheses();
        let key = (node_id(ty.node), ty.scope.id(), ty.bindings.id());
        if let Some(memo) = self.decomposition_memo.borrow().get(&key) {
            return Ok(memo.value.clone());
        }
        let cycles = self.cycle_count();
        let result = self.frame(&ty.scope, ty.node.range(), || self.decompose_worker(&ty))?;
        if self.cycle_count() == cycles {
            self.decomposition_memo
                .borrow_mut()
                .insert(key, Self::memo(&ty.bindings, result.clone()));
        }
        Ok(result)
    }

    fn decompose_worker(&self, ty: &ScopedType<'a>) -> Result<DecomposedType<'a>, ResolveError> {
        match ty.node {
            TypeNode::TypeLiteral(literal) => self.decompose_members(literal.members, &ty.scope, &ty.bindings),
            TypeNode::TypeReference(reference) => self.decompose_reference(
                ReferenceSite::of_type_reference(ty.node, reference),
                &ty.scope,
                &ty.bindings,
            ),
            TypeNode::UnionType(_) => {
                let members = self.flatten_union(ty)?;
                self.decompose_union_members(members)
            }
            TypeNode::IntersectionType(intersection) => {
                let mut result = DecomposedType::new();
                for member in intersection.types {
                    result = result.intersect(self.decompose_scoped(&ty.with_node(member))?);
                }
                Ok(result)
            }
            TypeNode::TupleType(tuple) => Ok(self.decompose_tuple(tuple, ty)),
            TypeNode::MappedType(mapped) => self.decompose_mapped(mapped, ty),
            TypeNode::IndexedAccessType(access) => self.decompose_indexed_access(access, ty),
            TypeNode::ConditionalType(conditional) => {
                let branches = self.select_branches(conditional, ty)?;
                self.union_of_shapes(branches.iter().map(|branch| self.decompose_scoped(branch)))
            }
            TypeNode::TypeOperator(operator) if operator.operator == SyntaxKind::ReadonlyKeyword => {
                self.decompose_scoped(&ty.with_node(operator.type_node))
            }
            TypeNode::FunctionType(function) => Ok(DecomposedType {
                calls: vec![CallSignature {
                    signature: &function.signature,
                    scope: Rc::clone(&ty.scope),
                    bindings: ty.bindings.clone(),
                }],
                ..DecomposedType::default()
            }),
            TypeNode::TypeQuery(query) => self.decompose_type_query(ty.node, query, ty),
            TypeNode::ImportType(import) => self.decompose_import_type(ty.node, import, ty),
            TypeNode::OptionalType(wrapped) | TypeNode::RestType(wrapped) => {
                self.decompose_scoped(&ty.with_node(wrapped.type_node))
            }
            TypeNode::NamedTupleMember(member) => self.decompose_scoped(&ty.with_node(member.type_node)),
            _ => Ok(DecomposedType::new()),
        }
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn member_key(&self, name: &PropertyName<'a>, scope: &FileScope<'a>) -> Result<Option<String>, ResolveError> {
        match (literal_key(name), name) {
            (Some(key), _) => Ok(Some(key)),
            (None, PropertyName::Computed(computed)) => Err(ResolveError::UnsupportedComputedKey {
                location: self.location(scope, computed.data.range),
            }),
            (None, _) => Ok(None),
        }
    }

    fn decompose_members(
        &self,
        members: &'a [TypeElement<'a>],
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let mut result = DecomposedType::new();
        for member in members {
            let (name, ty, optional) = match member {
                TypeElement::PropertySignature(property) => (
                    &property.name,
                    property.type_annotation.map_or(PropertyType::Untyped, PropertyType::Type),
                    property.question_token.is_some(),
                ),
                TypeElement::MethodSignature(method) => (
                    &method.name,
                    PropertyType::Signature(&method.signature),
                    method.question_token.is_some(),
                ),
                TypeElement::GetAccessor(accessor) | TypeElement::SetAccessor(accessor) => (
                    &accessor.name,
                    accessor.value_type().map_or(PropertyType::Untyped, PropertyType::Type),
                    false,
                ),
                TypeElement::CallSignature(call) => {
                    result.calls.push(CallSignature {
                        signature: &call.signature,
                        scope: Rc::clone(scope),
                        bindings: bindings.clone(),
                    });
                    continue;
                }
                TypeElement::ConstructSignature(_) | TypeElement::IndexSignature(_) => continue,
            };
            let Some(key) = self.member_key(name, scope)? else {
                continue;
            };
            let data = member.data();
            result.insert_if_absent(
                PropertyDescriptor::new(key, ty, scope, bindings)
                    .optional(optional)
                    .readonly(data.has_modifier(ModifierFlags::READONLY))
                    .at(data.range),
            );
        }
        Ok(result)
    }

    fn decompose_class(
        &self,
        class: &'a ClassDeclaration<'a>,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> DecomposedType<'a> {
        let mut result = DecomposedType::new();
        for member in class.members {
            let (name, ty, optional) = match member {
                ClassElement::PropertyDeclaration(property) => (
                    &property.name,
                    property.type_annotation.map_or(PropertyType::Untyped, PropertyType::Type),
                    property.question_token.is_some(),
                ),
                ClassElement::MethodDeclaration(method) => (
                    &method.name,
                    PropertyType::Signature(&method.signature),
                    method.question_token.is_some(),
                ),
                ClassElement::GetAccessor(accessor) | ClassElement::SetAccessor(accessor) => (
                    &accessor.name,
                    accessor.value_type().map_or(PropertyType::Untyped, PropertyType::Type),
                    false,
                ),
                ClassElement::Constructor(constructor) => {
                    for parameter in constructor.parameters {
                        let flags = parameter.data.modifier_flags;
                        let is_property = flags.intersects(ModifierFlags::PARAMETER_PROPERTY_MODIFIER)
                            && !flags.intersects(ModifierFlags::NON_PUBLIC_ACCESSIBILITY_MODIFIER);
                        let (true, Some(name)) = (is_property, parameter.name.as_identifier()) else {
                            continue;
                        };
                        let ty = parameter.type_annotation.map_or(PropertyType::Untyped, PropertyType::Type);
                        result.insert_if_absent(
                            PropertyDescriptor::new(name, ty, scope, bindings)
                                .optional(parameter.question_token.is_some())
                                .readonly(flags.contains(ModifierFlags::READONLY))
                                .at(parameter.data.range),
                        );
                    }
                    continue;
                }
                ClassElement::IndexSignature(_) | ClassElement::Unsupported(_) => continue,
            };
            let data = member.data();
            if !is_public_instance_member(data, name) {
                continue;
            }
            // Symbol-keyed members cannot be described.
            let Some(key) = literal_key(name) else {
                continue;
            };
            result.insert_if_absent(
                PropertyDescriptor::new(key, ty, scope, bindings)
                    .optional(optional)
                    .readonly(data.has_modifier(ModifierFlags::READONLY))
                    .at(data.range),
            );
        }
        result
    }

    fn decompose_tuple(&self, tuple: &'a TupleTypeNode<'a>, ty: &ScopedType<'a>) -> DecomposedType<'a> {
        let mut result = DecomposedType::new();
        for (index, element) in tuple.elements.iter().enumerate() {
            let (node, optional) = match element {
                TypeNode::OptionalType(wrapped) => (wrapped.type_node, true),
                TypeNode::RestType(_) => break,
                TypeNode::NamedTupleMember(member) if member.dot_dot_dot_token.is_some() => break,
                TypeNode::NamedTupleMember(member) => (member.type_node, member.question_token.is_some()),
                other => (other, false),
            };
            result.insert_if_absent(
                PropertyDescriptor::new(index.to_string(), PropertyType::Type(node), &ty.scope, &ty.bindings)
                    .optional(optional)
                    .at(element.range()),
            );
        }
        result
    }

    // ========================================================================
    // References
    // ========================================================================

    pub(crate) fn decompose_reference(
        &self,
        site: ReferenceSite<'a>,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let result = self.decompose_reference_worker(site, scope, bindings);
        match result {
            Err(error) if site.ignored => {
                debug!(name = %site.name.text(), %error, "ignored reference failed to resolve");
                Ok(DecomposedType::new())
            }
            other => other,
        }
    }

    fn decompose_reference_worker(
        &self,
        site: ReferenceSite<'a>,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        match self.resolve_reference(site.id, &site.name, scope, bindings, Space::Type)? {
            Some(reference) => {
                let key = (site.id, scope.id(), bindings.id());
                self.expand(key, scope, site.range, DecomposedType::new, || {
                    self.decompose_declaration(&reference, site.type_arguments, scope, bindings)
                })
            }
            None => match site.name.as_identifier() {
                Some(name) if SUPPORTED_UTILITY_TYPES.contains(&name) => {
                    self.decompose_utility(name, site, scope, bindings)
                }
                _ => Err(ResolveError::UnresolvableReference {
                    name: site.name.text(),
                    location: self.location(scope, site.range),
                }),
            },
        }
    }

    /// Decompose a resolved declaration, binding its type parameters from the
    /// use site's type arguments.
    fn decompose_declaration(
        &self,
        reference: &ResolvedReference<'a>,
        type_arguments: Option<&'a [TypeNode<'a>]>,
        site_scope: &Rc<FileScope<'a>>,
        site_bindings: &Bindings<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let scope = &reference.scope;
        match reference.declaration {
            Declaration::TypeArgument(node) => self.decompose(node, scope, &reference.bindings),
            Declaration::Interface(group) => {
                let parameters = group.iter().find_map(|decl| decl.type_parameters);
                let bindings = self.bind_type_parameters(parameters, type_arguments, scope, site_scope, site_bindings);
                self.decompose_interface(group, scope, &bindings)
            }
            Declaration::TypeAlias(alias) => {
                let bindings =
                    self.bind_type_parameters(alias.type_parameters, type_arguments, scope, site_scope, site_bindings);
                self.decompose(alias.type_node, scope, &bindings)
            }
            Declaration::Class(class) => {
                let bindings =
                    self.bind_type_parameters(class.type_parameters, type_arguments, scope, site_scope, site_bindings);
                Ok(self.decompose_class(class, scope, &bindings))
            }
            Declaration::TypeParameter(_)
            | Declaration::Enum(_)
            | Declaration::EnumMember(..)
            | Declaration::Namespace(_)
            | Declaration::ModuleNamespace
            | Declaration::Function(_)
            | Declaration::Variable(_) => Ok(DecomposedType::new()),
        }
    }

    /// Own members of every merged declaration, then each `extends` entry.
    /// Own members win on key collisions.
    fn decompose_interface(
        &self,
        group: &'a [&'a InterfaceDeclaration<'a>],
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let mut result = DecomposedType::new();
        for decl in group {
            result.inherit(self.decompose_members(decl.members, scope, bindings)?);
        }
        for decl in group {
            for clause in decl.heritage_clauses.unwrap_or_default() {
                if clause.token != SyntaxKind::ExtendsKeyword {
                    continue;
                }
                for entry in clause.types {
                    let site = ReferenceSite::of_heritage(entry);
                    if site.ignored {
                        continue;
                    }
                    let base = self.decompose_reference(site, scope, bindings).map_err(|source| match source {
                        // Surfaced as is: the host has to register a resolver.
                        ResolveError::ModuleResolverNotRegistered { .. } => source,
                        source => ResolveError::ExtendsBaseType {
                            location: self.location(scope, entry.data.range),
                            source: Box::new(source),
                        },
                    })?;
                    result.inherit(base);
                }
            }
        }
        Ok(result)
    }

    fn decompose_type_query(
        &self,
        node: &'a TypeNode<'a>,
        query: &'a TypeQueryNode<'a>,
        ty: &ScopedType<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let resolved = self.resolve_reference(node_id(node), &query.expr_name, &ty.scope, &ty.bindings, Space::Value)?;
        let Some(reference) = resolved else {
            return Err(ResolveError::UnresolvableReference {
                name: query.expr_name.text(),
                location: self.location(&ty.scope, query.data.range),
            });
        };
        match reference.declaration {
            Declaration::Function(function) => Ok(DecomposedType {
                calls: vec![CallSignature {
                    signature: &function.signature,
                    scope: reference.scope,
                    bindings: Bindings::empty(),
                }],
                ..DecomposedType::default()
            }),
            Declaration::Variable(variable) => match variable.type_annotation {
                Some(annotation) => self.decompose(annotation, &reference.scope, &Bindings::empty()),
                None => Ok(DecomposedType::new()),
            },
            _ => Ok(DecomposedType::new()),
        }
    }

    fn decompose_import_type(
        &self,
        node: &'a TypeNode<'a>,
        import: &'a ImportTypeNode<'a>,
        ty: &ScopedType<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let (false, Some(qualifier)) = (import.is_type_of, import.qualifier) else {
            return Ok(DecomposedType::new());
        };
        let Some(reference) = self.resolve_import_type(import, &qualifier, &ty.scope)? else {
            return Err(ResolveError::UnresolvableReference {
                name: qualifier.text(),
                location: self.location(&ty.scope, import.data.range),
            });
        };
        let key = (node_id(node), ty.scope.id(), ty.bindings.id());
        self.expand(key, &ty.scope, import.data.range, DecomposedType::new, || {
            self.decompose_declaration(&reference, import.type_arguments, &ty.scope, &ty.bindings)
        })
    }

    /// Resolve `import('./m').A.B` to the declaration of `A.B` among the
    /// exports of `./m`.
    pub(crate) fn resolve_import_type(
        &self,
        import: &'a ImportTypeNode<'a>,
        qualifier: &EntityName<'a>,
        scope: &Rc<FileScope<'a>>,
    ) -> Result<Option<ResolvedReference<'a>>, ResolveError> {
        let source = ModuleSource { specifier: import.argument.text, range: import.argument.data.range };
        let module = self.import_scope(scope, source)?;
        let namespace = ResolvedReference {
            declaration: Declaration::ModuleNamespace,
            scope: module,
            bindings: Bindings::empty(),
        };
        self.resolve_members(Some(namespace), &qualifier.parts(), Space::Type, import.data.range)
    }

    // ========================================================================
    // Unions, mapped types, indexed access
    // ========================================================================

    /// Decompose a flattened union conservatively: null-like members are
    /// dropped, and anything but a single remaining member yields no
    /// properties.
    fn decompose_union_members(&self, members: Vec<ScopedType<'a>>) -> Result<DecomposedType<'a>, ResolveError> {
        let mut remaining = members.into_iter().filter(|member| !self.is_nullish(member));
        match (remaining.next(), remaining.next()) {
            (Some(single), None) => self.decompose_scoped(&single),
            _ => Ok(DecomposedType::new()),
        }
    }

    fn is_nullish(&self, ty: &ScopedType<'a>) -> bool {
        let tags = self.infer_scoped(ty);
        tags.len() == 1 && tags.contains(&RuntimeTag::Null)
    }

    /// Union-merge several shapes: only keys every shape defines with the
    /// same runtime tags survive.
    fn union_of_shapes(
        &self,
        shapes: impl IntoIterator<Item = Result<DecomposedType<'a>, ResolveError>>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let mut merged: Option<DecomposedType<'a>> = None;
        for shape in shapes {
            let shape = shape?;
            merged = Some(match merged {
                None => shape,
                Some(previous) => self.union_merge(previous, shape),
            });
        }
        Ok(merged.unwrap_or_default())
    }

    fn union_merge(&self, first: DecomposedType<'a>, second: DecomposedType<'a>) -> DecomposedType<'a> {
        let mut result = DecomposedType::new();
        for (key, ours) in first.props {
            let Some(theirs) = second.props.get(&key) else {
                continue;
            };
            // Set comparison: order does not matter.
            if self.infer_property_tags(&ours) == self.infer_property_tags(theirs) {
                result.props.insert(key, merge_descriptors(MergeKind::Union, ours, theirs.clone()));
            }
        }
        if !first.calls.is_empty() && !second.calls.is_empty() {
            result.calls = first.calls;
            result.calls.extend(second.calls);
        }
        result
    }

    fn decompose_mapped(
        &self,
        mapped: &'a MappedTypeNode<'a>,
        ty: &ScopedType<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let parameter = mapped.type_parameter;
        let Some(constraint) = parameter.constraint else {
            return Ok(DecomposedType::new());
        };
        let keys = self.resolve_keys_scoped(&ty.with_node(constraint))?;

        // `[K in keyof T]` without a modifier keeps T's modifiers.
        let preserves = mapped.optional_modifier() == MappedModifier::Preserve
            || mapped.readonly_modifier() == MappedModifier::Preserve;
        let source = match constraint.skip_parentheses() {
            TypeNode::TypeOperator(operator) if preserves && operator.operator == SyntaxKind::KeyOfKeyword => {
                Some(self.decompose_scoped(&ty.with_node(operator.type_node))?)
            }
            _ => None,
        };

        let template = mapped.type_node.map_or(PropertyType::Untyped, PropertyType::Type);
        let mut result = DecomposedType::new();
        for key in keys {
            let key_type = ScopedType::new(self.literal_type(&key), &ty.scope, &Bindings::empty());
            let bindings = ty.bindings.with(parameter.name.text, BoundType::Type(key_type));
            let source_property = source.as_ref().and_then(|source| source.get(&key));
            let optional = match mapped.optional_modifier() {
                MappedModifier::Add => true,
                MappedModifier::Remove => false,
                MappedModifier::Preserve => source_property.is_some_and(|property| property.optional),
            };
            let readonly = match mapped.readonly_modifier() {
                MappedModifier::Add => true,
                MappedModifier::Remove => false,
                MappedModifier::Preserve => source_property.is_some_and(|property| property.readonly),
            };
            let names = match mapped.name_type {
                Some(name_type) => self.resolve_keys(name_type, &ty.scope, &bindings)?.into_iter().collect(),
                None => vec![key],
            };
            for name in names {
                result.insert_if_absent(
                    PropertyDescriptor::new(name, template.clone(), &ty.scope, &bindings)
                        .optional(optional)
                        .readonly(readonly)
                        .at(mapped.data.range),
                );
            }
        }
        Ok(result)
    }

    fn decompose_indexed_access(
        &self,
        access: &'a IndexedAccessTypeNode<'a>,
        ty: &ScopedType<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let object = ty.with_node(access.object_type);
        let index = ty.with_node(access.index_type);
        if let Some(elements) = self.number_indexed_elements(&object, &index)? {
            return self.union_of_shapes(elements.iter().map(|element| self.decompose_scoped(element)));
        }
        let shape = self.decompose_scoped(&object)?;
        let keys = self.resolve_keys_scoped(&index)?;
        let selected: Vec<&PropertyDescriptor<'a>> = keys.iter().filter_map(|key| shape.get(key)).collect();
        self.union_of_shapes(selected.into_iter().map(|property| self.decompose_property(property)))
    }

    /// For `T[number]` where `T` is an array or tuple, the element types.
    pub(crate) fn number_indexed_elements(
        &self,
        object: &ScopedType<'a>,
        index: &ScopedType<'a>,
    ) -> Result<Option<Vec<ScopedType<'a>>>, ResolveError> {
        let index = self.expand_aliases(index)?;
        if !index.node.is_keyword(SyntaxKind::NumberKeyword) {
            return Ok(None);
        }
        let object = self.expand_aliases(object)?;
        if let Some(element) = self.array_element(&object)? {
            return Ok(Some(vec![element]));
        }
        match object.node {
            TypeNode::TupleType(tuple) => Ok(Some(
                tuple
                    .elements
                    .iter()
                    .map(|element| {
                        let node = match element {
                            TypeNode::OptionalType(wrapped) | TypeNode::RestType(wrapped) => wrapped.type_node,
                            TypeNode::NamedTupleMember(member) => member.type_node,
                            other => other,
                        };
                        object.with_node(node)
                    })
                    .collect(),
            )),
            _ => Ok(None),
        }
    }

    /// The element type of `T[]`, `readonly T[]`, `Array<T>` or
    /// `ReadonlyArray<T>`.
    pub(crate) fn array_element(&self, ty: &ScopedType<'a>) -> Result<Option<ScopedType<'a>>, ResolveError> {
        match ty.node.skip_parentheses() {
            TypeNode::ArrayType(array) => Ok(Some(ty.with_node(array.element_type))),
            TypeNode::TypeOperator(operator) if operator.operator == SyntaxKind::ReadonlyKeyword => {
                let inner = self.expand_aliases(&ty.with_node(operator.type_node))?;
                self.array_element(&inner)
            }
            _ => match self.builtin_reference(ty)? {
                Some(("Array" | "ReadonlyArray", reference)) => Ok(reference
                    .type_arguments
                    .and_then(|args| args.first())
                    .map(|element| ty.with_node(element))),
                _ => Ok(None),
            },
        }
    }

    // ========================================================================
    // Utility types
    // ========================================================================

    fn decompose_utility(
        &self,
        name: &str,
        site: ReferenceSite<'a>,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> Result<DecomposedType<'a>, ResolveError> {
        let arguments = site.type_arguments.unwrap_or_default();
        let argument = |index: usize| arguments.get(index).map(|node| ScopedType::new(node, scope, bindings));
        let Some(first) = argument(0) else {
            return Ok(DecomposedType::new());
        };

        match name {
            "Partial" => Ok(self.decompose_scoped(&first)?.map_props(|p| p.optional = true)),
            "Required" => Ok(self.decompose_scoped(&first)?.map_props(|p| p.optional = false)),
            "Readonly" => Ok(self.decompose_scoped(&first)?.map_props(|p| p.readonly = true)),
            "Pick" | "Omit" => {
                let shape = self.decompose_scoped(&first)?;
                let Some(second) = argument(1) else {
                    return Ok(shape);
                };
                let keys = self.resolve_keys_scoped(&second)?;
                let mut result = DecomposedType::new();
                if name == "Pick" {
                    for key in &keys {
                        if let Some(property) = shape.get(key) {
                            result.insert_if_absent(property.clone());
                        }
                    }
                } else {
                    for (key, property) in shape.props {
                        if !keys.contains(&key) {
                            result.props.insert(key, property);
                        }
                    }
                }
                Ok(result)
            }
            "Record" => {
                let keys = self.resolve_keys_scoped(&first)?;
                let value = arguments.get(1).map_or(PropertyType::Untyped, PropertyType::Type);
                let mut result = DecomposedType::new();
                for key in keys {
                    result.insert_if_absent(PropertyDescriptor::new(key, value.clone(), scope, bindings).at(site.range));
                }
                Ok(result)
            }
            "Extract" | "Exclude" => {
                let Some(filter) = argument(1) else {
                    return Ok(DecomposedType::new());
                };
                let keep = name == "Extract";
                let members = self
                    .flatten_union(&first)?
                    .into_iter()
                    .filter(|member| self.is_assignable_scoped(member, &filter) == keep)
                    .collect();
                self.decompose_union_members(members)
            }
            "NonNullable" => {
                let members = self.flatten_union(&first)?;
                self.decompose_union_members(members)
            }
            "InstanceType" => self.decompose_instance_type(&first),
            "Awaited" => {
                let awaited = self.awaited(&first)?;
                self.decompose_scoped(&awaited)
            }
            "Parameters" => {
                let Some(call) = self.first_call_signature(&first)? else {
                    return Ok(DecomposedType::new());
                };
                let mut result = DecomposedType::new();
                for (index, parameter) in call.signature.parameters.iter().enumerate() {
                    if parameter.is_rest() {
                        break;
                    }
                    let ty = parameter.type_annotation.map_or(PropertyType::Untyped, PropertyType::Type);
                    result.insert_if_absent(
                        PropertyDescriptor::new(index.to_string(), ty, &call.scope, &call.bindings)
                            .optional(parameter.is_optional())
                            .at(parameter.data.range),
                    );
                }
                Ok(result)
            }
            "ReturnType" => {
                let Some(call) = self.first_call_signature(&first)? else {
                    return Ok(DecomposedType::new());
                };
                match call.signature.return_type {
                    Some(ret) => self.decompose(ret, &call.scope, &call.bindings),
                    None => Ok(DecomposedType::new()),
                }
            }
            _ => Err(ResolveError::UnresolvableReference {
                name: name.to_string(),
                location: self.location(scope, site.range),
            }),
        }
    }

    /// Instance members of the class `T` refers to in `InstanceType<typeof C>`,
    /// or the return type of a constructor type.
    fn decompose_instance_type(&self, ty: &ScopedType<'a>) -> Result<DecomposedType<'a>, ResolveError> {
        let ty = self.expand_aliases(ty)?;
        match ty.node {
            TypeNode::TypeQuery(query) => {
                let resolved =
                    self.resolve_reference(node_id(ty.node), &query.expr_name, &ty.scope, &ty.bindings, Space::Value)?;
                match resolved {
                    Some(ResolvedReference { declaration: Declaration::Class(class), scope, .. }) => {
                        let bindings = self.bind_type_parameters(class.type_parameters, None, &scope, &scope, &Bindings::empty());
                        Ok(self.decompose_class(class, &scope, &bindings))
                    }
                    _ => Ok(DecomposedType::new()),
                }
            }
            TypeNode::ConstructorType(constructor) => match constructor.signature.return_type {
                Some(ret) => self.decompose_scoped(&ty.with_node(ret)),
                None => Ok(DecomposedType::new()),
            },
            _ => Ok(DecomposedType::new()),
        }
    }

    /// Unwrap `Promise<T>` and `PromiseLike<T>` layers.
    pub(crate) fn awaited(&self, ty: &ScopedType<'a>) -> Result<ScopedType<'a>, ResolveError> {
        let mut current = self.expand_aliases(ty)?;
        for _ in 0..self.options.max_depth {
            let inner = match self.builtin_reference(&current)? {
                Some(("Promise" | "PromiseLike", reference)) => reference.type_arguments.and_then(|args| args.first()),
                _ => None,
            };
            match inner {
                Some(inner) => current = self.expand_aliases(&current.with_node(inner))?,
                None => return Ok(current),
            }
        }
        Err(self.too_complex(&ty.scope, ty.node.range()))
    }

    pub(crate) fn first_call_signature(&self, ty: &ScopedType<'a>) -> Result<Option<CallSignature<'a>>, ResolveError> {
        Ok(self.decompose_scoped(ty)?.calls.into_iter().next())
    }
}
