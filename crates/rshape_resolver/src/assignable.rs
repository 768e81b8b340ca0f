//! A narrow assignability check, enough to evaluate conditional types and the
//! `Extract`/`Exclude` filters.
//!
//! Both sides carry their own scope and bindings. `infer X` positions in the
//! target capture the candidate they are matched against.

use std::rc::Rc;

use rshape_ast::node::*;
use rshape_ast::syntax_kind::SyntaxKind;
use tracing::debug;

use crate::bindings::{Bindings, BoundType, ScopedType};
use crate::context::TypeResolutionContext;
use crate::error::ResolveError;
use crate::resolve::{node_id, ResolvedReference, Space};
use crate::runtime::RuntimeTag;
use crate::scope::{Declaration, FileScope};

/// Types captured by `infer` positions, in capture order.
type Captures<'a> = Vec<(&'a str, ScopedType<'a>)>;

fn same_type(a: &ScopedType<'_>, b: &ScopedType<'_>) -> bool {
    node_id(a.node) == node_id(b.node) && a.scope.id() == b.scope.id() && a.bindings.id() == b.bindings.id()
}

fn keyword_kind(node: &TypeNode<'_>) -> Option<SyntaxKind> {
    match node {
        TypeNode::KeywordType(keyword) => Some(keyword.data.kind),
        _ => None,
    }
}

/// The keyword a literal widens to.
fn widened_kind(node: &TypeNode<'_>) -> Option<SyntaxKind> {
    match node {
        TypeNode::LiteralType(literal) => Some(match literal.literal {
            LiteralValue::String(_) => SyntaxKind::StringKeyword,
            LiteralValue::Number(_) => SyntaxKind::NumberKeyword,
            LiteralValue::BigInt(_) => SyntaxKind::BigIntKeyword,
            LiteralValue::Boolean(_) => SyntaxKind::BooleanKeyword,
        }),
        TypeNode::TemplateLiteralType(_) => Some(SyntaxKind::StringKeyword),
        TypeNode::TypeOperator(operator) if operator.operator == SyntaxKind::UniqueKeyword => {
            Some(SyntaxKind::SymbolKeyword)
        }
        _ => None,
    }
}

fn is_nullish_keyword(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::NullKeyword | SyntaxKind::UndefinedKeyword | SyntaxKind::VoidKeyword)
}

impl<'a> TypeResolutionContext<'a> {
    /// Whether `candidate` is assignable to `target`, both interpreted in
    /// `scope` with `bindings`. Resolution failures count as not assignable.
    pub fn is_assignable(
        &self,
        candidate: &'a TypeNode<'a>,
        target: &'a TypeNode<'a>,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> bool {
        self.is_assignable_scoped(
            &ScopedType::new(candidate, scope, bindings),
            &ScopedType::new(target, scope, bindings),
        )
    }

    pub fn is_assignable_scoped(&self, candidate: &ScopedType<'a>, target: &ScopedType<'a>) -> bool {
        let mut captures = Captures::new();
        self.assignable(candidate, target, &mut captures).unwrap_or_else(|error| {
            debug!(file = %candidate.scope.file_name, %error, "assignability check failed");
            false
        })
    }

    // ========================================================================
    // Conditional types
    // ========================================================================

    /// The branch or branches a conditional type selects. A naked type
    /// parameter bound to a union distributes over its members.
    pub(crate) fn select_branches(
        &self,
        conditional: &'a ConditionalTypeNode<'a>,
        ty: &ScopedType<'a>,
    ) -> Result<Vec<ScopedType<'a>>, ResolveError> {
        if let TypeNode::TypeReference(reference) = conditional.check_type.skip_parentheses() {
            let bound = reference.type_name.as_identifier().and_then(|name| match ty.bindings.get(name) {
                Some(BoundType::Type(bound)) => Some((name, bound.clone())),
                _ => None,
            });
            if let Some((name, bound)) = bound {
                let members = self.flatten_union(&bound)?;
                if members.len() != 1 {
                    let mut branches = Vec::with_capacity(members.len());
                    for member in members {
                        let bindings = ty.bindings.with(name, BoundType::Type(member.clone()));
                        let distributed = ScopedType { node: ty.node, scope: Rc::clone(&ty.scope), bindings };
                        branches.push(self.select_branch(conditional, &distributed, &member)?);
                    }
                    return Ok(branches);
                }
            }
        }
        let check = ty.with_node(conditional.check_type);
        Ok(vec![self.select_branch(conditional, ty, &check)?])
    }

    fn select_branch(
        &self,
        conditional: &'a ConditionalTypeNode<'a>,
        ty: &ScopedType<'a>,
        check: &ScopedType<'a>,
    ) -> Result<ScopedType<'a>, ResolveError> {
        let mut captures = Captures::new();
        let extends = ty.with_node(conditional.extends_type);
        if self.assignable(check, &extends, &mut captures)? {
            let bindings = ty
                .bindings
                .extend(captures.into_iter().map(|(name, captured)| (name, BoundType::Type(captured))));
            Ok(ScopedType { node: conditional.true_type, scope: Rc::clone(&ty.scope), bindings })
        } else {
            Ok(ty.with_node(conditional.false_type))
        }
    }

    // ========================================================================
    // The relation
    // ========================================================================

    fn assignable(
        &self,
        candidate: &ScopedType<'a>,
        target: &ScopedType<'a>,
        captures: &mut Captures<'a>,
    ) -> Result<bool, ResolveError> {
        let candidate = candidate.skip_parentheses();
        let target = target.skip_parentheses();
        if same_type(&candidate, &target) {
            return Ok(true);
        }
        if let TypeNode::InferType(infer) = target.node {
            captures.push((infer.type_parameter.name.text, candidate));
            return Ok(true);
        }
        self.frame(&candidate.scope, candidate.node.range(), || {
            let candidate = self.expand_aliases(&candidate)?;
            let target = self.expand_aliases(&target)?;
            self.assignable_expanded(&candidate, &target, captures)
        })
    }

    /// Like `assignable`, but a failed check leaves no captures behind.
    fn try_assignable(
        &self,
        candidate: &ScopedType<'a>,
        target: &ScopedType<'a>,
        captures: &mut Captures<'a>,
    ) -> Result<bool, ResolveError> {
        let mark = captures.len();
        let result = self.assignable(candidate, target, captures)?;
        if !result {
            captures.truncate(mark);
        }
        Ok(result)
    }

    fn assignable_expanded(
        &self,
        candidate: &ScopedType<'a>,
        target: &ScopedType<'a>,
        captures: &mut Captures<'a>,
    ) -> Result<bool, ResolveError> {
        if same_type(candidate, target) {
            return Ok(true);
        }
        let target_keyword = keyword_kind(target.node);
        let candidate_keyword = keyword_kind(candidate.node);
        if matches!(target_keyword, Some(SyntaxKind::AnyKeyword | SyntaxKind::UnknownKeyword))
            || matches!(candidate_keyword, Some(SyntaxKind::NeverKeyword | SyntaxKind::AnyKeyword))
        {
            return Ok(true);
        }

        if let TypeNode::UnionType(_) = candidate.node {
            for member in self.flatten_union(candidate)? {
                if !self.assignable(&member, target, captures)? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
        if let TypeNode::UnionType(_) = target.node {
            for member in self.flatten_union(target)? {
                if self.try_assignable(candidate, &member, captures)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }
        if let TypeNode::IntersectionType(intersection) = target.node {
            for member in intersection.types {
                if !self.assignable(candidate, &target.with_node(member), captures)? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
        if let TypeNode::IntersectionType(intersection) = candidate.node {
            for member in intersection.types {
                if self.try_assignable(&candidate.with_node(member), target, captures)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        if let Some(kind) = target_keyword {
            return self.assignable_to_keyword(candidate, candidate_keyword, kind);
        }

        match (candidate.node, target.node) {
            (TypeNode::LiteralType(ours), TypeNode::LiteralType(theirs)) => return Ok(ours.literal == theirs.literal),
            (TypeNode::LiteralType(_) | TypeNode::TemplateLiteralType(_), TypeNode::TemplateLiteralType(_)) => {
                return self.key_subset(candidate, target)
            }
            (TypeNode::FunctionType(ours), TypeNode::FunctionType(theirs)) => {
                return self.signature_assignable(candidate, &ours.signature, target, &theirs.signature, captures)
            }
            (TypeNode::TupleType(ours), TypeNode::TupleType(theirs)) => {
                return self.tuple_assignable(candidate, ours, target, theirs, captures)
            }
            _ => {}
        }

        if let Some(target_element) = self.array_element(target)? {
            if let TypeNode::TupleType(tuple) = candidate.node {
                for element in tuple.elements {
                    let element = match element {
                        TypeNode::OptionalType(wrapped) => wrapped.type_node,
                        TypeNode::NamedTupleMember(member) => member.type_node,
                        other => other,
                    };
                    if !self.assignable(&candidate.with_node(element), &target_element, captures)? {
                        return Ok(false);
                    }
                }
                return Ok(true);
            }
            return match self.array_element(candidate)? {
                Some(candidate_element) => self.assignable(&candidate_element, &target_element, captures),
                None => Ok(false),
            };
        }

        if let Some(("Function", _)) = self.builtin_reference(target)? {
            let candidate_tags = self.infer_scoped(candidate);
            return Ok(candidate_tags.len() == 1 && candidate_tags.contains(&RuntimeTag::Function));
        }

        if let (TypeNode::TypeReference(ours), TypeNode::TypeReference(theirs)) = (candidate.node, target.node) {
            if let Some(result) = self.reference_identity(candidate, ours, target, theirs, captures)? {
                return Ok(result);
            }
        }

        match target.node {
            TypeNode::TypeLiteral(_) | TypeNode::MappedType(_) => self.structurally_assignable(candidate, target, captures),
            TypeNode::TypeReference(_) => {
                // Interfaces and classes compare structurally as a last resort.
                match self.resolve_type_reference(target)? {
                    Some(Declaration::Interface(_) | Declaration::Class(_)) => {
                        self.structurally_assignable(candidate, target, captures)
                    }
                    _ => Ok(false),
                }
            }
            _ => Ok(false),
        }
    }

    fn assignable_to_keyword(
        &self,
        candidate: &ScopedType<'a>,
        candidate_keyword: Option<SyntaxKind>,
        kind: SyntaxKind,
    ) -> Result<bool, ResolveError> {
        if candidate_keyword == Some(kind) || widened_kind(candidate.node) == Some(kind) {
            return Ok(true);
        }
        Ok(match kind {
            SyntaxKind::NeverKeyword => false,
            SyntaxKind::UndefinedKeyword | SyntaxKind::VoidKeyword => {
                matches!(candidate_keyword, Some(SyntaxKind::UndefinedKeyword | SyntaxKind::VoidKeyword))
            }
            SyntaxKind::StringKeyword | SyntaxKind::NumberKeyword => {
                let expected = if kind == SyntaxKind::StringKeyword { RuntimeTag::String } else { RuntimeTag::Number };
                match self.resolve_type_reference(candidate)? {
                    Some(Declaration::Enum(_) | Declaration::EnumMember(..)) => {
                        self.infer_scoped(candidate).iter().all(|tag| *tag == expected)
                    }
                    _ => false,
                }
            }
            SyntaxKind::ObjectKeyword => {
                if candidate_keyword.is_some_and(is_nullish_keyword) {
                    return Ok(false);
                }
                let candidate_tags = self.infer_scoped(candidate);
                candidate_tags.iter().all(|tag| {
                    matches!(
                        tag,
                        RuntimeTag::Object
                            | RuntimeTag::Array
                            | RuntimeTag::Function
                            | RuntimeTag::Date
                            | RuntimeTag::Set
                            | RuntimeTag::Map
                            | RuntimeTag::Error
                    )
                })
            }
            _ => false,
        })
    }

    fn resolve_type_reference(&self, ty: &ScopedType<'a>) -> Result<Option<Declaration<'a>>, ResolveError> {
        let TypeNode::TypeReference(reference) = ty.node else {
            return Ok(None);
        };
        let resolved =
            self.resolve_reference(node_id(ty.node), &reference.type_name, &ty.scope, &ty.bindings, Space::Type)?;
        Ok(resolved.map(|resolved| resolved.declaration))
    }

    /// Compare two references by what they name. `None` when the names
    /// differ in kind and a structural check should decide.
    fn reference_identity(
        &self,
        candidate: &ScopedType<'a>,
        ours: &'a TypeReferenceNode<'a>,
        target: &ScopedType<'a>,
        theirs: &'a TypeReferenceNode<'a>,
        captures: &mut Captures<'a>,
    ) -> Result<Option<bool>, ResolveError> {
        let our_decl = self.resolve_reference(node_id(candidate.node), &ours.type_name, &candidate.scope, &candidate.bindings, Space::Type)?;
        let their_decl = self.resolve_reference(node_id(target.node), &theirs.type_name, &target.scope, &target.bindings, Space::Type)?;
        let same = match (&our_decl, &their_decl) {
            (None, None) => ours.type_name.text() == theirs.type_name.text(),
            (
                Some(ResolvedReference { declaration: Declaration::TypeParameter(a), .. }),
                Some(ResolvedReference { declaration: Declaration::TypeParameter(b), .. }),
            ) => a == b,
            (
                Some(ResolvedReference { declaration: Declaration::EnumMember(member_of, _), .. }),
                Some(ResolvedReference { declaration: Declaration::Enum(decl), .. }),
            ) => std::ptr::eq(*member_of, *decl),
            (Some(a), Some(b)) if a.declaration.id() == b.declaration.id() => true,
            (Some(_), Some(_)) => return Ok(None),
            _ => return Ok(Some(false)),
        };
        if !same {
            return Ok(Some(false));
        }
        let our_args = ours.type_arguments.unwrap_or_default();
        let their_args = theirs.type_arguments.unwrap_or_default();
        for (mine, other) in our_args.iter().zip(their_args) {
            if !self.assignable(&candidate.with_node(mine), &target.with_node(other), captures)? {
                return Ok(Some(false));
            }
        }
        Ok(Some(true))
    }

    /// Elements pair up by position. A trailing rest element in the target
    /// absorbs the remaining candidate elements.
    fn tuple_assignable(
        &self,
        candidate: &ScopedType<'a>,
        ours: &'a TupleTypeNode<'a>,
        target: &ScopedType<'a>,
        theirs: &'a TupleTypeNode<'a>,
        captures: &mut Captures<'a>,
    ) -> Result<bool, ResolveError> {
        let (fixed, rest) = match theirs.elements.split_last() {
            Some((TypeNode::RestType(rest), fixed)) => (fixed, Some(rest.type_node)),
            _ => (theirs.elements, None),
        };
        if ours.elements.len() < fixed.len() || (rest.is_none() && ours.elements.len() != fixed.len()) {
            return Ok(false);
        }
        for (mine, other) in ours.elements.iter().zip(fixed) {
            if !self.assignable(&candidate.with_node(mine), &target.with_node(other), captures)? {
                return Ok(false);
            }
        }
        let Some(rest) = rest else {
            return Ok(true);
        };
        let Some(element) = self.array_element(&target.with_node(rest))? else {
            return Ok(true);
        };
        for mine in &ours.elements[fixed.len()..] {
            if !self.assignable(&candidate.with_node(mine), &element, captures)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Return types must be assignable. Parameters are matched only to
    /// collect `infer` captures.
    fn signature_assignable(
        &self,
        candidate: &ScopedType<'a>,
        ours: &'a SignatureDeclaration<'a>,
        target: &ScopedType<'a>,
        theirs: &'a SignatureDeclaration<'a>,
        captures: &mut Captures<'a>,
    ) -> Result<bool, ResolveError> {
        for (mine, other) in ours.parameters.iter().zip(theirs.parameters) {
            if let (Some(mine), Some(other)) = (mine.type_annotation, other.type_annotation) {
                self.try_assignable(&candidate.with_node(mine), &target.with_node(other), captures)?;
            }
        }
        match (ours.return_type, theirs.return_type) {
            (Some(mine), Some(other)) => self.assignable(&candidate.with_node(mine), &target.with_node(other), captures),
            _ => Ok(true),
        }
    }

    /// Every required target property exists on the candidate with an
    /// assignable type. Untyped and method properties match anything.
    fn structurally_assignable(
        &self,
        candidate: &ScopedType<'a>,
        target: &ScopedType<'a>,
        captures: &mut Captures<'a>,
    ) -> Result<bool, ResolveError> {
        if keyword_kind(candidate.node).is_some_and(is_nullish_keyword) {
            return Ok(false);
        }
        let theirs = self.decompose_scoped(target)?;
        let ours = self.decompose_scoped(candidate)?;
        for (key, property) in &theirs.props {
            let Some(mine) = ours.get(key) else {
                if property.optional {
                    continue;
                }
                return Ok(false);
            };
            if let (Some(mine), Some(other)) = (mine.scoped_type(), property.scoped_type()) {
                if !self.assignable(&mine, &other, captures)? {
                    return Ok(false);
                }
            }
        }
        Ok(theirs.calls.is_empty() || !ours.calls.is_empty())
    }

    /// For finite string types: every candidate key is a target key.
    fn key_subset(&self, candidate: &ScopedType<'a>, target: &ScopedType<'a>) -> Result<bool, ResolveError> {
        let (Ok(ours), Ok(theirs)) = (self.resolve_keys_scoped(candidate), self.resolve_keys_scoped(target)) else {
            return Ok(false);
        };
        Ok(ours.iter().all(|key| theirs.contains(key)))
    }
}
