//! String-set evaluation: reducing a key type to a finite, ordered set of
//! strings.

use std::rc::Rc;

use rshape_ast::node::*;
use rshape_ast::syntax_kind::SyntaxKind;
use rshape_core::collections::FxIndexSet;

use crate::bindings::{Bindings, ScopedType};
use crate::context::TypeResolutionContext;
use crate::error::ResolveError;
use crate::resolve::{node_id, ResolvedReference, Space};
use crate::scope::{Declaration, FileScope};

/// The value of an enum member.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EnumValue {
    String(String),
    Number(f64),
    /// An initializer that is not a literal.
    Computed,
}

impl EnumValue {
    fn key(&self) -> Option<String> {
        match self {
            EnumValue::String(text) => Some(text.clone()),
            EnumValue::Number(value) => Some(value.to_string()),
            EnumValue::Computed => None,
        }
    }
}

fn numeric_value(expression: &Expression<'_>) -> Option<f64> {
    match expression {
        Expression::NumericLiteral(literal) => literal.text.parse().ok(),
        Expression::PrefixUnary(unary) => {
            let value = numeric_value(unary.operand)?;
            match unary.operator {
                SyntaxKind::MinusToken => Some(-value),
                SyntaxKind::PlusToken => Some(value),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Member values in declaration order. Members without an initializer
/// continue counting from the previous numeric member.
pub(crate) fn enum_values(decl: &EnumDeclaration<'_>) -> Vec<EnumValue> {
    let mut next = Some(0.0);
    decl.members
        .iter()
        .map(|member| {
            let value = match member.initializer {
                None => next.map_or(EnumValue::Computed, EnumValue::Number),
                Some(Expression::StringLiteral(literal) | Expression::NoSubstitutionTemplateLiteral(literal)) => {
                    EnumValue::String(literal.text.to_string())
                }
                Some(expression) => numeric_value(expression).map_or(EnumValue::Computed, EnumValue::Number),
            };
            next = match value {
                EnumValue::Number(value) => Some(value + 1.0),
                _ => None,
            };
            value
        })
        .collect()
}

fn single(key: impl Into<String>) -> FxIndexSet<String> {
    let mut keys = FxIndexSet::default();
    keys.insert(key.into());
    keys
}

fn transform_case(name: &str, key: &str) -> String {
    let mut chars = key.chars();
    match (name, chars.next()) {
        ("Uppercase", _) => key.to_uppercase(),
        ("Lowercase", _) => key.to_lowercase(),
        ("Capitalize", Some(first)) => first.to_uppercase().chain(chars).collect(),
        ("Uncapitalize", Some(first)) => first.to_lowercase().chain(chars).collect(),
        _ => key.to_string(),
    }
}

impl<'a> TypeResolutionContext<'a> {
    /// Reduce a type to the finite set of string keys it denotes, e.g.
    /// `'a' | 'b'`, `keyof Props` or `` `on${Capitalize<E>}` ``.
    pub fn resolve_keys(
        &self,
        node: &'a TypeNode<'a>,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> Result<FxIndexSet<String>, ResolveError> {
        self.resolve_keys_scoped(&ScopedType::new(node, scope, bindings))
    }

    pub(crate) fn resolve_keys_scoped(&self, ty: &ScopedType<'a>) -> Result<FxIndexSet<String>, ResolveError> {
        let ty = ty.skip_parentheses();
        self.frame(&ty.scope, ty.node.range(), || self.keys_worker(&ty))
    }

    fn non_finite(&self, ty: &ScopedType<'a>) -> ResolveError {
        ResolveError::NonFiniteKeys { location: self.location(&ty.scope, ty.node.range()) }
    }

    fn union_of_keys(
        &self,
        members: impl IntoIterator<Item = ScopedType<'a>>,
    ) -> Result<FxIndexSet<String>, ResolveError> {
        let mut keys = FxIndexSet::default();
        for member in members {
            keys.extend(self.resolve_keys_scoped(&member)?);
        }
        Ok(keys)
    }

    fn keys_worker(&self, ty: &ScopedType<'a>) -> Result<FxIndexSet<String>, ResolveError> {
        match ty.node {
            TypeNode::LiteralType(literal) => match literal.literal {
                LiteralValue::String(text) | LiteralValue::Number(text) => Ok(single(text)),
                LiteralValue::Boolean(value) => Ok(single(value.to_string())),
                LiteralValue::BigInt(_) => Err(self.non_finite(ty)),
            },
            TypeNode::KeywordType(keyword) => match keyword.data.kind {
                SyntaxKind::NeverKeyword => Ok(FxIndexSet::default()),
                SyntaxKind::BooleanKeyword => Ok(["false", "true"].into_iter().map(String::from).collect()),
                SyntaxKind::NullKeyword => Ok(single("null")),
                SyntaxKind::UndefinedKeyword | SyntaxKind::VoidKeyword => Ok(single("undefined")),
                _ => Err(self.non_finite(ty)),
            },
            TypeNode::UnionType(union) => self.union_of_keys(union.types.iter().map(|member| ty.with_node(member))),
            TypeNode::IntersectionType(intersection) => {
                let mut result: Option<FxIndexSet<String>> = None;
                for member in intersection.types {
                    // `'a' & string` narrows nothing.
                    let member = self.expand_aliases(&ty.with_node(member))?;
                    if member.node.is_keyword(SyntaxKind::StringKeyword)
                        || member.node.is_keyword(SyntaxKind::NumberKeyword)
                    {
                        continue;
                    }
                    let keys = self.resolve_keys_scoped(&member)?;
                    result = Some(match result {
                        None => keys,
                        Some(previous) => previous.into_iter().filter(|key| keys.contains(key)).collect(),
                    });
                }
                result.ok_or_else(|| self.non_finite(ty))
            }
            TypeNode::TemplateLiteralType(template) => {
                let mut keys = vec![template.head.to_string()];
                for span in template.template_spans {
                    let parts = self.resolve_keys_scoped(&ty.with_node(span.type_node))?;
                    keys = keys
                        .iter()
                        .flat_map(|prefix| parts.iter().map(move |part| format!("{prefix}{part}{}", span.literal)))
                        .collect();
                }
                Ok(keys.into_iter().collect())
            }
            TypeNode::TypeOperator(operator) if operator.operator == SyntaxKind::KeyOfKeyword => {
                let operand = self.expand_aliases(&ty.with_node(operator.type_node))?;
                let open = [
                    SyntaxKind::AnyKeyword,
                    SyntaxKind::StringKeyword,
                    SyntaxKind::NumberKeyword,
                    SyntaxKind::SymbolKeyword,
                ]
                .into_iter()
                .any(|kind| operand.node.is_keyword(kind));
                if open || !self.index_signatures(&operand)?.is_empty() {
                    return Err(self.non_finite(ty));
                }
                let shape = self.decompose_scoped(&operand)?;
                Ok(shape.props.keys().cloned().collect())
            }
            TypeNode::TypeReference(reference) => self.reference_keys(ty, reference),
            TypeNode::ConditionalType(conditional) => {
                let branches = self.select_branches(conditional, ty)?;
                self.union_of_keys(branches)
            }
            TypeNode::IndexedAccessType(access) => {
                let object = ty.with_node(access.object_type);
                let index = ty.with_node(access.index_type);
                if let Some(elements) = self.number_indexed_elements(&object, &index)? {
                    return self.union_of_keys(elements);
                }
                let shape = self.decompose_scoped(&object)?;
                let mut keys = FxIndexSet::default();
                for key in self.resolve_keys_scoped(&index)? {
                    let Some(property) = shape.get(&key) else {
                        continue;
                    };
                    let property_type = property.scoped_type().ok_or_else(|| self.non_finite(ty))?;
                    keys.extend(self.resolve_keys_scoped(&property_type)?);
                }
                Ok(keys)
            }
            other => Err(ResolveError::UnsupportedIndexType {
                kind: format!("{:?}", other.kind()),
                location: self.location(&ty.scope, other.range()),
            }),
        }
    }

    /// Index signatures declared directly by an (alias-expanded) type literal
    /// or interface.
    pub(crate) fn index_signatures(
        &self,
        operand: &ScopedType<'a>,
    ) -> Result<Vec<&'a IndexSignatureDeclaration<'a>>, ResolveError> {
        let members: Vec<&'a TypeElement<'a>> = match operand.node {
            TypeNode::TypeLiteral(literal) => literal.members.iter().collect(),
            TypeNode::TypeReference(reference) => {
                let resolved = self.resolve_reference(
                    node_id(operand.node),
                    &reference.type_name,
                    &operand.scope,
                    &operand.bindings,
                    Space::Type,
                )?;
                match resolved.map(|resolved| resolved.declaration) {
                    Some(Declaration::Interface(group)) => group.iter().flat_map(|decl| decl.members.iter()).collect(),
                    _ => Vec::new(),
                }
            }
            _ => Vec::new(),
        };
        Ok(members
            .into_iter()
            .filter_map(|member| match member {
                TypeElement::IndexSignature(index) => Some(index),
                _ => None,
            })
            .collect())
    }

    fn reference_keys(
        &self,
        ty: &ScopedType<'a>,
        reference: &'a TypeReferenceNode<'a>,
    ) -> Result<FxIndexSet<String>, ResolveError> {
        let resolved =
            self.resolve_reference(node_id(ty.node), &reference.type_name, &ty.scope, &ty.bindings, Space::Type)?;
        let Some(resolved) = resolved else {
            return self.builtin_keys(ty, reference);
        };
        let ResolvedReference { declaration, scope, bindings } = resolved;
        match declaration {
            Declaration::TypeArgument(node) => self.resolve_keys(node, &scope, &bindings),
            Declaration::TypeParameter(name) => Err(ResolveError::UnboundTypeParameter {
                name: name.to_string(),
                location: self.location(&ty.scope, reference.data.range),
            }),
            Declaration::TypeAlias(alias) => {
                let bindings =
                    self.bind_type_parameters(alias.type_parameters, reference.type_arguments, &scope, &ty.scope, &ty.bindings);
                let key = (node_id(ty.node), ty.scope.id(), ty.bindings.id());
                self.expand(key, &ty.scope, reference.data.range, FxIndexSet::default, || {
                    self.resolve_keys(alias.type_node, &scope, &bindings)
                })
            }
            Declaration::Enum(decl) => enum_values(decl)
                .iter()
                .map(|value| value.key().ok_or_else(|| self.non_finite(ty)))
                .collect(),
            Declaration::EnumMember(decl, member) => {
                let index = decl.members.iter().position(|candidate| std::ptr::eq(candidate, member));
                let value = index.and_then(|index| enum_values(decl).into_iter().nth(index));
                value.and_then(|value| value.key()).map(single).ok_or_else(|| self.non_finite(ty))
            }
            _ => Err(self.non_finite(ty)),
        }
    }

    fn builtin_keys(
        &self,
        ty: &ScopedType<'a>,
        reference: &'a TypeReferenceNode<'a>,
    ) -> Result<FxIndexSet<String>, ResolveError> {
        let name = reference.type_name.text();
        let arguments = reference.type_arguments.unwrap_or_default();
        let argument = |index: usize| arguments.get(index).map(|node| ty.with_node(node));
        let unresolvable = || ResolveError::UnresolvableReference {
            name: name.clone(),
            location: self.location(&ty.scope, reference.data.range),
        };

        match name.as_str() {
            "Uppercase" | "Lowercase" | "Capitalize" | "Uncapitalize" => {
                let inner = argument(0).ok_or_else(|| self.non_finite(ty))?;
                Ok(self
                    .resolve_keys_scoped(&inner)?
                    .iter()
                    .map(|key| transform_case(&name, key))
                    .collect())
            }
            "Extract" | "Exclude" => {
                let (Some(source), Some(filter)) = (argument(0), argument(1)) else {
                    return Err(self.non_finite(ty));
                };
                let keep = name == "Extract";
                let members: Vec<_> = self
                    .flatten_union(&source)?
                    .into_iter()
                    .filter(|member| self.is_assignable_scoped(member, &filter) == keep)
                    .collect();
                self.union_of_keys(members)
            }
            "NonNullable" => {
                let source = argument(0).ok_or_else(|| self.non_finite(ty))?;
                let members: Vec<_> = self
                    .flatten_union(&source)?
                    .into_iter()
                    .filter(|member| {
                        !member.node.is_keyword(SyntaxKind::NullKeyword)
                            && !member.node.is_keyword(SyntaxKind::UndefinedKeyword)
                    })
                    .collect();
                self.union_of_keys(members)
            }
            _ => Err(unresolvable()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_case() {
        assert_eq!(transform_case("Capitalize", "id"), "Id");
        assert_eq!(transform_case("Uncapitalize", "Name"), "name");
        assert_eq!(transform_case("Uppercase", "click"), "CLICK");
        assert_eq!(transform_case("Lowercase", "MiXed"), "mixed");
        assert_eq!(transform_case("Capitalize", ""), "");
    }

    #[test]
    fn test_enum_value_keys() {
        assert_eq!(EnumValue::Number(1.0).key().as_deref(), Some("1"));
        assert_eq!(EnumValue::Number(-2.5).key().as_deref(), Some("-2.5"));
        assert_eq!(EnumValue::String("up".into()).key().as_deref(), Some("up"));
        assert_eq!(EnumValue::Computed.key(), None);
    }
}
