//! Runtime-tag inference.
//!
//! Maps a type to the JavaScript constructors a runtime check would test
//! against. Inference never fails: anything that cannot be resolved degrades
//! to [`RuntimeTag::Unknown`].

use std::fmt;
use std::rc::Rc;

use rshape_ast::node::*;
use rshape_ast::syntax_kind::SyntaxKind;
use rshape_core::collections::FxIndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bindings::{Bindings, ScopedType};
use crate::context::TypeResolutionContext;
use crate::error::ResolveError;
use crate::keys::{enum_values, EnumValue};
use crate::resolve::{node_id, ResolvedReference, Space};
use crate::scope::{Declaration, FileScope};
use crate::shape::{MergeKind, PropertyDescriptor, PropertyType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuntimeTag {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Function,
    Date,
    Set,
    Map,
    Symbol,
    Error,
    Null,
    Unknown,
}

impl RuntimeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeTag::String => "String",
            RuntimeTag::Number => "Number",
            RuntimeTag::Boolean => "Boolean",
            RuntimeTag::Object => "Object",
            RuntimeTag::Array => "Array",
            RuntimeTag::Function => "Function",
            RuntimeTag::Date => "Date",
            RuntimeTag::Set => "Set",
            RuntimeTag::Map => "Map",
            RuntimeTag::Symbol => "Symbol",
            RuntimeTag::Error => "Error",
            RuntimeTag::Null => "null",
            RuntimeTag::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RuntimeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags in first-inferred order, without duplicates. Equality ignores order.
pub type RuntimeTags = FxIndexSet<RuntimeTag>;

fn tags<const N: usize>(list: [RuntimeTag; N]) -> RuntimeTags {
    list.into_iter().collect()
}

fn unknown() -> RuntimeTags {
    tags([RuntimeTag::Unknown])
}

/// `Unknown` is dropped from an intersection unless nothing else is known.
fn intersect_tags(parts: impl IntoIterator<Item = RuntimeTags>) -> RuntimeTags {
    let mut all: RuntimeTags = parts.into_iter().flatten().collect();
    if all.len() > 1 {
        all.shift_remove(&RuntimeTag::Unknown);
    }
    all
}

fn member_tags<'e, 'n: 'e>(members: impl IntoIterator<Item = &'e TypeElement<'n>>) -> RuntimeTags {
    let mut result = RuntimeTags::default();
    for member in members {
        result.insert(match member {
            TypeElement::CallSignature(_) | TypeElement::ConstructSignature(_) => RuntimeTag::Function,
            _ => RuntimeTag::Object,
        });
    }
    if result.is_empty() {
        result.insert(RuntimeTag::Object);
    }
    result
}

fn enum_value_tag(value: &EnumValue) -> RuntimeTag {
    match value {
        EnumValue::String(_) => RuntimeTag::String,
        EnumValue::Number(_) | EnumValue::Computed => RuntimeTag::Number,
    }
}

fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

impl<'a> TypeResolutionContext<'a> {
    /// Infer the runtime tags of a type expression.
    pub fn infer_runtime_tags(
        &self,
        node: &'a TypeNode<'a>,
        scope: &Rc<FileScope<'a>>,
        bindings: &Bindings<'a>,
    ) -> RuntimeTags {
        self.infer_scoped(&ScopedType::new(node, scope, bindings))
    }

    /// Infer the runtime tags of one property of a decomposition.
    pub fn infer_property_tags(&self, descriptor: &PropertyDescriptor<'a>) -> RuntimeTags {
        match &descriptor.ty {
            PropertyType::Type(node) => self.infer_runtime_tags(node, &descriptor.scope, &descriptor.bindings),
            PropertyType::Signature(_) => tags([RuntimeTag::Function]),
            PropertyType::Untyped => unknown(),
            PropertyType::Merged(MergeKind::Intersection, parts) => {
                intersect_tags(parts.iter().map(|part| self.infer_property_tags(part)))
            }
            PropertyType::Merged(MergeKind::Union, parts) => {
                parts.iter().flat_map(|part| self.infer_property_tags(part)).collect()
            }
        }
    }

    /// Each member of a union, intersection or conditional goes through here,
    /// so a failure degrades only that member.
    pub(crate) fn infer_scoped(&self, ty: &ScopedType<'a>) -> RuntimeTags {
        match self.try_infer(ty) {
            Ok(result) if !result.is_empty() => result,
            Ok(_) => unknown(),
            Err(error) => {
                debug!(file = %ty.scope.file_name, %error, "runtime tag inference degraded to Unknown");
                unknown()
            }
        }
    }

    fn try_infer(&self, ty: &ScopedType<'a>) -> Result<RuntimeTags, ResolveError> {
        let ty = ty.skip_parentheses();
        self.frame(&ty.scope, ty.node.range(), || self.infer_worker(&ty))
    }

    fn infer_worker(&self, ty: &ScopedType<'a>) -> Result<RuntimeTags, ResolveError> {
        Ok(match ty.node {
            TypeNode::KeywordType(keyword) => tags([match keyword.data.kind {
                SyntaxKind::StringKeyword => RuntimeTag::String,
                SyntaxKind::NumberKeyword => RuntimeTag::Number,
                SyntaxKind::BooleanKeyword => RuntimeTag::Boolean,
                SyntaxKind::SymbolKeyword => RuntimeTag::Symbol,
                SyntaxKind::ObjectKeyword => RuntimeTag::Object,
                SyntaxKind::NullKeyword
                | SyntaxKind::UndefinedKeyword
                | SyntaxKind::VoidKeyword
                | SyntaxKind::NeverKeyword => RuntimeTag::Null,
                _ => RuntimeTag::Unknown,
            }]),
            TypeNode::ThisType(_) | TypeNode::MappedType(_) => tags([RuntimeTag::Object]),
            TypeNode::TypeLiteral(literal) => member_tags(literal.members),
            TypeNode::FunctionType(_) | TypeNode::ConstructorType(_) => tags([RuntimeTag::Function]),
            TypeNode::ArrayType(_) | TypeNode::TupleType(_) | TypeNode::RestType(_) => tags([RuntimeTag::Array]),
            TypeNode::LiteralType(literal) => tags([match literal.literal {
                LiteralValue::String(_) => RuntimeTag::String,
                LiteralValue::Number(_) => RuntimeTag::Number,
                LiteralValue::Boolean(_) => RuntimeTag::Boolean,
                LiteralValue::BigInt(_) => RuntimeTag::Unknown,
            }]),
            TypeNode::TemplateLiteralType(_) => tags([RuntimeTag::String]),
            TypeNode::TypePredicate(_) => tags([RuntimeTag::Boolean]),
            TypeNode::InferType(_) => unknown(),
            TypeNode::OptionalType(wrapped) | TypeNode::ParenthesizedType(wrapped) => {
                self.try_infer(&ty.with_node(wrapped.type_node))?
            }
            TypeNode::NamedTupleMember(member) if member.dot_dot_dot_token.is_some() => tags([RuntimeTag::Array]),
            TypeNode::NamedTupleMember(member) => self.try_infer(&ty.with_node(member.type_node))?,
            TypeNode::TypeOperator(operator) => match operator.operator {
                SyntaxKind::KeyOfKeyword => self.keyof_tags(&ty.with_node(operator.type_node))?,
                SyntaxKind::UniqueKeyword => tags([RuntimeTag::Symbol]),
                _ => self.try_infer(&ty.with_node(operator.type_node))?,
            },
            TypeNode::UnionType(union) => {
                let mut result = RuntimeTags::default();
                for member in union.types {
                    result.extend(self.infer_scoped(&ty.with_node(member)));
                }
                result
            }
            TypeNode::IntersectionType(intersection) => {
                intersect_tags(intersection.types.iter().map(|member| self.infer_scoped(&ty.with_node(member))))
            }
            TypeNode::TypeReference(reference) => self.reference_tags(ty, reference)?,
            TypeNode::TypeQuery(query) => {
                let resolved =
                    self.resolve_reference(node_id(ty.node), &query.expr_name, &ty.scope, &ty.bindings, Space::Value)?;
                match resolved {
                    Some(ResolvedReference { declaration: Declaration::Function(_) | Declaration::Class(_), .. }) => {
                        tags([RuntimeTag::Function])
                    }
                    Some(ResolvedReference { declaration: Declaration::Variable(variable), scope, .. }) => {
                        match variable.type_annotation {
                            Some(annotation) => self.try_infer(&ScopedType::new(annotation, &scope, &Bindings::empty()))?,
                            None => unknown(),
                        }
                    }
                    Some(ResolvedReference { declaration: Declaration::Enum(_), .. }) => tags([RuntimeTag::Object]),
                    _ => unknown(),
                }
            }
            TypeNode::ConditionalType(conditional) => {
                let mut result = RuntimeTags::default();
                for branch in self.select_branches(conditional, ty)? {
                    result.extend(self.infer_scoped(&branch));
                }
                result
            }
            TypeNode::IndexedAccessType(access) => {
                let object = ty.with_node(access.object_type);
                let index = ty.with_node(access.index_type);
                let mut result = RuntimeTags::default();
                if let Some(elements) = self.number_indexed_elements(&object, &index)? {
                    for element in elements {
                        result.extend(self.infer_scoped(&element));
                    }
                    return Ok(result);
                }
                let shape = self.decompose_scoped(&object)?;
                for key in self.resolve_keys_scoped(&index)? {
                    if let Some(property) = shape.get(&key) {
                        result.extend(self.infer_property_tags(property));
                    }
                }
                result
            }
            TypeNode::ImportType(import) => match (import.is_type_of, import.qualifier) {
                (false, Some(qualifier)) => match self.resolve_import_type(import, &qualifier, &ty.scope)? {
                    Some(reference) => self.declaration_tags(&reference, import.type_arguments, ty)?,
                    None => unknown(),
                },
                _ => unknown(),
            },
        })
    }

    fn reference_tags(
        &self,
        ty: &ScopedType<'a>,
        reference: &'a TypeReferenceNode<'a>,
    ) -> Result<RuntimeTags, ResolveError> {
        let resolved =
            self.resolve_reference(node_id(ty.node), &reference.type_name, &ty.scope, &ty.bindings, Space::Type)?;
        match resolved {
            Some(resolved) => {
                let key = (node_id(ty.node), ty.scope.id(), ty.bindings.id());
                self.expand(key, &ty.scope, reference.data.range, unknown, || {
                    self.declaration_tags(&resolved, reference.type_arguments, ty)
                })
            }
            None => self.builtin_tags(ty, reference),
        }
    }

    fn declaration_tags(
        &self,
        reference: &ResolvedReference<'a>,
        type_arguments: Option<&'a [TypeNode<'a>]>,
        site: &ScopedType<'a>,
    ) -> Result<RuntimeTags, ResolveError> {
        let scope = &reference.scope;
        Ok(match reference.declaration {
            Declaration::TypeArgument(node) => self.try_infer(&ScopedType::new(node, scope, &reference.bindings))?,
            Declaration::TypeParameter(_) | Declaration::Function(_) | Declaration::Variable(_) => unknown(),
            Declaration::Interface(group) => member_tags(group.iter().flat_map(|decl| decl.members.iter())),
            Declaration::TypeAlias(alias) => match alias.type_node.skip_parentheses() {
                TypeNode::FunctionType(_) => tags([RuntimeTag::Function]),
                rhs => {
                    let bindings =
                        self.bind_type_parameters(alias.type_parameters, type_arguments, scope, &site.scope, &site.bindings);
                    self.try_infer(&ScopedType::new(rhs, scope, &bindings))?
                }
            },
            Declaration::Class(_) | Declaration::Namespace(_) | Declaration::ModuleNamespace => {
                tags([RuntimeTag::Object])
            }
            Declaration::Enum(decl) => {
                let result: RuntimeTags = enum_values(decl).iter().map(enum_value_tag).collect();
                if result.is_empty() {
                    tags([RuntimeTag::Number])
                } else {
                    result
                }
            }
            Declaration::EnumMember(decl, member) => {
                let index = decl.members.iter().position(|candidate| std::ptr::eq(candidate, member));
                let value = index.and_then(|index| enum_values(decl).into_iter().nth(index));
                tags([value.as_ref().map_or(RuntimeTag::Number, enum_value_tag)])
            }
        })
    }

    /// Tags of global built-ins referenced without a local declaration.
    fn builtin_tags(
        &self,
        ty: &ScopedType<'a>,
        reference: &'a TypeReferenceNode<'a>,
    ) -> Result<RuntimeTags, ResolveError> {
        let arguments = reference.type_arguments.unwrap_or_default();
        let argument = |index: usize| arguments.get(index).map(|node| ty.with_node(node));
        let name = reference.type_name.text();
        Ok(match name.as_str() {
            "Array" | "ReadonlyArray" | "Parameters" | "ConstructorParameters" => tags([RuntimeTag::Array]),
            "Function" => tags([RuntimeTag::Function]),
            "Object" | "Promise" | "WeakMap" | "WeakSet" | "Partial" | "Required" | "Readonly" | "Record"
            | "Pick" | "Omit" | "InstanceType" => tags([RuntimeTag::Object]),
            "Date" => tags([RuntimeTag::Date]),
            "Set" | "ReadonlySet" => tags([RuntimeTag::Set]),
            "Map" | "ReadonlyMap" => tags([RuntimeTag::Map]),
            "Error" => tags([RuntimeTag::Error]),
            "Uppercase" | "Lowercase" | "Capitalize" | "Uncapitalize" => tags([RuntimeTag::String]),
            "NonNullable" => match argument(0) {
                Some(inner) => {
                    let mut result = self.try_infer(&inner)?;
                    result.shift_remove(&RuntimeTag::Null);
                    result
                }
                None => unknown(),
            },
            "Extract" => argument(1).map_or_else(|| Ok(unknown()), |filter| self.try_infer(&filter))?,
            "Exclude" => argument(0).map_or_else(|| Ok(unknown()), |source| self.try_infer(&source))?,
            "Awaited" => match argument(0) {
                Some(inner) => self.try_infer(&self.awaited(&inner)?)?,
                None => unknown(),
            },
            "ReturnType" => {
                let call = match argument(0) {
                    Some(inner) => self.first_call_signature(&inner)?,
                    None => None,
                };
                match call.and_then(|call| call.signature.return_type.map(|ret| (ret, call))) {
                    Some((ret, call)) => self.try_infer(&ScopedType::new(ret, &call.scope, &call.bindings))?,
                    None => unknown(),
                }
            }
            _ => {
                debug!(name = %name, file = %ty.scope.file_name, "unknown global type");
                unknown()
            }
        })
    }

    /// Tags of the keys of `keyof X`.
    fn keyof_tags(&self, operand: &ScopedType<'a>) -> Result<RuntimeTags, ResolveError> {
        let operand = self.expand_aliases(operand)?;
        if operand.node.is_keyword(SyntaxKind::AnyKeyword) {
            return Ok(tags([RuntimeTag::String, RuntimeTag::Number, RuntimeTag::Symbol]));
        }

        let mut result = RuntimeTags::default();
        for key in self.decompose_scoped(&operand)?.props.keys() {
            result.insert(if is_numeric_key(key) { RuntimeTag::Number } else { RuntimeTag::String });
        }

        for index in self.index_signatures(&operand)? {
            let key_type = index.parameters.first().and_then(|parameter| parameter.type_annotation);
            if let Some(key_type) = key_type {
                result.extend(self.infer_scoped(&operand.with_node(key_type)));
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_drops_unknown() {
        let result = intersect_tags([unknown(), tags([RuntimeTag::String])]);
        assert_eq!(result, tags([RuntimeTag::String]));
        assert_eq!(intersect_tags([unknown(), unknown()]), unknown());
    }

    #[test]
    fn test_tags_compare_as_sets() {
        assert_eq!(
            tags([RuntimeTag::String, RuntimeTag::Number]),
            tags([RuntimeTag::Number, RuntimeTag::String])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(RuntimeTag::Function.to_string(), "Function");
        assert_eq!(RuntimeTag::Null.to_string(), "null");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&[RuntimeTag::Date, RuntimeTag::Unknown]).unwrap();
        assert_eq!(json, r#"["Date","Unknown"]"#);
    }

    #[test]
    fn test_numeric_keys() {
        assert!(is_numeric_key("0"));
        assert!(is_numeric_key("12"));
        assert!(!is_numeric_key(""));
        assert!(!is_numeric_key("a1"));
    }
}
