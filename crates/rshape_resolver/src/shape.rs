//! Decomposed shapes: ordered property maps and call signatures.

use std::fmt;
use std::rc::Rc;

use rshape_ast::node::{SignatureDeclaration, TypeNode};
use rshape_core::collections::FxIndexMap;
use rshape_core::text::TextRange;

use crate::bindings::{Bindings, ScopedType};
use crate::scope::FileScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    Intersection,
    Union,
}

/// The type of a property. Resolved lazily by the caller.
#[derive(Clone)]
pub enum PropertyType<'a> {
    Type(&'a TypeNode<'a>),
    /// A method. Always a function.
    Signature(&'a SignatureDeclaration<'a>),
    /// No annotation: accepts anything.
    Untyped,
    /// The same key contributed by several members of an intersection or
    /// union.
    Merged(MergeKind, Vec<PropertyDescriptor<'a>>),
}

impl fmt::Debug for PropertyType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Type(node) => write!(f, "Type({:?})", node.kind()),
            PropertyType::Signature(_) => write!(f, "Signature"),
            PropertyType::Untyped => write!(f, "Untyped"),
            PropertyType::Merged(kind, parts) => f.debug_tuple("Merged").field(kind).field(parts).finish(),
        }
    }
}

#[derive(Clone)]
pub struct PropertyDescriptor<'a> {
    pub key: String,
    pub ty: PropertyType<'a>,
    pub optional: bool,
    pub readonly: bool,
    /// Scope and bindings the property's type is interpreted in.
    pub scope: Rc<FileScope<'a>>,
    pub bindings: Bindings<'a>,
    /// The member the property came from.
    pub range: TextRange,
}

impl<'a> PropertyDescriptor<'a> {
    pub fn new(key: impl Into<String>, ty: PropertyType<'a>, scope: &Rc<FileScope<'a>>, bindings: &Bindings<'a>) -> Self {
        Self {
            key: key.into(),
            ty,
            optional: false,
            readonly: false,
            scope: Rc::clone(scope),
            bindings: bindings.clone(),
            range: TextRange::default(),
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn at(mut self, range: TextRange) -> Self {
        self.range = range;
        self
    }

    /// The property's type node with its scope, if it has a single one.
    pub fn scoped_type(&self) -> Option<ScopedType<'a>> {
        match self.ty {
            PropertyType::Type(node) => Some(ScopedType::new(node, &self.scope, &self.bindings)),
            _ => None,
        }
    }
}

impl fmt::Debug for PropertyDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("key", &self.key)
            .field("ty", &self.ty)
            .field("optional", &self.optional)
            .field("readonly", &self.readonly)
            .finish()
    }
}

/// A call signature together with the scope its types are interpreted in.
#[derive(Clone)]
pub struct CallSignature<'a> {
    pub signature: &'a SignatureDeclaration<'a>,
    pub scope: Rc<FileScope<'a>>,
    pub bindings: Bindings<'a>,
}

impl fmt::Debug for CallSignature<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSignature")
            .field("parameters", &self.signature.parameters.len())
            .field("has_return_type", &self.signature.return_type.is_some())
            .finish()
    }
}

/// A type reduced to its properties (unique keys, first-occurrence order) and
/// call signatures.
#[derive(Debug, Clone, Default)]
pub struct DecomposedType<'a> {
    pub props: FxIndexMap<String, PropertyDescriptor<'a>>,
    pub calls: Vec<CallSignature<'a>>,
}

impl<'a> DecomposedType<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.calls.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.props.keys().map(String::as_str).collect()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyDescriptor<'a>> {
        self.props.get(key)
    }

    /// Add a property unless the key is already present.
    pub fn insert_if_absent(&mut self, descriptor: PropertyDescriptor<'a>) {
        self.props.entry(descriptor.key.clone()).or_insert(descriptor);
    }

    /// Merge another decomposition in, keeping existing properties on key
    /// collisions. Used for interface heritage.
    pub fn inherit(&mut self, base: DecomposedType<'a>) {
        for (_, descriptor) in base.props {
            self.insert_if_absent(descriptor);
        }
        self.calls.extend(base.calls);
    }

    /// The intersection of two shapes. Every key of either side is kept; a
    /// key on both sides is optional only if it is optional on both.
    pub fn intersect(mut self, other: DecomposedType<'a>) -> Self {
        for (key, theirs) in other.props {
            match self.props.get_mut(&key) {
                Some(ours) => {
                    let merged = merge_descriptors(MergeKind::Intersection, ours.clone(), theirs);
                    *ours = merged;
                }
                None => {
                    self.props.insert(key, theirs);
                }
            }
        }
        self.calls.extend(other.calls);
        self
    }

    pub fn map_props(mut self, f: impl Fn(&mut PropertyDescriptor<'a>)) -> Self {
        self.props.values_mut().for_each(f);
        self
    }
}

/// Combine two descriptors of the same key.
pub(crate) fn merge_descriptors<'a>(
    kind: MergeKind,
    first: PropertyDescriptor<'a>,
    second: PropertyDescriptor<'a>,
) -> PropertyDescriptor<'a> {
    let (optional, readonly) = match kind {
        MergeKind::Intersection => (first.optional && second.optional, first.readonly || second.readonly),
        MergeKind::Union => (first.optional || second.optional, first.readonly && second.readonly),
    };
    let key = first.key.clone();
    let scope = Rc::clone(&first.scope);
    let bindings = first.bindings.clone();
    let range = first.range;
    let mut parts = Vec::with_capacity(2);
    for descriptor in [first, second] {
        match descriptor {
            PropertyDescriptor { ty: PropertyType::Merged(merged, inner), .. } if merged == kind => parts.extend(inner),
            descriptor => parts.push(descriptor),
        }
    }
    PropertyDescriptor {
        key,
        ty: PropertyType::Merged(kind, parts),
        optional,
        readonly,
        scope,
        bindings,
        range,
    }
}
