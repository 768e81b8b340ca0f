//! Generic bindings: persistent maps from type-parameter names to the types
//! substituted for them.
//!
//! A binding set is an `Rc`-linked chain of single-entry layers. Extending a
//! set creates a new head and leaves the original untouched, so a set can be
//! shared by every descriptor produced under it and used as a memo key by
//! address.

use std::fmt;
use std::rc::Rc;

use rshape_ast::node::TypeNode;

use crate::scope::FileScope;

/// A type expression together with the scope and bindings it must be
/// interpreted in.
#[derive(Clone)]
pub struct ScopedType<'a> {
    pub node: &'a TypeNode<'a>,
    pub scope: Rc<FileScope<'a>>,
    pub bindings: Bindings<'a>,
}

impl<'a> ScopedType<'a> {
    pub fn new(node: &'a TypeNode<'a>, scope: &Rc<FileScope<'a>>, bindings: &Bindings<'a>) -> Self {
        Self { node, scope: Rc::clone(scope), bindings: bindings.clone() }
    }

    /// The same node and bindings with parentheses stripped.
    pub fn skip_parentheses(&self) -> Self {
        Self { node: self.node.skip_parentheses(), ..self.clone() }
    }

    /// Another node interpreted in this one's scope and bindings.
    pub fn with_node(&self, node: &'a TypeNode<'a>) -> Self {
        Self { node, ..self.clone() }
    }
}

impl fmt::Debug for ScopedType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedType")
            .field("kind", &self.node.kind())
            .field("range", &self.node.range())
            .field("file", &self.scope.file_name)
            .field("bindings", &self.bindings)
            .finish()
    }
}

/// What a type parameter is bound to.
#[derive(Clone)]
pub enum BoundType<'a> {
    /// A type argument, default or constraint, with the scope that supplied it.
    Type(ScopedType<'a>),
    /// A parameter with nothing to substitute. It still shadows outer
    /// declarations of the same name.
    Parameter(&'a str),
}

impl fmt::Debug for BoundType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundType::Type(ty) => write!(f, "{:?}@{:?}", ty.node.kind(), ty.node.range()),
            BoundType::Parameter(name) => write!(f, "param {name}"),
        }
    }
}

struct Layer<'a> {
    name: &'a str,
    value: BoundType<'a>,
    parent: Option<Rc<Layer<'a>>>,
}

#[derive(Clone, Default)]
pub struct Bindings<'a> {
    head: Option<Rc<Layer<'a>>>,
}

impl<'a> Bindings<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// The innermost binding for `name`.
    pub fn get(&self, name: &str) -> Option<&BoundType<'a>> {
        let mut layer = self.head.as_deref();
        while let Some(current) = layer {
            if current.name == name {
                return Some(&current.value);
            }
            layer = current.parent.as_deref();
        }
        None
    }

    /// A new set with `name` bound on top of this one.
    #[must_use]
    pub fn with(&self, name: &'a str, value: BoundType<'a>) -> Self {
        Self {
            head: Some(Rc::new(Layer { name, value, parent: self.head.clone() })),
        }
    }

    #[must_use]
    pub fn extend(&self, entries: impl IntoIterator<Item = (&'a str, BoundType<'a>)>) -> Self {
        entries
            .into_iter()
            .fold(self.clone(), |bindings, (name, value)| bindings.with(name, value))
    }

    /// Address identity of the set; `0` for the empty set.
    pub fn id(&self) -> usize {
        self.head.as_ref().map_or(0, |layer| Rc::as_ptr(layer) as usize)
    }

    /// Bound names, innermost first. Shadowed names appear once.
    pub fn names(&self) -> Vec<&'a str> {
        let mut names: Vec<&'a str> = Vec::new();
        let mut layer = self.head.as_deref();
        while let Some(current) = layer {
            if !names.contains(&current.name) {
                names.push(current.name);
            }
            layer = current.parent.as_deref();
        }
        names
    }
}

impl fmt::Debug for Bindings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_shadows_without_mutating_parent() {
        let parent = Bindings::empty().with("T", BoundType::Parameter("T"));
        let child = parent.with("T", BoundType::Parameter("U"));

        assert!(matches!(parent.get("T"), Some(BoundType::Parameter("T"))));
        assert!(matches!(child.get("T"), Some(BoundType::Parameter("U"))));
        assert_eq!(child.names(), vec!["T"]);
        assert!(child.get("K").is_none());
    }

    #[test]
    fn test_identity() {
        let empty = Bindings::empty();
        assert_eq!(empty.id(), 0);
        let one = empty.with("K", BoundType::Parameter("K"));
        assert_ne!(one.id(), 0);
        assert_eq!(one.clone().id(), one.id());
        let two = empty.extend([("A", BoundType::Parameter("A")), ("B", BoundType::Parameter("B"))]);
        assert_ne!(two.id(), one.id());
        assert_eq!(two.names(), vec!["B", "A"]);
    }
}
