//! Syntax tree node definitions.
//!
//! The tree covers the declaration level of a TypeScript module: imports,
//! exports, interfaces, type aliases, classes, enums, functions, variables,
//! namespaces, and the complete type-expression grammar. Nodes reference their
//! children through arena-allocated references; identity of a node is its
//! address in the arena.

use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use rshape_core::text::TextRange;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all nodes.
#[derive(Debug, Clone, Copy)]
pub struct NodeData {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub flags: NodeFlags,
    pub modifier_flags: ModifierFlags,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            range: TextRange::new(pos, end),
            flags: NodeFlags::NONE,
            modifier_flags: ModifierFlags::NONE,
        }
    }

    /// Data for a node created after parsing. It has an empty range.
    pub fn synthesized(kind: SyntaxKind) -> Self {
        Self {
            kind,
            range: TextRange::empty(0),
            flags: NodeFlags::SYNTHESIZED,
            modifier_flags: ModifierFlags::NONE,
        }
    }

    #[inline]
    pub fn has_modifier(&self, flag: ModifierFlags) -> bool {
        self.modifier_flags.intersects(flag)
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// An optional arena-allocated node.
pub type OptionalNode<'a, T> = Option<&'a T>;

/// A token kept in the tree only for its presence and kind (`?`, `...`, `-`).
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub data: NodeData,
}

impl Token {
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }
}

// ============================================================================
// Source File
// ============================================================================

#[derive(Debug)]
pub struct SourceFile<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
    pub file_name: &'a str,
    pub text: &'a str,
    /// `.d.ts` files are ambient: every declaration is implicitly `declare`.
    pub is_declaration_file: bool,
}

impl<'a> SourceFile<'a> {
    /// Whether the file has any import or export statement, i.e. is a module
    /// rather than a script whose declarations are global.
    pub fn is_external_module(&self) -> bool {
        self.statements.iter().any(|statement| match statement {
            Statement::ImportDeclaration(_)
            | Statement::ExportDeclaration(_)
            | Statement::ExportAssignment(_) => true,
            other => other.data().has_modifier(ModifierFlags::EXPORT),
        })
    }
}

// ============================================================================
// Names and literals
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    pub data: NodeData,
    pub text: &'a str,
}

#[derive(Debug)]
pub struct QualifiedName<'a> {
    pub data: NodeData,
    pub left: EntityName<'a>,
    pub right: Identifier<'a>,
}

/// `A` or `A.B.C` in type position.
#[derive(Debug, Clone, Copy)]
pub enum EntityName<'a> {
    Identifier(Identifier<'a>),
    QualifiedName(&'a QualifiedName<'a>),
}

impl<'a> EntityName<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            EntityName::Identifier(id) => id.data.range,
            EntityName::QualifiedName(q) => q.data.range,
        }
    }

    /// The dotted parts of the name, leftmost first.
    pub fn parts(&self) -> Vec<&'a str> {
        match self {
            EntityName::Identifier(id) => vec![id.text],
            EntityName::QualifiedName(q) => {
                let mut parts = q.left.parts();
                parts.push(q.right.text);
                parts
            }
        }
    }

    /// The single identifier of an unqualified name.
    pub fn as_identifier(&self) -> Option<&'a str> {
        match self {
            EntityName::Identifier(id) => Some(id.text),
            EntityName::QualifiedName(_) => None,
        }
    }

    pub fn text(&self) -> String {
        self.parts().join(".")
    }
}

/// A string literal. `text` holds the cooked value (escapes processed).
#[derive(Debug, Clone, Copy)]
pub struct StringLiteral<'a> {
    pub data: NodeData,
    pub text: &'a str,
}

/// A numeric literal. `text` holds the canonical decimal spelling, so `0x10`
/// and `16` compare equal as property keys.
#[derive(Debug, Clone, Copy)]
pub struct NumericLiteral<'a> {
    pub data: NodeData,
    pub text: &'a str,
}

#[derive(Debug)]
pub struct ComputedPropertyName<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum PropertyName<'a> {
    Identifier(Identifier<'a>),
    PrivateIdentifier(Identifier<'a>),
    StringLiteral(StringLiteral<'a>),
    NumericLiteral(NumericLiteral<'a>),
    Computed(&'a ComputedPropertyName<'a>),
}

impl<'a> PropertyName<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            PropertyName::Identifier(id) | PropertyName::PrivateIdentifier(id) => id.data.range,
            PropertyName::StringLiteral(lit) => lit.data.range,
            PropertyName::NumericLiteral(lit) => lit.data.range,
            PropertyName::Computed(c) => c.data.range,
        }
    }

    /// The key spelled by a non-computed name.
    pub fn static_text(&self) -> Option<&'a str> {
        match self {
            PropertyName::Identifier(id) => Some(id.text),
            PropertyName::StringLiteral(lit) => Some(lit.text),
            PropertyName::NumericLiteral(lit) => Some(lit.text),
            PropertyName::PrivateIdentifier(_) | PropertyName::Computed(_) => None,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// The few expression forms that matter for type resolution: enum member
/// initializers, computed property keys and `export default <name>`.
/// Everything else is skipped and recorded as `Omitted`.
#[derive(Debug)]
pub enum Expression<'a> {
    Identifier(Identifier<'a>),
    StringLiteral(StringLiteral<'a>),
    NumericLiteral(NumericLiteral<'a>),
    BigIntLiteral(NumericLiteral<'a>),
    NoSubstitutionTemplateLiteral(StringLiteral<'a>),
    TrueKeyword(NodeData),
    FalseKeyword(NodeData),
    NullKeyword(NodeData),
    PrefixUnary(PrefixUnaryExpression<'a>),
    PropertyAccess(PropertyAccessExpression<'a>),
    Omitted(NodeData),
}

impl<'a> Expression<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Identifier(id) => &id.data,
            Expression::StringLiteral(lit) | Expression::NoSubstitutionTemplateLiteral(lit) => &lit.data,
            Expression::NumericLiteral(lit) | Expression::BigIntLiteral(lit) => &lit.data,
            Expression::TrueKeyword(data)
            | Expression::FalseKeyword(data)
            | Expression::NullKeyword(data)
            | Expression::Omitted(data) => data,
            Expression::PrefixUnary(e) => &e.data,
            Expression::PropertyAccess(e) => &e.data,
        }
    }
}

#[derive(Debug)]
pub struct PrefixUnaryExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct PropertyAccessExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub name: Identifier<'a>,
}

// ============================================================================
// Signatures
// ============================================================================

#[derive(Debug)]
pub struct TypeParameterDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub constraint: OptionalNode<'a, TypeNode<'a>>,
    pub default: OptionalNode<'a, TypeNode<'a>>,
}

/// A parameter's binding name. Destructuring patterns are kept only as a range.
#[derive(Debug, Clone, Copy)]
pub enum BindingName<'a> {
    Identifier(Identifier<'a>),
    Pattern(NodeData),
}

impl<'a> BindingName<'a> {
    pub fn as_identifier(&self) -> Option<&'a str> {
        match self {
            BindingName::Identifier(id) => Some(id.text),
            BindingName::Pattern(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct ParameterDeclaration<'a> {
    /// `modifier_flags` carries `public`/`readonly`/... of parameter properties.
    pub data: NodeData,
    pub dot_dot_dot_token: Option<Token>,
    pub name: BindingName<'a>,
    pub question_token: Option<Token>,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
    pub has_initializer: bool,
}

impl<'a> ParameterDeclaration<'a> {
    pub fn is_optional(&self) -> bool {
        self.question_token.is_some() || self.has_initializer
    }

    pub fn is_rest(&self) -> bool {
        self.dot_dot_dot_token.is_some()
    }
}

/// The callable part shared by function types, call signatures, methods and
/// function declarations.
#[derive(Debug)]
pub struct SignatureDeclaration<'a> {
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: OptionalNode<'a, TypeNode<'a>>,
}

/// Function types, constructor types, call and construct signatures.
#[derive(Debug)]
pub struct SignatureNode<'a> {
    pub data: NodeData,
    pub signature: SignatureDeclaration<'a>,
}

// ============================================================================
// Type members
// ============================================================================

#[derive(Debug)]
pub enum TypeElement<'a> {
    PropertySignature(PropertySignature<'a>),
    MethodSignature(MethodSignature<'a>),
    CallSignature(SignatureNode<'a>),
    ConstructSignature(SignatureNode<'a>),
    IndexSignature(IndexSignatureDeclaration<'a>),
    GetAccessor(AccessorDeclaration<'a>),
    SetAccessor(AccessorDeclaration<'a>),
}

impl<'a> TypeElement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            TypeElement::PropertySignature(n) => &n.data,
            TypeElement::MethodSignature(n) => &n.data,
            TypeElement::CallSignature(n) | TypeElement::ConstructSignature(n) => &n.data,
            TypeElement::IndexSignature(n) => &n.data,
            TypeElement::GetAccessor(n) | TypeElement::SetAccessor(n) => &n.data,
        }
    }
}

#[derive(Debug)]
pub struct PropertySignature<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub question_token: Option<Token>,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
}

#[derive(Debug)]
pub struct MethodSignature<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub question_token: Option<Token>,
    pub signature: SignatureDeclaration<'a>,
}

#[derive(Debug)]
pub struct IndexSignatureDeclaration<'a> {
    pub data: NodeData,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
}

/// `get x(): T` / `set x(v: T)` in a class or an object type.
#[derive(Debug)]
pub struct AccessorDeclaration<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub signature: SignatureDeclaration<'a>,
}

impl<'a> AccessorDeclaration<'a> {
    /// The type an accessor exposes: the getter's return type or the setter's
    /// parameter type.
    pub fn value_type(&self) -> OptionalNode<'a, TypeNode<'a>> {
        match self.data.kind {
            SyntaxKind::SetAccessor => self.signature.parameters.first().and_then(|p| p.type_annotation),
            _ => self.signature.return_type,
        }
    }
}

// ============================================================================
// Class members
// ============================================================================

#[derive(Debug)]
pub enum ClassElement<'a> {
    PropertyDeclaration(PropertyDeclaration<'a>),
    MethodDeclaration(MethodDeclaration<'a>),
    Constructor(ConstructorDeclaration<'a>),
    GetAccessor(AccessorDeclaration<'a>),
    SetAccessor(AccessorDeclaration<'a>),
    IndexSignature(IndexSignatureDeclaration<'a>),
    /// Static blocks and stray semicolons.
    Unsupported(NodeData),
}

impl<'a> ClassElement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            ClassElement::PropertyDeclaration(n) => &n.data,
            ClassElement::MethodDeclaration(n) => &n.data,
            ClassElement::Constructor(n) => &n.data,
            ClassElement::GetAccessor(n) | ClassElement::SetAccessor(n) => &n.data,
            ClassElement::IndexSignature(n) => &n.data,
            ClassElement::Unsupported(data) => data,
        }
    }
}

#[derive(Debug)]
pub struct PropertyDeclaration<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub question_token: Option<Token>,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
    pub has_initializer: bool,
}

#[derive(Debug)]
pub struct MethodDeclaration<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub question_token: Option<Token>,
    pub signature: SignatureDeclaration<'a>,
}

#[derive(Debug)]
pub struct ConstructorDeclaration<'a> {
    pub data: NodeData,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
}

// ============================================================================
// Type Nodes
// ============================================================================

#[derive(Debug)]
pub enum TypeNode<'a> {
    /// `string`, `number`, `never`, `null`, ... (`data.kind` is the keyword).
    KeywordType(KeywordTypeNode),
    TypeReference(TypeReferenceNode<'a>),
    FunctionType(SignatureNode<'a>),
    ConstructorType(SignatureNode<'a>),
    TypeQuery(TypeQueryNode<'a>),
    TypeLiteral(TypeLiteralNode<'a>),
    ArrayType(ArrayTypeNode<'a>),
    TupleType(TupleTypeNode<'a>),
    OptionalType(WrappedTypeNode<'a>),
    RestType(WrappedTypeNode<'a>),
    NamedTupleMember(NamedTupleMemberNode<'a>),
    UnionType(UnionOrIntersectionTypeNode<'a>),
    IntersectionType(UnionOrIntersectionTypeNode<'a>),
    ConditionalType(ConditionalTypeNode<'a>),
    InferType(InferTypeNode<'a>),
    ParenthesizedType(WrappedTypeNode<'a>),
    ThisType(KeywordTypeNode),
    TypeOperator(TypeOperatorNode<'a>),
    IndexedAccessType(IndexedAccessTypeNode<'a>),
    MappedType(MappedTypeNode<'a>),
    LiteralType(LiteralTypeNode<'a>),
    TemplateLiteralType(TemplateLiteralTypeNode<'a>),
    ImportType(ImportTypeNode<'a>),
    TypePredicate(TypePredicateNode<'a>),
}

impl<'a> TypeNode<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            TypeNode::KeywordType(n) | TypeNode::ThisType(n) => &n.data,
            TypeNode::TypeReference(n) => &n.data,
            TypeNode::FunctionType(n) | TypeNode::ConstructorType(n) => &n.data,
            TypeNode::TypeQuery(n) => &n.data,
            TypeNode::TypeLiteral(n) => &n.data,
            TypeNode::ArrayType(n) => &n.data,
            TypeNode::TupleType(n) => &n.data,
            TypeNode::OptionalType(n) | TypeNode::RestType(n) | TypeNode::ParenthesizedType(n) => &n.data,
            TypeNode::NamedTupleMember(n) => &n.data,
            TypeNode::UnionType(n) | TypeNode::IntersectionType(n) => &n.data,
            TypeNode::ConditionalType(n) => &n.data,
            TypeNode::InferType(n) => &n.data,
            TypeNode::TypeOperator(n) => &n.data,
            TypeNode::IndexedAccessType(n) => &n.data,
            TypeNode::MappedType(n) => &n.data,
            TypeNode::LiteralType(n) => &n.data,
            TypeNode::TemplateLiteralType(n) => &n.data,
            TypeNode::ImportType(n) => &n.data,
            TypeNode::TypePredicate(n) => &n.data,
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.data().range
    }

    /// Whether this is the keyword type `kind` (e.g. `SyntaxKind::NeverKeyword`).
    pub fn is_keyword(&self, kind: SyntaxKind) -> bool {
        matches!(self, TypeNode::KeywordType(n) if n.data.kind == kind)
    }

    /// Strip any number of surrounding parentheses.
    pub fn skip_parentheses(&'a self) -> &'a TypeNode<'a> {
        let mut node = self;
        while let TypeNode::ParenthesizedType(inner) = node {
            node = inner.type_node;
        }
        node
    }
}

#[derive(Debug)]
pub struct KeywordTypeNode {
    pub data: NodeData,
}

/// Parenthesized, optional (`T?` in tuples) and rest (`...T`) types.
#[derive(Debug)]
pub struct WrappedTypeNode<'a> {
    pub data: NodeData,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct TypeReferenceNode<'a> {
    /// `flags` carries `IGNORE_DIRECTIVE` when the reference was marked.
    pub data: NodeData,
    pub type_name: EntityName<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
}

#[derive(Debug)]
pub struct TypeQueryNode<'a> {
    pub data: NodeData,
    pub expr_name: EntityName<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
}

#[derive(Debug)]
pub struct TypeLiteralNode<'a> {
    pub data: NodeData,
    pub members: NodeList<'a, TypeElement<'a>>,
}

#[derive(Debug)]
pub struct ArrayTypeNode<'a> {
    pub data: NodeData,
    pub element_type: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct TupleTypeNode<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, TypeNode<'a>>,
}

#[derive(Debug)]
pub struct NamedTupleMemberNode<'a> {
    pub data: NodeData,
    pub dot_dot_dot_token: Option<Token>,
    pub name: Identifier<'a>,
    pub question_token: Option<Token>,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct UnionOrIntersectionTypeNode<'a> {
    pub data: NodeData,
    pub types: NodeList<'a, TypeNode<'a>>,
}

#[derive(Debug)]
pub struct ConditionalTypeNode<'a> {
    pub data: NodeData,
    pub check_type: &'a TypeNode<'a>,
    pub extends_type: &'a TypeNode<'a>,
    pub true_type: &'a TypeNode<'a>,
    pub false_type: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct InferTypeNode<'a> {
    pub data: NodeData,
    pub type_parameter: &'a TypeParameterDeclaration<'a>,
}

/// `keyof T`, `unique symbol`, `readonly T[]`.
#[derive(Debug)]
pub struct TypeOperatorNode<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct IndexedAccessTypeNode<'a> {
    pub data: NodeData,
    pub object_type: &'a TypeNode<'a>,
    pub index_type: &'a TypeNode<'a>,
}

/// How a mapped type's `?` / `readonly` modifier changes its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedModifier {
    /// No modifier: keep the source property's modifier.
    Preserve,
    /// `?` / `+?`
    Add,
    /// `-?`
    Remove,
}

#[derive(Debug)]
pub struct MappedTypeNode<'a> {
    pub data: NodeData,
    /// `ReadonlyKeyword`, `PlusToken` or `MinusToken`.
    pub readonly_token: Option<Token>,
    /// The iteration variable; its constraint is the key type.
    pub type_parameter: &'a TypeParameterDeclaration<'a>,
    /// The `as` clause.
    pub name_type: OptionalNode<'a, TypeNode<'a>>,
    /// `QuestionToken`, `PlusToken` or `MinusToken`.
    pub question_token: Option<Token>,
    pub type_node: OptionalNode<'a, TypeNode<'a>>,
}

impl<'a> MappedTypeNode<'a> {
    pub fn optional_modifier(&self) -> MappedModifier {
        modifier_of(self.question_token)
    }

    pub fn readonly_modifier(&self) -> MappedModifier {
        modifier_of(self.readonly_token)
    }
}

fn modifier_of(token: Option<Token>) -> MappedModifier {
    match token.map(|t| t.kind()) {
        None => MappedModifier::Preserve,
        Some(SyntaxKind::MinusToken) => MappedModifier::Remove,
        Some(_) => MappedModifier::Add,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralValue<'a> {
    String(&'a str),
    /// Canonical decimal text, possibly with a leading `-`.
    Number(&'a str),
    BigInt(&'a str),
    Boolean(bool),
}

#[derive(Debug)]
pub struct LiteralTypeNode<'a> {
    pub data: NodeData,
    pub literal: LiteralValue<'a>,
}

/// `` `head${A}middle${B}tail` ``. `head` and span literals hold cooked text.
#[derive(Debug)]
pub struct TemplateLiteralTypeNode<'a> {
    pub data: NodeData,
    pub head: &'a str,
    pub template_spans: NodeList<'a, TemplateLiteralTypeSpan<'a>>,
}

#[derive(Debug)]
pub struct TemplateLiteralTypeSpan<'a> {
    pub data: NodeData,
    pub type_node: &'a TypeNode<'a>,
    pub literal: &'a str,
}

/// `import('./mod').Name<T>` and `typeof import('./mod')`.
#[derive(Debug)]
pub struct ImportTypeNode<'a> {
    pub data: NodeData,
    pub is_type_of: bool,
    pub argument: StringLiteral<'a>,
    pub qualifier: Option<EntityName<'a>>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
}

/// `x is T` / `asserts x is T` / `asserts x`.
#[derive(Debug)]
pub struct TypePredicateNode<'a> {
    pub data: NodeData,
    pub asserts: bool,
    pub parameter_name: Identifier<'a>,
    pub type_node: OptionalNode<'a, TypeNode<'a>>,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug)]
pub struct HeritageClause<'a> {
    pub data: NodeData,
    /// `ExtendsKeyword` or `ImplementsKeyword`.
    pub token: SyntaxKind,
    pub types: NodeList<'a, ExpressionWithTypeArguments<'a>>,
}

/// One entry of a heritage clause, e.g. `Base<T>` in `extends Base<T>`.
#[derive(Debug)]
pub struct ExpressionWithTypeArguments<'a> {
    /// `flags` carries `IGNORE_DIRECTIVE` when the entry was marked.
    pub data: NodeData,
    pub expression: EntityName<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
}

#[derive(Debug)]
pub struct InterfaceDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub heritage_clauses: Option<NodeList<'a, HeritageClause<'a>>>,
    pub members: NodeList<'a, TypeElement<'a>>,
}

#[derive(Debug)]
pub struct TypeAliasDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct ClassDeclaration<'a> {
    pub data: NodeData,
    /// `None` for `export default class { ... }`.
    pub name: Option<Identifier<'a>>,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub heritage_clauses: Option<NodeList<'a, HeritageClause<'a>>>,
    pub members: NodeList<'a, ClassElement<'a>>,
}

#[derive(Debug)]
pub struct EnumDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub members: NodeList<'a, EnumMember<'a>>,
}

#[derive(Debug)]
pub struct EnumMember<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub data: NodeData,
    pub name: Option<Identifier<'a>>,
    pub signature: SignatureDeclaration<'a>,
}

#[derive(Debug)]
pub struct VariableStatement<'a> {
    pub data: NodeData,
    pub declaration_list: VariableDeclarationList<'a>,
}

#[derive(Debug)]
pub struct VariableDeclarationList<'a> {
    /// `flags` carries `LET` / `CONST`.
    pub data: NodeData,
    pub declarations: NodeList<'a, VariableDeclaration<'a>>,
}

#[derive(Debug)]
pub struct VariableDeclaration<'a> {
    pub data: NodeData,
    pub name: BindingName<'a>,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum ModuleName<'a> {
    Identifier(Identifier<'a>),
    StringLiteral(StringLiteral<'a>),
}

impl<'a> ModuleName<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            ModuleName::Identifier(id) => id.text,
            ModuleName::StringLiteral(lit) => lit.text,
        }
    }
}

#[derive(Debug)]
pub struct ModuleBlock<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub enum ModuleBody<'a> {
    Block(ModuleBlock<'a>),
    /// `namespace A.B { }` nests `B` inside `A`.
    Namespace(&'a ModuleDeclaration<'a>),
}

/// `namespace N { }`, `module N { }`, `declare module 'm' { }`, `declare global { }`.
#[derive(Debug)]
pub struct ModuleDeclaration<'a> {
    /// `flags` carries `NAMESPACE` or `GLOBAL_AUGMENTATION`.
    pub data: NodeData,
    pub name: ModuleName<'a>,
    pub body: Option<ModuleBody<'a>>,
}

impl<'a> ModuleDeclaration<'a> {
    pub fn is_global_augmentation(&self) -> bool {
        self.data.flags.contains(NodeFlags::GLOBAL_AUGMENTATION)
    }

    /// The statements of the innermost block (`namespace A.B { ... }`).
    pub fn statements(&self) -> NodeList<'a, Statement<'a>> {
        match &self.body {
            Some(ModuleBody::Block(block)) => block.statements,
            Some(ModuleBody::Namespace(inner)) => inner.statements(),
            None => &[],
        }
    }
}

// ============================================================================
// Imports and exports
// ============================================================================

#[derive(Debug)]
pub struct ImportDeclaration<'a> {
    pub data: NodeData,
    /// `None` for side-effect imports (`import './x'`).
    pub import_clause: Option<ImportClause<'a>>,
    pub module_specifier: StringLiteral<'a>,
}

#[derive(Debug)]
pub struct ImportClause<'a> {
    pub data: NodeData,
    pub is_type_only: bool,
    /// The default import binding.
    pub name: Option<Identifier<'a>>,
    pub named_bindings: Option<NamedImportBindings<'a>>,
}

#[derive(Debug)]
pub enum NamedImportBindings<'a> {
    NamespaceImport(NamespaceImport<'a>),
    NamedImports(NamedImports<'a>),
}

#[derive(Debug)]
pub struct NamespaceImport<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
}

#[derive(Debug)]
pub struct NamedImports<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, ImportSpecifier<'a>>,
}

/// `{ a }`, `{ a as b }`, `{ type a }`.
#[derive(Debug)]
pub struct ImportSpecifier<'a> {
    pub data: NodeData,
    pub is_type_only: bool,
    /// The imported name when it differs from the local name.
    pub property_name: Option<Identifier<'a>>,
    pub name: Identifier<'a>,
}

#[derive(Debug)]
pub struct ExportDeclaration<'a> {
    pub data: NodeData,
    pub is_type_only: bool,
    /// `None` for `export * from '...'`.
    pub export_clause: Option<NamedExportBindings<'a>>,
    pub module_specifier: Option<StringLiteral<'a>>,
}

#[derive(Debug)]
pub enum NamedExportBindings<'a> {
    /// `export * as ns from '...'`
    NamespaceExport(NamespaceExport<'a>),
    NamedExports(NamedExports<'a>),
}

#[derive(Debug)]
pub struct NamespaceExport<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
}

#[derive(Debug)]
pub struct NamedExports<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, ExportSpecifier<'a>>,
}

/// `{ a }`, `{ a as b }`. `property_name` is the local (or source) name.
#[derive(Debug)]
pub struct ExportSpecifier<'a> {
    pub data: NodeData,
    pub is_type_only: bool,
    pub property_name: Option<Identifier<'a>>,
    pub name: Identifier<'a>,
}

impl<'a> ExportSpecifier<'a> {
    /// The name being exported from the module's point of view (`a` in `a as b`).
    pub fn local_name(&self) -> &'a str {
        self.property_name.unwrap_or(self.name).text
    }
}

/// `export default <expr>;` or `export = <expr>;`
#[derive(Debug)]
pub struct ExportAssignment<'a> {
    pub data: NodeData,
    pub is_export_equals: bool,
    pub expression: &'a Expression<'a>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    ImportDeclaration(ImportDeclaration<'a>),
    ExportDeclaration(ExportDeclaration<'a>),
    ExportAssignment(ExportAssignment<'a>),
    InterfaceDeclaration(InterfaceDeclaration<'a>),
    TypeAliasDeclaration(TypeAliasDeclaration<'a>),
    ClassDeclaration(ClassDeclaration<'a>),
    EnumDeclaration(EnumDeclaration<'a>),
    FunctionDeclaration(FunctionDeclaration<'a>),
    VariableStatement(VariableStatement<'a>),
    ModuleDeclaration(ModuleDeclaration<'a>),
    /// A runtime statement the parser skipped (`if`, expression statements,
    /// `import x = require(...)`, ...).
    Unsupported(NodeData),
}

impl<'a> Statement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::ImportDeclaration(n) => &n.data,
            Statement::ExportDeclaration(n) => &n.data,
            Statement::ExportAssignment(n) => &n.data,
            Statement::InterfaceDeclaration(n) => &n.data,
            Statement::TypeAliasDeclaration(n) => &n.data,
            Statement::ClassDeclaration(n) => &n.data,
            Statement::EnumDeclaration(n) => &n.data,
            Statement::FunctionDeclaration(n) => &n.data,
            Statement::VariableStatement(n) => &n.data,
            Statement::ModuleDeclaration(n) => &n.data,
            Statement::Unsupported(data) => data,
        }
    }
}
