//! SyntaxKind enum - token and node kinds of the declaration-level syntax tree.
//!
//! Only the kinds the declaration parser produces are listed. Runtime code
//! (function bodies, initializers, other statements) is skipped by the parser
//! and never gets a node of its own.

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        impl SyntaxKind {
            /// The source text of a keyword kind.
            pub fn keyword_text(self) -> Option<&'static str> {
                match self {
                    $(SyntaxKind::$variant => Some($text),)*
                    _ => None,
                }
            }

            /// The keyword kind spelled `text`, if any.
            pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
                match text {
                    $($text => Some(SyntaxKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

/// The kind of a token or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown,
    EndOfFileToken,

    // Trivia
    SingleLineCommentTrivia,
    MultiLineCommentTrivia,
    NewLineTrivia,
    WhitespaceTrivia,
    ShebangTrivia,

    // Literals
    NumericLiteral,
    BigIntLiteral,
    StringLiteral,
    RegularExpressionLiteral,
    NoSubstitutionTemplateLiteral,

    // Pseudo-literals (template)
    TemplateHead,
    TemplateMiddle,
    TemplateTail,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    DotDotDotToken,
    SemicolonToken,
    CommaToken,
    QuestionDotToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsGreaterThanToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    AsteriskAsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    ExclamationToken,
    TildeToken,
    AmpersandAmpersandToken,
    BarBarToken,
    QuestionToken,
    QuestionQuestionToken,
    ColonToken,
    AtToken,
    HashToken,
    EqualsToken,
    /// `+=`, `-=`, `&&=` and friends. Only ever skipped.
    CompoundAssignmentToken,

    // Identifiers
    Identifier,
    PrivateIdentifier,

    // Reserved words
    BreakKeyword,
    CaseKeyword,
    CatchKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DebuggerKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    EnumKeyword,
    ExportKeyword,
    ExtendsKeyword,
    FalseKeyword,
    FinallyKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    ImportKeyword,
    InKeyword,
    InstanceOfKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SuperKeyword,
    SwitchKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,
    WhileKeyword,
    WithKeyword,

    // Strict mode reserved words
    ImplementsKeyword,
    InterfaceKeyword,
    LetKeyword,
    PackageKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    StaticKeyword,
    YieldKeyword,

    // Contextual keywords
    AbstractKeyword,
    AccessorKeyword,
    AsKeyword,
    AssertsKeyword,
    AnyKeyword,
    AsyncKeyword,
    AwaitKeyword,
    BooleanKeyword,
    ConstructorKeyword,
    DeclareKeyword,
    GetKeyword,
    InferKeyword,
    IntrinsicKeyword,
    IsKeyword,
    KeyOfKeyword,
    ModuleKeyword,
    NamespaceKeyword,
    NeverKeyword,
    OutKeyword,
    ReadonlyKeyword,
    RequireKeyword,
    NumberKeyword,
    ObjectKeyword,
    SatisfiesKeyword,
    SetKeyword,
    StringKeyword,
    SymbolKeyword,
    TypeKeyword,
    UndefinedKeyword,
    UniqueKeyword,
    UnknownKeyword,
    FromKeyword,
    GlobalKeyword,
    BigIntKeyword,
    OverrideKeyword,
    OfKeyword,

    // ========================================================================
    // Nodes
    // ========================================================================

    // Names
    QualifiedName,
    ComputedPropertyName,

    // Signature elements
    TypeParameter,
    Parameter,

    // Type members
    PropertySignature,
    PropertyDeclaration,
    MethodSignature,
    MethodDeclaration,
    Constructor,
    GetAccessor,
    SetAccessor,
    CallSignature,
    ConstructSignature,
    IndexSignature,

    // Types
    TypePredicate,
    TypeReference,
    FunctionType,
    ConstructorType,
    TypeQuery,
    TypeLiteral,
    ArrayType,
    TupleType,
    OptionalType,
    RestType,
    UnionType,
    IntersectionType,
    ConditionalType,
    InferType,
    ParenthesizedType,
    ThisType,
    TypeOperator,
    IndexedAccessType,
    MappedType,
    LiteralType,
    NamedTupleMember,
    TemplateLiteralType,
    TemplateLiteralTypeSpan,
    ImportType,

    // Expressions the declaration parser models
    PrefixUnaryExpression,
    PropertyAccessExpression,
    ExpressionWithTypeArguments,
    /// An expression skipped without building a node.
    OmittedExpression,

    // Binding patterns (skipped, only their range is kept)
    BindingPattern,

    // Statements
    VariableStatement,
    VariableDeclarationList,
    VariableDeclaration,
    FunctionDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    TypeAliasDeclaration,
    EnumDeclaration,
    EnumMember,
    ModuleDeclaration,
    ModuleBlock,
    ImportEqualsDeclaration,
    ImportDeclaration,
    ImportClause,
    NamespaceImport,
    NamedImports,
    ImportSpecifier,
    ExportAssignment,
    ExportDeclaration,
    NamedExports,
    NamespaceExport,
    ExportSpecifier,
    HeritageClause,
    /// A statement or class element the parser skipped.
    UnsupportedNode,

    SourceFile,
}

impl SyntaxKind {
    pub const FIRST_RESERVED_WORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_RESERVED_WORD: SyntaxKind = SyntaxKind::WithKeyword;
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::OfKeyword;
    pub const FIRST_TYPE_NODE: SyntaxKind = SyntaxKind::TypePredicate;
    pub const LAST_TYPE_NODE: SyntaxKind = SyntaxKind::ImportType;

    #[inline]
    pub fn is_keyword(self) -> bool {
        self >= Self::FIRST_KEYWORD && self <= Self::LAST_KEYWORD
    }

    /// Reserved words can never be used as a type or binding name.
    #[inline]
    pub fn is_reserved_word(self) -> bool {
        self >= Self::FIRST_RESERVED_WORD && self <= Self::LAST_RESERVED_WORD
    }

    /// Identifiers and every keyword that may double as one.
    #[inline]
    pub fn is_identifier_or_contextual_keyword(self) -> bool {
        self == SyntaxKind::Identifier || (self.is_keyword() && !self.is_reserved_word())
    }

    #[inline]
    pub fn is_type_node(self) -> bool {
        self >= Self::FIRST_TYPE_NODE && self <= Self::LAST_TYPE_NODE
    }

    /// Keywords that denote a type by themselves (`string`, `never`, ...).
    pub fn is_keyword_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::AnyKeyword
                | SyntaxKind::UnknownKeyword
                | SyntaxKind::StringKeyword
                | SyntaxKind::NumberKeyword
                | SyntaxKind::BigIntKeyword
                | SyntaxKind::BooleanKeyword
                | SyntaxKind::SymbolKeyword
                | SyntaxKind::ObjectKeyword
                | SyntaxKind::NeverKeyword
                | SyntaxKind::UndefinedKeyword
                | SyntaxKind::VoidKeyword
                | SyntaxKind::NullKeyword
                | SyntaxKind::IntrinsicKeyword
        )
    }

    pub fn is_modifier_kind(self) -> bool {
        matches!(
            self,
            SyntaxKind::AbstractKeyword
                | SyntaxKind::AccessorKeyword
                | SyntaxKind::AsyncKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::DefaultKeyword
                | SyntaxKind::ExportKeyword
                | SyntaxKind::InKeyword
                | SyntaxKind::OutKeyword
                | SyntaxKind::OverrideKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::PublicKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::StaticKeyword
        )
    }

    /// Source text of a punctuation kind, used in "'x' expected." messages.
    pub fn punctuation_text(self) -> Option<&'static str> {
        Some(match self {
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::DotToken => ".",
            SyntaxKind::DotDotDotToken => "...",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::QuestionDotToken => "?.",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::EqualsGreaterThanToken => "=>",
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::AsteriskAsteriskToken => "**",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::PlusPlusToken => "++",
            SyntaxKind::MinusMinusToken => "--",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::BarToken => "|",
            SyntaxKind::CaretToken => "^",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::TildeToken => "~",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::QuestionToken => "?",
            SyntaxKind::QuestionQuestionToken => "??",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::AtToken => "@",
            SyntaxKind::HashToken => "#",
            SyntaxKind::EqualsToken => "=",
            _ => return None,
        })
    }

    /// Text for a token kind in diagnostics.
    pub fn token_text(self) -> &'static str {
        self.punctuation_text()
            .or_else(|| self.keyword_text())
            .unwrap_or("token")
    }
}

keywords! {
    BreakKeyword => "break",
    CaseKeyword => "case",
    CatchKeyword => "catch",
    ClassKeyword => "class",
    ConstKeyword => "const",
    ContinueKeyword => "continue",
    DebuggerKeyword => "debugger",
    DefaultKeyword => "default",
    DeleteKeyword => "delete",
    DoKeyword => "do",
    ElseKeyword => "else",
    EnumKeyword => "enum",
    ExportKeyword => "export",
    ExtendsKeyword => "extends",
    FalseKeyword => "false",
    FinallyKeyword => "finally",
    ForKeyword => "for",
    FunctionKeyword => "function",
    IfKeyword => "if",
    ImportKeyword => "import",
    InKeyword => "in",
    InstanceOfKeyword => "instanceof",
    NewKeyword => "new",
    NullKeyword => "null",
    ReturnKeyword => "return",
    SuperKeyword => "super",
    SwitchKeyword => "switch",
    ThisKeyword => "this",
    ThrowKeyword => "throw",
    TrueKeyword => "true",
    TryKeyword => "try",
    TypeOfKeyword => "typeof",
    VarKeyword => "var",
    VoidKeyword => "void",
    WhileKeyword => "while",
    WithKeyword => "with",
    ImplementsKeyword => "implements",
    InterfaceKeyword => "interface",
    LetKeyword => "let",
    PackageKeyword => "package",
    PrivateKeyword => "private",
    ProtectedKeyword => "protected",
    PublicKeyword => "public",
    StaticKeyword => "static",
    YieldKeyword => "yield",
    AbstractKeyword => "abstract",
    AccessorKeyword => "accessor",
    AsKeyword => "as",
    AssertsKeyword => "asserts",
    AnyKeyword => "any",
    AsyncKeyword => "async",
    AwaitKeyword => "await",
    BooleanKeyword => "boolean",
    ConstructorKeyword => "constructor",
    DeclareKeyword => "declare",
    GetKeyword => "get",
    InferKeyword => "infer",
    IntrinsicKeyword => "intrinsic",
    IsKeyword => "is",
    KeyOfKeyword => "keyof",
    ModuleKeyword => "module",
    NamespaceKeyword => "namespace",
    NeverKeyword => "never",
    OutKeyword => "out",
    ReadonlyKeyword => "readonly",
    RequireKeyword => "require",
    NumberKeyword => "number",
    ObjectKeyword => "object",
    SatisfiesKeyword => "satisfies",
    SetKeyword => "set",
    StringKeyword => "string",
    SymbolKeyword => "symbol",
    TypeKeyword => "type",
    UndefinedKeyword => "undefined",
    UniqueKeyword => "unique",
    UnknownKeyword => "unknown",
    FromKeyword => "from",
    GlobalKeyword => "global",
    BigIntKeyword => "bigint",
    OverrideKeyword => "override",
    OfKeyword => "of",
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        assert_eq!(SyntaxKind::from_keyword("keyof"), Some(SyntaxKind::KeyOfKeyword));
        assert_eq!(SyntaxKind::KeyOfKeyword.keyword_text(), Some("keyof"));
        assert_eq!(SyntaxKind::from_keyword("Props"), None);
    }

    #[test]
    fn test_keyword_classes() {
        assert!(SyntaxKind::ClassKeyword.is_reserved_word());
        assert!(!SyntaxKind::TypeKeyword.is_reserved_word());
        assert!(SyntaxKind::TypeKeyword.is_identifier_or_contextual_keyword());
        assert!(SyntaxKind::NeverKeyword.is_keyword_type());
        assert!(SyntaxKind::MappedType.is_type_node());
        assert!(!SyntaxKind::InterfaceDeclaration.is_type_node());
    }
}
