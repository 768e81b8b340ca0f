//! The declaration parser.
//!
//! A recursive descent parser over the scanner's token stream. Module items
//! and declarations are parsed into nodes; runtime statements and bodies are
//! skipped (see `skip.rs`). The type grammar lives in `type_parser.rs`.

use bumpalo::Bump;
use rshape_ast::node::*;
use rshape_ast::syntax_kind::SyntaxKind;
use rshape_ast::types::*;
use rshape_core::alloc_slice;
use rshape_core::text::TextSpan;
use rshape_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use rshape_scanner::{Scanner, ScannerState};

use crate::skip::SkipMode;
use crate::utilities::is_declaration_file_name;

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
pub(crate) const MAX_RECURSION_DEPTH: u32 = 200;

/// Everything needed to roll back a speculative parse.
pub(crate) struct ParserState {
    scanner: ScannerState,
    prev_token_end: u32,
    diagnostics_len: usize,
}

/// The parser produces a `SourceFile` tree from TypeScript source text.
pub struct Parser<'a> {
    pub(crate) arena: &'a Bump,
    pub(crate) scanner: Scanner<'a>,
    pub(crate) file_name: &'a str,
    pub(crate) source_text: &'a str,
    pub(crate) diagnostics: DiagnosticCollection,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    pub(crate) recursion_depth: u32,
    /// End of the last consumed token. Nodes end here.
    pub(crate) prev_token_end: u32,
    /// Set while parsing the `extends` operand of a conditional type.
    pub(crate) disallow_conditional_types: bool,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, file_name: &str, source_text: &str) -> Self {
        let source_text: &'a str = arena.alloc_str(source_text);
        Self {
            arena,
            scanner: Scanner::new(source_text),
            file_name: arena.alloc_str(file_name),
            source_text,
            diagnostics: DiagnosticCollection::new(),
            recursion_depth: 0,
            prev_token_end: 0,
            disallow_conditional_types: false,
        }
    }

    pub fn parse_source_file(&mut self) -> &'a SourceFile<'a> {
        self.scanner.skip_shebang();
        self.next_token();

        let statements = self.parse_statements(false);
        let end = self.source_text.len() as u32;

        self.arena.alloc(SourceFile {
            data: NodeData::new(SyntaxKind::SourceFile, 0, end),
            statements,
            file_name: self.file_name,
            text: self.source_text,
            is_declaration_file: is_declaration_file_name(self.file_name),
        })
    }

    /// Parse the whole text as a single type.
    pub fn parse_type_expression(&mut self) -> &'a TypeNode<'a> {
        self.next_token();
        let type_node = self.parse_type_and_alloc();
        if self.current_token() != SyntaxKind::EndOfFileToken {
            self.error(&messages::UNEXPECTED_TOKEN, &[]);
        }
        type_node
    }

    /// Parser and scanner diagnostics, sorted by position.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        let mut diagnostics = std::mem::take(&mut self.diagnostics);

        // Lookahead may scan the same region more than once.
        let mut scanner_diagnostics = self.scanner.take_diagnostics().into_diagnostics();
        scanner_diagnostics.sort_by_key(|d| d.span.map(|span| span.start));
        scanner_diagnostics.dedup_by(|a, b| a.code == b.code && a.span == b.span);

        for mut diagnostic in scanner_diagnostics {
            diagnostic.file = Some(self.file_name.to_string());
            diagnostics.add(diagnostic);
        }
        diagnostics.sort();
        diagnostics
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub(crate) fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.scanner.token_end() as u32;
        self.scanner.scan()
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.token_end() as u32
    }

    #[inline]
    pub(crate) fn token_value(&self) -> &str {
        self.scanner.token_value()
    }

    #[inline]
    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    /// Node data spanning from `pos` to the end of the last consumed token.
    pub(crate) fn node_data(&self, kind: SyntaxKind, pos: u32) -> NodeData {
        NodeData::new(kind, pos, self.prev_token_end.max(pos))
    }

    fn declaration_data(&self, kind: SyntaxKind, pos: u32, modifiers: ModifierFlags) -> NodeData {
        let mut data = self.node_data(kind, pos);
        data.modifier_flags = modifiers;
        data
    }

    #[inline]
    pub(crate) fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    #[inline]
    pub(crate) fn alloc_list<T>(&self, items: Vec<T>) -> &'a [T] {
        alloc_slice(self.arena, items)
    }

    #[inline]
    pub(crate) fn alloc_str(&self, text: &str) -> &'a str {
        rshape_core::alloc_str(self.arena, text)
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn optional_token(&mut self, kind: SyntaxKind) -> Option<Token> {
        if self.current_token() == kind {
            let data = NodeData::new(kind, self.token_pos(), self.token_end());
            self.next_token();
            Some(Token { data })
        } else {
            None
        }
    }

    pub(crate) fn expect_token(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        self.error(&messages::_0_EXPECTED, &[kind.token_text()]);
        false
    }

    /// Automatic semicolon insertion: a missing `;` is never an error here.
    pub(crate) fn parse_semicolon(&mut self) {
        self.parse_optional(SyntaxKind::SemicolonToken);
    }

    pub(crate) fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        let (pos, end) = (self.token_pos(), self.token_end());
        self.error_at(message, args, pos, end);
    }

    pub(crate) fn error_at(&mut self, message: &DiagnosticMessage, args: &[&str], pos: u32, end: u32) {
        let span = TextSpan::new(pos, end.saturating_sub(pos));
        self.diagnostics
            .add(Diagnostic::with_location(self.file_name, span, message, args));
    }

    pub(crate) fn save_state(&self) -> ParserState {
        ParserState {
            scanner: self.scanner.save_state(),
            prev_token_end: self.prev_token_end,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub(crate) fn restore_state(&mut self, state: ParserState) {
        self.scanner.restore_state(state.scanner);
        self.prev_token_end = state.prev_token_end;
        self.diagnostics.truncate(state.diagnostics_len);
    }

    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    // ========================================================================
    // Names and literals
    // ========================================================================

    /// An identifier, or a contextual keyword used as one.
    #[inline]
    pub(crate) fn is_identifier(&self) -> bool {
        self.current_token().is_identifier_or_contextual_keyword()
    }

    /// Property names and qualified-name parts may also be reserved words.
    #[inline]
    pub(crate) fn is_identifier_name(&self) -> bool {
        let token = self.current_token();
        token == SyntaxKind::Identifier || token.is_keyword()
    }

    pub(crate) fn parse_identifier(&mut self) -> Identifier<'a> {
        let pos = self.token_pos();
        if !self.is_identifier_name() {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            return Identifier {
                data: NodeData::new(SyntaxKind::Identifier, pos, pos),
                text: "",
            };
        }
        let text = self.alloc_str(self.token_value());
        self.next_token();
        Identifier {
            data: self.node_data(SyntaxKind::Identifier, pos),
            text,
        }
    }

    pub(crate) fn parse_string_literal(&mut self) -> StringLiteral<'a> {
        let pos = self.token_pos();
        if self.current_token() != SyntaxKind::StringLiteral {
            self.error(&messages::STRING_LITERAL_EXPECTED, &[]);
            return StringLiteral {
                data: NodeData::new(SyntaxKind::StringLiteral, pos, pos),
                text: "",
            };
        }
        let text = self.alloc_str(self.token_value());
        self.next_token();
        StringLiteral {
            data: self.node_data(SyntaxKind::StringLiteral, pos),
            text,
        }
    }

    /// A numeric or bigint literal at the current token.
    pub(crate) fn parse_numeric_literal(&mut self) -> NumericLiteral<'a> {
        let pos = self.token_pos();
        let kind = self.current_token();
        let text = self.alloc_str(self.token_value());
        self.next_token();
        NumericLiteral {
            data: self.node_data(kind, pos),
            text,
        }
    }

    /// `A` or `A.B.C`.
    pub(crate) fn parse_entity_name(&mut self) -> EntityName<'a> {
        let pos = self.token_pos();
        let mut name = EntityName::Identifier(self.parse_identifier());
        while self.current_token() == SyntaxKind::DotToken {
            self.next_token();
            let right = self.parse_identifier();
            let data = self.node_data(SyntaxKind::QualifiedName, pos);
            name = EntityName::QualifiedName(self.alloc(QualifiedName { data, left: name, right }));
        }
        name
    }

    pub(crate) fn is_property_name_start(&self) -> bool {
        self.is_identifier_name()
            || matches!(
                self.current_token(),
                SyntaxKind::StringLiteral
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::BigIntLiteral
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::PrivateIdentifier
            )
    }

    pub(crate) fn parse_property_name(&mut self) -> PropertyName<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::StringLiteral => PropertyName::StringLiteral(self.parse_string_literal()),
            SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral => {
                PropertyName::NumericLiteral(self.parse_numeric_literal())
            }
            SyntaxKind::PrivateIdentifier => {
                let text = self.alloc_str(self.token_value());
                self.next_token();
                PropertyName::PrivateIdentifier(Identifier {
                    data: self.node_data(SyntaxKind::PrivateIdentifier, pos),
                    text,
                })
            }
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let expression = self.parse_simple_expression(SkipMode::Expression);
                self.expect_token(SyntaxKind::CloseBracketToken);
                PropertyName::Computed(self.alloc(ComputedPropertyName {
                    data: self.node_data(SyntaxKind::ComputedPropertyName, pos),
                    expression,
                }))
            }
            _ => PropertyName::Identifier(self.parse_identifier()),
        }
    }

    /// A module specifier or an export name written as a string (`export { "a-b" as c }`).
    fn parse_module_export_name(&mut self) -> Identifier<'a> {
        if self.current_token() == SyntaxKind::StringLiteral {
            let literal = self.parse_string_literal();
            return Identifier {
                data: literal.data,
                text: literal.text,
            };
        }
        self.parse_identifier()
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub(crate) fn parse_statements(&mut self, in_block: bool) -> NodeList<'a, Statement<'a>> {
        let mut statements = Vec::new();
        loop {
            match self.current_token() {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CloseBraceToken if in_block => break,
                _ => {}
            }

            let saved_pos = self.token_pos();
            let statement = self.parse_statement();

            // Error recovery: always make progress on a token no statement can
            // start with.
            if self.token_pos() == saved_pos && self.current_token() != SyntaxKind::EndOfFileToken {
                if !in_block || self.current_token() != SyntaxKind::CloseBraceToken {
                    self.error(&messages::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
                    self.next_token();
                }
            }

            match statement {
                Statement::Unsupported(data) if data.range.is_empty() => {}
                statement => statements.push(statement),
            }
        }
        self.alloc_list(statements)
    }

    fn parse_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::ImportKeyword if self.is_import_declaration_start() => {
                self.parse_import_declaration(pos)
            }
            SyntaxKind::ExportKeyword => self.parse_export(pos),
            SyntaxKind::AtToken => {
                self.skip_decorators();
                if self.current_token() == SyntaxKind::ExportKeyword || self.is_start_of_declaration() {
                    self.parse_declaration(pos, ModifierFlags::NONE)
                } else {
                    self.skip_statement(pos)
                }
            }
            _ if self.is_start_of_declaration() => self.parse_declaration(pos, ModifierFlags::NONE),
            _ => self.skip_statement(pos),
        }
    }

    /// Whether the current token starts an import, export or declaration.
    pub(crate) fn is_start_of_module_item(&mut self) -> bool {
        matches!(
            self.current_token(),
            SyntaxKind::ImportKeyword | SyntaxKind::ExportKeyword
        ) || self.is_start_of_declaration()
    }

    pub(crate) fn is_start_of_declaration(&mut self) -> bool {
        match self.current_token() {
            SyntaxKind::InterfaceKeyword
            | SyntaxKind::ClassKeyword
            | SyntaxKind::EnumKeyword
            | SyntaxKind::FunctionKeyword
            | SyntaxKind::VarKeyword
            | SyntaxKind::ConstKeyword => true,
            SyntaxKind::LetKeyword => self.look_ahead(|p| {
                p.next_token();
                p.is_identifier() || matches!(p.current_token(), SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken)
            }),
            SyntaxKind::TypeKeyword | SyntaxKind::NamespaceKeyword => self.look_ahead(|p| {
                p.next_token();
                !p.has_preceding_line_break() && p.is_identifier()
            }),
            SyntaxKind::ModuleKeyword => self.look_ahead(|p| {
                p.next_token();
                !p.has_preceding_line_break()
                    && (p.is_identifier() || p.current_token() == SyntaxKind::StringLiteral)
            }),
            SyntaxKind::GlobalKeyword => self.look_ahead(|p| {
                p.next_token();
                p.current_token() == SyntaxKind::OpenBraceToken
            }),
            SyntaxKind::DeclareKeyword | SyntaxKind::AbstractKeyword | SyntaxKind::AsyncKeyword => {
                self.look_ahead(|p| {
                    p.next_token();
                    !p.has_preceding_line_break() && p.is_start_of_declaration()
                })
            }
            _ => false,
        }
    }

    fn parse_declaration(&mut self, pos: u32, mut modifiers: ModifierFlags) -> Statement<'a> {
        loop {
            let token = self.current_token();
            let flag = match token {
                SyntaxKind::ExportKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::AbstractKeyword
                | SyntaxKind::AsyncKeyword
                | SyntaxKind::DefaultKeyword => ModifierFlags::from_modifier_kind(token),
                SyntaxKind::ConstKeyword
                    if self.look_ahead(|p| p.next_token() == SyntaxKind::EnumKeyword) =>
                {
                    ModifierFlags::CONST
                }
                _ => break,
            };
            modifiers |= flag;
            self.next_token();
        }

        match self.current_token() {
            SyntaxKind::InterfaceKeyword => self.parse_interface_declaration(pos, modifiers),
            SyntaxKind::TypeKeyword => self.parse_type_alias_declaration(pos, modifiers),
            SyntaxKind::EnumKeyword => self.parse_enum_declaration(pos, modifiers),
            SyntaxKind::ClassKeyword => self.parse_class_declaration(pos, modifiers),
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(pos, modifiers),
            SyntaxKind::VarKeyword | SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => {
                self.parse_variable_statement(pos, modifiers)
            }
            SyntaxKind::NamespaceKeyword | SyntaxKind::ModuleKeyword | SyntaxKind::GlobalKeyword => {
                self.parse_module_declaration(pos, modifiers)
            }
            _ => self.skip_statement(pos),
        }
    }

    // ========================================================================
    // Imports
    // ========================================================================

    /// `import(...)`, `import.meta` and `import x = require(...)` are not
    /// import declarations.
    fn is_import_declaration_start(&mut self) -> bool {
        self.look_ahead(|p| {
            let first = p.next_token();
            if matches!(first, SyntaxKind::OpenParenToken | SyntaxKind::DotToken) {
                return false;
            }
            if !p.is_identifier_name() {
                return true;
            }
            let second = p.next_token();
            if second == SyntaxKind::EqualsToken {
                return false;
            }
            if first == SyntaxKind::TypeKeyword && p.is_identifier_name() {
                return p.next_token() != SyntaxKind::EqualsToken;
            }
            true
        })
    }

    fn parse_import_declaration(&mut self, pos: u32) -> Statement<'a> {
        self.expect_token(SyntaxKind::ImportKeyword);
        let import_clause = if self.current_token() == SyntaxKind::StringLiteral {
            None
        } else {
            let clause = self.parse_import_clause();
            self.expect_token(SyntaxKind::FromKeyword);
            Some(clause)
        };
        let module_specifier = self.parse_string_literal();
        self.skip_import_attributes();
        self.parse_semicolon();

        Statement::ImportDeclaration(ImportDeclaration {
            data: self.node_data(SyntaxKind::ImportDeclaration, pos),
            import_clause,
            module_specifier,
        })
    }

    fn parse_import_clause(&mut self) -> ImportClause<'a> {
        let pos = self.token_pos();
        let is_type_only = self.current_token() == SyntaxKind::TypeKeyword
            && self.look_ahead(|p| {
                let next = p.next_token();
                matches!(next, SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken)
                    || (p.is_identifier_name() && next != SyntaxKind::FromKeyword)
                    || (next == SyntaxKind::FromKeyword
                        && p.next_token() == SyntaxKind::FromKeyword)
            });
        if is_type_only {
            self.next_token();
        }

        let name = match self.current_token() {
            SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken => None,
            _ => Some(self.parse_identifier()),
        };

        let named_bindings = if name.is_none() || self.parse_optional(SyntaxKind::CommaToken) {
            let bindings_pos = self.token_pos();
            match self.current_token() {
                SyntaxKind::AsteriskToken => {
                    self.next_token();
                    self.expect_token(SyntaxKind::AsKeyword);
                    let name = self.parse_identifier();
                    Some(NamedImportBindings::NamespaceImport(NamespaceImport {
                        data: self.node_data(SyntaxKind::NamespaceImport, bindings_pos),
                        name,
                    }))
                }
                SyntaxKind::OpenBraceToken => {
                    let elements = self.parse_import_specifiers();
                    Some(NamedImportBindings::NamedImports(NamedImports {
                        data: self.node_data(SyntaxKind::NamedImports, bindings_pos),
                        elements,
                    }))
                }
                _ => {
                    self.error(&messages::_0_EXPECTED, &["{"]);
                    None
                }
            }
        } else {
            None
        };

        ImportClause {
            data: self.node_data(SyntaxKind::ImportClause, pos),
            is_type_only,
            name,
            named_bindings,
        }
    }

    /// Whether a `type` inside braces modifies the specifier after it
    /// (`{ type A }`) rather than naming it (`{ type }`, `{ type as t }`).
    fn is_type_modifier_in_specifier(&mut self) -> bool {
        self.current_token() == SyntaxKind::TypeKeyword
            && self.look_ahead(|p| {
                p.next_token();
                if p.current_token() == SyntaxKind::AsKeyword {
                    // `type as as x` / `type as x` (named `type`).
                    return p.look_ahead(|q| {
                        q.next_token();
                        q.current_token() == SyntaxKind::AsKeyword
                            || matches!(q.current_token(), SyntaxKind::CommaToken | SyntaxKind::CloseBraceToken)
                    });
                }
                p.is_identifier_name() || p.current_token() == SyntaxKind::StringLiteral
            })
    }

    fn parse_import_specifiers(&mut self) -> NodeList<'a, ImportSpecifier<'a>> {
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut elements = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let pos = self.token_pos();
            let is_type_only = self.is_type_modifier_in_specifier();
            if is_type_only {
                self.next_token();
            }
            let first = self.parse_module_export_name();
            let (property_name, name) = if self.parse_optional(SyntaxKind::AsKeyword) {
                (Some(first), self.parse_identifier())
            } else {
                (None, first)
            };
            elements.push(ImportSpecifier {
                data: self.node_data(SyntaxKind::ImportSpecifier, pos),
                is_type_only,
                property_name,
                name,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        self.alloc_list(elements)
    }

    /// `with { type: 'json' }` / `assert { ... }` after a module specifier.
    fn skip_import_attributes(&mut self) {
        let is_attributes_keyword = self.current_token() == SyntaxKind::WithKeyword
            || (self.current_token() == SyntaxKind::Identifier && self.token_value() == "assert");
        if is_attributes_keyword
            && !self.has_preceding_line_break()
            && self.look_ahead(|p| p.next_token() == SyntaxKind::OpenBraceToken)
        {
            self.next_token();
            self.skip_group();
        }
    }

    // ========================================================================
    // Exports
    // ========================================================================

    fn parse_export(&mut self, pos: u32) -> Statement<'a> {
        let is_export_declaration = self.look_ahead(|p| {
            match p.next_token() {
                SyntaxKind::AsteriskToken | SyntaxKind::OpenBraceToken => true,
                SyntaxKind::TypeKeyword => matches!(
                    p.next_token(),
                    SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken
                ),
                _ => false,
            }
        });
        if is_export_declaration {
            self.next_token();
            let is_type_only = self.parse_optional(SyntaxKind::TypeKeyword);
            return self.parse_export_declaration(pos, is_type_only);
        }

        let next = self.look_ahead(|p| p.next_token());
        match next {
            SyntaxKind::EqualsToken => {
                self.next_token();
                self.next_token();
                self.parse_export_assignment(pos, true)
            }
            SyntaxKind::DefaultKeyword if !self.is_export_default_declaration() => {
                self.next_token();
                self.next_token();
                self.parse_export_assignment(pos, false)
            }
            // `export as namespace X;` and `export import A = B.C;`
            SyntaxKind::AsKeyword | SyntaxKind::ImportKeyword => self.skip_statement(pos),
            _ => self.parse_declaration(pos, ModifierFlags::NONE),
        }
    }

    fn is_export_default_declaration(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            p.next_token();
            match p.current_token() {
                SyntaxKind::ClassKeyword | SyntaxKind::FunctionKeyword | SyntaxKind::InterfaceKeyword => {
                    true
                }
                SyntaxKind::AbstractKeyword | SyntaxKind::AsyncKeyword => {
                    let next = p.next_token();
                    !p.has_preceding_line_break()
                        && matches!(next, SyntaxKind::ClassKeyword | SyntaxKind::FunctionKeyword)
                }
                _ => false,
            }
        })
    }

    fn parse_export_assignment(&mut self, pos: u32, is_export_equals: bool) -> Statement<'a> {
        let expression = self.parse_simple_expression(SkipMode::Initializer);
        self.parse_semicolon();
        Statement::ExportAssignment(ExportAssignment {
            data: self.node_data(SyntaxKind::ExportAssignment, pos),
            is_export_equals,
            expression,
        })
    }

    fn parse_export_declaration(&mut self, pos: u32, is_type_only: bool) -> Statement<'a> {
        let clause_pos = self.token_pos();
        let (export_clause, module_specifier) = if self.parse_optional(SyntaxKind::AsteriskToken) {
            let clause = if self.parse_optional(SyntaxKind::AsKeyword) {
                let name = self.parse_module_export_name();
                Some(NamedExportBindings::NamespaceExport(NamespaceExport {
                    data: self.node_data(SyntaxKind::NamespaceExport, clause_pos),
                    name,
                }))
            } else {
                None
            };
            self.expect_token(SyntaxKind::FromKeyword);
            (clause, Some(self.parse_string_literal()))
        } else {
            let elements = self.parse_export_specifiers();
            let clause = NamedExportBindings::NamedExports(NamedExports {
                data: self.node_data(SyntaxKind::NamedExports, clause_pos),
                elements,
            });
            let module_specifier = if self.parse_optional(SyntaxKind::FromKeyword) {
                Some(self.parse_string_literal())
            } else {
                None
            };
            (Some(clause), module_specifier)
        };
        if module_specifier.is_some() {
            self.skip_import_attributes();
        }
        self.parse_semicolon();

        Statement::ExportDeclaration(ExportDeclaration {
            data: self.node_data(SyntaxKind::ExportDeclaration, pos),
            is_type_only,
            export_clause,
            module_specifier,
        })
    }

    fn parse_export_specifiers(&mut self) -> NodeList<'a, ExportSpecifier<'a>> {
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut elements = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let pos = self.token_pos();
            let is_type_only = self.is_type_modifier_in_specifier();
            if is_type_only {
                self.next_token();
            }
            let first = self.parse_module_export_name();
            let (property_name, name) = if self.parse_optional(SyntaxKind::AsKeyword) {
                (Some(first), self.parse_module_export_name())
            } else {
                (None, first)
            };
            elements.push(ExportSpecifier {
                data: self.node_data(SyntaxKind::ExportSpecifier, pos),
                is_type_only,
                property_name,
                name,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        self.alloc_list(elements)
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_interface_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        self.expect_token(SyntaxKind::InterfaceKeyword);
        let name = self.parse_identifier();
        let type_parameters = self.try_parse_type_parameters();
        let heritage_clauses = self.parse_heritage_clauses();
        let members = self.parse_object_type_members();

        Statement::InterfaceDeclaration(InterfaceDeclaration {
            data: self.declaration_data(SyntaxKind::InterfaceDeclaration, pos, modifiers),
            name,
            type_parameters,
            heritage_clauses,
            members,
        })
    }

    fn parse_type_alias_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        self.expect_token(SyntaxKind::TypeKeyword);
        let name = self.parse_identifier();
        let type_parameters = self.try_parse_type_parameters();
        self.expect_token(SyntaxKind::EqualsToken);
        let type_node = self.parse_type_and_alloc();
        self.parse_semicolon();

        Statement::TypeAliasDeclaration(TypeAliasDeclaration {
            data: self.declaration_data(SyntaxKind::TypeAliasDeclaration, pos, modifiers),
            name,
            type_parameters,
            type_node,
        })
    }

    fn parse_enum_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        self.expect_token(SyntaxKind::EnumKeyword);
        let name = self.parse_identifier();
        let mut members = Vec::new();
        if self.expect_token(SyntaxKind::OpenBraceToken) {
            while !matches!(
                self.current_token(),
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                let member_pos = self.token_pos();
                let member_name = self.parse_property_name();
                let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                    Some(self.parse_simple_expression(SkipMode::Expression))
                } else {
                    None
                };
                members.push(EnumMember {
                    data: self.node_data(SyntaxKind::EnumMember, member_pos),
                    name: member_name,
                    initializer,
                });
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.expect_token(SyntaxKind::CloseBraceToken);
        }

        Statement::EnumDeclaration(EnumDeclaration {
            data: self.declaration_data(SyntaxKind::EnumDeclaration, pos, modifiers),
            name,
            members: self.alloc_list(members),
        })
    }

    fn parse_class_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        self.expect_token(SyntaxKind::ClassKeyword);
        let name = if self.is_identifier() && self.current_token() != SyntaxKind::ImplementsKeyword {
            Some(self.parse_identifier())
        } else {
            None
        };
        let type_parameters = self.try_parse_type_parameters();
        let heritage_clauses = self.parse_heritage_clauses();
        let members = self.parse_class_members();

        Statement::ClassDeclaration(ClassDeclaration {
            data: self.declaration_data(SyntaxKind::ClassDeclaration, pos, modifiers),
            name,
            type_parameters,
            heritage_clauses,
            members,
        })
    }

    fn parse_function_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        self.expect_token(SyntaxKind::FunctionKeyword);
        self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if self.is_identifier() {
            Some(self.parse_identifier())
        } else {
            None
        };
        let signature = self.parse_signature(SyntaxKind::ColonToken);
        let has_body = self.parse_function_body();

        let mut data = self.declaration_data(SyntaxKind::FunctionDeclaration, pos, modifiers);
        if has_body {
            data.flags |= NodeFlags::HAS_BODY;
        }
        Statement::FunctionDeclaration(FunctionDeclaration { data, name, signature })
    }

    fn parse_variable_statement(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        let list_pos = self.token_pos();
        let flags = match self.current_token() {
            SyntaxKind::LetKeyword => NodeFlags::LET,
            SyntaxKind::ConstKeyword => NodeFlags::CONST,
            _ => NodeFlags::NONE,
        };
        self.next_token();

        let mut declarations = Vec::new();
        loop {
            let declaration_pos = self.token_pos();
            let name = self.parse_binding_name();
            self.parse_optional(SyntaxKind::ExclamationToken);
            let type_annotation = self.parse_type_annotation();
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                Some(self.parse_simple_expression(SkipMode::Initializer))
            } else {
                None
            };
            declarations.push(VariableDeclaration {
                data: self.node_data(SyntaxKind::VariableDeclaration, declaration_pos),
                name,
                type_annotation,
                initializer,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }

        let mut list_data = self.node_data(SyntaxKind::VariableDeclarationList, list_pos);
        list_data.flags |= flags;
        let declaration_list = VariableDeclarationList {
            data: list_data,
            declarations: self.alloc_list(declarations),
        };
        self.parse_semicolon();

        Statement::VariableStatement(VariableStatement {
            data: self.declaration_data(SyntaxKind::VariableStatement, pos, modifiers),
            declaration_list,
        })
    }

    fn parse_module_declaration(&mut self, pos: u32, modifiers: ModifierFlags) -> Statement<'a> {
        let mut flags = NodeFlags::NONE;
        let name = match self.current_token() {
            SyntaxKind::GlobalKeyword => {
                flags |= NodeFlags::GLOBAL_AUGMENTATION;
                ModuleName::Identifier(self.parse_identifier())
            }
            keyword => {
                if keyword == SyntaxKind::NamespaceKeyword {
                    flags |= NodeFlags::NAMESPACE;
                }
                self.next_token();
                if self.current_token() == SyntaxKind::StringLiteral {
                    ModuleName::StringLiteral(self.parse_string_literal())
                } else {
                    ModuleName::Identifier(self.parse_identifier())
                }
            }
        };
        Statement::ModuleDeclaration(self.parse_module_rest(pos, modifiers, flags, name))
    }

    fn parse_module_rest(
        &mut self,
        pos: u32,
        modifiers: ModifierFlags,
        flags: NodeFlags,
        name: ModuleName<'a>,
    ) -> ModuleDeclaration<'a> {
        let body = if matches!(name, ModuleName::Identifier(_)) && self.parse_optional(SyntaxKind::DotToken) {
            let inner_pos = self.token_pos();
            let inner_name = ModuleName::Identifier(self.parse_identifier());
            let inner = self.parse_module_rest(
                inner_pos,
                modifiers | ModifierFlags::EXPORT,
                flags | NodeFlags::NESTED_NAMESPACE,
                inner_name,
            );
            Some(ModuleBody::Namespace(self.alloc(inner)))
        } else if self.current_token() == SyntaxKind::OpenBraceToken {
            let block_pos = self.token_pos();
            self.next_token();
            let statements = self.parse_statements(true);
            self.expect_token(SyntaxKind::CloseBraceToken);
            Some(ModuleBody::Block(ModuleBlock {
                data: self.node_data(SyntaxKind::ModuleBlock, block_pos),
                statements,
            }))
        } else {
            self.parse_semicolon();
            None
        };

        let mut data = self.declaration_data(SyntaxKind::ModuleDeclaration, pos, modifiers);
        data.flags |= flags;
        ModuleDeclaration { data, name, body }
    }

    // ========================================================================
    // Heritage clauses
    // ========================================================================

    fn parse_heritage_clauses(&mut self) -> Option<NodeList<'a, HeritageClause<'a>>> {
        let mut clauses = Vec::new();
        while matches!(
            self.current_token(),
            SyntaxKind::ExtendsKeyword | SyntaxKind::ImplementsKeyword
        ) {
            let pos = self.token_pos();
            let token = self.current_token();
            self.next_token();

            let mut types = Vec::new();
            loop {
                let type_pos = self.token_pos();
                let ignored = self.scanner.has_preceding_ignore_directive();
                let expression = self.parse_entity_name();
                // `extends Mixin(Base)`: the call is runtime code.
                if self.current_token() == SyntaxKind::OpenParenToken {
                    self.skip_group();
                }
                let type_arguments = if self.current_token() == SyntaxKind::LessThanToken {
                    self.parse_type_arguments()
                } else {
                    None
                };
                let mut data = self.node_data(SyntaxKind::ExpressionWithTypeArguments, type_pos);
                if ignored {
                    data.flags |= NodeFlags::IGNORE_DIRECTIVE;
                }
                types.push(ExpressionWithTypeArguments {
                    data,
                    expression,
                    type_arguments,
                });
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }

            clauses.push(HeritageClause {
                data: self.node_data(SyntaxKind::HeritageClause, pos),
                token,
                types: self.alloc_list(types),
            });
        }
        if clauses.is_empty() {
            None
        } else {
            Some(self.alloc_list(clauses))
        }
    }

    // ========================================================================
    // Object type members
    // ========================================================================

    /// `{ member; member, ... }` of an interface or a type literal.
    pub(crate) fn parse_object_type_members(&mut self) -> NodeList<'a, TypeElement<'a>> {
        let mut members = Vec::new();
        if !self.expect_token(SyntaxKind::OpenBraceToken) {
            return self.alloc_list(members);
        }
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let saved_pos = self.token_pos();
            if let Some(member) = self.parse_type_member() {
                members.push(member);
            }
            if !self.parse_optional(SyntaxKind::SemicolonToken) {
                self.parse_optional(SyntaxKind::CommaToken);
            }
            if self.token_pos() == saved_pos {
                self.next_token();
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        self.alloc_list(members)
    }

    fn parse_type_member(&mut self) -> Option<TypeElement<'a>> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken => {
                let signature = self.parse_signature(SyntaxKind::ColonToken);
                return Some(TypeElement::CallSignature(SignatureNode {
                    data: self.node_data(SyntaxKind::CallSignature, pos),
                    signature,
                }));
            }
            SyntaxKind::NewKeyword if self.is_signature_after_next_token() => {
                self.next_token();
                let signature = self.parse_signature(SyntaxKind::ColonToken);
                return Some(TypeElement::ConstructSignature(SignatureNode {
                    data: self.node_data(SyntaxKind::ConstructSignature, pos),
                    signature,
                }));
            }
            _ => {}
        }

        let mut modifiers = ModifierFlags::NONE;
        if self.current_token() == SyntaxKind::ReadonlyKeyword && self.next_token_can_follow_modifier() {
            modifiers |= ModifierFlags::READONLY;
            self.next_token();
        }

        if let Some(kind) = self.accessor_kind_ahead() {
            self.next_token();
            let accessor = self.parse_accessor(pos, kind, modifiers);
            return Some(match kind {
                SyntaxKind::GetAccessor => TypeElement::GetAccessor(accessor),
                _ => TypeElement::SetAccessor(accessor),
            });
        }

        if self.current_token() == SyntaxKind::OpenBracketToken && self.is_index_signature() {
            return Some(TypeElement::IndexSignature(self.parse_index_signature(pos, modifiers)));
        }

        if !self.is_property_name_start() {
            self.error(&messages::PROPERTY_OR_SIGNATURE_EXPECTED, &[]);
            return None;
        }

        let name = self.parse_property_name();
        let question_token = self.optional_token(SyntaxKind::QuestionToken);
        if matches!(
            self.current_token(),
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
        ) {
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            return Some(TypeElement::MethodSignature(MethodSignature {
                data: self.declaration_data(SyntaxKind::MethodSignature, pos, modifiers),
                name,
                question_token,
                signature,
            }));
        }

        let type_annotation = self.parse_type_annotation();
        if self.parse_optional(SyntaxKind::EqualsToken) {
            self.skip_runtime_code(SkipMode::Expression);
        }
        Some(TypeElement::PropertySignature(PropertySignature {
            data: self.declaration_data(SyntaxKind::PropertySignature, pos, modifiers),
            name,
            question_token,
            type_annotation,
        }))
    }

    fn is_signature_after_next_token(&mut self) -> bool {
        self.look_ahead(|p| {
            matches!(
                p.next_token(),
                SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
            )
        })
    }

    /// Whether the token after a modifier keyword can start a member name on
    /// the same line (`readonly x`, but not `readonly: string` or `readonly()`).
    fn next_token_can_follow_modifier(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            !p.has_preceding_line_break()
                && (p.is_property_name_start()
                    || matches!(
                        p.current_token(),
                        SyntaxKind::AsteriskToken | SyntaxKind::OpenBraceToken
                    ))
        })
    }

    /// `get`/`set` followed by a member name starts an accessor.
    fn accessor_kind_ahead(&mut self) -> Option<SyntaxKind> {
        let kind = match self.current_token() {
            SyntaxKind::GetKeyword => SyntaxKind::GetAccessor,
            SyntaxKind::SetKeyword => SyntaxKind::SetAccessor,
            _ => return None,
        };
        let is_accessor = self.look_ahead(|p| {
            p.next_token();
            !p.has_preceding_line_break() && p.is_property_name_start()
        });
        is_accessor.then_some(kind)
    }

    fn parse_accessor(&mut self, pos: u32, kind: SyntaxKind, modifiers: ModifierFlags) -> AccessorDeclaration<'a> {
        let name = self.parse_property_name();
        let signature = self.parse_signature(SyntaxKind::ColonToken);
        let has_body = self.parse_function_body();
        let mut data = self.declaration_data(kind, pos, modifiers);
        if has_body {
            data.flags |= NodeFlags::HAS_BODY;
        }
        AccessorDeclaration { data, name, signature }
    }

    /// `[key: string]`, `[a, b: T]` and `[...rest]` start an index signature;
    /// `[expr]` starts a computed property name.
    fn is_index_signature(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if matches!(
                p.current_token(),
                SyntaxKind::DotDotDotToken | SyntaxKind::CloseBracketToken
            ) {
                return true;
            }
            if p.current_token().is_modifier_kind() {
                p.next_token();
                if p.is_identifier() {
                    return true;
                }
            } else if !p.is_identifier() {
                return false;
            } else {
                p.next_token();
            }
            matches!(
                p.current_token(),
                SyntaxKind::ColonToken | SyntaxKind::CommaToken
            ) || (p.current_token() == SyntaxKind::QuestionToken
                && matches!(
                    p.next_token(),
                    SyntaxKind::ColonToken | SyntaxKind::CommaToken | SyntaxKind::CloseBracketToken
                ))
        })
    }

    fn parse_index_signature(&mut self, pos: u32, modifiers: ModifierFlags) -> IndexSignatureDeclaration<'a> {
        self.expect_token(SyntaxKind::OpenBracketToken);
        let mut parameters = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
        ) {
            parameters.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBracketToken);
        let type_annotation = self.parse_type_annotation();

        IndexSignatureDeclaration {
            data: self.declaration_data(SyntaxKind::IndexSignature, pos, modifiers),
            parameters: self.alloc_list(parameters),
            type_annotation,
        }
    }

    // ========================================================================
    // Class members
    // ========================================================================

    fn parse_class_members(&mut self) -> NodeList<'a, ClassElement<'a>> {
        let mut members = Vec::new();
        if !self.expect_token(SyntaxKind::OpenBraceToken) {
            return self.alloc_list(members);
        }
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let saved_pos = self.token_pos();
            members.push(self.parse_class_member());
            if self.token_pos() == saved_pos {
                self.error(&messages::PROPERTY_OR_SIGNATURE_EXPECTED, &[]);
                self.next_token();
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        self.alloc_list(members)
    }

    fn parse_class_member(&mut self) -> ClassElement<'a> {
        let pos = self.token_pos();
        self.skip_decorators();

        let mut modifiers = ModifierFlags::NONE;
        while self.current_token().is_modifier_kind()
            && self.current_token() != SyntaxKind::ConstKeyword
            && self.next_token_can_follow_modifier()
        {
            modifiers |= ModifierFlags::from_modifier_kind(self.current_token());
            self.next_token();
        }

        if modifiers.contains(ModifierFlags::STATIC) && self.current_token() == SyntaxKind::OpenBraceToken {
            self.skip_group();
            return ClassElement::Unsupported(self.node_data(SyntaxKind::UnsupportedNode, pos));
        }

        if self.is_constructor_start() {
            self.next_token();
            self.try_parse_type_parameters();
            let parameters = self.parse_parameters();
            self.parse_type_annotation();
            let has_body = self.parse_function_body();
            let mut data = self.declaration_data(SyntaxKind::Constructor, pos, modifiers);
            if has_body {
                data.flags |= NodeFlags::HAS_BODY;
            }
            return ClassElement::Constructor(ConstructorDeclaration { data, parameters });
        }

        if let Some(kind) = self.accessor_kind_ahead() {
            self.next_token();
            let accessor = self.parse_accessor(pos, kind, modifiers);
            return match kind {
                SyntaxKind::GetAccessor => ClassElement::GetAccessor(accessor),
                _ => ClassElement::SetAccessor(accessor),
            };
        }

        if self.current_token() == SyntaxKind::OpenBracketToken && self.is_index_signature() {
            let signature = self.parse_index_signature(pos, modifiers);
            self.parse_semicolon();
            return ClassElement::IndexSignature(signature);
        }

        self.parse_optional(SyntaxKind::AsteriskToken);
        if !self.is_property_name_start() {
            return ClassElement::Unsupported(self.node_data(SyntaxKind::UnsupportedNode, pos));
        }
        let name = self.parse_property_name();
        let question_token = self.optional_token(SyntaxKind::QuestionToken);
        self.parse_optional(SyntaxKind::ExclamationToken);

        if matches!(
            self.current_token(),
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
        ) {
            let signature = self.parse_signature(SyntaxKind::ColonToken);
            let has_body = self.parse_function_body();
            let mut data = self.declaration_data(SyntaxKind::MethodDeclaration, pos, modifiers);
            if has_body {
                data.flags |= NodeFlags::HAS_BODY;
            }
            return ClassElement::MethodDeclaration(MethodDeclaration {
                data,
                name,
                question_token,
                signature,
            });
        }

        let type_annotation = self.parse_type_annotation();
        let has_initializer = self.parse_optional(SyntaxKind::EqualsToken);
        if has_initializer {
            self.skip_runtime_code(SkipMode::Initializer);
        }
        self.parse_semicolon();

        ClassElement::PropertyDeclaration(PropertyDeclaration {
            data: self.declaration_data(SyntaxKind::PropertyDeclaration, pos, modifiers),
            name,
            question_token,
            type_annotation,
            has_initializer,
        })
    }

    fn is_constructor_start(&mut self) -> bool {
        let is_constructor_name = self.current_token() == SyntaxKind::ConstructorKeyword
            || (self.current_token() == SyntaxKind::StringLiteral && self.token_value() == "constructor");
        is_constructor_name && self.is_signature_after_next_token()
    }

    /// `{ ... }` is skipped; a missing body ends with an optional `;`.
    fn parse_function_body(&mut self) -> bool {
        if self.current_token() == SyntaxKind::OpenBraceToken {
            self.skip_group();
            true
        } else {
            self.parse_semicolon();
            false
        }
    }

    // ========================================================================
    // Signatures and parameters
    // ========================================================================

    /// Type parameters, parameters and a return type introduced by
    /// `return_token` (`:` for declarations, `=>` for function types).
    pub(crate) fn parse_signature(&mut self, return_token: SyntaxKind) -> SignatureDeclaration<'a> {
        let type_parameters = self.try_parse_type_parameters();
        let parameters = self.parse_parameters();
        let return_type = if return_token == SyntaxKind::EqualsGreaterThanToken {
            self.expect_token(return_token);
            Some(self.parse_return_type())
        } else if self.parse_optional(return_token) {
            Some(self.parse_return_type())
        } else {
            None
        };
        SignatureDeclaration {
            type_parameters,
            parameters,
            return_type,
        }
    }

    pub(crate) fn parse_parameters(&mut self) -> NodeList<'a, ParameterDeclaration<'a>> {
        let mut parameters = Vec::new();
        if !self.expect_token(SyntaxKind::OpenParenToken) {
            return self.alloc_list(parameters);
        }
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            let saved_pos = self.token_pos();
            parameters.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == saved_pos {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        self.alloc_list(parameters)
    }

    fn parse_parameter(&mut self) -> ParameterDeclaration<'a> {
        let pos = self.token_pos();
        self.skip_decorators();

        let mut modifiers = ModifierFlags::NONE;
        while matches!(
            self.current_token(),
            SyntaxKind::PublicKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::OverrideKeyword
        ) && self.look_ahead(|p| {
            p.next_token();
            p.is_identifier_name()
                || matches!(
                    p.current_token(),
                    SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken | SyntaxKind::DotDotDotToken
                )
        }) {
            modifiers |= ModifierFlags::from_modifier_kind(self.current_token());
            self.next_token();
        }

        let dot_dot_dot_token = self.optional_token(SyntaxKind::DotDotDotToken);
        let name = self.parse_binding_name();
        let question_token = self.optional_token(SyntaxKind::QuestionToken);
        let type_annotation = self.parse_type_annotation();
        let has_initializer = self.parse_optional(SyntaxKind::EqualsToken);
        if has_initializer {
            self.skip_runtime_code(SkipMode::Expression);
        }

        ParameterDeclaration {
            data: self.declaration_data(SyntaxKind::Parameter, pos, modifiers),
            dot_dot_dot_token,
            name,
            question_token,
            type_annotation,
            has_initializer,
        }
    }

    fn parse_binding_name(&mut self) -> BindingName<'a> {
        match self.current_token() {
            SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken => {
                let pos = self.token_pos();
                self.skip_group();
                BindingName::Pattern(self.node_data(SyntaxKind::BindingPattern, pos))
            }
            _ => BindingName::Identifier(self.parse_identifier()),
        }
    }

    /// `: Type`, if present.
    pub(crate) fn parse_type_annotation(&mut self) -> OptionalNode<'a, TypeNode<'a>> {
        if self.parse_optional(SyntaxKind::ColonToken) {
            Some(self.parse_type_allowing_conditionals())
        } else {
            None
        }
    }

    pub(crate) fn try_parse_type_parameters(
        &mut self,
    ) -> Option<NodeList<'a, TypeParameterDeclaration<'a>>> {
        if self.current_token() != SyntaxKind::LessThanToken {
            return None;
        }
        self.next_token();

        let mut parameters = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::GreaterThanToken | SyntaxKind::EndOfFileToken
        ) {
            let pos = self.token_pos();
            // `const T`, `in T`, `out T`
            while matches!(
                self.current_token(),
                SyntaxKind::ConstKeyword | SyntaxKind::InKeyword | SyntaxKind::OutKeyword
            ) && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier()
            }) {
                self.next_token();
            }
            let name = self.parse_identifier();
            let constraint = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
                Some(self.parse_type_and_alloc())
            } else {
                None
            };
            let default = if self.parse_optional(SyntaxKind::EqualsToken) {
                Some(self.parse_type_and_alloc())
            } else {
                None
            };
            parameters.push(TypeParameterDeclaration {
                data: self.node_data(SyntaxKind::TypeParameter, pos),
                name,
                constraint,
                default,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::GreaterThanToken);
        Some(self.alloc_list(parameters))
    }
}
