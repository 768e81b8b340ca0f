//! Skipping runtime code.
//!
//! Only declarations matter for type resolution. Statements, function bodies
//! and initializers are consumed token by token while tracking bracket nesting
//! and template substitutions, rescanning `/` as a regular expression where an
//! expression may start. The few expression forms the tree models are parsed
//! by `parse_simple_expression`.

use rshape_ast::node::*;
use rshape_ast::syntax_kind::SyntaxKind;

use crate::parser::Parser;
use crate::utilities::{can_start_regex_after, continues_expression};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipMode {
    /// Up to and including `;`, or up to the next declaration on a new line.
    Statement,
    /// Up to `,`, `;` or an unmatched closer.
    Expression,
    /// Like `Expression`, but a line break ends the expression unless the
    /// tokens around it continue it.
    Initializer,
    /// One balanced `( )`, `[ ]` or `{ }` group starting at the current token.
    Group,
}

fn is_opener(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::OpenBraceToken | SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken
    )
}

impl<'a> Parser<'a> {
    pub(crate) fn skip_runtime_code(&mut self, mode: SkipMode) {
        let start = self.token_pos();
        let mut open: Vec<SyntaxKind> = Vec::new();
        let mut previous = SyntaxKind::Unknown;

        loop {
            let token = self.current_token();
            if token == SyntaxKind::EndOfFileToken {
                return;
            }

            if open.is_empty() {
                match token {
                    SyntaxKind::CloseBraceToken
                    | SyntaxKind::CloseParenToken
                    | SyntaxKind::CloseBracketToken => return,
                    SyntaxKind::SemicolonToken if mode != SkipMode::Group => {
                        if mode == SkipMode::Statement {
                            self.next_token();
                        }
                        return;
                    }
                    SyntaxKind::CommaToken
                        if matches!(mode, SkipMode::Expression | SkipMode::Initializer) =>
                    {
                        return
                    }
                    _ if mode == SkipMode::Group && !is_opener(token) => return,
                    _ => {}
                }
                if self.token_pos() > start
                    && self.has_preceding_line_break()
                    && self.line_break_ends_skip(mode, previous)
                {
                    return;
                }
            }

            match token {
                SyntaxKind::OpenBraceToken
                | SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::TemplateHead => open.push(token),
                SyntaxKind::CloseBraceToken if open.last() == Some(&SyntaxKind::TemplateHead) => {
                    if self.scanner.rescan_template_token() == SyntaxKind::TemplateTail {
                        open.pop();
                    }
                }
                SyntaxKind::CloseBraceToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken => {
                    open.pop();
                    if mode == SkipMode::Group && open.is_empty() {
                        self.next_token();
                        return;
                    }
                }
                SyntaxKind::SlashToken | SyntaxKind::CompoundAssignmentToken
                    if self.scanner.token_text().starts_with('/')
                        && can_start_regex_after(previous) =>
                {
                    self.scanner.rescan_slash_token();
                }
                _ => {}
            }

            previous = self.current_token();
            self.next_token();
        }
    }

    fn line_break_ends_skip(&mut self, mode: SkipMode, previous: SyntaxKind) -> bool {
        match mode {
            SkipMode::Statement | SkipMode::Expression => self.is_start_of_module_item(),
            SkipMode::Initializer => {
                !continues_expression(previous, self.current_token()) || self.is_start_of_module_item()
            }
            SkipMode::Group => false,
        }
    }

    /// Skip one runtime statement and record its range.
    pub(crate) fn skip_statement(&mut self, pos: u32) -> Statement<'a> {
        self.skip_runtime_code(SkipMode::Statement);
        Statement::Unsupported(self.node_data(SyntaxKind::UnsupportedNode, pos))
    }

    /// Skip a balanced group such as a function body or a destructuring pattern.
    pub(crate) fn skip_group(&mut self) {
        self.skip_runtime_code(SkipMode::Group);
    }

    /// Skip `@decorator`, `@a.b(...)` sequences.
    pub(crate) fn skip_decorators(&mut self) {
        while self.parse_optional(SyntaxKind::AtToken) {
            if self.current_token() == SyntaxKind::OpenParenToken {
                self.skip_group();
                continue;
            }
            self.parse_identifier();
            while self.parse_optional(SyntaxKind::DotToken) {
                self.parse_identifier();
            }
            if self.current_token() == SyntaxKind::OpenParenToken {
                self.skip_group();
            }
        }
    }

    // ========================================================================
    // Simple expressions
    // ========================================================================

    /// Parse an expression of one of the forms the tree models. Anything else
    /// is skipped and recorded as `Omitted`.
    pub(crate) fn parse_simple_expression(&mut self, mode: SkipMode) -> &'a Expression<'a> {
        let pos = self.token_pos();
        let state = self.save_state();
        if let Some(expression) = self.try_parse_simple_unary() {
            if self.is_expression_end(mode) {
                return self.alloc(expression);
            }
        }
        self.restore_state(state);
        self.skip_runtime_code(mode);
        self.alloc(Expression::Omitted(self.node_data(SyntaxKind::OmittedExpression, pos)))
    }

    fn is_expression_end(&mut self, mode: SkipMode) -> bool {
        match self.current_token() {
            SyntaxKind::EndOfFileToken
            | SyntaxKind::SemicolonToken
            | SyntaxKind::CommaToken
            | SyntaxKind::CloseParenToken
            | SyntaxKind::CloseBracketToken
            | SyntaxKind::CloseBraceToken => true,
            current => {
                mode != SkipMode::Expression
                    && self.has_preceding_line_break()
                    && !continues_expression(SyntaxKind::Identifier, current)
            }
        }
    }

    fn try_parse_simple_unary(&mut self) -> Option<Expression<'a>> {
        let pos = self.token_pos();
        let token = self.current_token();
        match token {
            SyntaxKind::MinusToken
            | SyntaxKind::PlusToken
            | SyntaxKind::TildeToken
            | SyntaxKind::ExclamationToken => {
                self.next_token();
                let operand = self.try_parse_simple_unary()?;
                let operand = self.alloc(operand);
                Some(Expression::PrefixUnary(PrefixUnaryExpression {
                    data: self.node_data(SyntaxKind::PrefixUnaryExpression, pos),
                    operator: token,
                    operand,
                }))
            }
            SyntaxKind::StringLiteral => Some(Expression::StringLiteral(self.parse_string_literal())),
            SyntaxKind::NoSubstitutionTemplateLiteral => {
                let text = self.alloc_str(self.token_value());
                self.next_token();
                Some(Expression::NoSubstitutionTemplateLiteral(StringLiteral {
                    data: self.node_data(token, pos),
                    text,
                }))
            }
            SyntaxKind::NumericLiteral => Some(Expression::NumericLiteral(self.parse_numeric_literal())),
            SyntaxKind::BigIntLiteral => Some(Expression::BigIntLiteral(self.parse_numeric_literal())),
            SyntaxKind::TrueKeyword => {
                self.next_token();
                Some(Expression::TrueKeyword(self.node_data(token, pos)))
            }
            SyntaxKind::FalseKeyword => {
                self.next_token();
                Some(Expression::FalseKeyword(self.node_data(token, pos)))
            }
            SyntaxKind::NullKeyword => {
                self.next_token();
                Some(Expression::NullKeyword(self.node_data(token, pos)))
            }
            _ if self.is_identifier() => {
                let mut expression = Expression::Identifier(self.parse_identifier());
                while self.current_token() == SyntaxKind::DotToken {
                    self.next_token();
                    if !self.is_identifier_name() {
                        return None;
                    }
                    let name = self.parse_identifier();
                    expression = Expression::PropertyAccess(PropertyAccessExpression {
                        data: self.node_data(SyntaxKind::PropertyAccessExpression, pos),
                        expression: self.alloc(expression),
                        name,
                    });
                }
                Some(expression)
            }
            _ => None,
        }
    }
}
