//! The type-expression grammar.

use rshape_ast::node::*;
use rshape_ast::syntax_kind::SyntaxKind;
use rshape_ast::types::*;
use rshape_diagnostics::messages;

use crate::parser::{Parser, MAX_RECURSION_DEPTH};

impl<'a> Parser<'a> {
    // ========================================================================
    // Entry points
    // ========================================================================

    pub(crate) fn parse_type(&mut self) -> TypeNode<'a> {
        self.recursion_depth += 1;
        let result = if self.recursion_depth > MAX_RECURSION_DEPTH {
            self.error(&messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &[]);
            self.missing_type()
        } else {
            self.parse_type_worker()
        };
        self.recursion_depth -= 1;
        result
    }

    pub(crate) fn parse_type_and_alloc(&mut self) -> &'a TypeNode<'a> {
        let type_node = self.parse_type();
        self.alloc(type_node)
    }

    /// Brackets, parentheses and braces re-enable conditional types inside an
    /// `extends` operand.
    pub(crate) fn parse_type_allowing_conditionals(&mut self) -> &'a TypeNode<'a> {
        self.with_conditional_types(true, Self::parse_type_and_alloc)
    }

    fn with_conditional_types<T>(&mut self, allow: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.disallow_conditional_types;
        self.disallow_conditional_types = !allow;
        let result = f(self);
        self.disallow_conditional_types = saved;
        result
    }

    fn parse_type_worker(&mut self) -> TypeNode<'a> {
        if self.is_start_of_function_type_or_constructor_type() {
            return self.parse_function_or_constructor_type();
        }

        let pos = self.token_pos();
        let check_type = self.parse_union_type_or_higher();
        if self.disallow_conditional_types
            || self.has_preceding_line_break()
            || self.current_token() != SyntaxKind::ExtendsKeyword
        {
            return check_type;
        }

        self.next_token();
        let extends_type = self.with_conditional_types(false, Self::parse_type_and_alloc);
        self.expect_token(SyntaxKind::QuestionToken);
        let true_type = self.parse_type_allowing_conditionals();
        self.expect_token(SyntaxKind::ColonToken);
        let false_type = self.parse_type_allowing_conditionals();

        TypeNode::ConditionalType(ConditionalTypeNode {
            data: self.node_data(SyntaxKind::ConditionalType, pos),
            check_type: self.alloc(check_type),
            extends_type,
            true_type,
            false_type,
        })
    }

    /// An `any` placeholder for a missing or malformed type.
    fn missing_type(&self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let mut data = NodeData::new(SyntaxKind::AnyKeyword, pos, pos);
        data.flags |= NodeFlags::THIS_NODE_HAS_ERROR;
        TypeNode::KeywordType(KeywordTypeNode { data })
    }

    // ========================================================================
    // Unions, intersections and operators
    // ========================================================================

    fn parse_union_type_or_higher(&mut self) -> TypeNode<'a> {
        self.parse_union_or_intersection(SyntaxKind::BarToken, Self::parse_intersection_type_or_higher)
    }

    fn parse_intersection_type_or_higher(&mut self) -> TypeNode<'a> {
        self.parse_union_or_intersection(SyntaxKind::AmpersandToken, Self::parse_type_operator_or_higher)
    }

    /// A leading `|` / `&` is allowed; a single constituent is returned as is.
    fn parse_union_or_intersection(
        &mut self,
        operator: SyntaxKind,
        parse_constituent: fn(&mut Self) -> TypeNode<'a>,
    ) -> TypeNode<'a> {
        let pos = self.token_pos();
        self.parse_optional(operator);
        let first = parse_constituent(self);
        if self.current_token() != operator {
            return first;
        }

        let mut types = vec![first];
        while self.parse_optional(operator) {
            types.push(parse_constituent(self));
        }

        let (kind, is_union) = match operator {
            SyntaxKind::BarToken => (SyntaxKind::UnionType, true),
            _ => (SyntaxKind::IntersectionType, false),
        };
        let node = UnionOrIntersectionTypeNode {
            data: self.node_data(kind, pos),
            types: self.alloc_list(types),
        };
        if is_union {
            TypeNode::UnionType(node)
        } else {
            TypeNode::IntersectionType(node)
        }
    }

    fn parse_type_operator_or_higher(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            operator @ (SyntaxKind::KeyOfKeyword | SyntaxKind::UniqueKeyword | SyntaxKind::ReadonlyKeyword) => {
                self.next_token();
                let operand = self.parse_type_operator_or_higher();
                TypeNode::TypeOperator(TypeOperatorNode {
                    data: self.node_data(SyntaxKind::TypeOperator, pos),
                    operator,
                    type_node: self.alloc(operand),
                })
            }
            SyntaxKind::InferKeyword => self.parse_infer_type(),
            _ => self.with_conditional_types(true, Self::parse_postfix_type_or_higher),
        }
    }

    fn parse_infer_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::InferKeyword);
        let parameter_pos = self.token_pos();
        let name = self.parse_identifier();
        let constraint = self.try_parse_infer_constraint();
        let type_parameter = self.alloc(TypeParameterDeclaration {
            data: self.node_data(SyntaxKind::TypeParameter, parameter_pos),
            name,
            constraint,
            default: None,
        });
        TypeNode::InferType(InferTypeNode {
            data: self.node_data(SyntaxKind::InferType, pos),
            type_parameter,
        })
    }

    /// `infer U extends C`, unless the `extends` turns out to start a
    /// conditional type (`infer U extends C ? X : Y`).
    fn try_parse_infer_constraint(&mut self) -> OptionalNode<'a, TypeNode<'a>> {
        if self.current_token() != SyntaxKind::ExtendsKeyword {
            return None;
        }
        let state = self.save_state();
        self.next_token();
        let constraint = self.with_conditional_types(false, Self::parse_type_and_alloc);
        if self.disallow_conditional_types || self.current_token() != SyntaxKind::QuestionToken {
            return Some(constraint);
        }
        self.restore_state(state);
        None
    }

    fn parse_postfix_type_or_higher(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let mut type_node = self.parse_non_array_type();
        while !self.has_preceding_line_break() {
            match self.current_token() {
                // JSDoc-style `T!` is accepted and ignored.
                SyntaxKind::ExclamationToken => {
                    self.next_token();
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    if self.parse_optional(SyntaxKind::CloseBracketToken) {
                        let element_type = self.alloc(type_node);
                        type_node = TypeNode::ArrayType(ArrayTypeNode {
                            data: self.node_data(SyntaxKind::ArrayType, pos),
                            element_type,
                        });
                    } else {
                        let object_type = self.alloc(type_node);
                        let index_type = self.parse_type_allowing_conditionals();
                        self.expect_token(SyntaxKind::CloseBracketToken);
                        type_node = TypeNode::IndexedAccessType(IndexedAccessTypeNode {
                            data: self.node_data(SyntaxKind::IndexedAccessType, pos),
                            object_type,
                            index_type,
                        });
                    }
                }
                _ => break,
            }
        }
        type_node
    }

    // ========================================================================
    // Primary types
    // ========================================================================

    fn parse_non_array_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let token = self.current_token();
        match token {
            _ if token.is_keyword_type()
                && !self.look_ahead(|p| p.next_token() == SyntaxKind::DotToken) =>
            {
                self.next_token();
                TypeNode::KeywordType(KeywordTypeNode {
                    data: self.node_data(token, pos),
                })
            }
            SyntaxKind::ThisKeyword => {
                self.next_token();
                TypeNode::ThisType(KeywordTypeNode {
                    data: self.node_data(SyntaxKind::ThisType, pos),
                })
            }
            SyntaxKind::TypeOfKeyword => self.parse_type_query(),
            SyntaxKind::ImportKeyword => self.parse_import_type(pos, false),
            SyntaxKind::OpenBraceToken => self.parse_type_literal_or_mapped_type(),
            SyntaxKind::OpenBracketToken => self.parse_tuple_type(),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let type_node = self.parse_type_allowing_conditionals();
                self.expect_token(SyntaxKind::CloseParenToken);
                TypeNode::ParenthesizedType(WrappedTypeNode {
                    data: self.node_data(SyntaxKind::ParenthesizedType, pos),
                    type_node,
                })
            }
            SyntaxKind::StringLiteral | SyntaxKind::NoSubstitutionTemplateLiteral => {
                let text = self.alloc_str(self.token_value());
                self.next_token();
                self.literal_type(pos, LiteralValue::String(text))
            }
            SyntaxKind::NumericLiteral => {
                let literal = self.parse_numeric_literal();
                self.literal_type(pos, LiteralValue::Number(literal.text))
            }
            SyntaxKind::BigIntLiteral => {
                let literal = self.parse_numeric_literal();
                self.literal_type(pos, LiteralValue::BigInt(literal.text))
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                self.next_token();
                self.literal_type(pos, LiteralValue::Boolean(token == SyntaxKind::TrueKeyword))
            }
            SyntaxKind::MinusToken
                if matches!(
                    self.look_ahead(|p| p.next_token()),
                    SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral
                ) =>
            {
                self.next_token();
                let literal = self.parse_numeric_literal();
                let text = if literal.text == "0" {
                    literal.text
                } else {
                    self.alloc_str(&format!("-{}", literal.text))
                };
                let value = match literal.data.kind {
                    SyntaxKind::BigIntLiteral => LiteralValue::BigInt(text),
                    _ => LiteralValue::Number(text),
                };
                self.literal_type(pos, value)
            }
            SyntaxKind::TemplateHead => self.parse_template_literal_type(),
            _ if self.is_identifier() => self.parse_type_reference(),
            _ => {
                self.error(&messages::TYPE_EXPECTED, &[]);
                let missing = self.missing_type();
                if !matches!(
                    token,
                    SyntaxKind::CloseBraceToken
                        | SyntaxKind::CloseParenToken
                        | SyntaxKind::CloseBracketToken
                        | SyntaxKind::GreaterThanToken
                        | SyntaxKind::CommaToken
                        | SyntaxKind::SemicolonToken
                        | SyntaxKind::EqualsToken
                        | SyntaxKind::EndOfFileToken
                ) {
                    self.next_token();
                }
                missing
            }
        }
    }

    fn literal_type(&self, pos: u32, literal: LiteralValue<'a>) -> TypeNode<'a> {
        TypeNode::LiteralType(LiteralTypeNode {
            data: self.node_data(SyntaxKind::LiteralType, pos),
            literal,
        })
    }

    fn parse_type_reference(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let ignored = self.scanner.has_preceding_ignore_directive();
        let type_name = self.parse_entity_name();
        let type_arguments = if !self.has_preceding_line_break()
            && self.current_token() == SyntaxKind::LessThanToken
        {
            self.parse_type_arguments()
        } else {
            None
        };
        let mut data = self.node_data(SyntaxKind::TypeReference, pos);
        if ignored {
            data.flags |= NodeFlags::IGNORE_DIRECTIVE;
        }
        TypeNode::TypeReference(TypeReferenceNode {
            data,
            type_name,
            type_arguments,
        })
    }

    /// `<A, B>` at the current `<`.
    pub(crate) fn parse_type_arguments(&mut self) -> Option<NodeList<'a, TypeNode<'a>>> {
        if !self.parse_optional(SyntaxKind::LessThanToken) {
            return None;
        }
        let mut arguments = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::GreaterThanToken | SyntaxKind::EndOfFileToken
        ) {
            arguments.push(self.with_conditional_types(true, Self::parse_type));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::GreaterThanToken);
        Some(self.alloc_list(arguments))
    }

    fn parse_type_query(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::TypeOfKeyword);
        if self.current_token() == SyntaxKind::ImportKeyword {
            return self.parse_import_type(pos, true);
        }
        let expr_name = self.parse_entity_name();
        let type_arguments = if !self.has_preceding_line_break()
            && self.current_token() == SyntaxKind::LessThanToken
        {
            self.parse_type_arguments()
        } else {
            None
        };
        TypeNode::TypeQuery(TypeQueryNode {
            data: self.node_data(SyntaxKind::TypeQuery, pos),
            expr_name,
            type_arguments,
        })
    }

    fn parse_import_type(&mut self, pos: u32, is_type_of: bool) -> TypeNode<'a> {
        self.expect_token(SyntaxKind::ImportKeyword);
        self.expect_token(SyntaxKind::OpenParenToken);
        let argument = self.parse_string_literal();
        if self.parse_optional(SyntaxKind::CommaToken) && self.current_token() == SyntaxKind::OpenBraceToken {
            // `import('./a', { with: { ... } })`
            self.skip_group();
            self.parse_optional(SyntaxKind::CommaToken);
        }
        self.expect_token(SyntaxKind::CloseParenToken);

        let qualifier = if self.parse_optional(SyntaxKind::DotToken) {
            Some(self.parse_entity_name())
        } else {
            None
        };
        let type_arguments = if !self.has_preceding_line_break()
            && self.current_token() == SyntaxKind::LessThanToken
        {
            self.parse_type_arguments()
        } else {
            None
        };

        TypeNode::ImportType(ImportTypeNode {
            data: self.node_data(SyntaxKind::ImportType, pos),
            is_type_of,
            argument,
            qualifier,
            type_arguments,
        })
    }

    // ========================================================================
    // Object, mapped and tuple types
    // ========================================================================

    fn parse_type_literal_or_mapped_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        if self.look_ahead(Self::is_start_of_mapped_type) {
            return self.parse_mapped_type(pos);
        }
        let members = self.with_conditional_types(true, Self::parse_object_type_members);
        TypeNode::TypeLiteral(TypeLiteralNode {
            data: self.node_data(SyntaxKind::TypeLiteral, pos),
            members,
        })
    }

    fn is_start_of_mapped_type(&mut self) -> bool {
        self.next_token();
        if matches!(
            self.current_token(),
            SyntaxKind::PlusToken | SyntaxKind::MinusToken
        ) {
            return self.next_token() == SyntaxKind::ReadonlyKeyword;
        }
        if self.current_token() == SyntaxKind::ReadonlyKeyword {
            self.next_token();
        }
        if self.current_token() != SyntaxKind::OpenBracketToken {
            return false;
        }
        self.next_token();
        if !self.is_identifier_name() {
            return false;
        }
        self.next_token() == SyntaxKind::InKeyword
    }

    /// `{ readonly [K in Keys as Name]?: Type }`
    fn parse_mapped_type(&mut self, pos: u32) -> TypeNode<'a> {
        self.expect_token(SyntaxKind::OpenBraceToken);

        let readonly_token = self.parse_mapped_modifier(SyntaxKind::ReadonlyKeyword);
        self.expect_token(SyntaxKind::OpenBracketToken);
        let parameter_pos = self.token_pos();
        let name = self.parse_identifier();
        self.expect_token(SyntaxKind::InKeyword);
        let constraint = self.parse_type_allowing_conditionals();
        let type_parameter = self.alloc(TypeParameterDeclaration {
            data: self.node_data(SyntaxKind::TypeParameter, parameter_pos),
            name,
            constraint: Some(constraint),
            default: None,
        });
        let name_type = if self.parse_optional(SyntaxKind::AsKeyword) {
            Some(self.parse_type_allowing_conditionals())
        } else {
            None
        };
        self.expect_token(SyntaxKind::CloseBracketToken);

        let question_token = self.parse_mapped_modifier(SyntaxKind::QuestionToken);
        let type_node = self.parse_type_annotation();
        if !self.parse_optional(SyntaxKind::SemicolonToken) {
            self.parse_optional(SyntaxKind::CommaToken);
        }
        self.expect_token(SyntaxKind::CloseBraceToken);

        TypeNode::MappedType(MappedTypeNode {
            data: self.node_data(SyntaxKind::MappedType, pos),
            readonly_token,
            type_parameter,
            name_type,
            question_token,
            type_node,
        })
    }

    /// `modifier`, `+modifier` or `-modifier`. The token kept is the sign when
    /// one is written.
    fn parse_mapped_modifier(&mut self, modifier: SyntaxKind) -> Option<Token> {
        match self.current_token() {
            SyntaxKind::PlusToken | SyntaxKind::MinusToken => {
                let token = self.optional_token(self.current_token());
                self.expect_token(modifier);
                token
            }
            kind if kind == modifier => self.optional_token(modifier),
            _ => None,
        }
    }

    fn parse_tuple_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
        ) {
            elements.push(self.parse_tuple_element());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBracketToken);
        TypeNode::TupleType(TupleTypeNode {
            data: self.node_data(SyntaxKind::TupleType, pos),
            elements: self.alloc_list(elements),
        })
    }

    fn parse_tuple_element(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let dot_dot_dot_token = self.optional_token(SyntaxKind::DotDotDotToken);

        if self.is_named_tuple_member() {
            let name = self.parse_identifier();
            let question_token = self.optional_token(SyntaxKind::QuestionToken);
            self.expect_token(SyntaxKind::ColonToken);
            let type_node = self.parse_type_allowing_conditionals();
            return TypeNode::NamedTupleMember(NamedTupleMemberNode {
                data: self.node_data(SyntaxKind::NamedTupleMember, pos),
                dot_dot_dot_token,
                name,
                question_token,
                type_node,
            });
        }

        let type_node = self.with_conditional_types(true, Self::parse_type);
        if dot_dot_dot_token.is_some() {
            return TypeNode::RestType(WrappedTypeNode {
                data: self.node_data(SyntaxKind::RestType, pos),
                type_node: self.alloc(type_node),
            });
        }
        if self.parse_optional(SyntaxKind::QuestionToken) {
            return TypeNode::OptionalType(WrappedTypeNode {
                data: self.node_data(SyntaxKind::OptionalType, pos),
                type_node: self.alloc(type_node),
            });
        }
        type_node
    }

    fn is_named_tuple_member(&mut self) -> bool {
        self.is_identifier_name()
            && self.look_ahead(|p| match p.next_token() {
                SyntaxKind::ColonToken => true,
                SyntaxKind::QuestionToken => p.next_token() == SyntaxKind::ColonToken,
                _ => false,
            })
    }

    // ========================================================================
    // Template literal types
    // ========================================================================

    fn parse_template_literal_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let head = self.alloc_str(self.token_value());
        self.expect_token(SyntaxKind::TemplateHead);

        let mut spans = Vec::new();
        loop {
            let span_pos = self.token_pos();
            let type_node = self.parse_type_allowing_conditionals();
            let kind = if self.current_token() == SyntaxKind::CloseBraceToken {
                self.scanner.rescan_template_token()
            } else {
                self.error(&messages::_0_EXPECTED, &["}"]);
                SyntaxKind::Unknown
            };
            let literal = match kind {
                SyntaxKind::TemplateMiddle | SyntaxKind::TemplateTail => {
                    let literal = self.alloc_str(self.token_value());
                    self.next_token();
                    literal
                }
                _ => "",
            };
            spans.push(TemplateLiteralTypeSpan {
                data: self.node_data(SyntaxKind::TemplateLiteralTypeSpan, span_pos),
                type_node,
                literal,
            });
            if kind != SyntaxKind::TemplateMiddle {
                break;
            }
        }

        TypeNode::TemplateLiteralType(TemplateLiteralTypeNode {
            data: self.node_data(SyntaxKind::TemplateLiteralType, pos),
            head,
            template_spans: self.alloc_list(spans),
        })
    }

    // ========================================================================
    // Function types and predicates
    // ========================================================================

    fn is_start_of_function_type_or_constructor_type(&mut self) -> bool {
        match self.current_token() {
            SyntaxKind::LessThanToken | SyntaxKind::NewKeyword => true,
            SyntaxKind::OpenParenToken => self.look_ahead(Self::is_unambiguously_start_of_function_type),
            SyntaxKind::AbstractKeyword => {
                self.look_ahead(|p| p.next_token() == SyntaxKind::NewKeyword)
            }
            _ => false,
        }
    }

    fn is_unambiguously_start_of_function_type(&mut self) -> bool {
        self.next_token();
        if matches!(
            self.current_token(),
            SyntaxKind::CloseParenToken | SyntaxKind::DotDotDotToken
        ) {
            return true;
        }
        if self.skip_parameter_start() {
            if matches!(
                self.current_token(),
                SyntaxKind::ColonToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::QuestionToken
                    | SyntaxKind::EqualsToken
            ) {
                return true;
            }
            if self.current_token() == SyntaxKind::CloseParenToken
                && self.next_token() == SyntaxKind::EqualsGreaterThanToken
            {
                return true;
            }
        }
        false
    }

    fn skip_parameter_start(&mut self) -> bool {
        while self.current_token().is_modifier_kind()
            && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier() || p.current_token() == SyntaxKind::ThisKeyword
            })
        {
            self.next_token();
        }
        if self.is_identifier() || self.current_token() == SyntaxKind::ThisKeyword {
            self.next_token();
            return true;
        }
        if matches!(
            self.current_token(),
            SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken
        ) {
            self.skip_group();
            return true;
        }
        false
    }

    fn parse_function_or_constructor_type(&mut self) -> TypeNode<'a> {
        let pos = self.token_pos();
        let is_abstract = self.parse_optional(SyntaxKind::AbstractKeyword);
        let is_constructor = self.parse_optional(SyntaxKind::NewKeyword);
        let signature = self.parse_signature(SyntaxKind::EqualsGreaterThanToken);

        let kind = if is_constructor {
            SyntaxKind::ConstructorType
        } else {
            SyntaxKind::FunctionType
        };
        let mut data = self.node_data(kind, pos);
        if is_abstract {
            data.modifier_flags |= ModifierFlags::ABSTRACT;
        }
        let node = SignatureNode { data, signature };
        if is_constructor {
            TypeNode::ConstructorType(node)
        } else {
            TypeNode::FunctionType(node)
        }
    }

    /// A return type, which may be a type predicate.
    pub(crate) fn parse_return_type(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();

        let is_asserts = self.current_token() == SyntaxKind::AssertsKeyword
            && self.look_ahead(|p| {
                p.next_token();
                !p.has_preceding_line_break()
                    && (p.is_identifier() || p.current_token() == SyntaxKind::ThisKeyword)
            });
        if is_asserts {
            self.next_token();
            let parameter_name = self.parse_identifier();
            let type_node = if self.parse_optional(SyntaxKind::IsKeyword) {
                Some(self.parse_type_and_alloc())
            } else {
                None
            };
            return self.alloc(TypeNode::TypePredicate(TypePredicateNode {
                data: self.node_data(SyntaxKind::TypePredicate, pos),
                asserts: true,
                parameter_name,
                type_node,
            }));
        }

        let is_predicate = (self.is_identifier() || self.current_token() == SyntaxKind::ThisKeyword)
            && self.look_ahead(|p| {
                p.next_token() == SyntaxKind::IsKeyword && !p.has_preceding_line_break()
            });
        if is_predicate {
            let parameter_name = self.parse_identifier();
            self.expect_token(SyntaxKind::IsKeyword);
            let type_node = Some(self.parse_type_and_alloc());
            return self.alloc(TypeNode::TypePredicate(TypePredicateNode {
                data: self.node_data(SyntaxKind::TypePredicate, pos),
                asserts: false,
                parameter_name,
                type_node,
            }));
        }

        self.parse_type_and_alloc()
    }
}
