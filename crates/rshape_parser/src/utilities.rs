//! Token classification used while skipping runtime code.

use rshape_ast::syntax_kind::SyntaxKind;

/// Whether a `/` following `previous` starts a regular expression literal
/// rather than a division.
pub(crate) fn can_start_regex_after(previous: SyntaxKind) -> bool {
    match previous {
        SyntaxKind::Identifier
        | SyntaxKind::PrivateIdentifier
        | SyntaxKind::NumericLiteral
        | SyntaxKind::BigIntLiteral
        | SyntaxKind::StringLiteral
        | SyntaxKind::NoSubstitutionTemplateLiteral
        | SyntaxKind::TemplateTail
        | SyntaxKind::RegularExpressionLiteral
        | SyntaxKind::CloseParenToken
        | SyntaxKind::CloseBracketToken
        | SyntaxKind::CloseBraceToken
        | SyntaxKind::PlusPlusToken
        | SyntaxKind::MinusMinusToken
        | SyntaxKind::ThisKeyword
        | SyntaxKind::SuperKeyword
        | SyntaxKind::TrueKeyword
        | SyntaxKind::FalseKeyword
        | SyntaxKind::NullKeyword => false,
        // Contextual keywords are almost always used as plain names.
        kind => !kind.is_identifier_or_contextual_keyword(),
    }
}

fn is_binary_operator(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::AsteriskToken
            | SyntaxKind::AsteriskAsteriskToken
            | SyntaxKind::SlashToken
            | SyntaxKind::PercentToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::AmpersandAmpersandToken
            | SyntaxKind::BarToken
            | SyntaxKind::BarBarToken
            | SyntaxKind::CaretToken
            | SyntaxKind::QuestionQuestionToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::EqualsToken
            | SyntaxKind::CompoundAssignmentToken
            | SyntaxKind::InstanceOfKeyword
            | SyntaxKind::InKeyword
            | SyntaxKind::AsKeyword
            | SyntaxKind::SatisfiesKeyword
    )
}

/// Whether an initializer interrupted by a line break between `previous` and
/// `current` carries on past the line break.
pub(crate) fn continues_expression(previous: SyntaxKind, current: SyntaxKind) -> bool {
    let previous_expects_operand = is_binary_operator(previous)
        || matches!(
            previous,
            SyntaxKind::Unknown
                | SyntaxKind::EqualsGreaterThanToken
                | SyntaxKind::CommaToken
                | SyntaxKind::DotToken
                | SyntaxKind::QuestionDotToken
                | SyntaxKind::QuestionToken
                | SyntaxKind::ColonToken
                | SyntaxKind::DotDotDotToken
                | SyntaxKind::ExclamationToken
                | SyntaxKind::TildeToken
                | SyntaxKind::NewKeyword
                | SyntaxKind::TypeOfKeyword
                | SyntaxKind::VoidKeyword
                | SyntaxKind::DeleteKeyword
                | SyntaxKind::AwaitKeyword
                | SyntaxKind::YieldKeyword
                | SyntaxKind::TemplateHead
                | SyntaxKind::TemplateMiddle
        );
    previous_expects_operand
        || is_binary_operator(current)
        || matches!(
            current,
            SyntaxKind::DotToken
                | SyntaxKind::QuestionDotToken
                | SyntaxKind::QuestionToken
                | SyntaxKind::ColonToken
                | SyntaxKind::EqualsGreaterThanToken
                | SyntaxKind::TemplateMiddle
                | SyntaxKind::TemplateTail
        )
}

/// `.d.ts`, `.d.mts`, `.d.cts` and `.d.<ext>.ts` declaration files.
pub(crate) fn is_declaration_file_name(file_name: &str) -> bool {
    let Some(stem) = [".ts", ".mts", ".cts"]
        .iter()
        .find_map(|extension| file_name.strip_suffix(extension))
    else {
        return false;
    };
    let base = stem.rsplit(['/', '\\']).next().unwrap_or(stem);
    base.ends_with(".d") || base.contains(".d.")
}
