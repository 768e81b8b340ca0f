//! Scanner integration tests.
//!
//! Verifies tokenization of the constructs the declaration parser relies on.

use rshape_ast::syntax_kind::SyntaxKind;
use rshape_ast::types::TokenFlags;
use rshape_scanner::Scanner;

/// Helper: scan all tokens from source and return as (kind, value) pairs.
fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        tokens.push((kind, scanner.token_value().to_string()));
    }
    tokens
}

/// Helper: scan all token kinds.
fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    scan_all(source).into_iter().map(|(k, _)| k).collect()
}

// ============================================================================
// Trivia
// ============================================================================

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
    assert!(scan_all("   \n\t  ").is_empty());
    assert!(scan_all("// only a comment").is_empty());
}

#[test]
fn test_comments_and_line_breaks() {
    let mut scanner = Scanner::new("// comment\nlet /* block */ x /* multi\nline */ y");
    assert_eq!(scanner.scan(), SyntaxKind::LetKeyword);
    assert!(scanner.has_preceding_line_break());
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(!scanner.has_preceding_line_break());
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "y");
    assert!(scanner.has_preceding_line_break());
}

#[test]
fn test_ignore_directive_marks_next_token_only() {
    let mut scanner = Scanner::new("extends /* @rshape-ignore */ Base, Other");
    assert_eq!(scanner.scan(), SyntaxKind::ExtendsKeyword);
    assert!(!scanner.has_preceding_ignore_directive());
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(scanner.has_preceding_ignore_directive());
    assert_eq!(scanner.scan(), SyntaxKind::CommaToken);
    assert!(!scanner.has_preceding_ignore_directive());
}

#[test]
fn test_ignore_directive_in_line_comment() {
    let mut scanner = Scanner::new("// @rshape-ignore\nExternal");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(scanner.has_preceding_ignore_directive());
}

#[test]
fn test_unterminated_block_comment_reports() {
    let mut scanner = Scanner::new("x /* never closed");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
    assert_eq!(scanner.diagnostics().len(), 1);
}

#[test]
fn test_shebang() {
    let mut scanner = Scanner::new("#!/usr/bin/env node\nlet x = 1;");
    scanner.skip_shebang();
    assert_eq!(scanner.scan(), SyntaxKind::LetKeyword);
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_string_escapes_are_cooked() {
    let tokens = scan_all(r#"'a\'b' "tab\there" '\x41B\u{43}' '😀'"#);
    assert_eq!(tokens[0], (SyntaxKind::StringLiteral, "a'b".to_string()));
    assert_eq!(tokens[1].1, "tab\there");
    assert_eq!(tokens[2].1, "ABC");
    assert_eq!(tokens[3].1, "\u{1F600}");
}

#[test]
fn test_unterminated_string() {
    let mut scanner = Scanner::new("'abc\nnext");
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert!(scanner.token_flags().contains(TokenFlags::UNTERMINATED));
    assert_eq!(scanner.token_value(), "abc");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
}

#[test]
fn test_numeric_literals_are_canonical() {
    let tokens = scan_all("42 3.14 0xff 0b1010 0o17 1_000 1e3 .5 017");
    let values: Vec<&str> = tokens.iter().map(|(_, v)| v.as_str()).collect();
    assert_eq!(values, vec!["42", "3.14", "255", "10", "15", "1000", "1000", "0.5", "15"]);
    assert!(tokens.iter().all(|(k, _)| *k == SyntaxKind::NumericLiteral));
}

#[test]
fn test_bigint_literals() {
    let tokens = scan_all("42n 0xFFn");
    assert_eq!(tokens[0], (SyntaxKind::BigIntLiteral, "42".to_string()));
    assert_eq!(tokens[1], (SyntaxKind::BigIntLiteral, "255".to_string()));
}

#[test]
fn test_template_literal_chunks() {
    let mut scanner = Scanner::new("`on${A}-${B}!`");
    assert_eq!(scanner.scan(), SyntaxKind::TemplateHead);
    assert_eq!(scanner.token_value(), "on");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
    assert_eq!(scanner.rescan_template_token(), SyntaxKind::TemplateMiddle);
    assert_eq!(scanner.token_value(), "-");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
    assert_eq!(scanner.rescan_template_token(), SyntaxKind::TemplateTail);
    assert_eq!(scanner.token_value(), "!");
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
}

#[test]
fn test_no_substitution_template() {
    let tokens = scan_all("`plain\\ttext`");
    assert_eq!(tokens, vec![(SyntaxKind::NoSubstitutionTemplateLiteral, "plain\ttext".to_string())]);
}

#[test]
fn test_regex_rescan() {
    let mut scanner = Scanner::new("/a[/]b\\/c/gi; x");
    assert_eq!(scanner.scan(), SyntaxKind::SlashToken);
    assert_eq!(scanner.rescan_slash_token(), SyntaxKind::RegularExpressionLiteral);
    assert_eq!(scanner.token_value(), "/a[/]b\\/c/gi");
    assert_eq!(scanner.scan(), SyntaxKind::SemicolonToken);
}

// ============================================================================
// Identifiers and punctuation
// ============================================================================

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(
        scan_kinds("interface Foo extends keyof"),
        vec![
            SyntaxKind::InterfaceKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::ExtendsKeyword,
            SyntaxKind::KeyOfKeyword,
        ]
    );
}

#[test]
fn test_unicode_identifiers() {
    let tokens = scan_all("café \\u0061bc");
    assert_eq!(tokens[0], (SyntaxKind::Identifier, "café".to_string()));
    assert_eq!(tokens[1], (SyntaxKind::Identifier, "abc".to_string()));
}

#[test]
fn test_escaped_keyword_is_identifier() {
    assert_eq!(scan_kinds("\\u0074ype"), vec![SyntaxKind::Identifier]);
}

#[test]
fn test_private_identifier() {
    let tokens = scan_all("#secret # x");
    assert_eq!(tokens[0], (SyntaxKind::PrivateIdentifier, "#secret".to_string()));
    assert_eq!(tokens[1].0, SyntaxKind::HashToken);
}

#[test]
fn test_type_punctuation() {
    assert_eq!(
        scan_kinds("?: ?. ... => | & -?"),
        vec![
            SyntaxKind::QuestionToken,
            SyntaxKind::ColonToken,
            SyntaxKind::QuestionDotToken,
            SyntaxKind::DotDotDotToken,
            SyntaxKind::EqualsGreaterThanToken,
            SyntaxKind::BarToken,
            SyntaxKind::AmpersandToken,
            SyntaxKind::MinusToken,
            SyntaxKind::QuestionToken,
        ]
    );
}

#[test]
fn test_runtime_operators_collapse() {
    assert_eq!(
        scan_kinds("a += b === c !== d ??= e"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::CompoundAssignmentToken,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::ExclamationEqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::CompoundAssignmentToken,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_invalid_character_reports() {
    let mut scanner = Scanner::new("a ¤ b");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::Unknown);
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.take_diagnostics().len(), 1);
}
