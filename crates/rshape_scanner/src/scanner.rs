//! The scanner.
//!
//! Converts source text into the stream of tokens the parser consumes.
//! Positions are byte offsets into the UTF-8 text. String and template tokens
//! carry their cooked value, numeric tokens their canonical decimal spelling.

use crate::char_codes::*;
use memchr::{memchr2, memmem};
use rshape_ast::syntax_kind::SyntaxKind;
use rshape_ast::types::TokenFlags;
use rshape_ast::IGNORE_DIRECTIVE;
use rshape_core::text::TextSpan;
use rshape_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Saved scanner state for lookahead.
#[derive(Debug, Clone)]
pub struct ScannerState {
    pub pos: usize,
    pub token_start: usize,
    pub token: SyntaxKind,
    pub token_value: String,
    pub token_flags: TokenFlags,
}

/// The scanner converts TypeScript source text into tokens.
pub struct Scanner<'t> {
    /// The source text being scanned.
    text: &'t str,
    /// Current byte position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// Identifier text, cooked literal value or canonical number.
    token_value: String,
    /// Token flags for the current token.
    token_flags: TokenFlags,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

impl<'t> Scanner<'t> {
    /// Create a new scanner for the given source text.
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            token_flags: TokenFlags::NONE,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Skip a `#!` line at the very beginning of the file.
    /// Call this before the first `scan()` call.
    pub fn skip_shebang(&mut self) {
        if self.pos == 0 && self.text.starts_with("#!") {
            self.pos = self.text[2..].find(is_line_break).map_or(self.text.len(), |i| i + 2);
        }
    }

    /// The full source text.
    #[inline]
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Look ahead: save state, call f, restore state and return the result.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// The current token's value: identifier text, cooked string value or
    /// canonical numeric text.
    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// Start of the current token (after trivia).
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// End of the current token.
    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    /// The raw source text of the current token.
    pub fn token_text(&self) -> &'t str {
        self.text.get(self.token_start..self.pos).unwrap_or("")
    }

    #[inline]
    pub fn token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    /// Whether the current token was preceded by a line break.
    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// Whether a comment containing the ignore directive precedes the current token.
    #[inline]
    pub fn has_preceding_ignore_directive(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_IGNORE_DIRECTIVE)
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            token_flags: self.token_flags,
        }
    }

    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
        self.token_flags = state.token_flags;
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    /// The byte at `pos + offset`.
    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    /// The character at the current position without advancing.
    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    fn advance(&mut self, len: usize, kind: SyntaxKind) -> SyntaxKind {
        self.pos += len;
        kind
    }

    fn error(&mut self, message: &DiagnosticMessage, start: usize, end: usize) {
        let mut diagnostic = Diagnostic::new(message, &[]);
        diagnostic.span = Some(TextSpan::new(start as u32, end.saturating_sub(start) as u32));
        self.diagnostics.add(diagnostic);
    }

    /// Skip whitespace and comments, recording line breaks and ignore directives.
    fn skip_trivia(&mut self) {
        let text = self.text;
        let bytes = text.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\n' | b'\r' => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                b' ' | b'\t' | 0x0B | 0x0C => self.pos += 1,
                b'/' if self.byte_at(1) == Some(b'/') => {
                    let start = self.pos + 2;
                    let end = memchr2(b'\n', b'\r', &bytes[start..]).map_or(bytes.len(), |i| start + i);
                    self.note_comment(start, end);
                    self.pos = end;
                }
                b'/' if self.byte_at(1) == Some(b'*') => {
                    let start = self.pos + 2;
                    let end = match memmem::find(&bytes[start..], b"*/") {
                        Some(i) => start + i,
                        None => {
                            self.error(&messages::ASTERISK_SLASH_EXPECTED, bytes.len(), bytes.len());
                            bytes.len()
                        }
                    };
                    self.note_comment(start, end);
                    if memchr2(b'\n', b'\r', &bytes[start..end]).is_some() {
                        self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    }
                    self.pos = (end + 2).min(bytes.len());
                }
                byte if byte >= 0x80 => match self.current_char() {
                    Some(ch) if is_line_break(ch) => {
                        self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                        self.pos += ch.len_utf8();
                    }
                    Some(ch) if is_white_space_single_line(ch) => self.pos += ch.len_utf8(),
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn note_comment(&mut self, start: usize, end: usize) {
        if self.text[start..end].contains(IGNORE_DIRECTIVE) {
            self.token_flags |= TokenFlags::PRECEDING_IGNORE_DIRECTIVE;
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_flags = TokenFlags::NONE;
        self.token_value.clear();

        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.current_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        let b1 = self.byte_at(1);
        let b2 = self.byte_at(2);
        self.token = match ch {
            '(' => self.advance(1, SyntaxKind::OpenParenToken),
            ')' => self.advance(1, SyntaxKind::CloseParenToken),
            '{' => self.advance(1, SyntaxKind::OpenBraceToken),
            '}' => self.advance(1, SyntaxKind::CloseBraceToken),
            '[' => self.advance(1, SyntaxKind::OpenBracketToken),
            ']' => self.advance(1, SyntaxKind::CloseBracketToken),
            ';' => self.advance(1, SyntaxKind::SemicolonToken),
            ',' => self.advance(1, SyntaxKind::CommaToken),
            ':' => self.advance(1, SyntaxKind::ColonToken),
            '~' => self.advance(1, SyntaxKind::TildeToken),
            '@' => self.advance(1, SyntaxKind::AtToken),
            // `>>` and `>=` are never combined; the parser only needs single `>`.
            '>' => self.advance(1, SyntaxKind::GreaterThanToken),

            '.' => match (b1, b2) {
                (Some(b'.'), Some(b'.')) => self.advance(3, SyntaxKind::DotDotDotToken),
                (Some(b), _) if b.is_ascii_digit() => self.scan_number(),
                _ => self.advance(1, SyntaxKind::DotToken),
            },
            '?' => match (b1, b2) {
                (Some(b'?'), Some(b'=')) => self.advance(3, SyntaxKind::CompoundAssignmentToken),
                (Some(b'?'), _) => self.advance(2, SyntaxKind::QuestionQuestionToken),
                (Some(b'.'), next) if !next.map_or(false, |b| b.is_ascii_digit()) => {
                    self.advance(2, SyntaxKind::QuestionDotToken)
                }
                _ => self.advance(1, SyntaxKind::QuestionToken),
            },
            '<' => match b1 {
                Some(b'=') => self.advance(2, SyntaxKind::LessThanEqualsToken),
                _ => self.advance(1, SyntaxKind::LessThanToken),
            },
            '=' => match (b1, b2) {
                (Some(b'='), Some(b'=')) => self.advance(3, SyntaxKind::EqualsEqualsToken),
                (Some(b'='), _) => self.advance(2, SyntaxKind::EqualsEqualsToken),
                (Some(b'>'), _) => self.advance(2, SyntaxKind::EqualsGreaterThanToken),
                _ => self.advance(1, SyntaxKind::EqualsToken),
            },
            '!' => match (b1, b2) {
                (Some(b'='), Some(b'=')) => self.advance(3, SyntaxKind::ExclamationEqualsToken),
                (Some(b'='), _) => self.advance(2, SyntaxKind::ExclamationEqualsToken),
                _ => self.advance(1, SyntaxKind::ExclamationToken),
            },
            '+' => match b1 {
                Some(b'+') => self.advance(2, SyntaxKind::PlusPlusToken),
                Some(b'=') => self.advance(2, SyntaxKind::CompoundAssignmentToken),
                _ => self.advance(1, SyntaxKind::PlusToken),
            },
            '-' => match b1 {
                Some(b'-') => self.advance(2, SyntaxKind::MinusMinusToken),
                Some(b'=') => self.advance(2, SyntaxKind::CompoundAssignmentToken),
                _ => self.advance(1, SyntaxKind::MinusToken),
            },
            '*' => match (b1, b2) {
                (Some(b'*'), Some(b'=')) => self.advance(3, SyntaxKind::CompoundAssignmentToken),
                (Some(b'*'), _) => self.advance(2, SyntaxKind::AsteriskAsteriskToken),
                (Some(b'='), _) => self.advance(2, SyntaxKind::CompoundAssignmentToken),
                _ => self.advance(1, SyntaxKind::AsteriskToken),
            },
            // Comments are handled in skip_trivia, so this is division or a regex.
            '/' => match b1 {
                Some(b'=') => self.advance(2, SyntaxKind::CompoundAssignmentToken),
                _ => self.advance(1, SyntaxKind::SlashToken),
            },
            '%' => match b1 {
                Some(b'=') => self.advance(2, SyntaxKind::CompoundAssignmentToken),
                _ => self.advance(1, SyntaxKind::PercentToken),
            },
            '^' => match b1 {
                Some(b'=') => self.advance(2, SyntaxKind::CompoundAssignmentToken),
                _ => self.advance(1, SyntaxKind::CaretToken),
            },
            '&' => match (b1, b2) {
                (Some(b'&'), Some(b'=')) => self.advance(3, SyntaxKind::CompoundAssignmentToken),
                (Some(b'&'), _) => self.advance(2, SyntaxKind::AmpersandAmpersandToken),
                (Some(b'='), _) => self.advance(2, SyntaxKind::CompoundAssignmentToken),
                _ => self.advance(1, SyntaxKind::AmpersandToken),
            },
            '|' => match (b1, b2) {
                (Some(b'|'), Some(b'=')) => self.advance(3, SyntaxKind::CompoundAssignmentToken),
                (Some(b'|'), _) => self.advance(2, SyntaxKind::BarBarToken),
                (Some(b'='), _) => self.advance(2, SyntaxKind::CompoundAssignmentToken),
                _ => self.advance(1, SyntaxKind::BarToken),
            },
            '#' => self.scan_hash(),

            '\'' | '"' => self.scan_string_literal(ch),
            '`' => {
                self.pos += 1;
                self.scan_template_body(true)
            }

            '0'..='9' => self.scan_number(),

            '\\' if b1 == Some(b'u') => self.scan_identifier(),
            _ if is_identifier_start(ch) => self.scan_identifier(),

            _ => {
                let start = self.pos;
                self.pos += ch.len_utf8();
                self.error(&messages::INVALID_CHARACTER, start, self.pos);
                SyntaxKind::Unknown
            }
        };

        self.token
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn scan_string_literal(&mut self, quote: char) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let mut result = String::new();
        loop {
            let Some(ch) = self.current_char() else {
                self.unterminated(&messages::UNTERMINATED_STRING_LITERAL, start);
                break;
            };
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == '\\' {
                self.scan_escape_sequence(&mut result);
                continue;
            }
            if is_line_break(ch) {
                self.unterminated(&messages::UNTERMINATED_STRING_LITERAL, start);
                break;
            }
            result.push(ch);
            self.pos += ch.len_utf8();
        }
        self.token_value = result;
        SyntaxKind::StringLiteral
    }

    fn unterminated(&mut self, message: &DiagnosticMessage, start: usize) {
        self.token_flags |= TokenFlags::UNTERMINATED;
        self.error(message, start, self.pos);
    }

    /// Scan template text up to the closing backtick or the next `${`.
    /// `from_backtick` is true for the first chunk of a template.
    fn scan_template_body(&mut self, from_backtick: bool) -> SyntaxKind {
        let start = self.pos;
        let mut result = String::new();
        let kind = loop {
            let Some(ch) = self.current_char() else {
                self.unterminated(&messages::UNTERMINATED_TEMPLATE_LITERAL, start);
                break if from_backtick { SyntaxKind::NoSubstitutionTemplateLiteral } else { SyntaxKind::TemplateTail };
            };
            match ch {
                '`' => {
                    self.pos += 1;
                    break if from_backtick { SyntaxKind::NoSubstitutionTemplateLiteral } else { SyntaxKind::TemplateTail };
                }
                '$' if self.byte_at(1) == Some(b'{') => {
                    self.pos += 2;
                    break if from_backtick { SyntaxKind::TemplateHead } else { SyntaxKind::TemplateMiddle };
                }
                '\\' => self.scan_escape_sequence(&mut result),
                // Template line endings are normalized to `\n`.
                '\r' => {
                    self.pos += 1;
                    if self.byte_at(0) == Some(b'\n') {
                        self.pos += 1;
                    }
                    result.push('\n');
                }
                _ => {
                    result.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        };
        self.token_value = result;
        kind
    }

    /// Rescan a `}` token as the continuation of a template literal
    /// (`TemplateMiddle` or `TemplateTail`).
    pub fn rescan_template_token(&mut self) -> SyntaxKind {
        self.pos = self.token_start + 1;
        self.token_value.clear();
        self.token = self.scan_template_body(false);
        self.token
    }

    /// Rescan the current `/` or `/=` token as a regular expression literal.
    pub fn rescan_slash_token(&mut self) -> SyntaxKind {
        self.pos = self.token_start + 1;
        let mut in_character_class = false;
        loop {
            let Some(ch) = self.current_char() else {
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            };
            if is_line_break(ch) {
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            }
            self.pos += ch.len_utf8();
            match ch {
                '\\' => {
                    if let Some(escaped) = self.current_char().filter(|c| !is_line_break(*c)) {
                        self.pos += escaped.len_utf8();
                    }
                }
                '[' => in_character_class = true,
                ']' => in_character_class = false,
                '/' if !in_character_class => {
                    // Flags
                    while let Some(flag) = self.current_char().filter(|c| is_identifier_part(*c)) {
                        self.pos += flag.len_utf8();
                    }
                    break;
                }
                _ => {}
            }
        }
        self.token_value = self.token_text().to_string();
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    /// Append the cooked value of the escape sequence at the current `\`.
    fn scan_escape_sequence(&mut self, out: &mut String) {
        let start = self.pos;
        self.pos += 1;
        let Some(ch) = self.current_char() else {
            out.push('\\');
            return;
        };
        self.pos += ch.len_utf8();
        match ch {
            '0' if !self.byte_at(0).map_or(false, |b| b.is_ascii_digit()) => out.push('\0'),
            'b' => out.push('\u{0008}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'v' => out.push('\u{000B}'),
            'f' => out.push('\u{000C}'),
            'r' => out.push('\r'),
            'x' => match self.scan_hex_value(2, 2).and_then(char::from_u32) {
                Some(c) => out.push(c),
                None => self.invalid_escape(start, out),
            },
            'u' => match self.scan_unicode_escape() {
                Some(high @ 0xD800..=0xDBFF) if self.text.get(self.pos..).map_or(false, |r| r.starts_with("\\u")) => {
                    let save = self.pos;
                    self.pos += 2;
                    match self.scan_unicode_escape() {
                        Some(low @ 0xDC00..=0xDFFF) => {
                            let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                            out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                        }
                        _ => {
                            self.pos = save;
                            out.push('\u{FFFD}');
                        }
                    }
                }
                Some(value) => out.push(char::from_u32(value).unwrap_or('\u{FFFD}')),
                None => self.invalid_escape(start, out),
            },
            // Line continuation
            '\r' => {
                if self.byte_at(0) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    fn invalid_escape(&mut self, start: usize, out: &mut String) {
        self.token_flags |= TokenFlags::CONTAINS_INVALID_ESCAPE;
        out.push_str(&self.text[start..self.pos]);
    }

    /// Scan the code point of a `\u` escape, positioned after the `u`.
    fn scan_unicode_escape(&mut self) -> Option<u32> {
        if self.byte_at(0) == Some(b'{') {
            self.pos += 1;
            let value = self.scan_hex_value(1, 6)?;
            if self.byte_at(0) != Some(b'}') {
                return None;
            }
            self.pos += 1;
            Some(value)
        } else {
            self.scan_hex_value(4, 4)
        }
    }

    fn scan_hex_value(&mut self, min_digits: usize, max_digits: usize) -> Option<u32> {
        let start = self.pos;
        while self.pos - start < max_digits && self.byte_at(0).map_or(false, |b| b.is_ascii_hexdigit()) {
            self.pos += 1;
        }
        if self.pos - start < min_digits {
            return None;
        }
        u32::from_str_radix(&self.text[start..self.pos], 16).ok()
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        let radix = match (self.byte_at(0), self.byte_at(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => {
                self.token_flags |= TokenFlags::HEX_SPECIFIER;
                16
            }
            (Some(b'0'), Some(b'b' | b'B')) => {
                self.token_flags |= TokenFlags::BINARY_SPECIFIER;
                2
            }
            (Some(b'0'), Some(b'o' | b'O')) => {
                self.token_flags |= TokenFlags::OCTAL_SPECIFIER;
                8
            }
            _ => 10,
        };

        if radix != 10 {
            self.pos += 2;
            self.scan_digits(radix);
        } else {
            self.scan_digits(10);
            if self.byte_at(0) == Some(b'.') {
                self.pos += 1;
                self.scan_digits(10);
            }
            if let Some(b'e' | b'E') = self.byte_at(0) {
                self.pos += 1;
                self.token_flags |= TokenFlags::SCIENTIFIC;
                if let Some(b'+' | b'-') = self.byte_at(0) {
                    self.pos += 1;
                }
                self.scan_digits(10);
            }
        }

        let raw: String = self.text[start..self.pos].chars().filter(|c| *c != '_').collect();
        if radix == 10 && raw.len() > 1 && raw.starts_with('0') && raw.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            // Legacy octal: `017`
            self.token_flags |= TokenFlags::OCTAL;
        }

        if self.byte_at(0) == Some(b'n') {
            self.pos += 1;
            self.token_value = bigint_text(&raw, radix);
            return SyntaxKind::BigIntLiteral;
        }

        self.token_value = numeric_text(&raw, radix, self.token_flags);
        SyntaxKind::NumericLiteral
    }

    fn scan_digits(&mut self, radix: u32) {
        while let Some(byte) = self.byte_at(0) {
            if byte == b'_' {
                self.token_flags |= TokenFlags::CONTAINS_SEPARATOR;
            } else if !is_digit_of_radix(byte, radix) {
                break;
            }
            self.pos += 1;
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            let at_start = self.pos == start;
            if ch == '\\' && self.byte_at(1) == Some(b'u') {
                let escape_start = self.pos;
                self.pos += 2;
                match self.scan_unicode_escape().and_then(char::from_u32) {
                    Some(c) if (text.is_empty() && is_identifier_start(c)) || (!text.is_empty() && is_identifier_part(c)) => {
                        self.token_flags |= TokenFlags::UNICODE_ESCAPE;
                        text.push(c);
                    }
                    _ => {
                        self.error(&messages::INVALID_CHARACTER, escape_start, self.pos);
                        break;
                    }
                }
            } else if (at_start && is_identifier_start(ch)) || (!at_start && is_identifier_part(ch)) {
                text.push(ch);
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }

        // An escaped keyword is an identifier.
        let kind = if self.token_flags.contains(TokenFlags::UNICODE_ESCAPE) {
            SyntaxKind::Identifier
        } else {
            SyntaxKind::from_keyword(&text).unwrap_or(SyntaxKind::Identifier)
        };
        self.token_value = text;
        kind
    }

    /// `#name` or a bare `#`.
    fn scan_hash(&mut self) -> SyntaxKind {
        self.pos += 1;
        if self.current_char().map_or(false, is_identifier_start) {
            self.scan_identifier();
            self.token_value.insert(0, '#');
            SyntaxKind::PrivateIdentifier
        } else {
            SyntaxKind::HashToken
        }
    }
}

/// Canonical text of a numeric literal (separators removed).
fn numeric_text(raw: &str, radix: u32, flags: TokenFlags) -> String {
    let value = if radix != 10 {
        u128::from_str_radix(&raw[2..], radix).ok().map(|v| v as f64)
    } else if flags.contains(TokenFlags::OCTAL) {
        u128::from_str_radix(&raw[1..], 8).ok().map(|v| v as f64)
    } else {
        raw.parse::<f64>().ok()
    };
    value.map_or_else(|| raw.to_string(), format_number)
}

/// Decimal digits of a bigint literal, without the `n` suffix.
fn bigint_text(raw: &str, radix: u32) -> String {
    let digits = if radix != 10 { &raw[2..] } else { raw };
    u128::from_str_radix(digits, radix).map_or_else(|_| digits.to_string(), |v| v.to_string())
}

/// Format a number the way `String(value)` does in JavaScript, so numeric
/// literal types and numeric property keys compare by value.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let text = format!("{:e}", value);
        if text.contains("e-") {
            text
        } else {
            text.replacen('e', "e+", 1)
        }
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple_tokens() {
        let mut scanner = Scanner::new("( ) { } [ ] ; , :");
        assert_eq!(scanner.scan(), SyntaxKind::OpenParenToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseParenToken);
        assert_eq!(scanner.scan(), SyntaxKind::OpenBraceToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
        assert_eq!(scanner.scan(), SyntaxKind::OpenBracketToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseBracketToken);
        assert_eq!(scanner.scan(), SyntaxKind::SemicolonToken);
        assert_eq!(scanner.scan(), SyntaxKind::CommaToken);
        assert_eq!(scanner.scan(), SyntaxKind::ColonToken);
        assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
    }

    #[test]
    fn test_greater_than_is_never_combined() {
        let mut scanner = Scanner::new("A<B<C>>= 1");
        let mut kinds = Vec::new();
        loop {
            let kind = scanner.scan();
            if kind == SyntaxKind::EndOfFileToken {
                break;
            }
            kinds.push(kind);
        }
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::LessThanToken,
                SyntaxKind::Identifier,
                SyntaxKind::LessThanToken,
                SyntaxKind::Identifier,
                SyntaxKind::GreaterThanToken,
                SyntaxKind::GreaterThanToken,
                SyntaxKind::EqualsToken,
                SyntaxKind::NumericLiteral,
            ]
        );
    }

    #[test]
    fn test_byte_positions_after_multibyte_text() {
        let mut scanner = Scanner::new("'héllo' x");
        assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
        assert_eq!(scanner.token_end(), 8);
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_start(), 9);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
    }

    #[test]
    fn test_look_ahead() {
        let mut scanner = Scanner::new("let x = 1;");
        scanner.scan();
        let next = scanner.look_ahead(|s| s.scan());
        assert_eq!(next, SyntaxKind::Identifier);
        // Position should be restored
        assert_eq!(scanner.token(), SyntaxKind::LetKeyword);
    }
}
