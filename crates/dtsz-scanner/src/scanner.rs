//! Scanner state machine.
//!
//! Produces one token per `scan()` call. Trivia (whitespace, newlines and
//! comments) is always skipped. Line breaks seen while skipping are
//! remembered in `token_flags::PRECEDING_LINE_BREAK`.

use crate::syntax_kind::{SyntaxKind, text_to_keyword};
use dtsz_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use std::sync::Arc;

pub mod token_flags {
    pub const NONE: u32 = 0;
    pub const PRECEDING_LINE_BREAK: u32 = 1 << 0;
    pub const UNTERMINATED: u32 = 1 << 1;
}

/// A lexical error, positioned in the scanned text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub pos: u32,
    pub length: u32,
    pub message: &'static str,
    pub code: u32,
}

/// Everything needed to rewind the scanner for look-ahead.
#[derive(Clone, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    token_flags: u32,
    diagnostics_len: usize,
}

pub struct ScannerState {
    text: Arc<str>,
    /// Current position (end of the last scanned token)
    pos: usize,
    /// Start of the current token excluding trivia
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    token_flags: u32,
    diagnostics: Vec<ScannerDiagnostic>,
}

impl ScannerState {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        ScannerState {
            text: text.into(),
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            token_flags: token_flags::NONE,
            diagnostics: Vec::new(),
        }
    }

    #[inline]
    pub fn get_text_arc(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    #[inline]
    pub fn get_token(&self) -> SyntaxKind {
        self.token
    }

    /// Start of the current token, after trivia.
    #[inline]
    pub fn get_token_start(&self) -> u32 {
        self.token_start as u32
    }

    #[inline]
    pub fn get_token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Cooked value of the current token (identifier name, string contents, ...).
    #[inline]
    pub fn get_token_value_ref(&self) -> &str {
        &self.token_value
    }

    /// Raw source text of the current token.
    pub fn get_token_text(&self) -> &str {
        self.text.get(self.token_start..self.pos).unwrap_or("")
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags & token_flags::PRECEDING_LINE_BREAK != 0
    }

    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.token_flags & token_flags::UNTERMINATED != 0
    }

    pub fn get_diagnostics(&self) -> &[ScannerDiagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<ScannerDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            token_flags: self.token_flags,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.token_start = snapshot.token_start;
        self.token = snapshot.token;
        self.token_value = snapshot.token_value;
        self.token_flags = snapshot.token_flags;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    fn error(&mut self, pos: usize, length: usize, message: &'static str, code: u32) {
        self.diagnostics.push(ScannerDiagnostic {
            pos: pos as u32,
            length: length as u32,
            message,
            code,
        });
    }

    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.text.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.text.as_bytes().get(pos).copied()
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_flags = token_flags::NONE;
        self.token_value.clear();

        loop {
            self.token_start = self.pos;
            let Some(ch) = self.peek_char() else {
                self.token = SyntaxKind::EndOfFileToken;
                return self.token;
            };

            match ch {
                '\n' | '\r' => {
                    self.token_flags |= token_flags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                '/' if self.byte_at(self.pos + 1) == Some(b'/') => {
                    self.skip_single_line_comment();
                }
                '/' if self.byte_at(self.pos + 1) == Some(b'*') => {
                    self.skip_multi_line_comment();
                }
                c if c.is_whitespace() || c == '\u{FEFF}' => {
                    if matches!(c, '\u{2028}' | '\u{2029}') {
                        self.token_flags |= token_flags::PRECEDING_LINE_BREAK;
                    }
                    self.pos += c.len_utf8();
                }
                _ => break,
            }
        }

        self.token = self.scan_token();
        self.token
    }

    fn skip_single_line_comment(&mut self) {
        let rest = &self.text[self.pos..];
        let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
        self.pos += len;
    }

    fn skip_multi_line_comment(&mut self) {
        let start = self.pos;
        let body = &self.text[start + 2..];
        match body.find("*/") {
            Some(close) => {
                let comment = &body[..close];
                if comment.contains(['\n', '\r', '\u{2028}', '\u{2029}']) {
                    self.token_flags |= token_flags::PRECEDING_LINE_BREAK;
                }
                self.pos = start + 2 + close + 2;
            }
            None => {
                self.pos = self.text.len();
                self.error(
                    start,
                    self.pos - start,
                    diagnostic_messages::ASTERISK_SLASH_EXPECTED,
                    diagnostic_codes::ASTERISK_SLASH_EXPECTED,
                );
            }
        }
    }

    fn scan_token(&mut self) -> SyntaxKind {
        let Some(ch) = self.peek_char() else {
            return SyntaxKind::EndOfFileToken;
        };
        let next = self.byte_at(self.pos + 1);

        let single = |scanner: &mut Self, kind: SyntaxKind| {
            scanner.pos += 1;
            kind
        };

        match ch {
            '{' => single(self, SyntaxKind::OpenBraceToken),
            '}' => single(self, SyntaxKind::CloseBraceToken),
            '(' => single(self, SyntaxKind::OpenParenToken),
            ')' => single(self, SyntaxKind::CloseParenToken),
            '[' => single(self, SyntaxKind::OpenBracketToken),
            ']' => single(self, SyntaxKind::CloseBracketToken),
            ';' => single(self, SyntaxKind::SemicolonToken),
            ',' => single(self, SyntaxKind::CommaToken),
            '<' => single(self, SyntaxKind::LessThanToken),
            // `>` is always a single token; `>>` in type argument lists closes two lists
            '>' => single(self, SyntaxKind::GreaterThanToken),
            '+' => single(self, SyntaxKind::PlusToken),
            '-' => single(self, SyntaxKind::MinusToken),
            '*' => single(self, SyntaxKind::AsteriskToken),
            '/' => single(self, SyntaxKind::SlashToken),
            '%' => single(self, SyntaxKind::PercentToken),
            '&' => single(self, SyntaxKind::AmpersandToken),
            '|' => single(self, SyntaxKind::BarToken),
            '^' => single(self, SyntaxKind::CaretToken),
            '!' => single(self, SyntaxKind::ExclamationToken),
            '~' => single(self, SyntaxKind::TildeToken),
            ':' => single(self, SyntaxKind::ColonToken),
            '@' => single(self, SyntaxKind::AtToken),
            '=' if next == Some(b'>') => {
                self.pos += 2;
                SyntaxKind::EqualsGreaterThanToken
            }
            '=' => single(self, SyntaxKind::EqualsToken),
            '?' if next == Some(b'.')
                && !self.byte_at(self.pos + 2).is_some_and(|b| b.is_ascii_digit()) =>
            {
                self.pos += 2;
                SyntaxKind::QuestionDotToken
            }
            '?' => single(self, SyntaxKind::QuestionToken),
            '.' if next.is_some_and(|b| b.is_ascii_digit()) => self.scan_number(),
            '.' if next == Some(b'.') && self.byte_at(self.pos + 2) == Some(b'.') => {
                self.pos += 3;
                SyntaxKind::DotDotDotToken
            }
            '.' => single(self, SyntaxKind::DotToken),
            '"' | '\'' => self.scan_string(ch),
            '`' => {
                self.pos += 1;
                self.scan_template_continuation(true)
            }
            '0'..='9' => self.scan_number(),
            '#' if self.text[self.pos + 1..]
                .chars()
                .next()
                .is_some_and(is_identifier_start) =>
            {
                self.pos += 1;
                self.scan_identifier_rest();
                self.token_value = self.text[self.token_start..self.pos].to_string();
                SyntaxKind::PrivateIdentifier
            }
            '#' => single(self, SyntaxKind::HashToken),
            c if is_identifier_start(c) => {
                self.scan_identifier_rest();
                let text = &self.text[self.token_start..self.pos];
                self.token_value = text.to_string();
                text_to_keyword(text).unwrap_or(SyntaxKind::Identifier)
            }
            c => {
                self.pos += c.len_utf8();
                self.error(
                    self.token_start,
                    c.len_utf8(),
                    diagnostic_messages::INVALID_CHARACTER,
                    diagnostic_codes::INVALID_CHARACTER,
                );
                SyntaxKind::Unknown
            }
        }
    }

    fn scan_identifier_rest(&mut self) {
        // First char is already known to be a valid start
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
        while let Some(c) = self.peek_char() {
            if !is_identifier_part(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        let radix_prefixed = bytes.get(start) == Some(&b'0')
            && matches!(
                bytes.get(start + 1),
                Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
            );

        if radix_prefixed {
            self.pos += 2;
            while self
                .byte_at(self.pos)
                .is_some_and(|b| b.is_ascii_hexdigit() || b == b'_')
            {
                self.pos += 1;
            }
        } else {
            let digits = |scanner: &mut Self| {
                while scanner
                    .byte_at(scanner.pos)
                    .is_some_and(|b| b.is_ascii_digit() || b == b'_')
                {
                    scanner.pos += 1;
                }
            };
            digits(self);
            if self.byte_at(self.pos) == Some(b'.') {
                self.pos += 1;
                digits(self);
            }
            if matches!(self.byte_at(self.pos), Some(b'e' | b'E')) {
                self.pos += 1;
                if matches!(self.byte_at(self.pos), Some(b'+' | b'-')) {
                    self.pos += 1;
                }
                digits(self);
            }
        }

        let kind = if self.byte_at(self.pos) == Some(b'n') {
            self.pos += 1;
            SyntaxKind::BigIntLiteral
        } else {
            SyntaxKind::NumericLiteral
        };
        self.token_value = self.text[start..self.pos].to_string();
        kind
    }

    fn scan_string(&mut self, quote: char) -> SyntaxKind {
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(c) = self.peek_char() else {
                self.token_flags |= token_flags::UNTERMINATED;
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    diagnostic_messages::UNTERMINATED_STRING_LITERAL,
                    diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                );
                break;
            };
            if c == quote {
                self.pos += 1;
                break;
            }
            if c == '\n' || c == '\r' {
                self.token_flags |= token_flags::UNTERMINATED;
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    diagnostic_messages::UNTERMINATED_STRING_LITERAL,
                    diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                );
                break;
            }
            if c == '\\' {
                self.pos += 1;
                self.scan_escape(&mut value);
                continue;
            }
            value.push(c);
            self.pos += c.len_utf8();
        }
        self.token_value = value;
        SyntaxKind::StringLiteral
    }

    fn scan_escape(&mut self, out: &mut String) {
        let Some(c) = self.peek_char() else {
            return;
        };
        self.pos += c.len_utf8();
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{C}'),
            'v' => out.push('\u{B}'),
            // Line continuation
            '\n' => {}
            '\r' => {
                if self.byte_at(self.pos) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            'u' | 'x' => {
                let rest = &self.text[self.pos..];
                let (digits, consumed) = if c == 'u' && rest.starts_with('{') {
                    let close = rest.find('}').unwrap_or(rest.len());
                    (&rest[1..close], (close + 1).min(rest.len()))
                } else {
                    let len = if c == 'u' { 4 } else { 2 };
                    let end = rest
                        .char_indices()
                        .take(len)
                        .take_while(|(_, ch)| ch.is_ascii_hexdigit())
                        .count();
                    (&rest[..end], end)
                };
                match u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push(c);
                        out.push_str(digits);
                    }
                }
                self.pos += consumed;
            }
            other => out.push(other),
        }
    }

    /// Scan template characters after a backtick or a `}` closing a substitution.
    fn scan_template_continuation(&mut self, is_start: bool) -> SyntaxKind {
        let mut value = String::new();
        loop {
            let Some(c) = self.peek_char() else {
                self.token_flags |= token_flags::UNTERMINATED;
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    diagnostic_messages::UNTERMINATED_TEMPLATE_LITERAL,
                    diagnostic_codes::UNTERMINATED_TEMPLATE_LITERAL,
                );
                self.token_value = value;
                return if is_start {
                    SyntaxKind::NoSubstitutionTemplateLiteral
                } else {
                    SyntaxKind::TemplateTail
                };
            };
            match c {
                '`' => {
                    self.pos += 1;
                    self.token_value = value;
                    return if is_start {
                        SyntaxKind::NoSubstitutionTemplateLiteral
                    } else {
                        SyntaxKind::TemplateTail
                    };
                }
                '$' if self.byte_at(self.pos + 1) == Some(b'{') => {
                    self.pos += 2;
                    self.token_value = value;
                    return if is_start {
                        SyntaxKind::TemplateHead
                    } else {
                        SyntaxKind::TemplateMiddle
                    };
                }
                '\\' => {
                    self.pos += 1;
                    self.scan_escape(&mut value);
                }
                _ => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    /// Re-scan a `}` token as the continuation of a template literal.
    ///
    /// Called by the parser after the type inside `${ ... }` when the current
    /// token is the closing brace.
    pub fn re_scan_template_token(&mut self) -> SyntaxKind {
        self.pos = self.token_start + 1;
        self.token_value.clear();
        self.token = self.scan_template_continuation(false);
        self.token
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == '$'
        || (!c.is_ascii() && (c.is_alphanumeric() || c == '\u{200C}' || c == '\u{200D}'))
}

/// Skip whitespace and comments starting at `pos`, returning the first
/// non-trivia position.
pub fn skip_trivia(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut pos = pos;
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C => pos += 1,
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                while pos < bytes.len() && bytes[pos] != b'\n' && bytes[pos] != b'\r' {
                    pos += 1;
                }
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                match text.get(pos + 2..).and_then(|rest| rest.find("*/")) {
                    Some(close) => pos += 2 + close + 2,
                    None => return bytes.len(),
                }
            }
            _ => {
                let Some(c) = text.get(pos..).and_then(|rest| rest.chars().next()) else {
                    return pos;
                };
                if c.is_whitespace() || c == '\u{FEFF}' {
                    pos += c.len_utf8();
                } else {
                    return pos;
                }
            }
        }
    }
    pos
}
