//! Parser state: token plumbing, diagnostics, look-ahead and the shared
//! name/modifier/expression helpers used by statement and type parsing.

use super::base::{NodeIndex, NodeList};
use super::flags::{modifier_flags, node_flags};
use super::node::{NodeArena, QualifiedNameData, WrappedData};
use super::syntax_kind_ext::{COMPUTED_PROPERTY_NAME, QUALIFIED_NAME, UNPARSED_EXPRESSION};
use dtsz_common::diagnostics::{diagnostic_codes, diagnostic_messages, format_message};
use dtsz_common::{Diagnostic, limits};
use dtsz_scanner::{
    ScannerState, SyntaxKind, keyword_to_text, token_is_identifier,
    token_is_identifier_or_keyword, token_is_modifier,
};
use tracing::trace;

/// Parsing a conditional type's `extends` clause: a nested conditional is
/// not allowed without parentheses.
pub(crate) const CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES: u32 = 1 << 0;
/// Inside a `declare` context or ambient module body.
pub(crate) const CONTEXT_FLAG_AMBIENT: u32 = 1 << 1;

/// Recursive descent parser for declaration files.
///
/// ```ignore
/// let mut parser = ParserState::new("index.d.ts".to_string(), text);
/// let root = parser.parse_source_file();
/// let arena = parser.into_arena();
/// ```
pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub(crate) file_name: String,
    pub(crate) current_token: SyntaxKind,
    pub(crate) context_flags: u32,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) recursion_depth: u32,
    /// End of the last consumed token; used as the `end` of finished nodes
    pub(crate) prev_token_end: u32,
    last_error_pos: Option<u32>,
}

/// Rewind point for speculative parsing.
pub(crate) struct ParserSnapshot {
    scanner: dtsz_scanner::ScannerSnapshot,
    current_token: SyntaxKind,
    prev_token_end: u32,
    diagnostics_len: usize,
    last_error_pos: Option<u32>,
}

impl ParserState {
    pub fn new(file_name: String, source_text: String) -> ParserState {
        ParserState {
            scanner: ScannerState::new(source_text),
            arena: NodeArena::new(),
            file_name,
            current_token: SyntaxKind::Unknown,
            context_flags: 0,
            diagnostics: Vec::new(),
            recursion_depth: 0,
            prev_token_end: 0,
            last_error_pos: None,
        }
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.current_token
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.get_token_start()
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.get_token_end()
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.scanner.get_token_end();
        self.current_token = self.scanner.scan();
        trace!(token = ?self.current_token, pos = self.token_pos(), "next_token");
        self.current_token
    }

    #[inline]
    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report TS1005 `'x' expected.`
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        let text = keyword_to_text(kind).unwrap_or("token");
        self.error_at_current_token(
            &format_message(diagnostic_messages::TOKEN_EXPECTED, &[text]),
            diagnostic_codes::TOKEN_EXPECTED,
        );
        false
    }

    /// ASI: a statement may end at `;`, before `}` or EOF, or at a line break.
    pub(crate) fn can_parse_semicolon(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) || self.has_preceding_line_break()
    }

    pub(crate) fn parse_semicolon(&mut self) {
        if self.parse_optional(SyntaxKind::SemicolonToken) || self.can_parse_semicolon() {
            return;
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
    }

    // =========================================================================
    // Speculation
    // =========================================================================

    pub(crate) fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            scanner: self.scanner.save_state(),
            current_token: self.current_token,
            prev_token_end: self.prev_token_end,
            diagnostics_len: self.diagnostics.len(),
            last_error_pos: self.last_error_pos,
        }
    }

    pub(crate) fn rewind(&mut self, snapshot: ParserSnapshot) {
        self.scanner.restore_state(snapshot.scanner);
        self.current_token = snapshot.current_token;
        self.prev_token_end = snapshot.prev_token_end;
        self.diagnostics.truncate(snapshot.diagnostics_len);
        self.last_error_pos = snapshot.last_error_pos;
    }

    /// Run `f` and rewind afterwards. `f` must not create nodes.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.snapshot();
        let result = f(self);
        self.rewind(snapshot);
        result
    }

    /// Run `f`, keeping its progress only when it returns `Some`.
    ///
    /// Nodes created by a failed attempt stay in the arena unreachable.
    pub(crate) fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let snapshot = self.snapshot();
        let result = f(self);
        if result.is_none() {
            self.rewind(snapshot);
        }
        result
    }

    pub(crate) fn next_token_is_identifier_on_same_line(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            !p.has_preceding_line_break() && token_is_identifier(p.token())
        })
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn parse_error_at(&mut self, start: u32, length: u32, message: &str, code: u32) {
        // One error per position keeps cascades quiet.
        if self.last_error_pos == Some(start) {
            return;
        }
        self.last_error_pos = Some(start);
        self.diagnostics.push(Diagnostic::error(
            self.file_name.clone(),
            start,
            length,
            message,
            code,
        ));
    }

    pub(crate) fn error_at_current_token(&mut self, message: &str, code: u32) {
        let start = self.token_pos();
        let length = self.token_end().saturating_sub(start);
        self.parse_error_at(start, length, message, code);
    }

    /// Guard deep nesting. Returns false (after reporting) when the limit is hit.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= limits::MAX_PARSER_RECURSION_DEPTH {
            self.error_at_current_token(
                diagnostic_messages::TYPE_EXPECTED,
                diagnostic_codes::TYPE_EXPECTED,
            );
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    #[inline]
    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    pub(crate) fn in_context(&self, flag: u32) -> bool {
        self.context_flags & flag != 0
    }

    /// Run `f` with `flag` set (or cleared), restoring the previous context.
    pub(crate) fn with_context<T>(
        &mut self,
        flag: u32,
        value: bool,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.context_flags;
        if value {
            self.context_flags |= flag;
        } else {
            self.context_flags &= !flag;
        }
        let result = f(self);
        self.context_flags = saved;
        result
    }

    pub(crate) fn take_scanner_diagnostics(&mut self) {
        for diag in self.scanner.take_diagnostics() {
            self.diagnostics.push(Diagnostic::error(
                self.file_name.clone(),
                diag.pos,
                diag.length,
                diag.message,
                diag.code,
            ));
        }
        self.diagnostics.sort_by_key(|d| d.start);
    }

    // =========================================================================
    // Names
    // =========================================================================

    fn create_missing_identifier(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let index = self
            .arena
            .add_identifier(SyntaxKind::Identifier as u16, pos, pos, String::new());
        self.arena.set_node_flags(index, node_flags::MISSING);
        index
    }

    fn create_identifier_from_token(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let end = self.token_end();
        let kind = if self.is_token(SyntaxKind::PrivateIdentifier) {
            SyntaxKind::PrivateIdentifier
        } else {
            SyntaxKind::Identifier
        };
        let text = self.scanner.get_token_value_ref().to_string();
        self.next_token();
        self.arena.add_identifier(kind as u16, pos, end, text)
    }

    /// Binding identifier: identifiers and non-reserved keywords.
    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if token_is_identifier(self.token()) {
            return self.create_identifier_from_token();
        }
        self.error_at_current_token(
            diagnostic_messages::IDENTIFIER_EXPECTED,
            diagnostic_codes::IDENTIFIER_EXPECTED,
        );
        self.create_missing_identifier()
    }

    /// Identifier name: any identifier or keyword (property names, qualified
    /// name segments, specifier names).
    pub(crate) fn parse_identifier_name(&mut self) -> NodeIndex {
        if token_is_identifier_or_keyword(self.token()) || self.is_token(SyntaxKind::PrivateIdentifier)
        {
            return self.create_identifier_from_token();
        }
        self.error_at_current_token(
            diagnostic_messages::IDENTIFIER_EXPECTED,
            diagnostic_codes::IDENTIFIER_EXPECTED,
        );
        self.create_missing_identifier()
    }

    pub(crate) fn parse_literal_node(&mut self) -> NodeIndex {
        let kind = self.token() as u16;
        let pos = self.token_pos();
        let end = self.token_end();
        let text = self.scanner.get_token_value_ref().to_string();
        self.next_token();
        self.arena.add_literal(kind, pos, end, text)
    }

    /// `A` or `A.B.C`; `this` is allowed as the first segment.
    pub(crate) fn parse_entity_name(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut entity = if self.is_token(SyntaxKind::ThisKeyword) {
            let end = self.token_end();
            self.next_token();
            self.arena
                .add_token(SyntaxKind::ThisKeyword as u16, start, end)
        } else {
            self.parse_identifier()
        };
        while self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            let right = self.parse_identifier_name();
            entity = self.arena.add_qualified_name(
                QUALIFIED_NAME,
                start,
                self.prev_token_end,
                QualifiedNameData {
                    left: entity,
                    right,
                },
            );
        }
        entity
    }

    /// Property name of a member: identifier, keyword, string, number,
    /// private name or `[computed]`.
    pub(crate) fn parse_property_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral => {
                self.parse_literal_node()
            }
            SyntaxKind::OpenBracketToken => {
                let start = self.token_pos();
                self.next_token();
                let inner = self.parse_expression_or_entity_name();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                self.arena.add_wrapped(
                    COMPUTED_PROPERTY_NAME,
                    start,
                    self.prev_token_end,
                    WrappedData { inner },
                )
            }
            _ => self.parse_identifier_name(),
        }
    }

    #[inline]
    pub(crate) fn is_property_name_start(&self) -> bool {
        token_is_identifier_or_keyword(self.token())
            || matches!(
                self.token(),
                SyntaxKind::StringLiteral
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::BigIntLiteral
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::PrivateIdentifier
            )
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    fn can_follow_modifier(&self) -> bool {
        token_is_identifier_or_keyword(self.token())
            || matches!(
                self.token(),
                SyntaxKind::OpenBracketToken
                    | SyntaxKind::OpenBraceToken
                    | SyntaxKind::AsteriskToken
                    | SyntaxKind::DotDotDotToken
                    | SyntaxKind::StringLiteral
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::PrivateIdentifier
            )
    }

    /// True when the current modifier keyword is really a modifier and not a
    /// name (`readonly: boolean`, `static(): void`, `export = x`).
    fn next_token_is_modifier_target(&mut self) -> bool {
        let modifier = self.token();
        self.look_ahead(|p| {
            p.next_token();
            match modifier {
                SyntaxKind::ConstKeyword => p.is_token(SyntaxKind::EnumKeyword),
                SyntaxKind::ExportKeyword => {
                    !matches!(
                        p.token(),
                        SyntaxKind::EqualsToken
                            | SyntaxKind::AsteriskToken
                            | SyntaxKind::OpenBraceToken
                            | SyntaxKind::AsKeyword
                    ) && p.can_follow_modifier()
                }
                SyntaxKind::DefaultKeyword => matches!(
                    p.token(),
                    SyntaxKind::ClassKeyword
                        | SyntaxKind::FunctionKeyword
                        | SyntaxKind::InterfaceKeyword
                        | SyntaxKind::AbstractKeyword
                        | SyntaxKind::AsyncKeyword
                        | SyntaxKind::DeclareKeyword
                ),
                _ => !p.has_preceding_line_break() && p.can_follow_modifier(),
            }
        })
    }

    /// Parse a run of modifier keywords, storing their combined flags on the
    /// node later via `apply_modifier_flags`.
    pub(crate) fn parse_modifiers(&mut self) -> Option<NodeList> {
        let start = self.token_pos();
        let mut nodes = Vec::new();
        while token_is_modifier(self.token()) && self.next_token_is_modifier_target() {
            let kind = self.token() as u16;
            let pos = self.token_pos();
            let end = self.token_end();
            self.next_token();
            nodes.push(self.arena.add_token(kind, pos, end));
        }
        if nodes.is_empty() {
            None
        } else {
            Some(NodeList::new(nodes, start, self.prev_token_end))
        }
    }

    /// Combined `modifier_flags` of a modifier list.
    pub(crate) fn modifier_flags_of_list(&self, modifiers: &Option<NodeList>) -> u32 {
        modifiers.as_ref().map_or(0, |list| {
            list.iter()
                .filter_map(|m| self.arena.get(m))
                .fold(0, |acc, node| acc | modifier_flags::from_modifier_kind(node.kind))
        })
    }

    /// Record modifier flags on a declaration; ambient context adds `AMBIENT`.
    pub(crate) fn apply_modifier_flags(&mut self, node: NodeIndex, modifiers: &Option<NodeList>) {
        let mut flags = self.modifier_flags_of_list(modifiers);
        if self.in_context(CONTEXT_FLAG_AMBIENT) {
            flags |= modifier_flags::AMBIENT;
        }
        self.arena.set_modifier_flags(node, flags);
    }

    // =========================================================================
    // Opaque expressions
    // =========================================================================

    fn at_expression_terminator(&self, consumed_any: bool) -> bool {
        matches!(
            self.token(),
            SyntaxKind::CommaToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EndOfFileToken
        ) || (consumed_any && self.has_preceding_line_break())
    }

    /// Skip a value expression, keeping only its span.
    ///
    /// Stops at depth 0 on `, ; ) ] }`, end of file, or a line break.
    pub(crate) fn parse_unparsed_expression(&mut self) -> NodeIndex {
        #[derive(PartialEq)]
        enum Open {
            Group,
            Template,
        }

        let start = self.token_pos();
        let mut stack: Vec<Open> = Vec::new();
        let mut consumed_any = false;
        loop {
            if stack.is_empty() && self.at_expression_terminator(consumed_any) {
                break;
            }
            match self.token() {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::OpenBraceToken => stack.push(Open::Group),
                SyntaxKind::TemplateHead => stack.push(Open::Template),
                SyntaxKind::CloseBraceToken if stack.last() == Some(&Open::Template) => {
                    if self.scanner.re_scan_template_token() == SyntaxKind::TemplateTail {
                        stack.pop();
                    }
                    self.current_token = self.scanner.get_token();
                }
                SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken => {
                    stack.pop();
                }
                _ => {}
            }
            consumed_any = true;
            self.next_token();
        }
        let end = if consumed_any {
            self.prev_token_end
        } else {
            start
        };
        self.arena.add_token(UNPARSED_EXPRESSION, start, end)
    }

    /// An entity name when the expression is exactly `a.b.c`, otherwise an
    /// opaque expression.
    pub(crate) fn parse_expression_or_entity_name(&mut self) -> NodeIndex {
        let is_entity = self.look_ahead(|p| {
            if !token_is_identifier(p.token()) {
                return false;
            }
            p.next_token();
            while p.is_token(SyntaxKind::DotToken) {
                p.next_token();
                if !token_is_identifier_or_keyword(p.token()) {
                    return false;
                }
                p.next_token();
            }
            p.at_expression_terminator(true)
        });
        if is_entity {
            self.parse_entity_name()
        } else {
            self.parse_unparsed_expression()
        }
    }
}
