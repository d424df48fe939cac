//! Parser state - type parsing methods
use super::base::{NodeIndex, NodeList};
use super::flags::{modifier_flags, node_flags};
use super::node::{
    BindingElementData, BindingPatternData, CompositeTypeData, ConditionalTypeData,
    FunctionTypeData, ImportTypeData, IndexedAccessTypeData, MappedTypeData,
    NamedTupleMemberData, ParameterData, QualifiedNameData, TemplateLiteralTypeData,
    TemplateSpanData, TypeLiteralData, TypeOperatorData, TypeParameterData, TypePredicateData,
    TypeQueryData, TypeRefData, WrappedData,
};
use super::state::{CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, ParserState};
use super::syntax_kind_ext::*;
use dtsz_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use dtsz_scanner::{
    SyntaxKind, token_is_identifier, token_is_identifier_or_keyword, token_is_type_keyword,
};

impl ParserState {
    // =========================================================================
    // Types
    // =========================================================================

    pub(crate) fn parse_type(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return self.create_missing_type();
        }
        let result = self.parse_type_worker();
        self.exit_recursion();
        result
    }

    fn parse_type_worker(&mut self) -> NodeIndex {
        if self.is_start_of_function_or_constructor_type() {
            return self.parse_function_or_constructor_type();
        }
        let start = self.token_pos();
        let check_type = self.parse_union_type_or_higher();
        if !self.in_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES)
            && !self.has_preceding_line_break()
            && self.parse_optional(SyntaxKind::ExtendsKeyword)
        {
            let extends_type = self.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, true, |p| {
                p.parse_type()
            });
            self.parse_expected(SyntaxKind::QuestionToken);
            let true_type =
                self.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, false, |p| {
                    p.parse_type()
                });
            self.parse_expected(SyntaxKind::ColonToken);
            let false_type =
                self.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, false, |p| {
                    p.parse_type()
                });
            return self.arena.add_conditional_type(
                CONDITIONAL_TYPE,
                start,
                self.prev_token_end,
                ConditionalTypeData {
                    check_type,
                    extends_type,
                    true_type,
                    false_type,
                },
            );
        }
        check_type
    }

    fn create_missing_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let index = self.arena.add_token(SyntaxKind::Unknown as u16, pos, pos);
        self.arena.set_node_flags(index, node_flags::MISSING);
        index
    }

    /// `: Type` when present.
    pub(crate) fn parse_type_annotation(&mut self) -> NodeIndex {
        if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        }
    }

    /// Return type position: also accepts `x is T`, `asserts x` and
    /// `asserts x is T`.
    pub(crate) fn parse_return_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let is_asserts = self.is_token(SyntaxKind::AssertsKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                !p.has_preceding_line_break()
                    && (token_is_identifier(p.token()) || p.is_token(SyntaxKind::ThisKeyword))
            });
        if is_asserts {
            self.next_token();
            let parameter_name = self.parse_predicate_parameter_name();
            let type_node = if self.parse_optional(SyntaxKind::IsKeyword) {
                self.parse_type()
            } else {
                NodeIndex::NONE
            };
            return self.arena.add_type_predicate(
                TYPE_PREDICATE,
                start,
                self.prev_token_end,
                TypePredicateData {
                    asserts_modifier: true,
                    parameter_name,
                    type_node,
                },
            );
        }
        let is_predicate = (token_is_identifier(self.token())
            || self.is_token(SyntaxKind::ThisKeyword))
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::IsKeyword) && !p.has_preceding_line_break()
            });
        if is_predicate {
            let parameter_name = self.parse_predicate_parameter_name();
            self.next_token();
            let type_node = self.parse_type();
            return self.arena.add_type_predicate(
                TYPE_PREDICATE,
                start,
                self.prev_token_end,
                TypePredicateData {
                    asserts_modifier: false,
                    parameter_name,
                    type_node,
                },
            );
        }
        self.parse_type()
    }

    fn parse_predicate_parameter_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::ThisKeyword) {
            let pos = self.token_pos();
            let end = self.token_end();
            self.next_token();
            self.arena.add_token(THIS_TYPE, pos, end)
        } else {
            self.parse_identifier()
        }
    }

    fn is_start_of_function_or_constructor_type(&mut self) -> bool {
        match self.token() {
            SyntaxKind::LessThanToken | SyntaxKind::NewKeyword => true,
            SyntaxKind::OpenParenToken => {
                self.look_ahead(|p| p.is_unambiguously_start_of_function_type())
            }
            SyntaxKind::AbstractKeyword => self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::NewKeyword)
            }),
            _ => false,
        }
    }

    fn is_unambiguously_start_of_function_type(&mut self) -> bool {
        self.next_token();
        if matches!(
            self.token(),
            SyntaxKind::CloseParenToken | SyntaxKind::DotDotDotToken
        ) {
            return true;
        }
        if self.skip_parameter_start() {
            if matches!(
                self.token(),
                SyntaxKind::ColonToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::QuestionToken
                    | SyntaxKind::EqualsToken
            ) {
                return true;
            }
            if self.is_token(SyntaxKind::CloseParenToken) {
                self.next_token();
                return self.is_token(SyntaxKind::EqualsGreaterThanToken);
            }
        }
        false
    }

    fn skip_parameter_start(&mut self) -> bool {
        while modifier_flags::from_modifier_kind(self.token() as u16) != 0
            && self.look_ahead(|p| {
                p.next_token();
                token_is_identifier(p.token())
            })
        {
            self.next_token();
        }
        if token_is_identifier(self.token()) || self.is_token(SyntaxKind::ThisKeyword) {
            self.next_token();
            return true;
        }
        if matches!(
            self.token(),
            SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken
        ) {
            let before = self.diagnostics.len();
            self.skip_balanced();
            return self.diagnostics.len() == before;
        }
        false
    }

    /// Skip a bracketed group starting at the current opener.
    fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.token() {
                SyntaxKind::OpenBracketToken
                | SyntaxKind::OpenBraceToken
                | SyntaxKind::OpenParenToken => depth += 1,
                SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::CloseParenToken => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.next_token();
                        return;
                    }
                }
                SyntaxKind::EndOfFileToken => return,
                _ => {}
            }
            self.next_token();
        }
    }

    fn parse_function_or_constructor_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let modifiers = self.parse_modifiers();
        let kind = if self.parse_optional(SyntaxKind::NewKeyword) {
            CONSTRUCTOR_TYPE
        } else {
            FUNCTION_TYPE
        };
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters();
        self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
        let type_annotation = self.parse_return_type();
        let index = self.arena.add_function_type(
            kind,
            start,
            self.prev_token_end,
            FunctionTypeData {
                modifiers: modifiers.clone(),
                type_parameters,
                parameters,
                type_annotation,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    fn parse_union_type_or_higher(&mut self) -> NodeIndex {
        self.parse_composite_type(
            SyntaxKind::BarToken,
            UNION_TYPE,
            Self::parse_intersection_type_or_higher,
        )
    }

    fn parse_intersection_type_or_higher(&mut self) -> NodeIndex {
        self.parse_composite_type(
            SyntaxKind::AmpersandToken,
            INTERSECTION_TYPE,
            Self::parse_type_operator_or_higher,
        )
    }

    fn parse_composite_type(
        &mut self,
        operator: SyntaxKind,
        kind: u16,
        parse_constituent: fn(&mut Self) -> NodeIndex,
    ) -> NodeIndex {
        let start = self.token_pos();
        let has_leading_operator = self.parse_optional(operator);
        let first = if has_leading_operator && self.is_start_of_function_or_constructor_type() {
            self.parse_function_or_constructor_type()
        } else {
            parse_constituent(self)
        };
        if !self.is_token(operator) && !has_leading_operator {
            return first;
        }
        let mut types = vec![first];
        while self.parse_optional(operator) {
            if self.is_start_of_function_or_constructor_type() {
                types.push(self.parse_function_or_constructor_type());
            } else {
                types.push(parse_constituent(self));
            }
        }
        if types.len() == 1 {
            return first;
        }
        let end = self.prev_token_end;
        self.arena.add_composite_type(
            kind,
            start,
            end,
            CompositeTypeData {
                types: NodeList::new(types, start, end),
            },
        )
    }

    fn parse_type_operator_or_higher(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::KeyOfKeyword | SyntaxKind::UniqueKeyword | SyntaxKind::ReadonlyKeyword => {
                let operator = self.token() as u16;
                self.next_token();
                let type_node = self.parse_type_operator_or_higher();
                self.arena.add_type_operator(
                    TYPE_OPERATOR,
                    start,
                    self.prev_token_end,
                    TypeOperatorData {
                        operator,
                        type_node,
                    },
                )
            }
            SyntaxKind::InferKeyword => self.parse_infer_type(),
            // Primary types re-allow conditionals: `T extends (A extends B ? 1 : 0) ? X : Y`
            _ => self.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, false, |p| {
                p.parse_postfix_type_or_higher()
            }),
        }
    }

    fn parse_infer_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let name_start = self.token_pos();
        let name = self.parse_identifier();
        let constraint = self
            .try_parse(|p| p.try_parse_constraint_of_infer_type())
            .unwrap_or(NodeIndex::NONE);
        let type_parameter = self.arena.add_type_parameter(
            TYPE_PARAMETER,
            name_start,
            self.prev_token_end,
            TypeParameterData {
                modifiers: None,
                name,
                constraint,
                default: NodeIndex::NONE,
            },
        );
        self.arena.add_wrapped(
            INFER_TYPE,
            start,
            self.prev_token_end,
            WrappedData {
                inner: type_parameter,
            },
        )
    }

    /// `infer U extends C` keeps the constraint unless this is really the
    /// `extends` of an enclosing conditional type (`infer U extends C ? X : Y`).
    fn try_parse_constraint_of_infer_type(&mut self) -> Option<NodeIndex> {
        if !self.parse_optional(SyntaxKind::ExtendsKeyword) {
            return None;
        }
        let constraint =
            self.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, true, |p| p.parse_type());
        if self.in_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES)
            || !self.is_token(SyntaxKind::QuestionToken)
        {
            Some(constraint)
        } else {
            None
        }
    }

    fn parse_postfix_type_or_higher(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut type_node = self.parse_non_array_type();
        while !self.has_preceding_line_break() && self.is_token(SyntaxKind::OpenBracketToken) {
            self.next_token();
            if self.parse_optional(SyntaxKind::CloseBracketToken) {
                type_node = self.arena.add_wrapped(
                    ARRAY_TYPE,
                    start,
                    self.prev_token_end,
                    WrappedData { inner: type_node },
                );
            } else {
                let index_type = self.parse_type();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                type_node = self.arena.add_indexed_access_type(
                    INDEXED_ACCESS_TYPE,
                    start,
                    self.prev_token_end,
                    IndexedAccessTypeData {
                        object_type: type_node,
                        index_type,
                    },
                );
            }
        }
        type_node
    }

    fn parse_keyword_type(&mut self) -> NodeIndex {
        let kind = self.token() as u16;
        let pos = self.token_pos();
        let end = self.token_end();
        self.next_token();
        self.arena.add_token(kind, pos, end)
    }

    fn parse_non_array_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            kind if token_is_type_keyword(kind)
                && kind != SyntaxKind::NullKeyword
                && !self.look_ahead(|p| {
                    p.next_token();
                    p.is_token(SyntaxKind::DotToken)
                }) =>
            {
                self.parse_keyword_type()
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword | SyntaxKind::NullKeyword => {
                let inner = self.parse_keyword_type();
                self.wrap_literal_type(start, inner)
            }
            SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral => {
                let inner = self.parse_literal_node();
                self.wrap_literal_type(start, inner)
            }
            SyntaxKind::MinusToken
                if self.look_ahead(|p| {
                    p.next_token();
                    matches!(
                        p.token(),
                        SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral
                    )
                }) =>
            {
                self.next_token();
                let kind = self.token() as u16;
                let end = self.token_end();
                let text = format!("-{}", self.scanner.get_token_value_ref());
                self.next_token();
                let inner = self.arena.add_literal(kind, start, end, text);
                self.wrap_literal_type(start, inner)
            }
            SyntaxKind::TemplateHead => self.parse_template_literal_type(),
            SyntaxKind::ThisKeyword => {
                let end = self.token_end();
                self.next_token();
                self.arena.add_token(THIS_TYPE, start, end)
            }
            SyntaxKind::TypeOfKeyword => {
                if self.look_ahead(|p| {
                    p.next_token();
                    p.is_token(SyntaxKind::ImportKeyword)
                }) {
                    self.next_token();
                    self.parse_import_type(start, true)
                } else {
                    self.parse_type_query()
                }
            }
            SyntaxKind::ImportKeyword => self.parse_import_type(start, false),
            SyntaxKind::OpenBraceToken => {
                if self.look_ahead(|p| p.is_start_of_mapped_type()) {
                    self.parse_mapped_type()
                } else {
                    self.parse_type_literal()
                }
            }
            SyntaxKind::OpenBracketToken => self.parse_tuple_type(),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_type();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.arena.add_wrapped(
                    PARENTHESIZED_TYPE,
                    start,
                    self.prev_token_end,
                    WrappedData { inner },
                )
            }
            kind if token_is_identifier_or_keyword(kind) => self.parse_type_reference(),
            _ => {
                self.error_at_current_token(
                    diagnostic_messages::TYPE_EXPECTED,
                    diagnostic_codes::TYPE_EXPECTED,
                );
                self.create_missing_type()
            }
        }
    }

    fn wrap_literal_type(&mut self, start: u32, inner: NodeIndex) -> NodeIndex {
        self.arena.add_wrapped(
            LITERAL_TYPE,
            start,
            self.prev_token_end,
            WrappedData { inner },
        )
    }

    /// `<T, U>` in type position; requires the `<` on the same line.
    fn parse_type_arguments_of_type_reference(&mut self) -> Option<NodeList> {
        if !self.has_preceding_line_break() && self.is_token(SyntaxKind::LessThanToken) {
            self.parse_type_arguments()
        } else {
            None
        }
    }

    pub(crate) fn parse_type_arguments(&mut self) -> Option<NodeList> {
        if !self.is_token(SyntaxKind::LessThanToken) {
            return None;
        }
        let start = self.token_pos();
        self.next_token();
        let mut types = Vec::new();
        while !self.is_token(SyntaxKind::GreaterThanToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            types.push(self.parse_type());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        Some(NodeList::new(types, start, self.prev_token_end))
    }

    fn parse_type_reference(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let type_name = self.parse_type_reference_name();
        let type_arguments = self.parse_type_arguments_of_type_reference();
        self.arena.add_type_ref(
            TYPE_REFERENCE,
            start,
            self.prev_token_end,
            TypeRefData {
                type_name,
                type_arguments,
            },
        )
    }

    /// Entity name in type position; the first segment may be any keyword
    /// that is not a primitive type (e.g. `intrinsic`, `global`).
    fn parse_type_reference_name(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut entity = self.parse_identifier_name();
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

    fn parse_type_query(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let expr_name = self.parse_entity_name();
        let type_arguments = self.parse_type_arguments_of_type_reference();
        self.arena.add_type_query(
            TYPE_QUERY,
            start,
            self.prev_token_end,
            TypeQueryData {
                expr_name,
                type_arguments,
            },
        )
    }

    /// `import("m")`, `import("m").A.B<T>`; `typeof` has already been consumed.
    fn parse_import_type(&mut self, start: u32, is_typeof: bool) -> NodeIndex {
        self.parse_expected(SyntaxKind::ImportKeyword);
        self.parse_expected(SyntaxKind::OpenParenToken);
        let argument = self.parse_type();
        if self.parse_optional(SyntaxKind::CommaToken) && !self.is_token(SyntaxKind::CloseParenToken)
        {
            // Import attributes (`{ with: { ... } }`) do not affect naming.
            self.parse_unparsed_expression();
            self.parse_optional(SyntaxKind::CommaToken);
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        let qualifier = if self.parse_optional(SyntaxKind::DotToken) {
            self.parse_type_reference_name()
        } else {
            NodeIndex::NONE
        };
        let type_arguments = self.parse_type_arguments_of_type_reference();
        self.arena.add_import_type(
            IMPORT_TYPE,
            start,
            self.prev_token_end,
            ImportTypeData {
                is_typeof,
                argument,
                qualifier,
                type_arguments,
            },
        )
    }

    fn is_start_of_mapped_type(&mut self) -> bool {
        self.next_token();
        if matches!(self.token(), SyntaxKind::PlusToken | SyntaxKind::MinusToken) {
            return self.next_token() == SyntaxKind::ReadonlyKeyword;
        }
        if self.is_token(SyntaxKind::ReadonlyKeyword) {
            self.next_token();
        }
        self.is_token(SyntaxKind::OpenBracketToken)
            && token_is_identifier(self.next_token())
            && self.next_token() == SyntaxKind::InKeyword
    }

    /// `readonly`, `+readonly`, `?`, `-?` ... as a single token node.
    fn parse_mapped_modifier_token(&mut self, target: SyntaxKind) -> NodeIndex {
        let start = self.token_pos();
        let prefix = self.token();
        let has_prefix = matches!(prefix, SyntaxKind::PlusToken | SyntaxKind::MinusToken)
            && self.look_ahead(|p| p.next_token() == target);
        if has_prefix {
            self.next_token();
        }
        if !self.is_token(target) {
            return NodeIndex::NONE;
        }
        let end = self.token_end();
        self.next_token();
        let kind = if has_prefix { prefix } else { target };
        self.arena.add_token(kind as u16, start, end)
    }

    fn parse_mapped_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let readonly_token = self.parse_mapped_modifier_token(SyntaxKind::ReadonlyKeyword);
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let param_start = self.token_pos();
        let name = self.parse_identifier();
        self.parse_expected(SyntaxKind::InKeyword);
        let constraint = self.parse_type();
        let type_parameter = self.arena.add_type_parameter(
            TYPE_PARAMETER,
            param_start,
            self.prev_token_end,
            TypeParameterData {
                modifiers: None,
                name,
                constraint,
                default: NodeIndex::NONE,
            },
        );
        let name_type = if self.parse_optional(SyntaxKind::AsKeyword) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let question_token = self.parse_mapped_modifier_token(SyntaxKind::QuestionToken);
        let type_node = self.parse_type_annotation();
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_mapped_type(
            MAPPED_TYPE,
            start,
            self.prev_token_end,
            MappedTypeData {
                readonly_token,
                type_parameter,
                name_type,
                question_token,
                type_node,
            },
        )
    }

    fn parse_type_literal(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let members = self.parse_object_type_members();
        self.arena.add_type_literal(
            TYPE_LITERAL,
            start,
            self.prev_token_end,
            TypeLiteralData { members },
        )
    }

    /// `{ member; member }` shared by type literals and interfaces.
    pub(crate) fn parse_object_type_members(&mut self) -> NodeList {
        let start = self.token_pos();
        let mut members = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                let before = self.token_pos();
                if let Some(member) = self.parse_type_member() {
                    members.push(member);
                }
                // Members are separated by `;`, `,` or a line break.
                if !self.parse_optional(SyntaxKind::SemicolonToken) {
                    self.parse_optional(SyntaxKind::CommaToken);
                }
                if self.token_pos() == before {
                    self.next_token();
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        NodeList::new(members, start, self.prev_token_end)
    }

    fn parse_tuple_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            elements.push(self.parse_tuple_element());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let end = self.prev_token_end;
        self.arena.add_composite_type(
            TUPLE_TYPE,
            start,
            end,
            CompositeTypeData {
                types: NodeList::new(elements, start, end),
            },
        )
    }

    fn is_named_tuple_member_start(&mut self) -> bool {
        self.look_ahead(|p| {
            p.parse_optional(SyntaxKind::DotDotDotToken);
            if !token_is_identifier_or_keyword(p.token()) {
                return false;
            }
            p.next_token();
            p.parse_optional(SyntaxKind::QuestionToken);
            p.is_token(SyntaxKind::ColonToken)
        })
    }

    fn parse_tuple_element(&mut self) -> NodeIndex {
        let start = self.token_pos();
        if self.is_named_tuple_member_start() {
            let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
            let name = self.parse_identifier_name();
            let question_token = self.parse_optional(SyntaxKind::QuestionToken);
            self.parse_expected(SyntaxKind::ColonToken);
            let type_node = self.parse_type();
            return self.arena.add_named_tuple_member(
                NAMED_TUPLE_MEMBER,
                start,
                self.prev_token_end,
                NamedTupleMemberData {
                    dot_dot_dot_token,
                    name,
                    question_token,
                    type_node,
                },
            );
        }
        if self.parse_optional(SyntaxKind::DotDotDotToken) {
            let inner = self.parse_type();
            return self.arena.add_wrapped(
                REST_TYPE,
                start,
                self.prev_token_end,
                WrappedData { inner },
            );
        }
        let inner = self.parse_type();
        if self.parse_optional(SyntaxKind::QuestionToken) {
            return self.arena.add_wrapped(
                OPTIONAL_TYPE,
                start,
                self.prev_token_end,
                WrappedData { inner },
            );
        }
        inner
    }

    fn parse_template_literal_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let head = self.parse_literal_node();
        let spans_start = self.token_pos();
        let mut spans = Vec::new();
        loop {
            let span_start = self.token_pos();
            let type_node = self.parse_type();
            if !self.is_token(SyntaxKind::CloseBraceToken) {
                self.parse_expected(SyntaxKind::CloseBraceToken);
                break;
            }
            self.current_token = self.scanner.re_scan_template_token();
            let is_tail = !self.is_token(SyntaxKind::TemplateMiddle);
            let literal = self.parse_literal_node();
            spans.push(self.arena.add_template_span(
                TEMPLATE_LITERAL_TYPE_SPAN,
                span_start,
                self.prev_token_end,
                TemplateSpanData { type_node, literal },
            ));
            if is_tail {
                break;
            }
        }
        let end = self.prev_token_end;
        self.arena.add_template_literal_type(
            TEMPLATE_LITERAL_TYPE,
            start,
            end,
            TemplateLiteralTypeData {
                head,
                template_spans: NodeList::new(spans, spans_start, end),
            },
        )
    }

    // =========================================================================
    // Type parameters and parameters
    // =========================================================================

    pub(crate) fn parse_type_parameters(&mut self) -> Option<NodeList> {
        if !self.is_token(SyntaxKind::LessThanToken) {
            return None;
        }
        let start = self.token_pos();
        self.next_token();
        let mut params = Vec::new();
        while !self.is_token(SyntaxKind::GreaterThanToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            params.push(self.parse_type_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        Some(NodeList::new(params, start, self.prev_token_end))
    }

    fn parse_type_parameter(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut modifier_nodes = Vec::new();
        while matches!(
            self.token(),
            SyntaxKind::ConstKeyword | SyntaxKind::InKeyword | SyntaxKind::OutKeyword
        ) && self.look_ahead(|p| {
            p.next_token();
            token_is_identifier(p.token())
        }) {
            let kind = self.token() as u16;
            let pos = self.token_pos();
            let end = self.token_end();
            self.next_token();
            modifier_nodes.push(self.arena.add_token(kind, pos, end));
        }
        let modifiers = if modifier_nodes.is_empty() {
            None
        } else {
            Some(NodeList::new(modifier_nodes, start, self.prev_token_end))
        };
        let name = self.parse_identifier();
        let constraint = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        let default = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        let index = self.arena.add_type_parameter(
            TYPE_PARAMETER,
            start,
            self.prev_token_end,
            TypeParameterData {
                modifiers: modifiers.clone(),
                name,
                constraint,
                default,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    /// `( param, param )`
    pub(crate) fn parse_parameters(&mut self) -> NodeList {
        let start = self.token_pos();
        let mut params = Vec::new();
        if self.parse_expected(SyntaxKind::OpenParenToken) {
            while !self.is_token(SyntaxKind::CloseParenToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                params.push(self.parse_parameter());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseParenToken);
        }
        NodeList::new(params, start, self.prev_token_end)
    }

    fn parse_parameter(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let modifiers = self.parse_modifiers();
        let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
        let name = self.parse_binding_name();
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);
        let type_annotation = self.parse_type_annotation();
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_unparsed_expression()
        } else {
            NodeIndex::NONE
        };
        let index = self.arena.add_parameter(
            PARAMETER,
            start,
            self.prev_token_end,
            ParameterData {
                modifiers: modifiers.clone(),
                dot_dot_dot_token,
                name,
                question_token,
                type_annotation,
                initializer,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    /// Identifier, `this` or a destructuring pattern.
    pub(crate) fn parse_binding_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken => {
                self.parse_binding_pattern()
            }
            SyntaxKind::ThisKeyword => {
                let pos = self.token_pos();
                let end = self.token_end();
                self.next_token();
                self.arena.add_identifier(
                    SyntaxKind::Identifier as u16,
                    pos,
                    end,
                    "this".to_string(),
                )
            }
            _ => self.parse_identifier(),
        }
    }

    fn parse_binding_pattern(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let is_object = self.is_token(SyntaxKind::OpenBraceToken);
        let close = if is_object {
            SyntaxKind::CloseBraceToken
        } else {
            SyntaxKind::CloseBracketToken
        };
        self.next_token();
        let list_start = self.token_pos();
        let mut elements = Vec::new();
        while !self.is_token(close) && !self.is_token(SyntaxKind::EndOfFileToken) {
            if !is_object && self.is_token(SyntaxKind::CommaToken) {
                // Array holes
                self.next_token();
                continue;
            }
            elements.push(self.parse_binding_element(is_object));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        let list_end = self.token_pos();
        self.parse_expected(close);
        self.arena.add_binding_pattern(
            if is_object {
                OBJECT_BINDING_PATTERN
            } else {
                ARRAY_BINDING_PATTERN
            },
            start,
            self.prev_token_end,
            BindingPatternData {
                elements: NodeList::new(elements, list_start, list_end),
            },
        )
    }

    fn parse_binding_element(&mut self, is_object: bool) -> NodeIndex {
        let start = self.token_pos();
        let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
        let mut property_name = NodeIndex::NONE;
        let name = if is_object
            && !dot_dot_dot_token
            && self.look_ahead(|p| {
                p.parse_property_name_token_only();
                p.is_token(SyntaxKind::ColonToken)
            }) {
            property_name = self.parse_property_name();
            self.parse_expected(SyntaxKind::ColonToken);
            self.parse_binding_name()
        } else {
            self.parse_binding_name()
        };
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_unparsed_expression()
        } else {
            NodeIndex::NONE
        };
        self.arena.add_binding_element(
            BINDING_ELEMENT,
            start,
            self.prev_token_end,
            BindingElementData {
                dot_dot_dot_token,
                property_name,
                name,
                initializer,
            },
        )
    }

    /// Advance past a property name without creating nodes (look-ahead only).
    pub(crate) fn parse_property_name_token_only(&mut self) {
        if self.is_token(SyntaxKind::OpenBracketToken) {
            self.skip_balanced();
        } else {
            self.next_token();
        }
    }
}
