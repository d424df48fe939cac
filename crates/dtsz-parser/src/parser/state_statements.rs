//! Parser state - statement and declaration parsing methods
use super::base::{NodeIndex, NodeList};
use super::flags::{modifier_flags, node_flags};
use super::node::{
    ClassData, EnumData, EnumMemberData, ExportAssignmentData, ExportDeclData,
    ExprWithTypeArgsData, FunctionData, HeritageData, ImportClauseData, ImportDeclData,
    ImportEqualsData, InterfaceData, ParameterData, ModuleBlockData, ModuleData, NamedImportsData,
    SignatureData, SourceFileData, SpecifierData, TypeAliasData, VariableData,
    VariableDeclarationData, WrappedData,
};
use super::state::{CONTEXT_FLAG_AMBIENT, ParserState};
use super::syntax_kind_ext::*;
use dtsz_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use dtsz_scanner::{SyntaxKind, token_is_identifier, token_is_identifier_or_keyword};
use tracing::{Level, debug, span};

/// Declaration file extensions; their top level is an ambient context.
const DECLARATION_FILE_SUFFIXES: &[&str] = &[".d.ts", ".d.mts", ".d.cts"];

impl ParserState {
    // =========================================================================
    // Source file
    // =========================================================================

    /// Parse the whole file and return the `SOURCE_FILE` node, which is always
    /// the last node in the arena.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        let _span = span!(Level::DEBUG, "parse_source_file", file = %self.file_name).entered();
        let is_declaration_file = DECLARATION_FILE_SUFFIXES
            .iter()
            .any(|suffix| self.file_name.ends_with(suffix));

        self.next_token();
        let statements = self.with_context(CONTEXT_FLAG_AMBIENT, is_declaration_file, |p| {
            p.parse_statement_list(false)
        });
        self.take_scanner_diagnostics();

        let text = self.scanner.get_text_arc();
        let end = text.len() as u32;
        let root = self.arena.add_source_file(
            SOURCE_FILE,
            0,
            end,
            SourceFileData {
                statements,
                file_name: self.file_name.clone(),
                text,
                is_declaration_file,
            },
        );
        debug!(
            nodes = self.arena.len(),
            diagnostics = self.diagnostics.len(),
            "parsed source file"
        );
        root
    }

    /// Statements until EOF, or until `}` when parsing a block.
    fn parse_statement_list(&mut self, in_block: bool) -> NodeList {
        let start = self.token_pos();
        let mut statements = Vec::new();
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CloseBraceToken if in_block => break,
                _ => {}
            }
            let before = self.token_pos();
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            if self.token_pos() == before && !self.is_token(SyntaxKind::EndOfFileToken) {
                self.next_token();
            }
        }
        NodeList::new(statements, start, self.prev_token_end)
    }

    fn parse_statement(&mut self) -> Option<NodeIndex> {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::SemicolonToken => {
                let end = self.token_end();
                self.next_token();
                return Some(self.arena.add_token(EMPTY_STATEMENT, start, end));
            }
            SyntaxKind::ImportKeyword
                if !self.look_ahead(|p| {
                    matches!(
                        p.next_token(),
                        SyntaxKind::OpenParenToken | SyntaxKind::DotToken
                    )
                }) =>
            {
                return Some(self.parse_import_declaration_or_import_equals(start, None));
            }
            SyntaxKind::ExportKeyword if self.look_ahead(|p| p.is_export_statement_start()) => {
                return Some(self.parse_export_statement(start));
            }
            _ => {}
        }

        let modifiers = self.parse_modifiers();
        if let Some(declaration) = self.parse_declaration_after_modifiers(start, modifiers) {
            return Some(declaration);
        }
        self.parse_error_at(
            start,
            self.token_end().saturating_sub(start),
            diagnostic_messages::DECLARATION_OR_STATEMENT_EXPECTED,
            diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
        );
        self.skip_to_next_statement();
        None
    }

    /// Error recovery: skip to a token that starts a new line (or `;`/`}`).
    fn skip_to_next_statement(&mut self) {
        let start = self.token_pos();
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken => return,
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    return;
                }
                _ => {}
            }
            if self.token_pos() != start && self.has_preceding_line_break() {
                return;
            }
            self.next_token();
        }
    }

    fn parse_declaration_after_modifiers(
        &mut self,
        start: u32,
        modifiers: Option<NodeList>,
    ) -> Option<NodeIndex> {
        let declaration = match self.token() {
            SyntaxKind::InterfaceKeyword => self.parse_interface_declaration(start, modifiers),
            SyntaxKind::TypeKeyword if self.next_token_is_identifier_on_same_line() => {
                self.parse_type_alias_declaration(start, modifiers)
            }
            SyntaxKind::ClassKeyword => self.parse_class_declaration(start, modifiers),
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(start, modifiers),
            SyntaxKind::EnumKeyword => self.parse_enum_declaration(start, modifiers),
            SyntaxKind::VarKeyword | SyntaxKind::ConstKeyword => {
                self.parse_variable_statement(start, modifiers)
            }
            SyntaxKind::LetKeyword
                if self.look_ahead(|p| {
                    let next = p.next_token();
                    token_is_identifier(next)
                        || matches!(
                            next,
                            SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken
                        )
                }) =>
            {
                self.parse_variable_statement(start, modifiers)
            }
            SyntaxKind::NamespaceKeyword | SyntaxKind::ModuleKeyword
                if self.look_ahead(|p| {
                    let next = p.next_token();
                    !p.has_preceding_line_break()
                        && (token_is_identifier(next) || next == SyntaxKind::StringLiteral)
                }) =>
            {
                self.parse_module_declaration(start, modifiers)
            }
            SyntaxKind::GlobalKeyword
                if self.look_ahead(|p| p.next_token() == SyntaxKind::OpenBraceToken) =>
            {
                self.parse_module_declaration(start, modifiers)
            }
            SyntaxKind::ImportKeyword => {
                self.parse_import_declaration_or_import_equals(start, modifiers)
            }
            _ => return None,
        };
        Some(declaration)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_interface_declaration(
        &mut self,
        start: u32,
        modifiers: Option<NodeList>,
    ) -> NodeIndex {
        self.parse_expected(SyntaxKind::InterfaceKeyword);
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        let heritage_clauses = self.parse_heritage_clauses();
        let members = self.parse_object_type_members();
        let index = self.arena.add_interface(
            INTERFACE_DECLARATION,
            start,
            self.prev_token_end,
            InterfaceData {
                modifiers: modifiers.clone(),
                name,
                type_parameters,
                heritage_clauses,
                members,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    fn parse_type_alias_declaration(
        &mut self,
        start: u32,
        modifiers: Option<NodeList>,
    ) -> NodeIndex {
        self.parse_expected(SyntaxKind::TypeKeyword);
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        self.parse_expected(SyntaxKind::EqualsToken);
        let type_node = self.parse_type();
        self.parse_semicolon();
        let index = self.arena.add_type_alias(
            TYPE_ALIAS_DECLARATION,
            start,
            self.prev_token_end,
            TypeAliasData {
                modifiers: modifiers.clone(),
                name,
                type_parameters,
                type_node,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    fn parse_class_declaration(&mut self, start: u32, modifiers: Option<NodeList>) -> NodeIndex {
        self.parse_expected(SyntaxKind::ClassKeyword);
        let name = if token_is_identifier(self.token())
            && !matches!(
                self.token(),
                SyntaxKind::ImplementsKeyword | SyntaxKind::ExtendsKeyword
            ) {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let type_parameters = self.parse_type_parameters();
        let heritage_clauses = self.parse_heritage_clauses();
        let members = self.parse_class_members();
        let index = self.arena.add_class(
            CLASS_DECLARATION,
            start,
            self.prev_token_end,
            ClassData {
                modifiers: modifiers.clone(),
                name,
                type_parameters,
                heritage_clauses,
                members,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    fn parse_heritage_clauses(&mut self) -> Option<NodeList> {
        let start = self.token_pos();
        let mut clauses = Vec::new();
        while matches!(
            self.token(),
            SyntaxKind::ExtendsKeyword | SyntaxKind::ImplementsKeyword
        ) {
            let clause_start = self.token_pos();
            let token = self.token() as u16;
            self.next_token();
            let types_start = self.token_pos();
            let mut types = Vec::new();
            loop {
                let type_start = self.token_pos();
                let expression = self.parse_entity_name();
                let type_arguments = self.parse_type_arguments();
                types.push(self.arena.add_expr_with_type_args(
                    EXPRESSION_WITH_TYPE_ARGUMENTS,
                    type_start,
                    self.prev_token_end,
                    ExprWithTypeArgsData {
                        expression,
                        type_arguments,
                    },
                ));
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            let types = NodeList::new(types, types_start, self.prev_token_end);
            clauses.push(self.arena.add_heritage_clause(
                HERITAGE_CLAUSE,
                clause_start,
                self.prev_token_end,
                HeritageData { token, types },
            ));
        }
        if clauses.is_empty() {
            None
        } else {
            Some(NodeList::new(clauses, start, self.prev_token_end))
        }
    }

    fn parse_function_declaration(
        &mut self,
        start: u32,
        modifiers: Option<NodeList>,
    ) -> NodeIndex {
        self.parse_expected(SyntaxKind::FunctionKeyword);
        let asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if token_is_identifier(self.token()) {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters();
        let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_return_type()
        } else {
            NodeIndex::NONE
        };
        let body = self.parse_function_body_or_semicolon();
        let index = self.arena.add_function(
            FUNCTION_DECLARATION,
            start,
            self.prev_token_end,
            FunctionData {
                modifiers: modifiers.clone(),
                asterisk_token,
                name,
                type_parameters,
                parameters,
                type_annotation,
                body,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    /// Bodies are kept as opaque spans.
    fn parse_function_body_or_semicolon(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_unparsed_expression()
        } else {
            self.parse_semicolon();
            NodeIndex::NONE
        }
    }

    fn parse_enum_declaration(&mut self, start: u32, modifiers: Option<NodeList>) -> NodeIndex {
        self.parse_expected(SyntaxKind::EnumKeyword);
        let name = self.parse_identifier();
        let members_start = self.token_pos();
        let mut members = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                let member_start = self.token_pos();
                let member_name = self.parse_property_name();
                let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                    self.parse_unparsed_expression()
                } else {
                    NodeIndex::NONE
                };
                members.push(self.arena.add_enum_member(
                    ENUM_MEMBER,
                    member_start,
                    self.prev_token_end,
                    EnumMemberData {
                        name: member_name,
                        initializer,
                    },
                ));
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        let members = NodeList::new(members, members_start, self.prev_token_end);
        let index = self.arena.add_enum(
            ENUM_DECLARATION,
            start,
            self.prev_token_end,
            EnumData {
                modifiers: modifiers.clone(),
                name,
                members,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    fn parse_variable_statement(&mut self, start: u32, modifiers: Option<NodeList>) -> NodeIndex {
        let flags = match self.token() {
            SyntaxKind::LetKeyword => node_flags::LET,
            SyntaxKind::ConstKeyword => node_flags::CONST,
            _ => node_flags::NONE,
        };
        self.next_token();
        let list_start = self.token_pos();
        let mut declarations = Vec::new();
        loop {
            let decl_start = self.token_pos();
            let name = self.parse_binding_name();
            let exclamation_token = self.parse_optional(SyntaxKind::ExclamationToken);
            let type_annotation = self.parse_type_annotation();
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_unparsed_expression()
            } else {
                NodeIndex::NONE
            };
            let declaration = self.arena.add_variable_declaration(
                VARIABLE_DECLARATION,
                decl_start,
                self.prev_token_end,
                VariableDeclarationData {
                    name,
                    exclamation_token,
                    type_annotation,
                    initializer,
                },
            );
            self.arena.set_node_flags(declaration, flags);
            declarations.push(declaration);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        let declarations = NodeList::new(declarations, list_start, self.prev_token_end);
        self.parse_semicolon();
        let index = self.arena.add_variable(
            VARIABLE_STATEMENT,
            start,
            self.prev_token_end,
            VariableData {
                modifiers: modifiers.clone(),
                declarations,
            },
        );
        self.arena.set_node_flags(index, flags);
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    /// `namespace A.B {}`, `module "m" {}`, `declare module "m";` and
    /// `declare global {}`.
    fn parse_module_declaration(&mut self, start: u32, modifiers: Option<NodeList>) -> NodeIndex {
        let mut flags = node_flags::NONE;
        let name = match self.token() {
            SyntaxKind::GlobalKeyword => {
                flags |= node_flags::GLOBAL_AUGMENTATION;
                self.parse_identifier_name()
            }
            keyword => {
                if keyword == SyntaxKind::NamespaceKeyword {
                    flags |= node_flags::NAMESPACE;
                }
                self.next_token();
                if self.is_token(SyntaxKind::StringLiteral) {
                    self.parse_literal_node()
                } else {
                    self.parse_identifier()
                }
            }
        };
        let is_ambient_module = self
            .arena
            .get(name)
            .is_some_and(|node| node.is_string_literal());
        let has_declare = self.modifier_flags_of_list(&modifiers) & modifier_flags::AMBIENT != 0;
        let ambient = self.in_context(CONTEXT_FLAG_AMBIENT) || has_declare || is_ambient_module;
        let body = self.with_context(CONTEXT_FLAG_AMBIENT, ambient, |p| {
            p.parse_module_body(flags & node_flags::NAMESPACE)
        });
        let index = self.arena.add_module(
            MODULE_DECLARATION,
            start,
            self.prev_token_end,
            ModuleData {
                modifiers: modifiers.clone(),
                name,
                body,
            },
        );
        self.arena.set_node_flags(index, flags);
        let mut module_flags = self.modifier_flags_of_list(&modifiers);
        if ambient {
            module_flags |= modifier_flags::AMBIENT;
        }
        self.arena.set_modifier_flags(index, module_flags);
        index
    }

    /// Body of a module: a block, a nested dotted declaration, or nothing.
    fn parse_module_body(&mut self, namespace_flag: u16) -> NodeIndex {
        if self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            let start = self.token_pos();
            let name = self.parse_identifier();
            let body = self.parse_module_body(namespace_flag);
            let index = self.arena.add_module(
                MODULE_DECLARATION,
                start,
                self.prev_token_end,
                ModuleData {
                    modifiers: None,
                    name,
                    body,
                },
            );
            self.arena
                .set_node_flags(index, node_flags::NESTED_NAMESPACE | namespace_flag);
            self.apply_modifier_flags(index, &None);
            return index;
        }
        if !self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_semicolon();
            return NodeIndex::NONE;
        }
        let start = self.token_pos();
        self.next_token();
        let statements = self.parse_statement_list(true);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_module_block(
            MODULE_BLOCK,
            start,
            self.prev_token_end,
            ModuleBlockData { statements },
        )
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn is_index_signature(&mut self) -> bool {
        self.look_ahead(|p| {
            if !p.is_token(SyntaxKind::OpenBracketToken) {
                return false;
            }
            let next = p.next_token();
            if matches!(
                next,
                SyntaxKind::DotDotDotToken | SyntaxKind::CloseBracketToken
            ) {
                return true;
            }
            if modifier_flags::from_modifier_kind(next as u16) != 0 {
                if token_is_identifier(p.next_token()) {
                    return true;
                }
            } else if !token_is_identifier(next) {
                return false;
            } else {
                p.next_token();
            }
            match p.token() {
                SyntaxKind::ColonToken | SyntaxKind::CommaToken => true,
                SyntaxKind::QuestionToken => matches!(
                    p.next_token(),
                    SyntaxKind::ColonToken
                        | SyntaxKind::CommaToken
                        | SyntaxKind::CloseBracketToken
                ),
                _ => false,
            }
        })
    }

    /// `get x()` / `set x(v)` rather than a member named `get`.
    fn is_accessor_start(&mut self) -> bool {
        matches!(self.token(), SyntaxKind::GetKeyword | SyntaxKind::SetKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                !p.has_preceding_line_break() && p.is_property_name_start()
            })
    }

    fn add_signature(
        &mut self,
        kind: u16,
        start: u32,
        data: SignatureData,
    ) -> NodeIndex {
        let modifiers = data.modifiers.clone();
        let index = self.arena.add_signature(kind, start, self.prev_token_end, data);
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    /// Type parameters, parameters and return type of a signature-like member.
    fn parse_signature_rest(
        &mut self,
        kind: u16,
        start: u32,
        modifiers: Option<NodeList>,
        name: NodeIndex,
        question_token: bool,
    ) -> NodeIndex {
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameters();
        let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_return_type()
        } else {
            NodeIndex::NONE
        };
        let body = if matches!(kind, METHOD_DECLARATION | CONSTRUCTOR | GET_ACCESSOR | SET_ACCESSOR)
            && self.is_token(SyntaxKind::OpenBraceToken)
        {
            self.parse_unparsed_expression()
        } else {
            NodeIndex::NONE
        };
        self.add_signature(
            kind,
            start,
            SignatureData {
                modifiers,
                name,
                question_token,
                type_parameters,
                parameters: Some(parameters),
                type_annotation,
                body,
            },
        )
    }

    fn parse_index_signature(&mut self, start: u32, modifiers: Option<NodeList>) -> NodeIndex {
        let params_start = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let mut params = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let param_start = self.token_pos();
            let param_modifiers = self.parse_modifiers();
            let dot_dot_dot_token = self.parse_optional(SyntaxKind::DotDotDotToken);
            let name = self.parse_identifier();
            let question_token = self.parse_optional(SyntaxKind::QuestionToken);
            let type_annotation = self.parse_type_annotation();
            params.push(self.arena.add_parameter(
                PARAMETER,
                param_start,
                self.prev_token_end,
                ParameterData {
                    modifiers: param_modifiers,
                    dot_dot_dot_token,
                    name,
                    question_token,
                    type_annotation,
                    initializer: NodeIndex::NONE,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let parameters = NodeList::new(params, params_start, self.prev_token_end);
        let type_annotation = self.parse_type_annotation();
        self.add_signature(
            INDEX_SIGNATURE,
            start,
            SignatureData {
                modifiers,
                name: NodeIndex::NONE,
                question_token: false,
                type_parameters: None,
                parameters: Some(parameters),
                type_annotation,
                body: NodeIndex::NONE,
            },
        )
    }

    /// One member of an interface or type literal.
    pub(crate) fn parse_type_member(&mut self) -> Option<NodeIndex> {
        let start = self.token_pos();
        if matches!(
            self.token(),
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
        ) {
            return Some(self.parse_signature_rest(CALL_SIGNATURE, start, None, NodeIndex::NONE, false));
        }
        if self.is_token(SyntaxKind::NewKeyword)
            && self.look_ahead(|p| {
                matches!(
                    p.next_token(),
                    SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
                )
            })
        {
            self.next_token();
            return Some(self.parse_signature_rest(
                CONSTRUCT_SIGNATURE,
                start,
                None,
                NodeIndex::NONE,
                false,
            ));
        }
        let modifiers = self.parse_modifiers();
        if self.is_index_signature() {
            return Some(self.parse_index_signature(start, modifiers));
        }
        if self.is_accessor_start() {
            return Some(self.parse_accessor(start, modifiers));
        }
        if !self.is_property_name_start() {
            self.error_at_current_token(
                diagnostic_messages::IDENTIFIER_EXPECTED,
                diagnostic_codes::IDENTIFIER_EXPECTED,
            );
            return None;
        }
        let name = self.parse_property_name();
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);
        if matches!(
            self.token(),
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
        ) {
            return Some(self.parse_signature_rest(
                METHOD_SIGNATURE,
                start,
                modifiers,
                name,
                question_token,
            ));
        }
        let type_annotation = self.parse_type_annotation();
        Some(self.add_signature(
            PROPERTY_SIGNATURE,
            start,
            SignatureData {
                modifiers,
                name,
                question_token,
                type_parameters: None,
                parameters: None,
                type_annotation,
                body: NodeIndex::NONE,
            },
        ))
    }

    fn parse_accessor(&mut self, start: u32, modifiers: Option<NodeList>) -> NodeIndex {
        let kind = if self.is_token(SyntaxKind::GetKeyword) {
            GET_ACCESSOR
        } else {
            SET_ACCESSOR
        };
        self.next_token();
        let name = self.parse_property_name();
        self.parse_signature_rest(kind, start, modifiers, name, false)
    }

    fn parse_class_members(&mut self) -> NodeList {
        let start = self.token_pos();
        let mut members = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                let before = self.token_pos();
                if let Some(member) = self.parse_class_member() {
                    members.push(member);
                }
                if self.token_pos() == before {
                    self.next_token();
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        NodeList::new(members, start, self.prev_token_end)
    }

    fn parse_class_member(&mut self) -> Option<NodeIndex> {
        let start = self.token_pos();
        if self.is_token(SyntaxKind::SemicolonToken) {
            let end = self.token_end();
            self.next_token();
            return Some(self.arena.add_token(SEMICOLON_CLASS_ELEMENT, start, end));
        }
        let modifiers = self.parse_modifiers();
        if self.is_token(SyntaxKind::ConstructorKeyword)
            && self.look_ahead(|p| p.next_token() == SyntaxKind::OpenParenToken)
        {
            self.next_token();
            let member =
                self.parse_signature_rest(CONSTRUCTOR, start, modifiers, NodeIndex::NONE, false);
            self.parse_member_terminator();
            return Some(member);
        }
        if self.is_index_signature() {
            let member = self.parse_index_signature(start, modifiers);
            self.parse_member_terminator();
            return Some(member);
        }
        if self.is_accessor_start() {
            let member = self.parse_accessor(start, modifiers);
            self.parse_member_terminator();
            return Some(member);
        }
        if !self.is_property_name_start() {
            self.error_at_current_token(
                diagnostic_messages::IDENTIFIER_EXPECTED,
                diagnostic_codes::IDENTIFIER_EXPECTED,
            );
            return None;
        }
        let name = self.parse_property_name();
        let question_token = self.parse_optional(SyntaxKind::QuestionToken);
        self.parse_optional(SyntaxKind::ExclamationToken);
        let member = if matches!(
            self.token(),
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
        ) {
            self.parse_signature_rest(METHOD_DECLARATION, start, modifiers, name, question_token)
        } else {
            let type_annotation = self.parse_type_annotation();
            let body = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_unparsed_expression()
            } else {
                NodeIndex::NONE
            };
            self.add_signature(
                PROPERTY_DECLARATION,
                start,
                SignatureData {
                    modifiers,
                    name,
                    question_token,
                    type_parameters: None,
                    parameters: None,
                    type_annotation,
                    body,
                },
            )
        };
        self.parse_member_terminator();
        Some(member)
    }

    fn parse_member_terminator(&mut self) {
        if !self.parse_optional(SyntaxKind::SemicolonToken) {
            self.parse_optional(SyntaxKind::CommaToken);
        }
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn parse_module_specifier(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            self.parse_literal_node()
        } else {
            self.parse_expected(SyntaxKind::StringLiteral);
            NodeIndex::NONE
        }
    }

    /// `with { type: "json" }` / `assert { ... }` after a module specifier.
    fn skip_import_attributes(&mut self) {
        if matches!(self.token(), SyntaxKind::WithKeyword)
            || (self.is_token(SyntaxKind::Identifier)
                && self.scanner.get_token_value_ref() == "assert"
                && !self.has_preceding_line_break())
        {
            self.next_token();
            self.parse_unparsed_expression();
        }
    }

    fn is_type_only_import_start(&mut self) -> bool {
        self.is_token(SyntaxKind::TypeKeyword)
            && self.look_ahead(|p| {
                let next = p.next_token();
                match next {
                    SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken => true,
                    SyntaxKind::FromKeyword => p.next_token() == SyntaxKind::FromKeyword,
                    _ => token_is_identifier(next),
                }
            })
    }

    fn parse_import_declaration_or_import_equals(
        &mut self,
        start: u32,
        modifiers: Option<NodeList>,
    ) -> NodeIndex {
        self.parse_expected(SyntaxKind::ImportKeyword);
        let is_type_only = self.is_type_only_import_start();
        if is_type_only {
            self.next_token();
        }

        if token_is_identifier(self.token())
            && self.look_ahead(|p| p.next_token() == SyntaxKind::EqualsToken)
        {
            return self.parse_import_equals_rest(start, modifiers, is_type_only);
        }

        let import_clause = if self.is_token(SyntaxKind::StringLiteral) {
            NodeIndex::NONE
        } else {
            let clause = self.parse_import_clause(is_type_only);
            self.parse_expected(SyntaxKind::FromKeyword);
            clause
        };
        let module_specifier = self.parse_module_specifier();
        self.skip_import_attributes();
        self.parse_semicolon();
        let index = self.arena.add_import_decl(
            IMPORT_DECLARATION,
            start,
            self.prev_token_end,
            ImportDeclData {
                modifiers: modifiers.clone(),
                import_clause,
                module_specifier,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    fn parse_import_equals_rest(
        &mut self,
        start: u32,
        modifiers: Option<NodeList>,
        is_type_only: bool,
    ) -> NodeIndex {
        let name = self.parse_identifier();
        self.parse_expected(SyntaxKind::EqualsToken);
        let module_reference = if self.is_token(SyntaxKind::RequireKeyword)
            && self.look_ahead(|p| p.next_token() == SyntaxKind::OpenParenToken)
        {
            let ref_start = self.token_pos();
            self.next_token();
            self.next_token();
            let inner = self.parse_module_specifier();
            self.parse_expected(SyntaxKind::CloseParenToken);
            self.arena.add_wrapped(
                EXTERNAL_MODULE_REFERENCE,
                ref_start,
                self.prev_token_end,
                WrappedData { inner },
            )
        } else {
            self.parse_entity_name()
        };
        self.parse_semicolon();
        let index = self.arena.add_import_equals(
            IMPORT_EQUALS_DECLARATION,
            start,
            self.prev_token_end,
            ImportEqualsData {
                modifiers: modifiers.clone(),
                is_type_only,
                name,
                module_reference,
            },
        );
        self.apply_modifier_flags(index, &modifiers);
        index
    }

    fn parse_import_clause(&mut self, is_type_only: bool) -> NodeIndex {
        let start = self.token_pos();
        let name = if (token_is_identifier(self.token()) && !self.is_token(SyntaxKind::FromKeyword))
            || (self.is_token(SyntaxKind::FromKeyword)
                && self.look_ahead(|p| p.next_token() == SyntaxKind::FromKeyword))
        {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let named_bindings = if name.is_none() || self.parse_optional(SyntaxKind::CommaToken) {
            match self.token() {
                SyntaxKind::AsteriskToken => {
                    let ns_start = self.token_pos();
                    self.next_token();
                    self.parse_expected(SyntaxKind::AsKeyword);
                    let ns_name = self.parse_identifier();
                    self.arena.add_named_imports(
                        NAMESPACE_IMPORT,
                        ns_start,
                        self.prev_token_end,
                        NamedImportsData {
                            name: ns_name,
                            elements: NodeList::default(),
                        },
                    )
                }
                SyntaxKind::OpenBraceToken => {
                    self.parse_named_imports_or_exports(NAMED_IMPORTS, IMPORT_SPECIFIER)
                }
                _ => {
                    if name.is_none() {
                        self.parse_expected(SyntaxKind::OpenBraceToken);
                    }
                    NodeIndex::NONE
                }
            }
        } else {
            NodeIndex::NONE
        };
        self.arena.add_import_clause(
            IMPORT_CLAUSE,
            start,
            self.prev_token_end,
            ImportClauseData {
                is_type_only,
                name,
                named_bindings,
            },
        )
    }

    /// `{ a, b as c, type d, "str" as e }`
    fn parse_named_imports_or_exports(&mut self, kind: u16, specifier_kind: u16) -> NodeIndex {
        let start = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let list_start = self.token_pos();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            elements.push(self.parse_specifier(specifier_kind));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        let list_end = self.token_pos();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_named_imports(
            kind,
            start,
            self.prev_token_end,
            NamedImportsData {
                name: NodeIndex::NONE,
                elements: NodeList::new(elements, list_start, list_end),
            },
        )
    }

    fn parse_module_export_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            self.parse_literal_node()
        } else {
            self.parse_identifier_name()
        }
    }

    fn parse_specifier(&mut self, kind: u16) -> NodeIndex {
        let start = self.token_pos();
        // `type` is a modifier unless it is the whole specifier (`{ type }`)
        // or the name being renamed (`{ type as t }`).
        let is_type_only = self.is_token(SyntaxKind::TypeKeyword)
            && self.look_ahead(|p| {
                let next = p.next_token();
                if next == SyntaxKind::AsKeyword {
                    // `type as as x` is type-only; `type as x` renames `type`.
                    p.next_token() == SyntaxKind::AsKeyword
                } else {
                    token_is_identifier_or_keyword(next) || next == SyntaxKind::StringLiteral
                }
            });
        if is_type_only {
            self.next_token();
        }
        let first = self.parse_module_export_name();
        let (property_name, name) = if self.parse_optional(SyntaxKind::AsKeyword) {
            (first, self.parse_module_export_name())
        } else {
            (NodeIndex::NONE, first)
        };
        self.arena.add_specifier(
            kind,
            start,
            self.prev_token_end,
            SpecifierData {
                is_type_only,
                property_name,
                name,
            },
        )
    }

    // =========================================================================
    // Exports
    // =========================================================================

    /// After `export`: `*`, `{`, `=`, `as namespace`, `type {`/`type *`, or
    /// `default` not followed by a declaration keyword.
    fn is_export_statement_start(&mut self) -> bool {
        match self.next_token() {
            SyntaxKind::AsteriskToken
            | SyntaxKind::OpenBraceToken
            | SyntaxKind::EqualsToken
            | SyntaxKind::AsKeyword => true,
            SyntaxKind::TypeKeyword => matches!(
                self.next_token(),
                SyntaxKind::OpenBraceToken | SyntaxKind::AsteriskToken
            ),
            SyntaxKind::DefaultKeyword => {
                let next = self.next_token();
                match next {
                    SyntaxKind::ClassKeyword | SyntaxKind::FunctionKeyword => false,
                    SyntaxKind::InterfaceKeyword => !token_is_identifier(self.next_token()),
                    SyntaxKind::AbstractKeyword => self.next_token() != SyntaxKind::ClassKeyword,
                    SyntaxKind::AsyncKeyword => {
                        self.next_token() != SyntaxKind::FunctionKeyword
                            || self.has_preceding_line_break()
                    }
                    _ => true,
                }
            }
            _ => false,
        }
    }

    fn parse_export_statement(&mut self, start: u32) -> NodeIndex {
        self.parse_expected(SyntaxKind::ExportKeyword);
        match self.token() {
            SyntaxKind::EqualsToken | SyntaxKind::DefaultKeyword => {
                let is_export_equals = self.is_token(SyntaxKind::EqualsToken);
                self.next_token();
                let expression = self.parse_expression_or_entity_name();
                self.parse_semicolon();
                self.arena.add_export_assignment(
                    EXPORT_ASSIGNMENT,
                    start,
                    self.prev_token_end,
                    ExportAssignmentData {
                        modifiers: None,
                        is_export_equals,
                        expression,
                    },
                )
            }
            SyntaxKind::AsKeyword => {
                self.next_token();
                self.parse_expected(SyntaxKind::NamespaceKeyword);
                let inner = self.parse_identifier();
                self.parse_semicolon();
                self.arena.add_wrapped(
                    NAMESPACE_EXPORT_DECLARATION,
                    start,
                    self.prev_token_end,
                    WrappedData { inner },
                )
            }
            _ => {
                let is_type_only = self.parse_optional(SyntaxKind::TypeKeyword);
                let export_clause = if self.is_token(SyntaxKind::AsteriskToken) {
                    let star_start = self.token_pos();
                    self.next_token();
                    if self.parse_optional(SyntaxKind::AsKeyword) {
                        let name = self.parse_module_export_name();
                        self.arena.add_named_imports(
                            NAMESPACE_EXPORT,
                            star_start,
                            self.prev_token_end,
                            NamedImportsData {
                                name,
                                elements: NodeList::default(),
                            },
                        )
                    } else {
                        NodeIndex::NONE
                    }
                } else {
                    self.parse_named_imports_or_exports(NAMED_EXPORTS, EXPORT_SPECIFIER)
                };
                let module_specifier = if export_clause.is_none()
                    || self.is_token(SyntaxKind::FromKeyword)
                {
                    self.parse_expected(SyntaxKind::FromKeyword);
                    self.parse_module_specifier()
                } else {
                    NodeIndex::NONE
                };
                self.skip_import_attributes();
                self.parse_semicolon();
                self.arena.add_export_decl(
                    EXPORT_DECLARATION,
                    start,
                    self.prev_token_end,
                    ExportDeclData {
                        modifiers: None,
                        is_type_only,
                        export_clause,
                        module_specifier,
                    },
                )
            }
        }
    }
}
