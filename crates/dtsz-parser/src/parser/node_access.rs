//! NodeArena access methods.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use super::syntax_kind_ext::*;
use dtsz_scanner::SyntaxKind;

impl NodeArena {
    /// Get a thin node by index
    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    /// Get extended info for a node
    #[inline]
    pub fn get_extended(&self, index: NodeIndex) -> Option<&ExtendedNodeInfo> {
        if index.is_none() {
            None
        } else {
            self.extended_info.get(index.0 as usize)
        }
    }

    /// Get identifier data for a node.
    /// Returns None if node is not an identifier or has no data.
    #[inline]
    pub fn get_identifier(&self, node: &Node) -> Option<&IdentifierData> {
        if node.has_data()
            && (node.kind == SyntaxKind::Identifier as u16
                || node.kind == SyntaxKind::PrivateIdentifier as u16)
        {
            self.identifiers.get(node.data_index as usize)
        } else {
            None
        }
    }

    /// Get literal data for a node.
    /// Returns None if node is not a literal or has no data.
    #[inline]
    pub fn get_literal(&self, node: &Node) -> Option<&LiteralData> {
        if node.has_data()
            && matches!(node.kind,
                k if k == SyntaxKind::StringLiteral as u16 ||
                     k == SyntaxKind::NumericLiteral as u16 ||
                     k == SyntaxKind::BigIntLiteral as u16 ||
                     k == SyntaxKind::NoSubstitutionTemplateLiteral as u16 ||
                     k == SyntaxKind::TemplateHead as u16 ||
                     k == SyntaxKind::TemplateMiddle as u16 ||
                     k == SyntaxKind::TemplateTail as u16
            )
        {
            self.literals.get(node.data_index as usize)
        } else {
            None
        }
    }

    /// Parent of a node, `NONE` for the source file.
    #[inline]
    pub fn parent_of(&self, index: NodeIndex) -> NodeIndex {
        self.get_extended(index)
            .map_or(NodeIndex::NONE, |info| info.parent)
    }

    #[inline]
    pub fn modifier_flags_of(&self, index: NodeIndex) -> u32 {
        self.get_extended(index).map_or(0, |info| info.modifier_flags)
    }

    #[inline]
    pub fn has_modifier(&self, index: NodeIndex, flag: u32) -> bool {
        self.modifier_flags_of(index) & flag != 0
    }

    /// Text of an identifier node.
    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        self.get_identifier(node).map(|id| id.escaped_text.as_str())
    }

    /// Cooked text of a string or numeric literal node.
    pub fn literal_text(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        self.get_literal(node).map(|lit| lit.text.as_str())
    }

    /// Text of an identifier or string literal used as a declaration name.
    pub fn name_text(&self, index: NodeIndex) -> Option<&str> {
        self.identifier_text(index)
            .or_else(|| self.literal_text(index))
    }

    /// The root source file node, which is always the last node created.
    pub fn source_file_index(&self) -> NodeIndex {
        match self.nodes.last() {
            Some(node) if node.kind == SOURCE_FILE => NodeIndex(self.nodes.len() as u32 - 1),
            _ => NodeIndex::NONE,
        }
    }

    pub fn source_file(&self) -> Option<&SourceFileData> {
        let node = self.get(self.source_file_index())?;
        self.get_source_file(node)
    }

    /// Full text of the parsed file, empty before `parse_source_file`.
    pub fn source_text(&self) -> &str {
        self.source_file().map_or("", |sf| &sf.text)
    }

    /// Source text covered by a node.
    pub fn node_text(&self, index: NodeIndex) -> &str {
        let Some(node) = self.get(index) else {
            return "";
        };
        self.source_text()
            .get(node.pos as usize..node.end as usize)
            .unwrap_or("")
    }

    /// Name node of a declaration, `NONE` when the declaration is anonymous
    /// or has no name.
    pub fn declaration_name(&self, index: NodeIndex) -> NodeIndex {
        let Some(node) = self.get(index) else {
            return NodeIndex::NONE;
        };
        match node.kind {
            FUNCTION_DECLARATION => self.get_function(node).map(|d| d.name),
            CLASS_DECLARATION => self.get_class(node).map(|d| d.name),
            INTERFACE_DECLARATION => self.get_interface(node).map(|d| d.name),
            TYPE_ALIAS_DECLARATION => self.get_type_alias(node).map(|d| d.name),
            ENUM_DECLARATION => self.get_enum(node).map(|d| d.name),
            MODULE_DECLARATION => self.get_module(node).map(|d| d.name),
            VARIABLE_DECLARATION => self.get_variable_declaration(node).map(|d| d.name),
            TYPE_PARAMETER => self.get_type_parameter(node).map(|d| d.name),
            PARAMETER => self.get_parameter(node).map(|d| d.name),
            BINDING_ELEMENT => self.get_binding_element(node).map(|d| d.name),
            ENUM_MEMBER => self.get_enum_member(node).map(|d| d.name),
            IMPORT_EQUALS_DECLARATION => self.get_import_equals(node).map(|d| d.name),
            IMPORT_CLAUSE => self.get_import_clause(node).map(|d| d.name),
            NAMESPACE_IMPORT | NAMESPACE_EXPORT => self.get_named_imports(node).map(|d| d.name),
            IMPORT_SPECIFIER | EXPORT_SPECIFIER => self.get_specifier(node).map(|d| d.name),
            NAMESPACE_EXPORT_DECLARATION => self.get_wrapped(node).map(|d| d.inner),
            k if self.get_signature(node).is_some() && k != INDEX_SIGNATURE => {
                self.get_signature(node).map(|d| d.name)
            }
            _ => None,
        }
        .unwrap_or(NodeIndex::NONE)
    }

    /// Modifier tokens of a declaration or member.
    pub fn modifiers_of(&self, index: NodeIndex) -> Option<&NodeList> {
        let node = self.get(index)?;
        match node.kind {
            FUNCTION_DECLARATION => self.get_function(node)?.modifiers.as_ref(),
            CLASS_DECLARATION => self.get_class(node)?.modifiers.as_ref(),
            INTERFACE_DECLARATION => self.get_interface(node)?.modifiers.as_ref(),
            TYPE_ALIAS_DECLARATION => self.get_type_alias(node)?.modifiers.as_ref(),
            ENUM_DECLARATION => self.get_enum(node)?.modifiers.as_ref(),
            MODULE_DECLARATION => self.get_module(node)?.modifiers.as_ref(),
            VARIABLE_STATEMENT => self.get_variable(node)?.modifiers.as_ref(),
            IMPORT_EQUALS_DECLARATION => self.get_import_equals(node)?.modifiers.as_ref(),
            IMPORT_DECLARATION => self.get_import_decl(node)?.modifiers.as_ref(),
            EXPORT_DECLARATION => self.get_export_decl(node)?.modifiers.as_ref(),
            EXPORT_ASSIGNMENT => self.get_export_assignment(node)?.modifiers.as_ref(),
            _ => self.get_signature(node)?.modifiers.as_ref(),
        }
    }

    /// Statements of a source file or module block.
    pub fn statements_of(&self, index: NodeIndex) -> Option<&NodeList> {
        let node = self.get(index)?;
        match node.kind {
            SOURCE_FILE => self.get_source_file(node).map(|d| &d.statements),
            MODULE_BLOCK => self.get_module_block(node).map(|d| &d.statements),
            _ => None,
        }
    }

    /// Collect direct children into a vector.
    pub fn children_of(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut children = Vec::new();
        self.for_each_child(index, &mut |child| children.push(child));
        children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// =============================================================================
// Node kind helpers
// =============================================================================

impl Node {
    #[inline]
    pub fn is_string_literal(&self) -> bool {
        self.kind == SyntaxKind::StringLiteral as u16
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.flags & super::flags::node_flags::MISSING != 0
    }
}
