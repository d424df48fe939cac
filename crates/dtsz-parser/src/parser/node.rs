//! Thin Node Architecture for the declaration AST
//!
//! Each node is a 16-byte header (`Node`) that points into a typed storage
//! pool via `data_index`. Tokens such as keywords and modifiers carry no data.
//!
//! Parent links and modifier flags live in `ExtendedNodeInfo`, indexed by the
//! same `NodeIndex` as the header. Children are always created before their
//! parent, so an adder can set parent links for every child it receives.

use super::base::{NodeIndex, NodeList};
use super::syntax_kind_ext::*;
use dtsz_scanner::SyntaxKind;
use serde::Serialize;
use std::sync::Arc;

/// A thin 16-byte node header.
///
/// Layout:
/// - `kind`: 2 bytes (`SyntaxKind` for tokens, `syntax_kind_ext` for nodes)
/// - `flags`: 2 bytes (`node_flags`)
/// - `pos`: 4 bytes (start of the first token, trivia excluded)
/// - `end`: 4 bytes (end of the last token)
/// - `data_index`: 4 bytes (index into the kind's pool, `u32::MAX` = no data)
#[repr(C)]
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Node {
    pub kind: u16,
    pub flags: u16,
    pub pos: u32,
    pub end: u32,
    pub data_index: u32,
}

impl Node {
    pub const NO_DATA: u32 = u32::MAX;

    #[inline]
    pub fn new(kind: u16, pos: u32, end: u32) -> Node {
        Node {
            kind,
            flags: 0,
            pos,
            end,
            data_index: Self::NO_DATA,
        }
    }

    #[inline]
    pub fn with_data(kind: u16, pos: u32, end: u32, data_index: u32) -> Node {
        Node {
            kind,
            flags: 0,
            pos,
            end,
            data_index,
        }
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        self.data_index != Self::NO_DATA
    }

    #[inline]
    pub fn is_identifier(&self) -> bool {
        self.kind == SyntaxKind::Identifier as u16
    }
}

// =============================================================================
// Child enumeration
// =============================================================================

/// A field of a data struct that can hold child nodes.
pub trait ChildSlot {
    fn visit(&self, f: &mut dyn FnMut(NodeIndex));
}

impl ChildSlot for NodeIndex {
    #[inline]
    fn visit(&self, f: &mut dyn FnMut(NodeIndex)) {
        if self.is_some() {
            f(*self);
        }
    }
}

impl ChildSlot for NodeList {
    #[inline]
    fn visit(&self, f: &mut dyn FnMut(NodeIndex)) {
        for &child in &self.nodes {
            f(child);
        }
    }
}

impl ChildSlot for Option<NodeList> {
    #[inline]
    fn visit(&self, f: &mut dyn FnMut(NodeIndex)) {
        if let Some(list) = self {
            list.visit(f);
        }
    }
}

/// Data structs enumerate their children in source order.
pub trait NodeChildren {
    fn for_each_child(&self, f: &mut dyn FnMut(NodeIndex));
}

macro_rules! impl_children {
    ($($ty:ident { $($field:ident),* $(,)? })+) => {
        $(
            impl NodeChildren for $ty {
                #[allow(unused_variables)]
                fn for_each_child(&self, f: &mut dyn FnMut(NodeIndex)) {
                    $(ChildSlot::visit(&self.$field, f);)*
                }
            }
        )+
    };
}

// =============================================================================
// Typed Data Pools
// =============================================================================

/// Data for identifier nodes (Identifier, PrivateIdentifier)
#[derive(Clone, Debug, Serialize)]
pub struct IdentifierData {
    pub escaped_text: String,
}

/// Data for string / numeric / bigint / template literal tokens
#[derive(Clone, Debug, Serialize)]
pub struct LiteralData {
    /// Cooked value (string contents without quotes)
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct QualifiedNameData {
    pub left: NodeIndex,
    pub right: NodeIndex,
}

/// Shared by nodes that wrap exactly one child: array / optional / rest /
/// parenthesized / literal types, computed property names, external module
/// references, `infer` types and `export as namespace`.
#[derive(Clone, Debug, Serialize)]
pub struct WrappedData {
    pub inner: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeParameterData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub constraint: NodeIndex,
    pub default: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParameterData {
    pub modifiers: Option<NodeList>,
    pub dot_dot_dot_token: bool,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

/// Data for every type member and class element.
///
/// `parameters` is `None` for properties. Index signatures store their single
/// parameter in `parameters`.
#[derive(Clone, Debug, Serialize)]
pub struct SignatureData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_parameters: Option<NodeList>,
    pub parameters: Option<NodeList>,
    pub type_annotation: NodeIndex,
    /// Property initializer or method body, kept unparsed
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypePredicateData {
    pub asserts_modifier: bool,
    pub parameter_name: NodeIndex,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeRefData {
    pub type_name: NodeIndex,
    pub type_arguments: Option<NodeList>,
}

/// Function and constructor types
#[derive(Clone, Debug, Serialize)]
pub struct FunctionTypeData {
    pub modifiers: Option<NodeList>,
    pub type_parameters: Option<NodeList>,
    pub parameters: NodeList,
    pub type_annotation: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeQueryData {
    pub expr_name: NodeIndex,
    pub type_arguments: Option<NodeList>,
}

/// Type literals (`{ ... }`)
#[derive(Clone, Debug, Serialize)]
pub struct TypeLiteralData {
    pub members: NodeList,
}

/// Union, intersection and tuple types
#[derive(Clone, Debug, Serialize)]
pub struct CompositeTypeData {
    pub types: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConditionalTypeData {
    pub check_type: NodeIndex,
    pub extends_type: NodeIndex,
    pub true_type: NodeIndex,
    pub false_type: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeOperatorData {
    pub operator: u16,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct IndexedAccessTypeData {
    pub object_type: NodeIndex,
    pub index_type: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct MappedTypeData {
    /// `readonly`, `+readonly` or `-readonly` token
    pub readonly_token: NodeIndex,
    pub type_parameter: NodeIndex,
    pub name_type: NodeIndex,
    /// `?`, `+?` or `-?` token
    pub question_token: NodeIndex,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct NamedTupleMemberData {
    pub dot_dot_dot_token: bool,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TemplateLiteralTypeData {
    pub head: NodeIndex,
    pub template_spans: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct TemplateSpanData {
    pub type_node: NodeIndex,
    pub literal: NodeIndex,
}

/// `import("m").A.B<T>` and `typeof import("m")`
#[derive(Clone, Debug, Serialize)]
pub struct ImportTypeData {
    pub is_typeof: bool,
    pub argument: NodeIndex,
    pub qualifier: NodeIndex,
    pub type_arguments: Option<NodeList>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BindingPatternData {
    pub elements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct BindingElementData {
    pub dot_dot_dot_token: bool,
    pub property_name: NodeIndex,
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExprWithTypeArgsData {
    pub expression: NodeIndex,
    pub type_arguments: Option<NodeList>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HeritageData {
    /// `ExtendsKeyword` or `ImplementsKeyword`
    pub token: u16,
    pub types: NodeList,
}

/// Data for variable statements; `let`/`const` live in `Node::flags`
#[derive(Clone, Debug, Serialize)]
pub struct VariableData {
    pub modifiers: Option<NodeList>,
    pub declarations: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct VariableDeclarationData {
    pub name: NodeIndex,
    pub exclamation_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct FunctionData {
    pub modifiers: Option<NodeList>,
    pub asterisk_token: bool,
    /// `NONE` for `export default function () {}`
    pub name: NodeIndex,
    pub type_parameters: Option<NodeList>,
    pub parameters: NodeList,
    pub type_annotation: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassData {
    pub modifiers: Option<NodeList>,
    /// `NONE` for `export default class {}`
    pub name: NodeIndex,
    pub type_parameters: Option<NodeList>,
    pub heritage_clauses: Option<NodeList>,
    pub members: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct InterfaceData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub type_parameters: Option<NodeList>,
    pub heritage_clauses: Option<NodeList>,
    pub members: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeAliasData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub type_parameters: Option<NodeList>,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub members: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumMemberData {
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

/// Data for module/namespace declarations
///
/// `body` is a `MODULE_BLOCK`, a nested `MODULE_DECLARATION` for dotted
/// names, or `NONE` for `declare module "m";`.
#[derive(Clone, Debug, Serialize)]
pub struct ModuleData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ModuleBlockData {
    pub statements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportEqualsData {
    pub modifiers: Option<NodeList>,
    pub is_type_only: bool,
    pub name: NodeIndex,
    /// Entity name or `EXTERNAL_MODULE_REFERENCE`
    pub module_reference: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportDeclData {
    pub modifiers: Option<NodeList>,
    pub import_clause: NodeIndex,
    pub module_specifier: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportClauseData {
    pub is_type_only: bool,
    pub name: NodeIndex,
    pub named_bindings: NodeIndex,
}

/// Namespace imports/exports use `name`; named imports/exports use `elements`
#[derive(Clone, Debug, Serialize)]
pub struct NamedImportsData {
    pub name: NodeIndex,
    pub elements: NodeList,
}

/// Data for import/export specifiers
#[derive(Clone, Debug, Serialize)]
pub struct SpecifierData {
    pub is_type_only: bool,
    pub property_name: NodeIndex,
    pub name: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExportDeclData {
    pub modifiers: Option<NodeList>,
    pub is_type_only: bool,
    /// `NAMED_EXPORTS`, `NAMESPACE_EXPORT` or `NONE` for `export *`
    pub export_clause: NodeIndex,
    pub module_specifier: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExportAssignmentData {
    pub modifiers: Option<NodeList>,
    pub is_export_equals: bool,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceFileData {
    pub statements: NodeList,
    pub file_name: String,
    #[serde(skip)]
    pub text: Arc<str>,
    pub is_declaration_file: bool,
}

impl_children! {
    QualifiedNameData { left, right }
    WrappedData { inner }
    TypeParameterData { modifiers, name, constraint, default }
    ParameterData { modifiers, name, type_annotation, initializer }
    SignatureData { modifiers, name, type_parameters, parameters, type_annotation, body }
    TypePredicateData { parameter_name, type_node }
    TypeRefData { type_name, type_arguments }
    FunctionTypeData { modifiers, type_parameters, parameters, type_annotation }
    TypeQueryData { expr_name, type_arguments }
    TypeLiteralData { members }
    CompositeTypeData { types }
    ConditionalTypeData { check_type, extends_type, true_type, false_type }
    TypeOperatorData { type_node }
    IndexedAccessTypeData { object_type, index_type }
    MappedTypeData { readonly_token, type_parameter, name_type, question_token, type_node }
    NamedTupleMemberData { name, type_node }
    TemplateLiteralTypeData { head, template_spans }
    TemplateSpanData { type_node, literal }
    ImportTypeData { argument, qualifier, type_arguments }
    BindingPatternData { elements }
    BindingElementData { property_name, name, initializer }
    ExprWithTypeArgsData { expression, type_arguments }
    HeritageData { types }
    VariableData { modifiers, declarations }
    VariableDeclarationData { name, type_annotation, initializer }
    FunctionData { modifiers, name, type_parameters, parameters, type_annotation, body }
    ClassData { modifiers, name, type_parameters, heritage_clauses, members }
    InterfaceData { modifiers, name, type_parameters, heritage_clauses, members }
    TypeAliasData { modifiers, name, type_parameters, type_node }
    EnumData { modifiers, name, members }
    EnumMemberData { name, initializer }
    ModuleData { modifiers, name, body }
    ModuleBlockData { statements }
    ImportEqualsData { modifiers, name, module_reference }
    ImportDeclData { modifiers, import_clause, module_specifier }
    ImportClauseData { name, named_bindings }
    NamedImportsData { name, elements }
    SpecifierData { property_name, name }
    ExportDeclData { modifiers, export_clause, module_specifier }
    ExportAssignmentData { modifiers, expression }
    SourceFileData { statements }
}

// =============================================================================
// Thin Node Arena
// =============================================================================

/// Extended node info for data that does not fit in `Node`
#[derive(Clone, Debug, Serialize)]
pub struct ExtendedNodeInfo {
    pub parent: NodeIndex,
    pub modifier_flags: u32,
}

impl Default for ExtendedNodeInfo {
    fn default() -> Self {
        ExtendedNodeInfo {
            parent: NodeIndex::NONE,
            modifier_flags: 0,
        }
    }
}

/// Arena for thin nodes with typed data pools.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NodeArena {
    pub nodes: Vec<Node>,

    // Names and literals
    pub identifiers: Vec<IdentifierData>,
    pub literals: Vec<LiteralData>,
    pub qualified_names: Vec<QualifiedNameData>,
    pub wrapped: Vec<WrappedData>,

    // Signatures and members
    pub type_parameters: Vec<TypeParameterData>,
    pub parameters: Vec<ParameterData>,
    pub signatures: Vec<SignatureData>,
    pub heritage_clauses: Vec<HeritageData>,
    pub expr_with_type_args: Vec<ExprWithTypeArgsData>,

    // Types
    pub type_predicates: Vec<TypePredicateData>,
    pub type_refs: Vec<TypeRefData>,
    pub function_types: Vec<FunctionTypeData>,
    pub type_queries: Vec<TypeQueryData>,
    pub type_literals: Vec<TypeLiteralData>,
    pub composite_types: Vec<CompositeTypeData>,
    pub conditional_types: Vec<ConditionalTypeData>,
    pub type_operators: Vec<TypeOperatorData>,
    pub indexed_access_types: Vec<IndexedAccessTypeData>,
    pub mapped_types: Vec<MappedTypeData>,
    pub named_tuple_members: Vec<NamedTupleMemberData>,
    pub template_literal_types: Vec<TemplateLiteralTypeData>,
    pub template_spans: Vec<TemplateSpanData>,
    pub import_types: Vec<ImportTypeData>,

    // Binding patterns
    pub binding_patterns: Vec<BindingPatternData>,
    pub binding_elements: Vec<BindingElementData>,

    // Declarations
    pub variables: Vec<VariableData>,
    pub variable_declarations: Vec<VariableDeclarationData>,
    pub functions: Vec<FunctionData>,
    pub classes: Vec<ClassData>,
    pub interfaces: Vec<InterfaceData>,
    pub type_aliases: Vec<TypeAliasData>,
    pub enums: Vec<EnumData>,
    pub enum_members: Vec<EnumMemberData>,
    pub modules: Vec<ModuleData>,
    pub module_blocks: Vec<ModuleBlockData>,

    // Import/export
    pub import_equals: Vec<ImportEqualsData>,
    pub import_decls: Vec<ImportDeclData>,
    pub import_clauses: Vec<ImportClauseData>,
    pub named_imports: Vec<NamedImportsData>,
    pub specifiers: Vec<SpecifierData>,
    pub export_decls: Vec<ExportDeclData>,
    pub export_assignments: Vec<ExportAssignmentData>,

    pub source_files: Vec<SourceFileData>,

    pub extended_info: Vec<ExtendedNodeInfo>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    #[inline]
    fn push_node(&mut self, node: Node) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        self.extended_info.push(ExtendedNodeInfo::default());
        index
    }

    #[inline]
    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if let Some(info) = self.extended_info.get_mut(child.0 as usize) {
            info.parent = parent;
        }
    }

    /// Add a token node (keywords, modifiers, `this`, ...)
    pub fn add_token(&mut self, kind: u16, pos: u32, end: u32) -> NodeIndex {
        self.push_node(Node::new(kind, pos, end))
    }

    pub fn add_identifier(&mut self, kind: u16, pos: u32, end: u32, text: String) -> NodeIndex {
        let data_index = self.identifiers.len() as u32;
        self.identifiers.push(IdentifierData { escaped_text: text });
        self.push_node(Node::with_data(kind, pos, end, data_index))
    }

    pub fn add_literal(&mut self, kind: u16, pos: u32, end: u32, text: String) -> NodeIndex {
        let data_index = self.literals.len() as u32;
        self.literals.push(LiteralData { text });
        self.push_node(Node::with_data(kind, pos, end, data_index))
    }

    pub fn set_node_flags(&mut self, index: NodeIndex, flags: u16) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.flags |= flags;
        }
    }

    pub fn set_modifier_flags(&mut self, index: NodeIndex, flags: u32) {
        if let Some(info) = self.extended_info.get_mut(index.0 as usize) {
            info.modifier_flags |= flags;
        }
    }
}

macro_rules! node_pools {
    ($($pool:ident : $ty:ident => $add:ident, $get:ident, [$($kind:ident)|+];)+) => {
        impl NodeArena {
            $(
                pub fn $add(&mut self, kind: u16, pos: u32, end: u32, data: $ty) -> NodeIndex {
                    let data_index = self.$pool.len() as u32;
                    let index = self.push_node(Node::with_data(kind, pos, end, data_index));
                    data.for_each_child(&mut |child| self.set_parent(child, index));
                    self.$pool.push(data);
                    index
                }

                #[inline]
                pub fn $get(&self, node: &Node) -> Option<&$ty> {
                    if node.has_data() && matches!(node.kind, $($kind)|+) {
                        self.$pool.get(node.data_index as usize)
                    } else {
                        None
                    }
                }
            )+

            /// Visit the direct children of a node in source order.
            pub fn for_each_child(&self, index: NodeIndex, f: &mut dyn FnMut(NodeIndex)) {
                let Some(node) = self.get(index) else {
                    return;
                };
                if !node.has_data() {
                    return;
                }
                $(
                    if matches!(node.kind, $($kind)|+) {
                        if let Some(data) = self.$pool.get(node.data_index as usize) {
                            data.for_each_child(f);
                        }
                        return;
                    }
                )+
            }
        }
    };
}

node_pools! {
    qualified_names: QualifiedNameData => add_qualified_name, get_qualified_name, [QUALIFIED_NAME];
    wrapped: WrappedData => add_wrapped, get_wrapped, [ARRAY_TYPE | OPTIONAL_TYPE | REST_TYPE | PARENTHESIZED_TYPE | LITERAL_TYPE | COMPUTED_PROPERTY_NAME | EXTERNAL_MODULE_REFERENCE | INFER_TYPE | NAMESPACE_EXPORT_DECLARATION];
    type_parameters: TypeParameterData => add_type_parameter, get_type_parameter, [TYPE_PARAMETER];
    parameters: ParameterData => add_parameter, get_parameter, [PARAMETER];
    signatures: SignatureData => add_signature, get_signature, [PROPERTY_SIGNATURE | PROPERTY_DECLARATION | METHOD_SIGNATURE | METHOD_DECLARATION | CONSTRUCTOR | GET_ACCESSOR | SET_ACCESSOR | CALL_SIGNATURE | CONSTRUCT_SIGNATURE | INDEX_SIGNATURE];
    heritage_clauses: HeritageData => add_heritage_clause, get_heritage_clause, [HERITAGE_CLAUSE];
    expr_with_type_args: ExprWithTypeArgsData => add_expr_with_type_args, get_expr_with_type_args, [EXPRESSION_WITH_TYPE_ARGUMENTS];
    type_predicates: TypePredicateData => add_type_predicate, get_type_predicate, [TYPE_PREDICATE];
    type_refs: TypeRefData => add_type_ref, get_type_ref, [TYPE_REFERENCE];
    function_types: FunctionTypeData => add_function_type, get_function_type, [FUNCTION_TYPE | CONSTRUCTOR_TYPE];
    type_queries: TypeQueryData => add_type_query, get_type_query, [TYPE_QUERY];
    type_literals: TypeLiteralData => add_type_literal, get_type_literal, [TYPE_LITERAL];
    composite_types: CompositeTypeData => add_composite_type, get_composite_type, [UNION_TYPE | INTERSECTION_TYPE | TUPLE_TYPE];
    conditional_types: ConditionalTypeData => add_conditional_type, get_conditional_type, [CONDITIONAL_TYPE];
    type_operators: TypeOperatorData => add_type_operator, get_type_operator, [TYPE_OPERATOR];
    indexed_access_types: IndexedAccessTypeData => add_indexed_access_type, get_indexed_access_type, [INDEXED_ACCESS_TYPE];
    mapped_types: MappedTypeData => add_mapped_type, get_mapped_type, [MAPPED_TYPE];
    named_tuple_members: NamedTupleMemberData => add_named_tuple_member, get_named_tuple_member, [NAMED_TUPLE_MEMBER];
    template_literal_types: TemplateLiteralTypeData => add_template_literal_type, get_template_literal_type, [TEMPLATE_LITERAL_TYPE];
    template_spans: TemplateSpanData => add_template_span, get_template_span, [TEMPLATE_LITERAL_TYPE_SPAN];
    import_types: ImportTypeData => add_import_type, get_import_type, [IMPORT_TYPE];
    binding_patterns: BindingPatternData => add_binding_pattern, get_binding_pattern, [OBJECT_BINDING_PATTERN | ARRAY_BINDING_PATTERN];
    binding_elements: BindingElementData => add_binding_element, get_binding_element, [BINDING_ELEMENT];
    variables: VariableData => add_variable, get_variable, [VARIABLE_STATEMENT];
    variable_declarations: VariableDeclarationData => add_variable_declaration, get_variable_declaration, [VARIABLE_DECLARATION];
    functions: FunctionData => add_function, get_function, [FUNCTION_DECLARATION];
    classes: ClassData => add_class, get_class, [CLASS_DECLARATION];
    interfaces: InterfaceData => add_interface, get_interface, [INTERFACE_DECLARATION];
    type_aliases: TypeAliasData => add_type_alias, get_type_alias, [TYPE_ALIAS_DECLARATION];
    enums: EnumData => add_enum, get_enum, [ENUM_DECLARATION];
    enum_members: EnumMemberData => add_enum_member, get_enum_member, [ENUM_MEMBER];
    modules: ModuleData => add_module, get_module, [MODULE_DECLARATION];
    module_blocks: ModuleBlockData => add_module_block, get_module_block, [MODULE_BLOCK];
    import_equals: ImportEqualsData => add_import_equals, get_import_equals, [IMPORT_EQUALS_DECLARATION];
    import_decls: ImportDeclData => add_import_decl, get_import_decl, [IMPORT_DECLARATION];
    import_clauses: ImportClauseData => add_import_clause, get_import_clause, [IMPORT_CLAUSE];
    named_imports: NamedImportsData => add_named_imports, get_named_imports, [NAMESPACE_IMPORT | NAMED_IMPORTS | NAMED_EXPORTS | NAMESPACE_EXPORT];
    specifiers: SpecifierData => add_specifier, get_specifier, [IMPORT_SPECIFIER | EXPORT_SPECIFIER];
    export_decls: ExportDeclData => add_export_decl, get_export_decl, [EXPORT_DECLARATION];
    export_assignments: ExportAssignmentData => add_export_assignment, get_export_assignment, [EXPORT_ASSIGNMENT];
    source_files: SourceFileData => add_source_file, get_source_file, [SOURCE_FILE];
}
