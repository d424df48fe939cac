//! AST node kinds.
//!
//! Token kinds come from `dtsz_scanner::SyntaxKind`; composite nodes use the
//! constants below, which start well above `SyntaxKind::Count`.

pub const FIRST_NODE: u16 = 300;

// Names
pub const QUALIFIED_NAME: u16 = 300;
pub const COMPUTED_PROPERTY_NAME: u16 = 301;

// Signature elements
pub const TYPE_PARAMETER: u16 = 302;
pub const PARAMETER: u16 = 303;

// Type members and class elements
pub const PROPERTY_SIGNATURE: u16 = 304;
pub const PROPERTY_DECLARATION: u16 = 305;
pub const METHOD_SIGNATURE: u16 = 306;
pub const METHOD_DECLARATION: u16 = 307;
pub const CONSTRUCTOR: u16 = 308;
pub const GET_ACCESSOR: u16 = 309;
pub const SET_ACCESSOR: u16 = 310;
pub const CALL_SIGNATURE: u16 = 311;
pub const CONSTRUCT_SIGNATURE: u16 = 312;
pub const INDEX_SIGNATURE: u16 = 313;
pub const SEMICOLON_CLASS_ELEMENT: u16 = 314;

// Types
pub const TYPE_PREDICATE: u16 = 320;
pub const TYPE_REFERENCE: u16 = 321;
pub const FUNCTION_TYPE: u16 = 322;
pub const CONSTRUCTOR_TYPE: u16 = 323;
pub const TYPE_QUERY: u16 = 324;
pub const TYPE_LITERAL: u16 = 325;
pub const ARRAY_TYPE: u16 = 326;
pub const TUPLE_TYPE: u16 = 327;
pub const OPTIONAL_TYPE: u16 = 328;
pub const REST_TYPE: u16 = 329;
pub const UNION_TYPE: u16 = 330;
pub const INTERSECTION_TYPE: u16 = 331;
pub const CONDITIONAL_TYPE: u16 = 332;
pub const INFER_TYPE: u16 = 333;
pub const PARENTHESIZED_TYPE: u16 = 334;
pub const THIS_TYPE: u16 = 335;
pub const TYPE_OPERATOR: u16 = 336;
pub const INDEXED_ACCESS_TYPE: u16 = 337;
pub const MAPPED_TYPE: u16 = 338;
pub const LITERAL_TYPE: u16 = 339;
pub const NAMED_TUPLE_MEMBER: u16 = 340;
pub const TEMPLATE_LITERAL_TYPE: u16 = 341;
pub const TEMPLATE_LITERAL_TYPE_SPAN: u16 = 342;
pub const IMPORT_TYPE: u16 = 343;

// Binding patterns
pub const OBJECT_BINDING_PATTERN: u16 = 350;
pub const ARRAY_BINDING_PATTERN: u16 = 351;
pub const BINDING_ELEMENT: u16 = 352;

// Expressions
pub const EXPRESSION_WITH_TYPE_ARGUMENTS: u16 = 360;
/// Initializers and bodies the bundler copies verbatim
pub const UNPARSED_EXPRESSION: u16 = 361;

// Statements and declarations
pub const EMPTY_STATEMENT: u16 = 370;
pub const VARIABLE_STATEMENT: u16 = 371;
pub const VARIABLE_DECLARATION: u16 = 372;
pub const FUNCTION_DECLARATION: u16 = 373;
pub const CLASS_DECLARATION: u16 = 374;
pub const INTERFACE_DECLARATION: u16 = 375;
pub const TYPE_ALIAS_DECLARATION: u16 = 376;
pub const ENUM_DECLARATION: u16 = 377;
pub const ENUM_MEMBER: u16 = 378;
pub const MODULE_DECLARATION: u16 = 379;
pub const MODULE_BLOCK: u16 = 380;
pub const HERITAGE_CLAUSE: u16 = 381;

// Imports and exports
pub const IMPORT_EQUALS_DECLARATION: u16 = 390;
pub const IMPORT_DECLARATION: u16 = 391;
pub const IMPORT_CLAUSE: u16 = 392;
pub const NAMESPACE_IMPORT: u16 = 393;
pub const NAMED_IMPORTS: u16 = 394;
pub const IMPORT_SPECIFIER: u16 = 395;
pub const EXPORT_ASSIGNMENT: u16 = 396;
pub const EXPORT_DECLARATION: u16 = 397;
pub const NAMED_EXPORTS: u16 = 398;
pub const NAMESPACE_EXPORT: u16 = 399;
pub const EXPORT_SPECIFIER: u16 = 400;
pub const EXTERNAL_MODULE_REFERENCE: u16 = 401;
/// `export as namespace Foo;`
pub const NAMESPACE_EXPORT_DECLARATION: u16 = 402;

pub const SOURCE_FILE: u16 = 410;

/// True for statements that declare something at their container's level.
pub fn is_declaration_statement(kind: u16) -> bool {
    matches!(
        kind,
        VARIABLE_STATEMENT
            | FUNCTION_DECLARATION
            | CLASS_DECLARATION
            | INTERFACE_DECLARATION
            | TYPE_ALIAS_DECLARATION
            | ENUM_DECLARATION
            | MODULE_DECLARATION
    )
}
