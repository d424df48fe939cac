//! Symbol declaration and merging tests.

use dtsz_binder::{BinderState, FileId, NodeRef, SymbolArena, SymbolTable, symbol_flags};
use dtsz_parser::{NodeArena, ParserState};

fn bind(source: &str) -> (NodeArena, BinderState) {
    let mut parser = ParserState::new("test.d.ts".to_string(), source.to_string());
    parser.parse_source_file();
    let arena = parser.into_arena();
    let mut binder = BinderState::new();
    binder.bind_source_file(FileId(0), &arena);
    (arena, binder)
}

fn module_exports(binder: &BinderState) -> Vec<String> {
    let module = binder.files[0].module_symbol;
    binder
        .symbols
        .get(module)
        .and_then(|sym| sym.exports.as_deref())
        .map(|exports| exports.iter().map(|(name, _)| name.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_symbol_table_preserves_insertion_order() {
    let mut arena = SymbolArena::new();
    let mut table = SymbolTable::new();
    for name in ["zeta", "alpha", "mid"] {
        let id = arena.alloc(symbol_flags::INTERFACE, name.to_string());
        table.set(name.to_string(), id);
    }
    let names: Vec<&str> = table.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert_eq!(arena.len(), 3);
}

#[test]
fn test_add_declaration_deduplicates() {
    let mut arena = SymbolArena::new();
    let id = arena.alloc(symbol_flags::FUNCTION, "f".to_string());
    let sym = arena.get_mut(id).unwrap();
    let decl = NodeRef::new(FileId(0), dtsz_parser::NodeIndex(3));
    sym.add_declaration(decl);
    sym.add_declaration(decl);
    assert_eq!(sym.declarations.len(), 1);
    assert_eq!(sym.value_declaration, Some(decl));
}

#[test]
fn test_interface_declarations_merge() {
    let (_, binder) = bind("interface A { x: number }\ninterface A { y: string }");
    let id = binder.globals.get("A").expect("A is global");
    let sym = binder.symbols.get(id).unwrap();
    assert_eq!(sym.flags, symbol_flags::INTERFACE);
    assert_eq!(sym.declarations.len(), 2);
}

#[test]
fn test_class_and_interface_merge() {
    let (_, binder) = bind("declare class C {}\ninterface C { extra: number }");
    let sym = binder.symbols.get(binder.globals.get("C").unwrap()).unwrap();
    assert!(sym.has_flags(symbol_flags::CLASS));
    assert!(sym.has_flags(symbol_flags::INTERFACE));
    assert_eq!(sym.declarations.len(), 2);
}

#[test]
fn test_function_and_namespace_merge() {
    let source = "declare function f(): void;\ndeclare namespace f { const version: string; }";
    let (_, binder) = bind(source);
    let sym = binder.symbols.get(binder.globals.get("f").unwrap()).unwrap();
    assert!(sym.has_flags(symbol_flags::FUNCTION));
    assert!(sym.has_flags(symbol_flags::NAMESPACE_MODULE));
    assert!(sym.has_flags(symbol_flags::VALUE_MODULE));
    let exports = sym.exports.as_deref().expect("namespace exports");
    assert!(exports.has("version"));
}

#[test]
fn test_type_only_namespace_is_not_instantiated() {
    let (_, binder) = bind("declare namespace Types { interface A {} type B = A; }");
    let sym = binder
        .symbols
        .get(binder.globals.get("Types").unwrap())
        .unwrap();
    assert!(sym.has_flags(symbol_flags::NAMESPACE_MODULE));
    assert!(!sym.has_flags(symbol_flags::VALUE_MODULE));
}

#[test]
fn test_can_merge_flags_rules() {
    use symbol_flags::*;
    assert!(BinderState::can_merge_flags(INTERFACE, INTERFACE));
    assert!(BinderState::can_merge_flags(CLASS, INTERFACE));
    assert!(BinderState::can_merge_flags(NAMESPACE_MODULE, REGULAR_ENUM));
    assert!(BinderState::can_merge_flags(FUNCTION, FUNCTION));
    assert!(BinderState::can_merge_flags(TYPE_ALIAS, BLOCK_SCOPED_VARIABLE));
    assert!(BinderState::can_merge_flags(CONST_ENUM, CONST_ENUM));
    assert!(!BinderState::can_merge_flags(CONST_ENUM, REGULAR_ENUM));
    assert!(!BinderState::can_merge_flags(CLASS, CLASS));
    assert!(!BinderState::can_merge_flags(TYPE_ALIAS, TYPE_ALIAS));
}

#[test]
fn test_enum_members_are_enum_exports() {
    let (_, binder) = bind("declare enum Color { Red, Green = 2, \"Blue\" }");
    let color = binder.symbols.get(binder.globals.get("Color").unwrap()).unwrap();
    assert!(color.has_flags(symbol_flags::REGULAR_ENUM));
    let exports = color.exports.as_deref().unwrap();
    let names: Vec<&str> = exports.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Red", "Green", "Blue"]);
    let red = binder.symbols.get(exports.get("Red").unwrap()).unwrap();
    assert_eq!(red.flags, symbol_flags::ENUM_MEMBER);
}

#[test]
fn test_module_file_exports_in_declaration_order() {
    let source = r#"
export interface A { a: string }
interface B { b: number }
export { B as C };
export default A;
"#;
    let (_, binder) = bind(source);
    assert!(binder.files[0].is_external_module);
    assert!(binder.globals.is_empty());
    assert_eq!(module_exports(&binder), vec!["A", "C", "default"]);

    let module = binder.symbols.get(binder.files[0].module_symbol).unwrap();
    assert_eq!(module.escaped_name, "\"test.d.ts\"");
    let exports = module.exports.as_deref().unwrap();
    let c = binder.symbols.get(exports.get("C").unwrap()).unwrap();
    assert!(c.has_flags(symbol_flags::ALIAS));
    assert!(c.alias_entity.is_some());
}

#[test]
fn test_export_default_declaration_shares_symbol() {
    let (_, binder) = bind("export default interface Options { verbose: boolean }");
    let module = binder.symbols.get(binder.files[0].module_symbol).unwrap();
    let exports = module.exports.as_deref().unwrap();
    let default = exports.get("default").expect("default export");
    assert_eq!(binder.symbols.get(default).unwrap().escaped_name, "Options");
    assert!(!exports.has("Options"));
}

#[test]
fn test_anonymous_default_class_is_default_symbol() {
    let (_, binder) = bind("export default class { run(): void }");
    let module = binder.symbols.get(binder.files[0].module_symbol).unwrap();
    let default = module.exports.as_deref().unwrap().get("default").unwrap();
    let sym = binder.symbols.get(default).unwrap();
    assert_eq!(sym.escaped_name, "default");
    assert!(sym.has_flags(symbol_flags::CLASS));
}

#[test]
fn test_import_aliases_record_module_and_name() {
    let source = r#"
import Def, { a, b as c } from "./dep";
import * as ns from "pkg";
import eq = require("./eq");
export {};
"#;
    let (_, binder) = bind(source);
    let root = binder.files[0].root_scope;
    let lookup = |name: &str| {
        let id = binder.lookup_name(root, name).unwrap();
        binder.symbols.get(id).unwrap()
    };

    let def = lookup("Def");
    assert!(def.has_flags(symbol_flags::ALIAS));
    assert_eq!(def.import_module.as_deref(), Some("./dep"));
    assert_eq!(def.import_name.as_deref(), Some("default"));

    assert_eq!(lookup("a").import_name.as_deref(), Some("a"));
    assert_eq!(lookup("c").import_name.as_deref(), Some("b"));

    let ns = lookup("ns");
    assert_eq!(ns.import_module.as_deref(), Some("pkg"));
    assert_eq!(ns.import_name, None);

    let eq = lookup("eq");
    assert_eq!(eq.import_module.as_deref(), Some("./eq"));
    assert_eq!(eq.import_name, None);

    let specifiers: Vec<&str> = binder.files[0]
        .module_specifiers
        .iter()
        .map(|(s, _)| s.as_str())
        .collect();
    assert_eq!(specifiers, vec!["./dep", "pkg", "./eq"]);
}

#[test]
fn test_export_star_is_recorded_on_module() {
    let (_, binder) = bind("export * from \"./a\";\nexport * from \"./b\";");
    let module = binder.symbols.get(binder.files[0].module_symbol).unwrap();
    assert!(module.has_flags(symbol_flags::EXPORT_STAR));
    assert_eq!(module.star_exports, vec!["./a", "./b"]);
}

#[test]
fn test_ambient_modules_merge_by_specifier() {
    let source = r#"
declare module "virtual" { interface A {} }
declare module "virtual" { interface B {} }
"#;
    let (_, binder) = bind(source);
    let id = binder.ambient_modules.get("virtual").unwrap();
    let sym = binder.symbols.get(id).unwrap();
    assert_eq!(sym.declarations.len(), 2);
    let exports = sym.exports.as_deref().unwrap();
    assert!(exports.has("A"));
    assert!(exports.has("B"));
}

#[test]
fn test_binds_declarations_and_imports_of_one_file() {
    let (_arena, binder) = bind(
        "import { A } from \"./a\";\nexport interface B { a: A }\nexport { A };",
    );

    let mut exports = module_exports(&binder);
    exports.sort();
    assert_eq!(exports, vec!["A".to_string(), "B".to_string()]);
    let specifiers: Vec<&str> = binder.files[0]
        .module_specifiers
        .iter()
        .map(|(specifier, _)| specifier.as_str())
        .collect();
    assert_eq!(specifiers, vec!["./a"]);
    assert!(binder.files[0].is_external_module);
}
