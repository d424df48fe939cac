//! Scope construction and name lookup tests.

use dtsz_binder::lib_loader::load_default_lib;
use dtsz_binder::{BinderState, ContainerKind, FileId, NodeRef, symbol_flags};
use dtsz_parser::{NodeArena, NodeIndex, ParserState};
use dtsz_scanner::SyntaxKind;

fn parse(file_name: &str, source: &str) -> NodeArena {
    let mut parser = ParserState::new(file_name.to_string(), source.to_string());
    parser.parse_source_file();
    parser.into_arena()
}

fn bind(source: &str) -> (NodeArena, BinderState) {
    let arena = parse("test.d.ts", source);
    let mut binder = BinderState::new();
    binder.bind_source_file(FileId(0), &arena);
    (arena, binder)
}

/// The `nth` identifier node (0-based, source order) with the given text.
fn identifier(arena: &NodeArena, text: &str, nth: usize) -> NodeIndex {
    arena
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.kind == SyntaxKind::Identifier as u16)
        .map(|(i, _)| NodeIndex(i as u32))
        .filter(|&idx| arena.identifier_text(idx) == Some(text))
        .nth(nth)
        .unwrap_or_else(|| panic!("identifier {text} #{nth} not found"))
}

fn resolve(binder: &BinderState, arena: &NodeArena, node: NodeIndex) -> Option<u32> {
    let scope = binder.find_enclosing_scope(FileId(0), arena, node);
    let name = arena.identifier_text(node)?;
    binder.lookup_name(scope, name).map(|id| id.0)
}

#[test]
fn test_namespace_member_resolves_inside_namespace() {
    let source = "declare namespace Ns { interface Opt {} function f(o: Opt): void; }";
    let (arena, binder) = bind(source);
    let decl_name = identifier(&arena, "Opt", 0);
    let reference = identifier(&arena, "Opt", 1);
    let declared = binder.node_symbol(NodeRef::new(FileId(0), decl_name)).unwrap();
    assert_eq!(resolve(&binder, &arena, reference), Some(declared.0));
}

#[test]
fn test_type_parameter_shadows_global() {
    let source = "interface T {}\ndeclare function f<T>(x: T): T;";
    let (arena, binder) = bind(source);
    let reference = identifier(&arena, "T", 2);
    let scope = binder.find_enclosing_scope(FileId(0), &arena, reference);
    let id = binder.lookup_name(scope, "T").unwrap();
    let sym = binder.symbols.get(id).unwrap();
    assert_eq!(sym.flags, symbol_flags::TYPE_PARAMETER);
    assert_ne!(Some(id), binder.globals.get("T"));
}

#[test]
fn test_infer_declares_in_conditional_type() {
    let source = "type Elem<X> = X extends Array<infer E> ? E : never;";
    let (arena, binder) = bind(source);
    let reference = identifier(&arena, "E", 1);
    let scope = binder.find_enclosing_scope(FileId(0), &arena, reference);
    assert_eq!(
        binder.scope(scope).map(|s| s.kind),
        Some(ContainerKind::TypeLevel)
    );
    let id = binder.lookup_name(scope, "E").unwrap();
    assert_eq!(
        binder.symbols.get(id).unwrap().flags,
        symbol_flags::TYPE_PARAMETER
    );
}

#[test]
fn test_mapped_type_parameter_is_local() {
    let source = "type Keys<T> = { [K in keyof T]: K };";
    let (arena, binder) = bind(source);
    let reference = identifier(&arena, "K", 1);
    let id = resolve(&binder, &arena, reference).unwrap();
    let declared = identifier(&arena, "K", 0);
    let scope = binder.find_enclosing_scope(FileId(0), &arena, declared);
    assert_eq!(binder.lookup_name(scope, "K").map(|s| s.0), Some(id));
    assert!(binder.globals.get("K").is_none());
}

#[test]
fn test_script_declarations_are_global() {
    let (_, binder) = bind("declare const version: string;\ninterface Window {}");
    assert!(binder.globals.has("version"));
    assert!(binder.globals.has("Window"));
    assert!(!binder.files[0].is_external_module);
}

#[test]
fn test_module_declarations_are_local() {
    let (_, binder) = bind("declare const version: string;\nexport {};");
    assert!(binder.globals.is_empty());
    let root = binder.files[0].root_scope;
    assert!(binder.scope(root).unwrap().table.has("version"));
}

#[test]
fn test_declare_global_contributes_to_globals() {
    let source = "declare global { interface Window { app: string } }\nexport {};";
    let (_, binder) = bind(source);
    assert!(binder.globals.has("Window"));
    assert!(binder.files[0].is_external_module);
}

#[test]
fn test_merged_namespace_blocks_see_each_others_exports() {
    let source = r#"
declare namespace N { export interface A {} }
declare namespace N { export type B = A; }
"#;
    let (arena, binder) = bind(source);
    let declared = identifier(&arena, "A", 0);
    let reference = identifier(&arena, "A", 1);
    let declared = binder.node_symbol(NodeRef::new(FileId(0), declared)).unwrap();
    assert_eq!(resolve(&binder, &arena, reference), Some(declared.0));

    let n = binder.symbols.get(binder.globals.get("N").unwrap()).unwrap();
    assert_eq!(n.declarations.len(), 2);
}

#[test]
fn test_non_exported_namespace_member_is_not_exported() {
    let source = "declare namespace N { export interface A {} interface Hidden {} }";
    let (_, binder) = bind(source);
    let n = binder.symbols.get(binder.globals.get("N").unwrap()).unwrap();
    let exports = n.exports.as_deref().unwrap();
    assert!(exports.has("A"));
    assert!(!exports.has("Hidden"));
}

#[test]
fn test_dotted_namespace_nests_scopes() {
    let source = "declare namespace Outer.Inner { interface Leaf {} }";
    let (_, binder) = bind(source);
    let outer = binder.symbols.get(binder.globals.get("Outer").unwrap()).unwrap();
    let inner_id = outer.exports.as_deref().unwrap().get("Inner").unwrap();
    let inner = binder.symbols.get(inner_id).unwrap();
    assert!(inner.exports.as_deref().unwrap().has("Leaf"));
    assert_eq!(Some(inner.parent), binder.globals.get("Outer"));
}

#[test]
fn test_lookup_falls_back_to_lib() {
    let lib = load_default_lib();
    let arena = parse("app.d.ts", "export declare const p: Promise<string>;");
    let mut binder = BinderState::new();
    binder.bind_lib_file(FileId(1), &lib.arena);
    binder.bind_source_file(FileId(0), &arena);

    let reference = identifier(&arena, "Promise", 0);
    let scope = binder.find_enclosing_scope(FileId(0), &arena, reference);
    let found = binder.lookup_name(scope, "Promise");
    assert!(found.is_some());
    assert_eq!(found, binder.lib_globals.get("Promise"));
    assert!(binder.globals.is_empty());
}
