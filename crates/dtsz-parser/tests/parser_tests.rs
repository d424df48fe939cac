//! Parser tests for declaration-file syntax.

use dtsz_parser::parser::node::NodeArena;
use dtsz_parser::{NodeIndex, ParserState, modifier_flags, node_flags, syntax_kind_ext};

fn parse(source: &str) -> (NodeArena, NodeIndex, Vec<u32>) {
    let mut parser = ParserState::new("test.d.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    let codes = parser.get_diagnostics().iter().map(|d| d.code).collect();
    (parser.into_arena(), root, codes)
}

fn statements(arena: &NodeArena, root: NodeIndex) -> Vec<NodeIndex> {
    arena
        .statements_of(root)
        .map(|list| list.nodes.clone())
        .unwrap_or_default()
}

fn kind_of(arena: &NodeArena, index: NodeIndex) -> u16 {
    arena.get(index).map(|n| n.kind).unwrap_or(u16::MAX)
}

/// Collect every node index reachable from `root` in pre-order.
fn walk(arena: &NodeArena, root: NodeIndex) -> Vec<NodeIndex> {
    let mut out = vec![root];
    let mut i = 0;
    while i < out.len() {
        let children = arena.children_of(out[i]);
        out.splice(i + 1..i + 1, children);
        i += 1;
    }
    out
}

#[test]
fn test_basic_declarations_have_no_diagnostics() {
    let source = r#"
interface Foo<T extends object = {}> extends Bar<T>, Baz {
    readonly a: string;
    b?(x: number, ...rest: T[]): void;
    [key: string]: unknown;
    new (x: number): Foo<T>;
    <U>(u: U): U;
    get value(): number;
}
type Alias<T> = T extends string ? "s" : T extends number ? 1 : never;
declare class Cls<T> extends Base<T> implements I {
    private constructor(x: number);
    static create(): Cls<string>;
    protected readonly field: T;
}
declare function fn<T>(this: void, arg: T): arg is T;
declare enum Color { Red = 1, Green = "g", Blue }
declare const enum Flags { A = 1 << 0, B = A | 2 }
declare const value: number, other: string;
export {};
"#;
    let (arena, root, codes) = parse(source);
    assert!(codes.is_empty(), "unexpected diagnostics: {codes:?}");
    let kinds: Vec<u16> = statements(&arena, root)
        .into_iter()
        .map(|s| kind_of(&arena, s))
        .collect();
    assert_eq!(
        kinds,
        vec![
            syntax_kind_ext::INTERFACE_DECLARATION,
            syntax_kind_ext::TYPE_ALIAS_DECLARATION,
            syntax_kind_ext::CLASS_DECLARATION,
            syntax_kind_ext::FUNCTION_DECLARATION,
            syntax_kind_ext::ENUM_DECLARATION,
            syntax_kind_ext::ENUM_DECLARATION,
            syntax_kind_ext::VARIABLE_STATEMENT,
            syntax_kind_ext::EXPORT_DECLARATION,
        ]
    );
}

#[test]
fn test_modifier_flags_and_ambient_context() {
    let (arena, root, codes) = parse("export declare const enum E { A }\nexport default interface I {}\n");
    assert!(codes.is_empty(), "{codes:?}");
    let stmts = statements(&arena, root);
    let flags = arena.modifier_flags_of(stmts[0]);
    assert!(flags & modifier_flags::EXPORT != 0);
    assert!(flags & modifier_flags::CONST != 0);
    assert!(flags & modifier_flags::AMBIENT != 0);

    let flags = arena.modifier_flags_of(stmts[1]);
    assert!(flags & modifier_flags::DEFAULT != 0);
    // Every declaration in a .d.ts file is ambient.
    assert!(flags & modifier_flags::AMBIENT != 0);
}

#[test]
fn test_dotted_namespace_nests_module_declarations() {
    let (arena, root, codes) = parse("declare namespace A.B.C { interface X {} }");
    assert!(codes.is_empty(), "{codes:?}");
    let outer = statements(&arena, root)[0];
    let outer_data = arena.get_module(arena.get(outer).unwrap()).unwrap();
    assert_eq!(arena.identifier_text(outer_data.name), Some("A"));

    let middle = outer_data.body;
    let middle_node = arena.get(middle).unwrap();
    assert_eq!(middle_node.kind, syntax_kind_ext::MODULE_DECLARATION);
    assert!(middle_node.flags & node_flags::NESTED_NAMESPACE != 0);
    let middle_data = arena.get_module(middle_node).unwrap();
    assert_eq!(arena.identifier_text(middle_data.name), Some("B"));

    let inner = arena.get_module(arena.get(middle_data.body).unwrap()).unwrap();
    assert_eq!(arena.identifier_text(inner.name), Some("C"));
    assert_eq!(kind_of(&arena, inner.body), syntax_kind_ext::MODULE_BLOCK);
    assert_eq!(arena.parent_of(middle), outer);
}

#[test]
fn test_ambient_module_and_global_augmentation() {
    let source = "declare module \"pkg\" {\n  export const x: number;\n}\ndeclare module \"short\";\ndeclare global {\n  interface Window { a: 1 }\n}\n";
    let (arena, root, codes) = parse(source);
    assert!(codes.is_empty(), "{codes:?}");
    let stmts = statements(&arena, root);
    let pkg = arena.get_module(arena.get(stmts[0]).unwrap()).unwrap();
    assert_eq!(arena.literal_text(pkg.name), Some("pkg"));
    let short = arena.get_module(arena.get(stmts[1]).unwrap()).unwrap();
    assert!(short.body.is_none());
    let global = arena.get(stmts[2]).unwrap();
    assert!(global.flags & node_flags::GLOBAL_AUGMENTATION != 0);
}

#[test]
fn test_import_forms() {
    let source = r#"
import Default, { a, b as c, type d } from "./mod";
import * as ns from "ns";
import type { T } from "./types";
import "side-effect";
import Eq = require("eq");
import Alias = ns.inner.Thing;
export import Re = ns.Other;
"#;
    let (arena, root, codes) = parse(source);
    assert!(codes.is_empty(), "{codes:?}");
    let stmts = statements(&arena, root);
    assert_eq!(stmts.len(), 7);

    let decl = arena.get_import_decl(arena.get(stmts[0]).unwrap()).unwrap();
    let clause = arena.get_import_clause(arena.get(decl.import_clause).unwrap()).unwrap();
    assert_eq!(arena.identifier_text(clause.name), Some("Default"));
    let named = arena.get_named_imports(arena.get(clause.named_bindings).unwrap()).unwrap();
    assert_eq!(named.elements.len(), 3);
    let renamed = arena.get_specifier(arena.get(named.elements.nodes[1]).unwrap()).unwrap();
    assert_eq!(arena.identifier_text(renamed.property_name), Some("b"));
    assert_eq!(arena.identifier_text(renamed.name), Some("c"));
    let type_only = arena.get_specifier(arena.get(named.elements.nodes[2]).unwrap()).unwrap();
    assert!(type_only.is_type_only);
    assert_eq!(arena.literal_text(decl.module_specifier), Some("./mod"));

    let ns_clause = arena
        .get_import_decl(arena.get(stmts[1]).unwrap())
        .and_then(|d| arena.get_import_clause(arena.get(d.import_clause).unwrap()))
        .unwrap();
    assert_eq!(
        kind_of(&arena, ns_clause.named_bindings),
        syntax_kind_ext::NAMESPACE_IMPORT
    );

    let side_effect = arena.get_import_decl(arena.get(stmts[3]).unwrap()).unwrap();
    assert!(side_effect.import_clause.is_none());

    let eq = arena.get_import_equals(arena.get(stmts[4]).unwrap()).unwrap();
    assert_eq!(
        kind_of(&arena, eq.module_reference),
        syntax_kind_ext::EXTERNAL_MODULE_REFERENCE
    );
    let alias = arena.get_import_equals(arena.get(stmts[5]).unwrap()).unwrap();
    assert_eq!(kind_of(&arena, alias.module_reference), syntax_kind_ext::QUALIFIED_NAME);
    assert!(arena.has_modifier(stmts[6], modifier_flags::EXPORT));
}

#[test]
fn test_export_forms() {
    let source = r#"
export * from "./a";
export * as ns from "./b";
export { x, y as z } from "./c";
export type { T };
export default Foo.Bar;
export = Thing;
export as namespace Lib;
export default function (): void;
"#;
    let (arena, root, codes) = parse(source);
    assert!(codes.is_empty(), "{codes:?}");
    let kinds: Vec<u16> = statements(&arena, root)
        .into_iter()
        .map(|s| kind_of(&arena, s))
        .collect();
    assert_eq!(
        kinds,
        vec![
            syntax_kind_ext::EXPORT_DECLARATION,
            syntax_kind_ext::EXPORT_DECLARATION,
            syntax_kind_ext::EXPORT_DECLARATION,
            syntax_kind_ext::EXPORT_DECLARATION,
            syntax_kind_ext::EXPORT_ASSIGNMENT,
            syntax_kind_ext::EXPORT_ASSIGNMENT,
            syntax_kind_ext::NAMESPACE_EXPORT_DECLARATION,
            syntax_kind_ext::FUNCTION_DECLARATION,
        ]
    );
    let stmts = statements(&arena, root);
    let default_export = arena
        .get_export_assignment(arena.get(stmts[4]).unwrap())
        .unwrap();
    assert!(!default_export.is_export_equals);
    assert_eq!(
        kind_of(&arena, default_export.expression),
        syntax_kind_ext::QUALIFIED_NAME
    );
    let type_only = arena.get_export_decl(arena.get(stmts[3]).unwrap()).unwrap();
    assert!(type_only.is_type_only);
    assert!(type_only.module_specifier.is_none());
    let anonymous = arena.get_function(arena.get(stmts[7]).unwrap()).unwrap();
    assert!(anonymous.name.is_none());
}

#[test]
fn test_non_entity_default_export_is_opaque() {
    let (arena, root, codes) = parse("declare const _default: { a: number };\nexport default _default;\nexport default 42 + foo(1, [2]);\n");
    assert!(codes.is_empty(), "{codes:?}");
    let stmts = statements(&arena, root);
    let opaque = arena
        .get_export_assignment(arena.get(stmts[2]).unwrap())
        .unwrap();
    assert_eq!(
        kind_of(&arena, opaque.expression),
        syntax_kind_ext::UNPARSED_EXPRESSION
    );
    assert_eq!(arena.node_text(opaque.expression), "42 + foo(1, [2])");
}

#[test]
fn test_type_forms_parse_cleanly() {
    let source = r#"
type A = { readonly [K in keyof T as `get${Capitalize<K & string>}`]-?: () => T[K] };
type B = [first: string, second?: number, ...rest: boolean[]];
type C = typeof import("./mod").Thing<string>;
type D = import("./mod").Other;
type E = T extends [infer H extends string, ...infer R] ? H : never;
type F = abstract new (...args: any[]) => object;
type G = unique symbol | -1 | 10n | `plain` | null | undefined;
type H = (keyof typeof obj)[number];
type I = asserts;
declare function isFoo(x: unknown): asserts x is Foo;
"#;
    let (arena, root, codes) = parse(source);
    assert!(codes.is_empty(), "unexpected diagnostics: {codes:?}");
    let all = walk(&arena, root);
    let count = |kind: u16| all.iter().filter(|&&n| kind_of(&arena, n) == kind).count();
    assert_eq!(count(syntax_kind_ext::MAPPED_TYPE), 1);
    assert_eq!(count(syntax_kind_ext::TEMPLATE_LITERAL_TYPE), 1);
    assert_eq!(count(syntax_kind_ext::NAMED_TUPLE_MEMBER), 3);
    assert_eq!(count(syntax_kind_ext::IMPORT_TYPE), 2);
    assert_eq!(count(syntax_kind_ext::INFER_TYPE), 2);
    assert_eq!(count(syntax_kind_ext::CONSTRUCTOR_TYPE), 1);
    assert_eq!(count(syntax_kind_ext::TYPE_PREDICATE), 1);
    assert_eq!(count(syntax_kind_ext::TYPE_QUERY), 1);
}

#[test]
fn test_infer_constraint_rolls_back_before_question() {
    // `infer U extends string ? 1 : 0` is a conditional on the infer, not a
    // constraint.
    let (arena, root, codes) = parse("type X<T> = T extends (infer U extends string ? 1 : 0) ? U : never;");
    assert!(codes.is_empty(), "{codes:?}");
    let all = walk(&arena, root);
    let infer = all
        .iter()
        .copied()
        .find(|&n| kind_of(&arena, n) == syntax_kind_ext::INFER_TYPE)
        .unwrap();
    let param = arena.get_wrapped(arena.get(infer).unwrap()).unwrap().inner;
    let data = arena.get_type_parameter(arena.get(param).unwrap()).unwrap();
    assert!(data.constraint.is_none());
}

#[test]
fn test_parent_links_cover_every_child() {
    let (arena, root, _) = parse("declare namespace N { function f<T>(x: T): Array<T>; }");
    for node in walk(&arena, root) {
        for child in arena.children_of(node) {
            assert_eq!(arena.parent_of(child), node);
        }
    }
    assert!(arena.parent_of(root).is_none());
}

#[test]
fn test_node_positions_exclude_leading_trivia() {
    let source = "/** doc */\nexport interface Foo {}\n";
    let (arena, root, _) = parse(source);
    let stmt = statements(&arena, root)[0];
    let node = arena.get(stmt).unwrap();
    assert_eq!(node.pos as usize, source.find("export").unwrap());
    assert_eq!(arena.node_text(stmt), "export interface Foo {}");
}

#[test]
fn test_keyword_property_names_and_modifier_names() {
    let source = "interface K { readonly: boolean; default: string; static(): void; get: number; new: 1 }";
    let (arena, root, codes) = parse(source);
    assert!(codes.is_empty(), "{codes:?}");
    let iface = arena
        .get_interface(arena.get(statements(&arena, root)[0]).unwrap())
        .unwrap();
    let names: Vec<&str> = iface
        .members
        .iter()
        .filter_map(|m| arena.identifier_text(arena.declaration_name(m)))
        .collect();
    assert_eq!(names, vec!["readonly", "default", "static", "get", "new"]);
}

#[test]
fn test_recovery_reports_declaration_expected() {
    let (arena, root, codes) = parse("interface A {}\n= 1;\ninterface B {}\n");
    assert!(codes.contains(&1128), "{codes:?}");
    assert_eq!(statements(&arena, root).len(), 2);
}

#[test]
fn test_missing_identifier_reports_1003() {
    let (arena, root, codes) = parse("interface {}");
    assert!(codes.contains(&1003), "{codes:?}");
    let iface = arena
        .get_interface(arena.get(statements(&arena, root)[0]).unwrap())
        .unwrap();
    assert!(arena.get(iface.name).unwrap().is_missing());
}

#[test]
fn test_unterminated_string_is_reported() {
    let (_, _, codes) = parse("declare module \"oops\n");
    assert!(codes.contains(&1002), "{codes:?}");
}

#[test]
fn test_computed_property_names_are_entity_names() {
    let (arena, root, codes) = parse("interface It { [Symbol.iterator](): Iterator<number>; }");
    assert!(codes.is_empty(), "{codes:?}");
    let all = walk(&arena, root);
    let computed = all
        .iter()
        .copied()
        .find(|&n| kind_of(&arena, n) == syntax_kind_ext::COMPUTED_PROPERTY_NAME)
        .unwrap();
    let inner = arena.get_wrapped(arena.get(computed).unwrap()).unwrap().inner;
    assert_eq!(kind_of(&arena, inner), syntax_kind_ext::QUALIFIED_NAME);
    assert_eq!(arena.node_text(inner), "Symbol.iterator");
}
