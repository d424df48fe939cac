//! End-to-end bundling through the parser and binder.

use dtsz_binder::{Program, ProgramBuilder};
use dtsz_bundler::{BundleError, BundleOptions, BundleOutput, RenamedSymbol, bundle};
use dtsz_common::diagnostic_codes;
use std::path::Path;

fn program(files: &[(&str, &str)]) -> Program {
    let mut builder = ProgramBuilder::new();
    for (name, text) in files {
        builder.add_file(name, *text);
    }
    builder.build()
}

fn quiet() -> BundleOptions {
    BundleOptions {
        no_banner: true,
        ..BundleOptions::default()
    }
}

fn bundle_with(files: &[(&str, &str)], options: &BundleOptions) -> BundleOutput {
    let program = program(files);
    bundle(&program, Path::new(files[0].0), options).expect("bundle")
}

fn codes(output: &BundleOutput) -> Vec<u32> {
    output.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn test_colliding_declarations_from_two_modules() {
    let output = bundle_with(
        &[
            (
                "/src/index.d.ts",
                "import { Options as AOptions } from \"./a\";\n\
                 import { Options as BOptions } from \"./b\";\n\
                 export interface Config { a: AOptions; b: BOptions; }",
            ),
            ("/src/a.d.ts", "export interface Options { x: number }"),
            ("/src/b.d.ts", "export interface Options { y: string }"),
        ],
        &quiet(),
    );

    assert_eq!(
        output.text,
        "export interface Options { x: number }\n\
         interface Options$1 { y: string }\n\
         export interface Config { a: Options; b: Options$1; }\n"
    );
    assert_eq!(
        output.renamed,
        vec![RenamedSymbol {
            file: "/src/b.d.ts".to_string(),
            original: "Options".to_string(),
            name: "Options$1".to_string(),
        }]
    );
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
}

#[test]
fn test_referenced_types_stay_private_when_not_exported() {
    let options = BundleOptions {
        export_referenced_types: false,
        ..quiet()
    };
    let output = bundle_with(
        &[
            (
                "/src/index.d.ts",
                "import { Options } from \"./a\";\nexport interface Config { a: Options }",
            ),
            ("/src/a.d.ts", "export interface Options { x: number }"),
        ],
        &options,
    );

    assert_eq!(
        output.text,
        "interface Options { x: number }\nexport interface Config { a: Options }\n"
    );
}

#[test]
fn test_value_declarations_get_declare() {
    let output = bundle_with(
        &[
            ("/src/index.d.ts", "export { make } from \"./factory\";"),
            (
                "/src/factory.d.ts",
                "import { Widget } from \"./widget\";\nexport declare function make(): Widget;",
            ),
            ("/src/widget.d.ts", "export declare class Widget {}"),
        ],
        &quiet(),
    );

    assert_eq!(
        output.text,
        "export declare class Widget {}\nexport declare function make(): Widget;\n"
    );
}

#[test]
fn test_external_imports_are_kept_and_grouped() {
    let output = bundle_with(
        &[
            ("/src/index.d.ts", "export * from \"./a\";"),
            (
                "/src/a.d.ts",
                "import { Component } from \"react\";\n\
                 import { ReactNode } from \"react\";\n\
                 export declare class Button extends Component {\n    label: ReactNode;\n}",
            ),
        ],
        &quiet(),
    );

    assert_eq!(
        output.text,
        "import { Component, ReactNode } from \"react\";\n\n\
         export declare class Button extends Component {\n    label: ReactNode;\n}\n"
    );
}

#[test]
fn test_local_declaration_yields_to_external_import() {
    let output = bundle_with(
        &[
            (
                "/src/index.d.ts",
                "export { Props } from \"./a\";\nexport { Component as LocalComponent } from \"./b\";",
            ),
            (
                "/src/a.d.ts",
                "import { Component } from \"react\";\nexport interface Props { base: Component }",
            ),
            ("/src/b.d.ts", "export interface Component { local: boolean }"),
        ],
        &quiet(),
    );

    assert_eq!(
        output.text,
        "import { Component } from \"react\";\n\n\
         export interface Props { base: Component }\n\
         interface Component$1 { local: boolean }\n\n\
         export { Component$1 as LocalComponent };\n"
    );
}

#[test]
fn test_qualified_references_through_renamed_namespaces() {
    let output = bundle_with(
        &[
            (
                "/src/index.d.ts",
                "import { Ns as A } from \"./a\";\n\
                 import { Ns as B } from \"./b\";\n\
                 export interface Both { a: A.Opt; b: B.Opt; }",
            ),
            ("/src/a.d.ts", "export declare namespace Ns { interface Opt { a: string } }"),
            ("/src/b.d.ts", "export declare namespace Ns { interface Opt { b: number } }"),
        ],
        &quiet(),
    );

    assert_eq!(
        output.text,
        "export declare namespace Ns { interface Opt { a: string } }\n\
         declare namespace Ns$1 { interface Opt { b: number } }\n\
         export interface Both { a: Ns.Opt; b: Ns$1.Opt; }\n"
    );
}

#[test]
fn test_reference_inside_namespace_is_untouched() {
    let output = bundle_with(
        &[
            ("/src/index.d.ts", "export { Ns } from \"./a\";\nexport { Opt } from \"./b\";"),
            (
                "/src/a.d.ts",
                "export declare namespace Ns {\n    interface Opt {}\n    interface Uses { o: Opt }\n}",
            ),
            ("/src/b.d.ts", "export interface Opt { top: boolean }"),
        ],
        &quiet(),
    );

    assert!(output.text.contains("interface Uses { o: Opt }"), "{}", output.text);
    assert!(output.text.contains("export interface Opt { top: boolean }"), "{}", output.text);
}

#[test]
fn test_anonymous_default_export_is_named() {
    let output = bundle_with(
        &[
            ("/src/index.d.ts", "export { default as Widget } from \"./widget\";"),
            ("/src/widget.d.ts", "export default class {\n    size: number;\n}"),
        ],
        &quiet(),
    );

    assert_eq!(
        output.text,
        "declare class _default {\n    size: number;\n}\n\nexport { _default as Widget };\n"
    );
}

#[test]
fn test_export_equals_entry() {
    let output = bundle_with(
        &[(
            "/src/index.d.ts",
            "declare namespace Lib { interface Item {} }\nexport = Lib;",
        )],
        &quiet(),
    );

    assert_eq!(
        output.text,
        "declare namespace Lib { interface Item {} }\n\nexport = Lib;\n"
    );
}

#[test]
fn test_declaration_shadowing_a_lib_global_is_renamed() {
    let output = bundle_with(
        &[(
            "/src/index.d.ts",
            "export interface Map { custom: boolean }\n\
             export declare const builtin: Promise<Map>;",
        )],
        &quiet(),
    );

    assert_eq!(
        output.text,
        "interface Map$1 { custom: boolean }\n\
         export declare const builtin: Promise<Map$1>;\n\n\
         export { Map$1 as Map };\n"
    );
    assert_eq!(output.renamed.len(), 1);
    assert_eq!(output.renamed[0].name, "Map$1");
}

#[test]
fn test_import_types_are_flattened() {
    let output = bundle_with(
        &[
            (
                "/src/index.d.ts",
                "export declare const thing: import(\"./a\").Thing;\n\
                 export type Value = typeof import(\"./b\").value;\n\
                 export declare const element: import(\"react\").ReactElement;",
            ),
            ("/src/a.d.ts", "export interface Thing { id: string }"),
            ("/src/b.d.ts", "export declare const value: number;"),
        ],
        &quiet(),
    );

    assert!(output.text.starts_with("import { ReactElement } from \"react\";\n\n"), "{}", output.text);
    assert!(output.text.contains("export declare const thing: Thing;"), "{}", output.text);
    assert!(output.text.contains("export type Value = typeof value;"), "{}", output.text);
    assert!(output.text.contains("export declare const element: ReactElement;"), "{}", output.text);
    assert!(output.text.contains("export interface Thing { id: string }"), "{}", output.text);
    assert!(output.text.contains("export declare const value: number;"), "{}", output.text);
    assert!(!output.text.contains("import(\""), "{}", output.text);
}

#[test]
fn test_module_import_type_is_reported() {
    let output = bundle_with(
        &[
            ("/src/index.d.ts", "export declare const mod: typeof import(\"./a\");"),
            ("/src/a.d.ts", "export declare const a: number;"),
        ],
        &quiet(),
    );

    assert!(codes(&output).contains(&diagnostic_codes::NAMESPACE_IMPORT_NOT_FLATTENED));
    assert!(output.text.contains("typeof import(\"./a\")"), "{}", output.text);
}

#[test]
fn test_circular_modules_are_bundled_with_a_warning() {
    let output = bundle_with(
        &[
            ("/src/index.d.ts", "export * from \"./a\";"),
            (
                "/src/a.d.ts",
                "import { B } from \"./b\";\nexport interface A { b: B }",
            ),
            (
                "/src/b.d.ts",
                "import { A } from \"./a\";\nexport interface B { a: A }",
            ),
        ],
        &quiet(),
    );

    assert_eq!(codes(&output), vec![diagnostic_codes::CIRCULAR_MODULE_DEPENDENCY]);
    assert!(output.diagnostics[0].message_text.contains("/src/a.d.ts -> /src/b.d.ts -> /src/a.d.ts"));
    assert_eq!(
        output.text,
        "export interface B { a: A }\nexport interface A { b: B }\n"
    );
}

#[test]
fn test_namespace_reexport_is_unsupported() {
    let output = bundle_with(
        &[
            ("/src/index.d.ts", "import * as ns from \"./a\";\nexport { ns };"),
            ("/src/a.d.ts", "export declare const a: number;"),
        ],
        &quiet(),
    );

    assert_eq!(codes(&output), vec![diagnostic_codes::UNSUPPORTED_EXPORT]);
    assert_eq!(output.text, "export {};\n");
}

#[test]
fn test_unresolved_export_is_reported() {
    let output = bundle_with(
        &[("/src/index.d.ts", "export { Missing } from \"./missing\";")],
        &quiet(),
    );

    assert!(codes(&output).contains(&diagnostic_codes::UNRESOLVED_EXPORT));
}

#[test]
fn test_external_star_exports_are_preserved() {
    let output = bundle_with(
        &[
            ("/src/index.d.ts", "export * from \"./a\";\nexport * from \"lodash\";"),
            ("/src/a.d.ts", "export interface A {}"),
        ],
        &quiet(),
    );

    assert_eq!(
        output.text,
        "export interface A {}\n\nexport * from \"lodash\";\n"
    );
}

#[test]
fn test_sort_nodes_orders_by_name() {
    let files = [
        ("/src/index.d.ts", "export { Zeta, Alpha } from \"./a\";"),
        ("/src/a.d.ts", "export interface Zeta {}\nexport interface Alpha {}"),
    ];
    let unsorted = bundle_with(&files, &quiet());
    assert_eq!(unsorted.text, "export interface Zeta {}\nexport interface Alpha {}\n");

    let sorted = bundle_with(
        &files,
        &BundleOptions {
            sort_nodes: true,
            ..quiet()
        },
    );
    assert_eq!(sorted.text, "export interface Alpha {}\nexport interface Zeta {}\n");
}

#[test]
fn test_jsdoc_and_banner() {
    let output = bundle_with(
        &[(
            "/src/index.d.ts",
            "/** The answer. */\nexport declare const answer: number;",
        )],
        &BundleOptions::default(),
    );

    assert!(output.text.starts_with("// Generated by dtsz v"), "{}", output.text);
    assert!(
        output.text.ends_with("\n\n/** The answer. */\nexport declare const answer: number;\n"),
        "{}",
        output.text
    );
}

#[test]
fn test_declare_global_blocks_are_optional() {
    let files = [
        ("/src/index.d.ts", "export * from \"./a\";"),
        (
            "/src/a.d.ts",
            "export interface A {}\ndeclare global { interface Window { a: A } }",
        ),
    ];
    let without = bundle_with(&files, &quiet());
    assert!(!without.text.contains("declare global"), "{}", without.text);

    let with = bundle_with(
        &files,
        &BundleOptions {
            inline_declare_global: true,
            ..quiet()
        },
    );
    assert!(
        with.text.contains("declare global { interface Window { a: A } }"),
        "{}",
        with.text
    );
}

#[test]
fn test_entry_must_be_a_program_module() {
    let program = program(&[
        ("/src/index.d.ts", "export interface A {}"),
        ("/src/script.d.ts", "declare const x: number;"),
    ]);

    assert!(matches!(
        bundle(&program, Path::new("/src/other.d.ts"), &quiet()),
        Err(BundleError::EntryNotFound(_))
    ));
    assert!(matches!(
        bundle(&program, Path::new("/src/script.d.ts"), &quiet()),
        Err(BundleError::EntryNotAModule(_))
    ));
}
