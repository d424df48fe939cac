use super::*;

#[test]
fn parses_entries_with_camel_case_keys() {
    let config = parse_config(
        r#"{
            "entries": [
                {
                    "filePath": "src/index.d.ts",
                    "outFile": "dist/index.d.ts",
                    "output": { "sortNodes": true, "exportReferencedTypes": false }
                },
                { "filePath": "src/other.d.ts" }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(config.entries.len(), 2);
    let first = &config.entries[0];
    assert_eq!(first.file_path, PathBuf::from("src/index.d.ts"));
    assert_eq!(first.out_file, Some(PathBuf::from("dist/index.d.ts")));
    let options = first.output.to_options();
    assert!(options.sort_nodes);
    assert!(!options.export_referenced_types);
    assert!(!options.no_banner);

    let second = &config.entries[1];
    assert_eq!(second.out_file, None);
    assert_eq!(second.output.to_options(), BundleOptions::default());
}

#[test]
fn accepts_string_booleans() {
    let config = parse_config(
        r#"{ "entries": [ { "filePath": "a.d.ts",
            "output": { "noBanner": "true", "inlineDeclareGlobals": "false" } } ] }"#,
    )
    .unwrap();

    let output = &config.entries[0].output;
    assert_eq!(output.no_banner, Some(true));
    assert_eq!(output.inline_declare_globals, Some(false));
}

#[test]
fn rejects_unknown_boolean_strings() {
    let err = parse_config(
        r#"{ "entries": [ { "filePath": "a.d.ts", "output": { "sortNodes": "maybe" } } ] }"#,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("invalid boolean value: 'maybe'"));
}

#[test]
fn missing_entries_is_empty() {
    let config = parse_config("{}").unwrap();
    assert!(config.entries.is_empty());
}

#[test]
fn load_config_resolves_paths_against_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dtsz.json");
    std::fs::write(
        &path,
        r#"{ "entries": [ { "filePath": "src/index.d.ts", "outFile": "out/index.d.ts" } ] }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.entries[0].file_path, dir.path().join("src/index.d.ts"));
    assert_eq!(
        config.entries[0].out_file,
        Some(dir.path().join("out/index.d.ts"))
    );
}

#[test]
fn load_config_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().starts_with("failed to read config"));
}
