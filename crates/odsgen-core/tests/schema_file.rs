use std::fs;
use std::path::PathBuf;

use odsgen_core::{
    Dataset, Error, load_table_schema, parse_table_schema_json, parse_table_schema_toml,
};

#[test]
fn preset_json_file_loads() {
    let schema = Dataset::Contracts.schema();
    let dir = temp_dir("json");
    let path = dir.join("contracts.json");
    fs::write(&path, serde_json::to_vec_pretty(&schema).expect("json")).expect("write");

    let loaded = load_table_schema(&path).expect("load");
    assert_eq!(loaded, schema);
}

#[test]
fn toml_file_loads() {
    let dir = temp_dir("toml");
    let path = dir.join("people.toml");
    fs::write(
        &path,
        r#"
name = "people"

[[columns]]
name = "id"
type = "int64"
required = true
min_val = 1.0
generator = { kind = "row_id" }

[[columns]]
name = "ville"
type = "string"
max_length = 20
generator = { kind = "choice", list = "villes" }

[lists]
villes = ["Paris", "Lyon"]
"#,
    )
    .expect("write");

    let loaded = load_table_schema(&path).expect("load");
    assert_eq!(loaded.header(), vec!["id", "ville"]);
    assert_eq!(loaded.lists["villes"], vec!["Paris", "Lyon"]);
}

#[test]
fn unknown_generator_kind_fails_structural_check() {
    let result = parse_table_schema_json(
        r#"{"name": "t", "columns": [{"name": "a", "type": "string", "generator": {"kind": "iban"}}]}"#,
    );
    match result {
        Err(Error::SchemaFile(issues)) => assert!(!issues.is_empty()),
        other => panic!("expected structural issues, got {other:?}"),
    }
}

#[test]
fn missing_columns_key_is_reported() {
    let result = parse_table_schema_json(r#"{"name": "t"}"#);
    assert!(matches!(result, Err(Error::SchemaFile(_))));
}

#[test]
fn semantic_errors_surface_after_structural_check() {
    let result = parse_table_schema_toml(
        r#"
name = "t"

[[columns]]
name = "ville"
type = "string"
generator = { kind = "choice", list = "villes" }
"#,
    );
    assert!(matches!(result, Err(Error::InvalidSchema(message)) if message.contains("not declared")));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        parse_table_schema_json("{ not json"),
        Err(Error::Parse(_))
    ));
}

fn temp_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("odsgen_core_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
