//! Loading user-supplied table schemas from JSON or TOML files.

use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::json_schema::table_json_schema;
use crate::schema::TableSchema;
use crate::validation::validate_schema;

/// Load a table schema file, picking the format from the extension
/// (`.toml`, anything else is read as JSON).
///
/// The document is checked structurally against the table schema JSON
/// Schema first, then semantically with [`validate_schema`].
pub fn load_table_schema(path: &Path) -> Result<TableSchema> {
    let contents = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        parse_table_schema_toml(&contents)
    } else {
        parse_table_schema_json(&contents)
    }
}

pub fn parse_table_schema_json(contents: &str) -> Result<TableSchema> {
    let document: Value =
        serde_json::from_str(contents).map_err(|err| Error::Parse(err.to_string()))?;
    from_document(document)
}

pub fn parse_table_schema_toml(contents: &str) -> Result<TableSchema> {
    let document: Value = toml::from_str(contents).map_err(|err| Error::Parse(err.to_string()))?;
    from_document(document)
}

/// Structural issues of a schema document, as `path: message` strings.
pub fn check_document(document: &Value) -> Result<Vec<String>> {
    let format = serde_json::to_value(table_json_schema())
        .map_err(|err| Error::Parse(err.to_string()))?;
    let compiled = JSONSchema::compile(&format).map_err(|err| Error::Parse(err.to_string()))?;

    let mut issues = Vec::new();
    if let Err(errors) = compiled.validate(document) {
        for error in errors {
            let path = error.instance_path.to_string();
            let path = if path.is_empty() { "/".to_string() } else { path };
            issues.push(format!("{path}: {error}"));
        }
    }
    Ok(issues)
}

fn from_document(document: Value) -> Result<TableSchema> {
    let issues = check_document(&document)?;
    if !issues.is_empty() {
        return Err(Error::SchemaFile(issues));
    }
    let schema: TableSchema =
        serde_json::from_value(document).map_err(|err| Error::Parse(err.to_string()))?;
    validate_schema(&schema)?;
    Ok(schema)
}
