use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::schema::TableSchema;

/// Emit the JSON Schema for table schema files.
pub fn table_json_schema() -> RootSchema {
    schema_for!(TableSchema)
}
