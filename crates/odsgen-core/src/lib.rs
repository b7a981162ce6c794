//! Core contracts and helpers for odsgen.
//!
//! This crate defines the column schema contract, its validation rules and
//! the built-in ODS table presets shared by the generator, the audit and
//! the CLI.

pub mod error;
pub mod graph;
pub mod json_schema;
pub mod presets;
pub mod schema;
pub mod schema_file;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use graph::derivation_order;
pub use json_schema::table_json_schema;
pub use presets::{Dataset, contracts_schema, employees_schema};
pub use schema::{ColumnSpec, DATE_FORMAT, TableSchema, parse_date};
pub use schema_file::{load_table_schema, parse_table_schema_json, parse_table_schema_toml};
pub use types::{FieldGenerator, FieldType};
pub use validation::validate_schema;
