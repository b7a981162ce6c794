//! Schema-bounded synthetic CSV generation.
//!
//! A [`TableSchema`](odsgen_core::TableSchema) drives one parameterized
//! record generator; [`GenerationEngine`] writes its records to a
//! `;`-delimited file until the file reaches a target size.

pub mod catalog;
pub mod engine;
pub mod errors;
pub mod faker_rs;
pub mod fields;
pub mod generators;
pub mod model;
pub mod output;
pub mod session;

pub use catalog::GenerationCatalog;
pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use faker_rs::LocaleKey;
pub use fields::{DELIMITER, FieldError, FieldRules, FieldValue, clean_field, validate_field};
pub use generators::{GeneratedValue, RowSynthesizer};
pub use model::{Clock, GenerateOptions, GenerationReport, TargetSize};
pub use session::{Record, RecordGenerator};
