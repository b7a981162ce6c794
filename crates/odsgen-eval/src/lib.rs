//! Read-back audit of generated CSV files against their table schema.

pub mod engine;
pub mod errors;
pub mod model;
pub mod report;

pub use engine::AuditEngine;
pub use errors::EvalError;
pub use model::{AuditOptions, AuditReport, AuditResult, Violation, ViolationCode};
pub use report::render_report;
