use thiserror::Error;

/// Errors emitted by the generation engine.
///
/// Only `InvalidSchema` and the destination errors (`Io`, `Csv`)
/// ever reach the caller of [`crate::GenerationEngine::run`]; the synthesis
/// variants are recovered inside the row loop.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("synthesis failed for '{column}': {message}")]
    Synthesis { column: String, message: String },
}

impl From<odsgen_core::Error> for GenerationError {
    fn from(err: odsgen_core::Error) -> Self {
        GenerationError::InvalidSchema(err.to_string())
    }
}
