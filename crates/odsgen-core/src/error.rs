use thiserror::Error;

/// Core error type shared across odsgen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The table schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// No built-in dataset with that name.
    #[error("unknown dataset preset: {0}")]
    UnknownPreset(String),
    /// A schema file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A schema file is not valid JSON or TOML.
    #[error("cannot parse schema file: {0}")]
    Parse(String),
    /// A schema file does not match the table schema format.
    #[error("schema file does not match the table schema format: {}", .0.join("; "))]
    SchemaFile(Vec<String>),
}

/// Convenience alias for results returned by odsgen crates.
pub type Result<T> = std::result::Result<T, Error>;
