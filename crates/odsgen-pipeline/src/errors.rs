use thiserror::Error;

/// Errors emitted while building or running a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline definition: {0}")]
    InvalidDefinition(String),
    #[error("no implementation registered for task '{0}'")]
    UnknownTask(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single task attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TaskError(pub String);

impl TaskError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
