//! Five-step simulated ingestion chain and its sequential runner.

pub mod definition;
pub mod errors;
pub mod report;
pub mod runner;
pub mod task;

pub use definition::{DEFAULT_TASKS, DefaultArgs, IngestionParams, PipelineDefinition};
pub use errors::{PipelineError, TaskError};
pub use report::{PipelineRunReport, RunState, TaskRun, TaskState};
pub use runner::PipelineRunner;
pub use task::{Task, TaskContext};
