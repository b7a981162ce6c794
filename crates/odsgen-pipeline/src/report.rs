use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Success,
    Failed,
    /// Not run because an upstream task failed.
    UpstreamFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
    pub task_id: String,
    pub state: TaskState,
    pub attempts: u32,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRunReport {
    pub dag_id: String,
    pub run_id: String,
    pub execution_date: DateTime<Utc>,
    pub state: RunState,
    pub tasks: Vec<TaskRun>,
    pub duration_ms: u64,
}

impl PipelineRunReport {
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Success
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskRun> {
        self.tasks.iter().find(|task| task.task_id == task_id)
    }

    /// First task that exhausted its retries.
    pub fn failed_task(&self) -> Option<&TaskRun> {
        self.tasks.iter().find(|task| task.state == TaskState::Failed)
    }
}
