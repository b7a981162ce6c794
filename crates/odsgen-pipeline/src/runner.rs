use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};

use crate::definition::PipelineDefinition;
use crate::errors::{PipelineError, Result, TaskError};
use crate::report::{PipelineRunReport, RunState, TaskRun, TaskState};
use crate::task::{Task, TaskContext, default_tasks};

/// Executes a [`PipelineDefinition`] strictly in order.
///
/// A failing task is retried `default_args.retries` times with
/// `retry_delay` in between. Once it runs out of attempts the run fails and
/// every downstream task is marked `upstream_failed`.
pub struct PipelineRunner {
    definition: PipelineDefinition,
    tasks: HashMap<String, Box<dyn Task>>,
    retry_delay: Duration,
}

impl PipelineRunner {
    /// Runner with the five built-in tasks registered.
    pub fn new(definition: PipelineDefinition) -> Self {
        let retry_delay = definition.default_args.retry_delay();
        let mut runner = Self {
            definition,
            tasks: HashMap::new(),
            retry_delay,
        };
        for task in default_tasks() {
            runner = runner.with_task(task);
        }
        runner
    }

    /// Register (or replace) the implementation of a task id.
    pub fn with_task(mut self, task: Box<dyn Task>) -> Self {
        self.tasks.insert(task.id().to_string(), task);
        self
    }

    /// Override the delay between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn definition(&self) -> &PipelineDefinition {
        &self.definition
    }

    pub fn run(&self) -> Result<PipelineRunReport> {
        self.definition.validate()?;
        for task_id in &self.definition.tasks {
            if !self.tasks.contains_key(task_id) {
                return Err(PipelineError::UnknownTask(task_id.clone()));
            }
        }

        let start = Instant::now();
        let execution_date = Utc::now();
        let run_id = format!(
            "manual__{}_{}",
            execution_date.format("%Y-%m-%dT%H:%M:%S%.6f%:z"),
            uuid::Uuid::new_v4().simple()
        );
        let max_attempts = self.definition.default_args.retries.saturating_add(1);

        info!(
            dag_id = %self.definition.dag_id,
            run_id = %run_id,
            tasks = self.definition.tasks.len(),
            "pipeline run started"
        );

        let mut runs = Vec::with_capacity(self.definition.tasks.len());
        let mut failed = false;

        for task_id in &self.definition.tasks {
            if failed {
                runs.push(TaskRun {
                    task_id: task_id.clone(),
                    state: TaskState::UpstreamFailed,
                    attempts: 0,
                    duration_ms: 0,
                    output: None,
                    error: None,
                });
                continue;
            }

            let Some(task) = self.tasks.get(task_id) else {
                return Err(PipelineError::UnknownTask(task_id.clone()));
            };
            let task_start = Instant::now();
            let mut attempt = 0;
            let outcome = loop {
                attempt += 1;
                let ctx = TaskContext {
                    dag_id: &self.definition.dag_id,
                    run_id: &run_id,
                    execution_date,
                    params: &self.definition.params,
                    attempt,
                };
                match run_attempt(task.as_ref(), &ctx) {
                    Ok(output) => break Ok(output),
                    Err(err) if attempt < max_attempts => {
                        warn!(
                            task = %task_id,
                            attempt,
                            max_attempts,
                            error = %err,
                            retry_in_secs = self.retry_delay.as_secs_f64(),
                            "task failed, retrying"
                        );
                        if !self.retry_delay.is_zero() {
                            std::thread::sleep(self.retry_delay);
                        }
                    }
                    Err(err) => break Err(err),
                }
            };

            let duration_ms = task_start.elapsed().as_millis() as u64;
            match outcome {
                Ok(output) => {
                    info!(task = %task_id, attempts = attempt, duration_ms, "task succeeded");
                    runs.push(TaskRun {
                        task_id: task_id.clone(),
                        state: TaskState::Success,
                        attempts: attempt,
                        duration_ms,
                        output,
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(task = %task_id, attempts = attempt, error = %err, "task failed");
                    failed = true;
                    runs.push(TaskRun {
                        task_id: task_id.clone(),
                        state: TaskState::Failed,
                        attempts: attempt,
                        duration_ms,
                        output: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        let report = PipelineRunReport {
            dag_id: self.definition.dag_id.clone(),
            run_id,
            execution_date,
            state: if failed {
                RunState::Failed
            } else {
                RunState::Success
            },
            tasks: runs,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            dag_id = %report.dag_id,
            run_id = %report.run_id,
            succeeded = report.succeeded(),
            duration_ms = report.duration_ms,
            "pipeline run finished"
        );
        Ok(report)
    }
}

fn run_attempt(
    task: &dyn Task,
    ctx: &TaskContext<'_>,
) -> std::result::Result<Option<String>, TaskError> {
    match catch_unwind(AssertUnwindSafe(|| task.run(ctx))) {
        Ok(result) => result,
        Err(panic) => Err(TaskError::new(panic_message(panic))),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
