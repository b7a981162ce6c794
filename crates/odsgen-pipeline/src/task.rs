use chrono::{DateTime, Utc};
use tracing::info;

use crate::definition::{
    IngestionParams, LOG_PIPELINE_METRICS, SEND_SUCCESS_NOTIFICATION,
    SIMULATE_BIGQUERY_INGESTION, VALIDATE_CSV_STRUCTURE, VALIDATE_LOADED_DATA,
};
use crate::errors::TaskError;

/// What a task sees of the run it belongs to.
#[derive(Debug, Clone)]
pub struct TaskContext<'a> {
    pub dag_id: &'a str,
    pub run_id: &'a str,
    pub execution_date: DateTime<Utc>,
    pub params: &'a IngestionParams,
    /// 1 for the first attempt.
    pub attempt: u32,
}

/// One step of the chain.
pub trait Task {
    fn id(&self) -> &str;

    /// Execute one attempt. The returned value, if any, lands in the run
    /// report.
    fn run(&self, ctx: &TaskContext<'_>) -> Result<Option<String>, TaskError>;
}

/// Checks the CSV header against the expected column list (simulated: the
/// file itself is not read).
#[derive(Debug, Clone)]
pub struct ValidateCsvStructure {
    expected_columns: Vec<String>,
}

impl ValidateCsvStructure {
    pub fn new(expected_columns: Vec<String>) -> Self {
        Self { expected_columns }
    }

    /// Expected columns of the built-in employees table.
    pub fn employees() -> Self {
        let schema = odsgen_core::employees_schema();
        Self::new(schema.header().into_iter().map(str::to_string).collect())
    }
}

impl Task for ValidateCsvStructure {
    fn id(&self) -> &str {
        VALIDATE_CSV_STRUCTURE
    }

    fn run(&self, ctx: &TaskContext<'_>) -> Result<Option<String>, TaskError> {
        if self.expected_columns.is_empty() {
            return Err(TaskError::new("no expected columns configured"));
        }
        info!(
            task = VALIDATE_CSV_STRUCTURE,
            source = %ctx.params.source_uri(),
            columns = self.expected_columns.len(),
            expected = %self.expected_columns.join(", "),
            "csv structure validated (simulated)"
        );
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimulateIngestion;

impl Task for SimulateIngestion {
    fn id(&self) -> &str {
        SIMULATE_BIGQUERY_INGESTION
    }

    fn run(&self, ctx: &TaskContext<'_>) -> Result<Option<String>, TaskError> {
        info!(
            task = SIMULATE_BIGQUERY_INGESTION,
            source = %ctx.params.source_uri(),
            destination = %ctx.params.table_ref(),
            "bigquery ingestion simulated"
        );
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateLoadedData;

impl Task for ValidateLoadedData {
    fn id(&self) -> &str {
        VALIDATE_LOADED_DATA
    }

    fn run(&self, ctx: &TaskContext<'_>) -> Result<Option<String>, TaskError> {
        for check in ["rows loaded", "no duplicates", "email format", "ages consistent"] {
            info!(
                task = VALIDATE_LOADED_DATA,
                table = %ctx.params.table_ref(),
                check,
                "loaded data check passed (simulated)"
            );
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogPipelineMetrics;

impl Task for LogPipelineMetrics {
    fn id(&self) -> &str {
        LOG_PIPELINE_METRICS
    }

    fn run(&self, ctx: &TaskContext<'_>) -> Result<Option<String>, TaskError> {
        info!(
            task = LOG_PIPELINE_METRICS,
            dag_id = ctx.dag_id,
            run_id = ctx.run_id,
            execution_date = %ctx.execution_date.to_rfc3339(),
            status = "SUCCESS",
            "pipeline metrics"
        );
        Ok(Some("metrics_logged".to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SendSuccessNotification;

impl Task for SendSuccessNotification {
    fn id(&self) -> &str {
        SEND_SUCCESS_NOTIFICATION
    }

    fn run(&self, ctx: &TaskContext<'_>) -> Result<Option<String>, TaskError> {
        info!(
            task = SEND_SUCCESS_NOTIFICATION,
            dag_id = ctx.dag_id,
            "pipeline finished successfully"
        );
        Ok(None)
    }
}

/// The five built-in tasks, in chain order.
pub fn default_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(ValidateCsvStructure::employees()),
        Box::new(SimulateIngestion),
        Box::new(ValidateLoadedData),
        Box::new(LogPipelineMetrics),
        Box::new(SendSuccessNotification),
    ]
}
