//! Static description of the ingestion chain: identity, scheduling
//! defaults, retry policy, ingestion parameters and task order.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};

pub const VALIDATE_CSV_STRUCTURE: &str = "validate_csv_structure";
pub const SIMULATE_BIGQUERY_INGESTION: &str = "simulate_bigquery_ingestion";
pub const VALIDATE_LOADED_DATA: &str = "validate_loaded_data";
pub const LOG_PIPELINE_METRICS: &str = "log_pipeline_metrics";
pub const SEND_SUCCESS_NOTIFICATION: &str = "send_success_notification";

/// Built-in task ids, in execution order.
pub const DEFAULT_TASKS: [&str; 5] = [
    VALIDATE_CSV_STRUCTURE,
    SIMULATE_BIGQUERY_INGESTION,
    VALIDATE_LOADED_DATA,
    LOG_PIPELINE_METRICS,
    SEND_SUCCESS_NOTIFICATION,
];

/// Per-task defaults applied to every task of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultArgs {
    pub owner: String,
    pub depends_on_past: bool,
    pub email_on_failure: bool,
    pub email_on_retry: bool,
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub retry_delay_secs: u64,
}

impl DefaultArgs {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for DefaultArgs {
    fn default() -> Self {
        Self {
            owner: "data-team".to_string(),
            depends_on_past: false,
            email_on_failure: false,
            email_on_retry: false,
            retries: 2,
            retry_delay_secs: 5 * 60,
        }
    }
}

/// Destination and source of the simulated load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionParams {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    pub gcs_bucket: String,
    pub gcs_object: String,
}

impl IngestionParams {
    pub fn source_uri(&self) -> String {
        format!("gs://{}/{}", self.gcs_bucket, self.gcs_object)
    }

    pub fn table_ref(&self) -> String {
        format!("{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

impl Default for IngestionParams {
    fn default() -> Self {
        Self {
            project_id: "lake-471013".to_string(),
            dataset_id: "lakehouse_employee_data".to_string(),
            table_id: "employees".to_string(),
            gcs_bucket: "lakehouse-bucket-20250903".to_string(),
            gcs_object: "employees_5mb.csv".to_string(),
        }
    }
}

/// Linear workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub dag_id: String,
    pub description: String,
    pub default_args: DefaultArgs,
    /// `None` means manual trigger only.
    pub schedule: Option<String>,
    pub catchup: bool,
    pub max_active_runs: u32,
    pub tags: Vec<String>,
    pub params: IngestionParams,
    /// Task ids, each depending on the previous one.
    pub tasks: Vec<String>,
}

impl PipelineDefinition {
    /// The employees CSV ingestion chain, run locally.
    pub fn employees_ingestion() -> Self {
        Self {
            dag_id: "employees_csv_ingestion_local".to_string(),
            description: "Employees CSV ingestion into BigQuery (local Kubernetes)".to_string(),
            default_args: DefaultArgs::default(),
            schedule: None,
            catchup: false,
            max_active_runs: 1,
            tags: ["bigquery", "gcs", "employees", "ingestion", "local"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            params: IngestionParams::default(),
            tasks: DEFAULT_TASKS.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dag_id.trim().is_empty() {
            return Err(PipelineError::InvalidDefinition(
                "dag_id is empty".to_string(),
            ));
        }
        if self.tasks.is_empty() {
            return Err(PipelineError::InvalidDefinition(format!(
                "'{}' declares no tasks",
                self.dag_id
            )));
        }
        if self.max_active_runs == 0 {
            return Err(PipelineError::InvalidDefinition(
                "max_active_runs must be at least 1".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for task in &self.tasks {
            if !seen.insert(task.as_str()) {
                return Err(PipelineError::InvalidDefinition(format!(
                    "duplicate task id '{task}'"
                )));
            }
        }
        Ok(())
    }

    /// `a >> b >> c` rendering of the dependency chain.
    pub fn chain(&self) -> String {
        self.tasks.join(" >> ")
    }

    /// Markdown documentation with the ingestion parameters filled in.
    pub fn render_doc(&self) -> String {
        let schedule = self.schedule.as_deref().unwrap_or("None");
        let mut lines = vec![
            "# Employees CSV ingestion pipeline (local Kubernetes)".to_string(),
            String::new(),
            "Orchestrates the ingestion of the employees data from GCS into BigQuery.".to_string(),
            "Variant adapted to a local Kubernetes environment.".to_string(),
            String::new(),
            "## Architecture".to_string(),
            "1. Validate the CSV file structure".to_string(),
            "2. Simulate the BigQuery ingestion (replaces the real load)".to_string(),
            "3. Validate the loaded data (simulation)".to_string(),
            "4. Collect pipeline metrics".to_string(),
            "5. Success notification".to_string(),
            String::new(),
            "## Configuration".to_string(),
            format!("- **Project**: {}", self.params.project_id),
            format!("- **Dataset**: {}", self.params.dataset_id),
            format!("- **Table**: {}", self.params.table_id),
            format!("- **Source file**: {}", self.params.source_uri()),
            String::new(),
            "## Usage".to_string(),
            format!("Manual execution only (`schedule={schedule}`)."),
            format!("Trigger `{}` from the orchestrator UI or with `odsgen pipeline`.", self.dag_id),
            String::new(),
            "## Notes".to_string(),
            "- Simplified version for local tests".to_string(),
            "- Real GCP connections are replaced by simulations".to_string(),
            "- Meant for exercising orchestration and monitoring".to_string(),
            String::new(),
            format!("Tasks: `{}`", self.chain()),
        ];
        lines.push(String::new());
        lines.join("\n")
    }
}

impl Default for PipelineDefinition {
    fn default() -> Self {
        Self::employees_ingestion()
    }
}
