use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::faker_rs::LocaleKey;

/// Default number of rows written between two size measurements.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
/// Default number of rows between two progress log lines.
pub const DEFAULT_PROGRESS_EVERY: u64 = 50_000;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Rows written between two measurements of the output size.
    pub batch_size: usize,
    /// Rows between two progress log lines.
    pub progress_every: u64,
    /// Seed for reproducible runs; random when absent.
    pub seed: Option<u64>,
    /// Locale used by the faker-backed generators.
    pub locale: LocaleKey,
    /// Clock used by `now` columns.
    pub clock: Clock,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            progress_every: DEFAULT_PROGRESS_EVERY,
            seed: None,
            locale: LocaleKey::FrFr,
            clock: Clock::System,
        }
    }
}

/// Source of the current timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clock {
    /// Local wall clock, read for every row.
    System,
    /// Frozen instant, for reproducible output.
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => chrono::Local::now().naive_local(),
            Clock::Fixed(instant) => *instant,
        }
    }
}

/// Output size the write loop stops at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    pub bytes: u64,
}

impl TargetSize {
    pub const fn bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub const fn megabytes(mb: u64) -> Self {
        Self {
            bytes: mb * 1024 * 1024,
        }
    }

    pub const fn gigabytes(gb: u64) -> Self {
        Self {
            bytes: gb * 1024 * 1024 * 1024,
        }
    }

    /// Human-readable size in the unit the target was most likely given in.
    pub fn display(bytes: u64) -> String {
        const GB: f64 = 1024.0 * 1024.0 * 1024.0;
        const MB: f64 = 1024.0 * 1024.0;
        let value = bytes as f64;
        if value >= GB {
            format!("{:.2}GB", value / GB)
        } else {
            format!("{:.2}MB", value / MB)
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub table: String,
    pub output_path: PathBuf,
    pub seed: u64,
    pub target_bytes: u64,
    pub bytes_written: u64,
    pub sample_row_bytes: u64,
    pub estimated_rows: u64,
    pub rows_written: u64,
    pub batches: u64,
    pub field_errors: u64,
    pub row_fallbacks: u64,
    pub field_errors_by_column: BTreeMap<String, u64>,
    pub duration_ms: u64,
    pub throughput_bytes_per_sec: f64,
}

impl GenerationReport {
    pub fn new(
        run_id: String,
        table: String,
        output_path: PathBuf,
        seed: u64,
        target_bytes: u64,
    ) -> Self {
        Self {
            run_id,
            table,
            output_path,
            seed,
            target_bytes,
            bytes_written: 0,
            sample_row_bytes: 0,
            estimated_rows: 0,
            rows_written: 0,
            batches: 0,
            field_errors: 0,
            row_fallbacks: 0,
            field_errors_by_column: BTreeMap::new(),
            duration_ms: 0,
            throughput_bytes_per_sec: 0.0,
        }
    }

    pub fn record_field_error(&mut self, column: &str) {
        self.field_errors += 1;
        *self
            .field_errors_by_column
            .entry(column.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_row_fallback(&mut self) {
        self.row_fallbacks += 1;
    }

    /// Field failures plus row fallbacks.
    pub fn error_count(&self) -> u64 {
        self.field_errors + self.row_fallbacks
    }
}
