use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use odsgen_core::{TableSchema, validate_schema};

use crate::catalog::GenerationCatalog;
use crate::errors::GenerationError;
use crate::model::{GenerateOptions, GenerationReport, TargetSize};
use crate::output::{CsvSink, serialized_len};
use crate::session::RecordGenerator;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub path: PathBuf,
    pub report: GenerationReport,
}

/// Writes schema-bounded CSV files until they reach a target size.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate `path` from `schema` until the file holds at least
    /// `target` bytes.
    ///
    /// Only an invalid schema or a failure to create or write the
    /// destination is an error; bad fields and rows are counted in the
    /// report and replaced by safe values.
    pub fn run(
        &self,
        schema: &TableSchema,
        path: &Path,
        target: TargetSize,
    ) -> Result<GenerationResult, GenerationError> {
        validate_schema(schema)?;

        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let seed = self.options.seed.unwrap_or_else(rand::random);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let catalog =
            GenerationCatalog::for_schema(schema, self.options.locale, self.options.clock);
        let mut generator = RecordGenerator::new(schema, catalog, seed)?;
        let mut report = GenerationReport::new(
            run_id.clone(),
            schema.name.clone(),
            path.to_path_buf(),
            seed,
            target.bytes,
        );

        let (sample_row_bytes, estimated_rows) = estimate_rows(&mut generator, target)?;
        report.sample_row_bytes = sample_row_bytes;
        report.estimated_rows = estimated_rows;

        info!(
            run_id = %run_id,
            table = %schema.name,
            path = %path.display(),
            target_size = %TargetSize::display(target.bytes),
            columns = schema.columns.len(),
            seed,
            sample_row_bytes,
            estimated_rows,
            "generation started"
        );

        let mut sink = CsvSink::create(path)?;
        sink.write_header(schema.header())?;
        let mut current_size = sink.flush()?;

        let batch_limit = self.options.batch_size.max(1) as u64;
        let progress_every = self.options.progress_every.max(1);
        let mut next_progress = progress_every;
        let mut row_id = 1_u64;

        while current_size < target.bytes {
            let batch = batch_len(estimated_rows, row_id, batch_limit);

            for _ in 0..batch {
                let record = generator.generate(row_id);
                if record.fallback.is_some() {
                    report.record_row_fallback();
                }
                for (idx, _) in &record.field_errors {
                    if let Some(column) = schema.columns.get(*idx) {
                        report.record_field_error(&column.name);
                    }
                }
                sink.write_record(record.to_csv())?;
                report.rows_written += 1;
                row_id += 1;
            }

            current_size = sink.flush()?;
            report.batches += 1;

            if report.rows_written >= next_progress {
                let progress = current_size as f64 / target.bytes.max(1) as f64 * 100.0;
                info!(
                    run_id = %run_id,
                    progress = %format!("{progress:.1}%"),
                    size = %TargetSize::display(current_size),
                    rows = report.rows_written,
                    errors = report.error_count(),
                    "generation progress"
                );
                while next_progress <= report.rows_written {
                    next_progress = next_progress.saturating_add(progress_every);
                }
            }
        }

        let counted = sink.finish()?;
        let final_size = fs::metadata(path)?.len();
        if final_size != counted {
            warn!(
                run_id = %run_id,
                counted,
                on_disk = final_size,
                "byte count differs from file size"
            );
        }

        let elapsed = start.elapsed();
        report.bytes_written = final_size;
        report.duration_ms = elapsed.as_millis() as u64;
        report.throughput_bytes_per_sec = if elapsed.as_secs_f64() > 0.0 {
            final_size as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        info!(
            run_id = %run_id,
            path = %path.display(),
            size = %TargetSize::display(final_size),
            bytes_written = final_size,
            rows = report.rows_written,
            batches = report.batches,
            field_errors = report.field_errors,
            row_fallbacks = report.row_fallbacks,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult {
            path: path.to_path_buf(),
            report,
        })
    }
}

/// Serialized size of one sample row and the row count it implies.
fn estimate_rows(
    generator: &mut RecordGenerator<'_>,
    target: TargetSize,
) -> Result<(u64, u64), GenerationError> {
    let sample = generator.generate(1);
    let row_bytes = serialized_len(sample.to_csv())?.max(1);
    Ok((row_bytes, (target.bytes / row_bytes).max(1)))
}

/// Rows in the next batch: what is left of the estimate, capped at
/// `limit`. Once the estimate is used up, full batches.
fn batch_len(estimated_rows: u64, next_row_id: u64, limit: u64) -> u64 {
    match (estimated_rows + 1).checked_sub(next_row_id) {
        Some(remaining) if remaining > 0 => remaining.min(limit),
        _ => limit,
    }
}
