use std::fs;
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use odsgen_core::{ColumnSpec, FieldType, TableSchema, parse_date};

use crate::errors::{EvalError, Result};
use crate::model::{AuditOptions, AuditReport, AuditResult, Violation, ViolationCode};
use crate::report::render_report;

const DELIMITER: u8 = b';';

/// Reads a generated file back and checks it against its schema.
#[derive(Debug, Clone)]
pub struct AuditEngine {
    options: AuditOptions,
}

impl AuditEngine {
    pub fn new(options: AuditOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, schema: &TableSchema, path: &Path) -> Result<AuditResult> {
        let start = Instant::now();
        if schema.columns.is_empty() {
            return Err(EvalError::InvalidDataset(format!(
                "schema '{}' declares no columns",
                schema.name
            )));
        }

        let mut report = AuditReport::new(path.to_path_buf(), schema.name.clone());
        report.file_size = fs::metadata(path)?.len();
        let max_samples = self.options.max_samples;
        let checks: Vec<ColumnCheck<'_>> = schema.columns.iter().map(ColumnCheck::new).collect();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let expected = schema.header();
        report.header_ok = header == expected;
        if !report.header_ok {
            report.record(
                Violation {
                    code: ViolationCode::HeaderMismatch,
                    column: None,
                    row_index: None,
                    message: format!("expected header {expected:?}"),
                    example: Some(header.join(";")),
                },
                max_samples,
            );
        }

        let mut record = csv::StringRecord::new();
        let mut row_index = 0_u64;
        while reader.read_record(&mut record)? {
            row_index += 1;
            report.rows_checked += 1;

            if record.len() != header.len() {
                report.record(
                    Violation {
                        code: ViolationCode::ColumnCount,
                        column: None,
                        row_index: Some(row_index),
                        message: format!(
                            "row has {} fields, header has {}",
                            record.len(),
                            header.len()
                        ),
                        example: None,
                    },
                    max_samples,
                );
            }

            for (check, value) in checks.iter().zip(record.iter()) {
                report.fields_checked += 1;
                for (code, message) in check.inspect(value) {
                    report.record(
                        Violation {
                            code,
                            column: Some(check.spec.name.clone()),
                            row_index: Some(row_index),
                            message,
                            example: Some(value.to_string()),
                        },
                        max_samples,
                    );
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;

        let (report_json, report_md) = match &self.options.out_dir {
            Some(out_dir) => {
                fs::create_dir_all(out_dir)?;
                let stem = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| schema.name.clone());
                let json_path = out_dir.join(format!("{stem}.audit.json"));
                fs::write(&json_path, serde_json::to_vec_pretty(&report)?)?;
                let md_path = out_dir.join(format!("{stem}.audit.md"));
                fs::write(&md_path, render_report(&report).as_bytes())?;
                (Some(json_path), Some(md_path))
            }
            None => (None, None),
        };

        if report.is_clean() {
            info!(
                file = %path.display(),
                rows = report.rows_checked,
                bytes = report.file_size,
                duration_ms = report.duration_ms,
                "audit passed"
            );
        } else {
            warn!(
                file = %path.display(),
                rows = report.rows_checked,
                violations = report.violations_total,
                "audit found violations"
            );
        }

        if self.options.strict && !report.is_clean() {
            return Err(EvalError::Violations(report.violations_total));
        }

        Ok(AuditResult {
            report,
            report_json,
            report_md,
        })
    }
}

struct ColumnCheck<'a> {
    spec: &'a ColumnSpec,
    min_date: Option<chrono::NaiveDate>,
    max_date: Option<chrono::NaiveDate>,
}

impl<'a> ColumnCheck<'a> {
    fn new(spec: &'a ColumnSpec) -> Self {
        let (min_date, max_date) = spec.parsed_date_bounds();
        Self {
            spec,
            min_date,
            max_date,
        }
    }

    fn inspect(&self, value: &str) -> Vec<(ViolationCode, String)> {
        let mut found = Vec::new();
        if value.contains([';', '\n', '\r']) {
            found.push((
                ViolationCode::ForbiddenChar,
                "field contains the delimiter or a line break".to_string(),
            ));
        }
        if value.is_empty() {
            if self.spec.required {
                found.push((
                    ViolationCode::MissingRequired,
                    "required field is empty".to_string(),
                ));
            }
            return found;
        }

        match self.spec.field_type {
            FieldType::Int64 => match value.parse::<i64>() {
                Ok(number) => self.check_range(number as f64, &mut found),
                Err(_) => found.push(parse_error(value, self.spec.field_type)),
            },
            FieldType::Float64 => match value.parse::<f64>() {
                Ok(number) if number.is_finite() => {
                    self.check_range(number, &mut found);
                    if let Some(scale) = self.spec.scale
                        && decimals(value) > scale as usize
                    {
                        found.push((
                            ViolationCode::ScaleExceeded,
                            format!("more than {scale} decimal places"),
                        ));
                    }
                }
                _ => found.push(parse_error(value, self.spec.field_type)),
            },
            FieldType::String => {
                if let Some(max) = self.spec.max_length {
                    let len = value.chars().count();
                    if len > max {
                        found.push((
                            ViolationCode::TooLong,
                            format!("{len} characters, max_length is {max}"),
                        ));
                    }
                }
            }
            FieldType::Date => match parse_date(value) {
                Some(date) => {
                    let early = self.min_date.is_some_and(|min| date < min);
                    let late = self.max_date.is_some_and(|max| date > max);
                    if early || late {
                        found.push((
                            ViolationCode::DateOutOfBounds,
                            format!("date {date} outside declared bounds"),
                        ));
                    }
                }
                None => found.push(parse_error(value, self.spec.field_type)),
            },
            FieldType::Timestamp => {
                if parse_timestamp(value).is_none() {
                    found.push(parse_error(value, self.spec.field_type));
                }
            }
        }
        found
    }

    fn check_range(&self, number: f64, found: &mut Vec<(ViolationCode, String)>) {
        if let Some(min) = self.spec.min_val
            && number < min
        {
            found.push((ViolationCode::BelowMin, format!("{number} < min_val {min}")));
        }
        if let Some(max) = self.spec.max_val
            && number > max
        {
            found.push((ViolationCode::AboveMax, format!("{number} > max_val {max}")));
        }
    }
}

fn parse_error(value: &str, field_type: FieldType) -> (ViolationCode, String) {
    (
        ViolationCode::ParseError,
        format!("'{value}' is not a valid {field_type}"),
    )
}

fn decimals(value: &str) -> usize {
    value
        .split_once('.')
        .map(|(_, fraction)| fraction.chars().take_while(char::is_ascii_digit).count())
        .unwrap_or(0)
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}
