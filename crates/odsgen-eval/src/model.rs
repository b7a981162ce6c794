use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default cap on sample violations kept in a report.
pub const DEFAULT_MAX_SAMPLES: usize = 100;

/// Options for a file audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOptions {
    /// Fail the audit when any violation is found.
    pub strict: bool,
    /// Limit the number of sample violations kept in the report.
    pub max_samples: usize,
    /// Write `<stem>.audit.json` and `<stem>.audit.md` into this directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_samples: DEFAULT_MAX_SAMPLES,
            out_dir: None,
        }
    }
}

/// Kind of rule a field or row broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    HeaderMismatch,
    ColumnCount,
    ParseError,
    BelowMin,
    AboveMax,
    ScaleExceeded,
    TooLong,
    DateOutOfBounds,
    ForbiddenChar,
    MissingRequired,
}

impl ViolationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HeaderMismatch => "header_mismatch",
            Self::ColumnCount => "column_count",
            Self::ParseError => "parse_error",
            Self::BelowMin => "below_min",
            Self::AboveMax => "above_max",
            Self::ScaleExceeded => "scale_exceeded",
            Self::TooLong => "too_long",
            Self::DateOutOfBounds => "date_out_of_bounds",
            Self::ForbiddenChar => "forbidden_char",
            Self::MissingRequired => "missing_required",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured violation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub code: ViolationCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// 1-based data row, header excluded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u64>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Result of auditing one generated file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub file: PathBuf,
    pub table: String,
    pub file_size: u64,
    pub header_ok: bool,
    pub rows_checked: u64,
    pub fields_checked: u64,
    pub violations_total: u64,
    pub violations_by_code: BTreeMap<ViolationCode, u64>,
    pub samples: Vec<Violation>,
    pub duration_ms: u64,
}

impl AuditReport {
    pub fn new(file: PathBuf, table: String) -> Self {
        Self {
            file,
            table,
            file_size: 0,
            header_ok: false,
            rows_checked: 0,
            fields_checked: 0,
            violations_total: 0,
            violations_by_code: BTreeMap::new(),
            samples: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations_total == 0
    }

    pub fn count(&self, code: ViolationCode) -> u64 {
        self.violations_by_code.get(&code).copied().unwrap_or(0)
    }

    pub(crate) fn record(&mut self, violation: Violation, max_samples: usize) {
        self.violations_total += 1;
        *self.violations_by_code.entry(violation.code).or_insert(0) += 1;
        if self.samples.len() < max_samples {
            self.samples.push(violation);
        }
    }
}

/// Report plus the files written for it, if any.
#[derive(Debug, Clone)]
pub struct AuditResult {
    pub report: AuditReport,
    pub report_json: Option<PathBuf>,
    pub report_md: Option<PathBuf>,
}
