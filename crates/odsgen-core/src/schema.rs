use std::collections::BTreeMap;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{FieldGenerator, FieldType};

/// Date format used for date bounds and date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A flat ODS table: ordered columns plus the value lists its `choice`
/// generators draw from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct TableSchema {
    /// Table name, also the default output file prefix.
    pub name: String,
    /// Columns in output order.
    pub columns: Vec<ColumnSpec>,
    /// Named value lists referenced by `choice` generators.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lists: BTreeMap<String, Vec<String>>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            lists: BTreeMap::new(),
        }
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn list<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lists
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Column names in declared order; this is the CSV header.
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|col| col.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|col| col.name == name)
    }
}

/// One declared column: type, validation bounds and semantic generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Inclusive lower bound for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_val: Option<f64>,
    /// Inclusive upper bound for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_val: Option<f64>,
    /// Maximum length in characters for string columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    /// Decimal places kept for float columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    pub generator: FieldGenerator,
    /// Literal used when the whole row has to fall back to defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType, generator: FieldGenerator) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            min_val: None,
            max_val: None,
            max_length: None,
            min_date: None,
            max_date: None,
            scale: None,
            generator,
            fallback: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min_val = Some(min);
        self
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min_val = Some(min);
        self.max_val = Some(max);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn date_bounds(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min_date = Some(min.into());
        self.max_date = Some(max.into());
        self
    }

    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn fallback(mut self, value: impl Into<String>) -> Self {
        self.fallback = Some(value.into());
        self
    }

    /// Parsed `(min_date, max_date)`; unparsable bounds read as absent.
    pub fn parsed_date_bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (
            self.min_date.as_deref().and_then(parse_date),
            self.max_date.as_deref().and_then(parse_date),
        )
    }

    /// Numeric bounds narrowed to values writable at `scale` decimals:
    /// the minimum rounds up and the maximum rounds down.
    pub fn writable_bounds(&self) -> (Option<f64>, Option<f64>) {
        match self.scale {
            Some(scale) => {
                let factor = 10_f64.powi(scale as i32);
                (
                    self.min_val.map(|min| snap(min * factor, f64::ceil) / factor),
                    self.max_val.map(|max| snap(max * factor, f64::floor) / factor),
                )
            }
            None => (self.min_val, self.max_val),
        }
    }
}

/// Round `scaled` to an integer with `direction`, treating values within
/// float noise of an integer as that integer.
fn snap(scaled: f64, direction: fn(f64) -> f64) -> f64 {
    let nearest = scaled.round();
    if (scaled - nearest).abs() <= 1e-9 * nearest.abs().max(1.0) {
        nearest
    } else {
        direction(scaled)
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
