//! Field validation: coercion to the declared type, clamping to declared
//! bounds and sanitizing of text so a row always serializes cleanly.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use odsgen_core::{ColumnSpec, DATE_FORMAT, FieldType};

use crate::generators::{GeneratedValue, TIMESTAMP_FORMAT};

/// Output column delimiter.
pub const DELIMITER: u8 = b';';

/// Per-field validation failure. Recorded and replaced by an empty value,
/// never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("cannot coerce {found} value {value:?} to {expected}")]
    Coercion {
        expected: FieldType,
        found: &'static str,
        value: String,
    },
    #[error("non-finite number {0}")]
    NotFinite(f64),
    #[error("required value is missing")]
    Missing,
}

/// Validated value, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Empty,
    Int(i64),
    Float { value: f64, scale: Option<u32> },
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    pub fn to_csv(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Int(value) => value.to_string(),
            FieldValue::Float { value, scale } => match scale {
                Some(scale) => {
                    let scale = *scale as usize;
                    format!("{value:.scale$}")
                }
                None => value.to_string(),
            },
            FieldValue::Text(value) => value.clone(),
            FieldValue::Date(value) => value.format(DATE_FORMAT).to_string(),
            FieldValue::Timestamp(value) => value.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Validation rules of one column, with bounds parsed once per run.
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub min_val: Option<f64>,
    pub max_val: Option<f64>,
    pub max_length: Option<usize>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub scale: Option<u32>,
}

impl FieldRules {
    pub fn from_spec(spec: &ColumnSpec) -> Self {
        let (min_date, max_date) = spec.parsed_date_bounds();
        let (min_val, max_val) = spec.writable_bounds();
        Self {
            name: spec.name.clone(),
            field_type: spec.field_type,
            required: spec.required,
            min_val,
            max_val,
            max_length: spec.max_length,
            min_date,
            max_date,
            scale: spec.scale,
        }
    }
}

/// Replace the delimiter and line breaks, trim, then cut to `max_length`
/// characters.
pub fn clean_field(value: &str, max_length: Option<usize>) -> String {
    let cleaned: String = value
        .chars()
        .map(|ch| match ch {
            ';' => ',',
            '\n' | '\r' => ' ',
            other => other,
        })
        .collect();
    let cleaned = cleaned.trim();

    match max_length {
        Some(max) if cleaned.chars().count() > max => cleaned.chars().take(max).collect(),
        _ => cleaned.to_string(),
    }
}

/// Coerce a raw value into the column's declared type and legal range.
pub fn validate_field(rules: &FieldRules, value: GeneratedValue) -> Result<FieldValue, FieldError> {
    if value.is_null() {
        return if rules.required {
            Err(FieldError::Missing)
        } else {
            Ok(FieldValue::Empty)
        };
    }

    match rules.field_type {
        FieldType::Int64 => {
            let value = coerce_int(rules, value)?;
            Ok(FieldValue::Int(clamp_int(rules, value)))
        }
        FieldType::Float64 => {
            let value = coerce_float(rules, value)?;
            Ok(FieldValue::Float {
                value: clamp_float(rules, round_to_scale(value, rules.scale)),
                scale: rules.scale,
            })
        }
        FieldType::String => Ok(FieldValue::Text(clean_field(
            &value.render(),
            rules.max_length,
        ))),
        FieldType::Date => {
            let date = match value {
                GeneratedValue::Date(date) => date,
                GeneratedValue::Timestamp(ts) => ts.date(),
                GeneratedValue::Text(ref text) => odsgen_core::parse_date(text)
                    .ok_or_else(|| coercion_error(rules, &value))?,
                other => return Err(coercion_error(rules, &other)),
            };
            Ok(FieldValue::Date(clamp_date(rules, date)))
        }
        FieldType::Timestamp => {
            let ts = match value {
                GeneratedValue::Timestamp(ts) => ts,
                GeneratedValue::Date(date) => date.and_time(NaiveTime::MIN),
                GeneratedValue::Text(ref text) => {
                    parse_timestamp(text).ok_or_else(|| coercion_error(rules, &value))?
                }
                other => return Err(coercion_error(rules, &other)),
            };
            Ok(FieldValue::Timestamp(ts))
        }
    }
}

fn coerce_int(rules: &FieldRules, value: GeneratedValue) -> Result<i64, FieldError> {
    match value {
        GeneratedValue::Int(value) => Ok(value),
        GeneratedValue::Float(value) if !value.is_finite() => Err(FieldError::NotFinite(value)),
        // truncation toward zero, like an integer cast
        GeneratedValue::Float(value) => Ok(value.trunc() as i64),
        GeneratedValue::Text(ref text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| coercion_error(rules, &value)),
        other => Err(coercion_error(rules, &other)),
    }
}

fn coerce_float(rules: &FieldRules, value: GeneratedValue) -> Result<f64, FieldError> {
    let number = match value {
        GeneratedValue::Int(value) => value as f64,
        GeneratedValue::Float(value) => value,
        GeneratedValue::Text(ref text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| coercion_error(rules, &value))?,
        other => return Err(coercion_error(rules, &other)),
    };
    if number.is_finite() {
        Ok(number)
    } else {
        Err(FieldError::NotFinite(number))
    }
}

fn clamp_int(rules: &FieldRules, mut value: i64) -> i64 {
    if let Some(min) = rules.min_val
        && (value as f64) < min
    {
        value = min as i64;
    }
    if let Some(max) = rules.max_val
        && (value as f64) > max
    {
        value = max as i64;
    }
    value
}

fn clamp_float(rules: &FieldRules, mut value: f64) -> f64 {
    if let Some(min) = rules.min_val
        && value < min
    {
        value = min;
    }
    if let Some(max) = rules.max_val
        && value > max
    {
        value = max;
    }
    value
}

fn clamp_date(rules: &FieldRules, mut date: NaiveDate) -> NaiveDate {
    if let Some(min) = rules.min_date
        && date < min
    {
        date = min;
    }
    if let Some(max) = rules.max_date
        && date > max
    {
        date = max;
    }
    date
}

fn round_to_scale(value: f64, scale: Option<u32>) -> f64 {
    match scale {
        Some(scale) => {
            let factor = 10_f64.powi(scale as i32);
            let rounded = (value * factor).round() / factor;
            if rounded.is_finite() { rounded } else { value }
        }
        None => value,
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

fn coercion_error(rules: &FieldRules, value: &GeneratedValue) -> FieldError {
    FieldError::Coercion {
        expected: rules.field_type,
        found: value.kind(),
        value: value.render(),
    }
}

#[cfg(test)]
mod tests {
    use odsgen_core::FieldGenerator;

    use super::*;

    fn rules(spec: ColumnSpec) -> FieldRules {
        FieldRules::from_spec(&spec)
    }

    fn int_column() -> FieldRules {
        rules(ColumnSpec::new("age", FieldType::Int64, FieldGenerator::RowId).bounds(16.0, 70.0))
    }

    #[test]
    fn clean_field_replaces_delimiter_and_newlines() {
        assert_eq!(clean_field(" a;b\nc\rd ", None), "a,b c d");
    }

    #[test]
    fn clean_field_truncates_by_characters() {
        assert_eq!(clean_field("éléphant", Some(3)), "élé");
    }

    #[test]
    fn int_values_are_clamped() {
        let rules = int_column();
        assert_eq!(
            validate_field(&rules, GeneratedValue::Int(3)),
            Ok(FieldValue::Int(16))
        );
        assert_eq!(
            validate_field(&rules, GeneratedValue::Int(99)),
            Ok(FieldValue::Int(70))
        );
        assert_eq!(
            validate_field(&rules, GeneratedValue::Text(" 42 ".to_string())),
            Ok(FieldValue::Int(42))
        );
        assert_eq!(
            validate_field(&rules, GeneratedValue::Float(30.9)),
            Ok(FieldValue::Int(30))
        );
    }

    #[test]
    fn unparsable_int_is_a_field_error() {
        let result = validate_field(&int_column(), GeneratedValue::Text("abc".to_string()));
        assert!(matches!(
            result,
            Err(FieldError::Coercion {
                expected: FieldType::Int64,
                found: "text",
                ..
            })
        ));
    }

    #[test]
    fn floats_are_rounded_then_clamped() {
        let rules = rules(
            ColumnSpec::new(
                "latitude",
                FieldType::Float64,
                FieldGenerator::FloatRange { min: 0.0, max: 1.0 },
            )
            .bounds(42.0, 51.0)
            .scale(2),
        );
        let value = validate_field(&rules, GeneratedValue::Float(45.678)).expect("valid");
        assert_eq!(value.to_csv(), "45.68");
        let value = validate_field(&rules, GeneratedValue::Float(60.0)).expect("valid");
        assert_eq!(value.to_csv(), "51.00");
        assert!(matches!(
            validate_field(&rules, GeneratedValue::Float(f64::NAN)),
            Err(FieldError::NotFinite(_))
        ));
    }

    #[test]
    fn clamped_floats_stay_within_bounds_once_printed() {
        let rules = rules(
            ColumnSpec::new(
                "ratio",
                FieldType::Float64,
                FieldGenerator::FloatRange { min: 0.0, max: 60.0 },
            )
            .bounds(0.004, 50.996)
            .scale(2),
        );
        let low = validate_field(&rules, GeneratedValue::Float(0.0)).expect("valid");
        assert_eq!(low.to_csv(), "0.01");
        let high = validate_field(&rules, GeneratedValue::Float(60.0)).expect("valid");
        assert_eq!(high.to_csv(), "50.99");
        let edge = validate_field(&rules, GeneratedValue::Float(50.9951)).expect("valid");
        assert_eq!(edge.to_csv(), "50.99");

        for printed in [low.to_csv(), high.to_csv(), edge.to_csv()] {
            let value: f64 = printed.parse().expect("number");
            assert!((0.004..=50.996).contains(&value), "{printed} out of bounds");
        }
    }

    #[test]
    fn dates_are_clamped_to_bounds() {
        let rules = rules(
            ColumnSpec::new("date_fin", FieldType::Date, FieldGenerator::Now)
                .date_bounds("2020-01-01", "2025-12-31"),
        );
        let late = NaiveDate::from_ymd_opt(2027, 3, 1).expect("date");
        assert_eq!(
            validate_field(&rules, GeneratedValue::Date(late)).map(|v| v.to_csv()),
            Ok("2025-12-31".to_string())
        );
        assert!(validate_field(&rules, GeneratedValue::Int(5)).is_err());
    }

    #[test]
    fn null_is_empty_unless_required() {
        let optional = rules(ColumnSpec::new("nom", FieldType::String, FieldGenerator::LastName));
        assert_eq!(
            validate_field(&optional, GeneratedValue::Null),
            Ok(FieldValue::Empty)
        );
        let required = rules(ColumnSpec::new("id", FieldType::Int64, FieldGenerator::RowId).required());
        assert_eq!(
            validate_field(&required, GeneratedValue::Null),
            Err(FieldError::Missing)
        );
    }
}
