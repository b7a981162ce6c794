use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::graph::derivation_order;
use crate::schema::{ColumnSpec, TableSchema, parse_date};
use crate::types::{FieldGenerator, FieldType};

/// Characters that would break a `;`-delimited row if they appeared in a
/// column name.
const FORBIDDEN_NAME_CHARS: &[char] = &[';', '\n', '\r', '"'];

/// Maximum decimal places accepted for float columns.
pub const MAX_SCALE: u32 = 12;

/// Validate internal consistency of a table schema.
///
/// This checks:
/// - the table has a name usable as a file name prefix and at least one
///   column
/// - column names are non-empty, unique and safe to use as CSV headers
/// - bounds are ordered and attached to a column type that supports them
/// - generator parameters are well formed and `choice` lists exist
/// - derived generators reference existing columns without cycles
pub fn validate_schema(schema: &TableSchema) -> Result<()> {
    if schema.name.trim().is_empty() {
        return Err(Error::InvalidSchema("table name is empty".to_string()));
    }
    if schema.name.contains(['/', '\\']) || schema.name.starts_with('.') {
        return Err(Error::InvalidSchema(format!(
            "table name must be usable as a file name prefix: {:?}",
            schema.name
        )));
    }
    if schema.columns.is_empty() {
        return Err(Error::InvalidSchema(format!(
            "table '{}' declares no columns",
            schema.name
        )));
    }

    let mut names = BTreeSet::new();
    for column in &schema.columns {
        if column.name.trim().is_empty() {
            return Err(Error::InvalidSchema(format!(
                "table '{}' has a column with an empty name",
                schema.name
            )));
        }
        if column.name.contains(FORBIDDEN_NAME_CHARS) {
            return Err(Error::InvalidSchema(format!(
                "column name contains a delimiter, quote or newline: {:?}",
                column.name
            )));
        }
        if !names.insert(column.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate column name: {}.{}",
                schema.name, column.name
            )));
        }
    }

    for column in &schema.columns {
        validate_bounds(schema, column)?;
        validate_generator(schema, column)?;
    }

    derivation_order(schema).map_err(|stuck| {
        Error::InvalidSchema(format!(
            "cyclic derived columns in '{}': {}",
            schema.name,
            stuck.join(", ")
        ))
    })?;

    Ok(())
}

fn validate_bounds(schema: &TableSchema, column: &ColumnSpec) -> Result<()> {
    let path = format!("{}.{}", schema.name, column.name);

    if (column.min_val.is_some() || column.max_val.is_some()) && !column.field_type.is_numeric() {
        return Err(Error::InvalidSchema(format!(
            "{path}: min_val/max_val require a numeric type, found {}",
            column.field_type
        )));
    }
    for bound in [column.min_val, column.max_val].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(Error::InvalidSchema(format!("{path}: bounds must be finite")));
        }
        if column.field_type == FieldType::Int64 && bound.fract() != 0.0 {
            return Err(Error::InvalidSchema(format!(
                "{path}: int64 bounds must be whole numbers, found {bound}"
            )));
        }
    }
    if let (Some(min), Some(max)) = (column.min_val, column.max_val)
        && min > max
    {
        return Err(Error::InvalidSchema(format!(
            "{path}: min_val {min} is greater than max_val {max}"
        )));
    }

    if let Some(max_length) = column.max_length {
        if column.field_type != FieldType::String {
            return Err(Error::InvalidSchema(format!(
                "{path}: max_length requires a string type, found {}",
                column.field_type
            )));
        }
        if max_length == 0 {
            return Err(Error::InvalidSchema(format!(
                "{path}: max_length must be positive"
            )));
        }
    }

    if let Some(scale) = column.scale {
        if column.field_type != FieldType::Float64 {
            return Err(Error::InvalidSchema(format!(
                "{path}: scale requires a float64 type, found {}",
                column.field_type
            )));
        }
        if scale > MAX_SCALE {
            return Err(Error::InvalidSchema(format!(
                "{path}: scale {scale} exceeds {MAX_SCALE}"
            )));
        }
        if let (Some(min), Some(max)) = column.writable_bounds()
            && min > max
        {
            return Err(Error::InvalidSchema(format!(
                "{path}: no value with {scale} decimals lies within the bounds"
            )));
        }
    }

    if column.min_date.is_some() || column.max_date.is_some() {
        if column.field_type != FieldType::Date {
            return Err(Error::InvalidSchema(format!(
                "{path}: min_date/max_date require a date type, found {}",
                column.field_type
            )));
        }
        let min = parse_bound_date(&path, column.min_date.as_deref())?;
        let max = parse_bound_date(&path, column.max_date.as_deref())?;
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(Error::InvalidSchema(format!(
                "{path}: min_date {min} is after max_date {max}"
            )));
        }
    }

    Ok(())
}

fn parse_bound_date(path: &str, value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    match value {
        None => Ok(None),
        Some(raw) => parse_date(raw).map(Some).ok_or_else(|| {
            Error::InvalidSchema(format!("{path}: invalid date '{raw}', expected YYYY-MM-DD"))
        }),
    }
}

fn validate_generator(schema: &TableSchema, column: &ColumnSpec) -> Result<()> {
    let path = format!("{}.{}", schema.name, column.name);
    let generator_id = column.generator.id();

    match &column.generator {
        FieldGenerator::Choice { list } => match schema.lists.get(list) {
            None => {
                return Err(Error::InvalidSchema(format!(
                    "{path}: choice list '{list}' is not declared"
                )));
            }
            Some(values) if values.is_empty() => {
                return Err(Error::InvalidSchema(format!(
                    "{path}: choice list '{list}' is empty"
                )));
            }
            Some(_) => {}
        },
        FieldGenerator::IntRange { min, max } if min > max => {
            return Err(Error::InvalidSchema(format!(
                "{path}: {generator_id} min {min} is greater than max {max}"
            )));
        }
        FieldGenerator::FloatRange { min, max } => {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(Error::InvalidSchema(format!(
                    "{path}: {generator_id} requires finite min <= max"
                )));
            }
        }
        FieldGenerator::DateRange { min, max } => {
            let min = parse_bound_date(&path, Some(min))?;
            let max = parse_bound_date(&path, Some(max))?;
            if min > max {
                return Err(Error::InvalidSchema(format!(
                    "{path}: {generator_id} min is after max"
                )));
            }
        }
        FieldGenerator::DateOffset {
            min_days, max_days, ..
        } if min_days > max_days => {
            return Err(Error::InvalidSchema(format!(
                "{path}: {generator_id} min_days is greater than max_days"
            )));
        }
        FieldGenerator::Reference { width, .. } if *width == 0 || *width > 20 => {
            return Err(Error::InvalidSchema(format!(
                "{path}: {generator_id} width must be between 1 and 20"
            )));
        }
        FieldGenerator::Lorem { max_chars } if *max_chars == 0 => {
            return Err(Error::InvalidSchema(format!(
                "{path}: {generator_id} max_chars must be positive"
            )));
        }
        _ => {}
    }

    for input in column.generator.inputs() {
        if input == column.name {
            return Err(Error::InvalidSchema(format!(
                "{path}: {generator_id} cannot read its own column"
            )));
        }
        if schema.column_index(input).is_none() {
            return Err(Error::InvalidSchema(format!(
                "{path}: {generator_id} references unknown column '{input}'"
            )));
        }
    }

    Ok(())
}
