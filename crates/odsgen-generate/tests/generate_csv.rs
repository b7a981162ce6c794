use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use odsgen_core::{ColumnSpec, Dataset, FieldGenerator, FieldType, TableSchema};
use odsgen_generate::{
    Clock, GenerateOptions, GenerationEngine, GenerationError, TargetSize,
};

fn fixed_options(seed: u64, batch_size: usize) -> GenerateOptions {
    let instant = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .expect("instant");
    GenerateOptions {
        batch_size,
        seed: Some(seed),
        clock: Clock::Fixed(instant),
        ..GenerateOptions::default()
    }
}

#[test]
fn output_reaches_target_within_one_batch() {
    let out_dir = temp_out_dir("target");
    let path = out_dir.join("employees_test.csv");
    let target = TargetSize::bytes(256 * 1024);
    let batch_size = 500;

    let engine = GenerationEngine::new(fixed_options(7, batch_size));
    let result = engine
        .run(&Dataset::Employees.schema(), &path, target)
        .expect("generation");

    let contents = fs::read_to_string(&path).expect("read csv");
    let max_line = contents.lines().map(|line| line.len() + 1).max().expect("lines") as u64;
    let size = fs::metadata(&path).expect("metadata").len();

    assert_eq!(result.report.bytes_written, size);
    assert!(size >= target.bytes, "file smaller than target: {size}");
    assert!(
        size < target.bytes + batch_size as u64 * max_line,
        "file overshoots target by more than one batch: {size}"
    );
    assert_eq!(
        result.report.rows_written,
        contents.lines().count() as u64 - 1
    );

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn rows_respect_schema_bounds() {
    let out_dir = temp_out_dir("bounds");
    let path = out_dir.join("contract_test.csv");
    let schema = Dataset::Contracts.schema();

    let engine = GenerationEngine::new(fixed_options(21, 200));
    engine
        .run(&schema, &path, TargetSize::bytes(128 * 1024))
        .expect("generation");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(&path)
        .expect("open csv");
    let header: Vec<String> = reader
        .headers()
        .expect("header")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(header, schema.header());

    for record in reader.records() {
        let record = record.expect("record");
        assert_eq!(record.len(), header.len());
        for (column, value) in schema.columns.iter().zip(record.iter()) {
            assert!(!value.contains(';') && !value.contains('\n'));
            if let Some(max) = column.max_length {
                assert!(value.chars().count() <= max, "{} too long", column.name);
            }
            if column.field_type.is_numeric() && !value.is_empty() {
                let number: f64 = value.parse().expect("numeric field");
                if let Some(min) = column.min_val {
                    assert!(number >= min, "{} below min: {number}", column.name);
                }
                if let Some(max) = column.max_val {
                    assert!(number <= max, "{} above max: {number}", column.name);
                }
            }
        }
    }

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn same_seed_and_clock_give_identical_files() {
    let out_dir = temp_out_dir("determinism");
    let path_a = out_dir.join("a.csv");
    let path_b = out_dir.join("b.csv");
    let schema = Dataset::Contracts.schema();
    let target = TargetSize::bytes(64 * 1024);

    GenerationEngine::new(fixed_options(42, 100))
        .run(&schema, &path_a, target)
        .expect("run a");
    GenerationEngine::new(fixed_options(42, 100))
        .run(&schema, &path_b, target)
        .expect("run b");

    let a = fs::read(&path_a).expect("read a");
    let b = fs::read(&path_b).expect("read b");
    assert!(a == b, "outputs differ for the same seed");

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn destination_directory_is_created() {
    let out_dir = temp_out_dir("nested");
    let path = out_dir.join("deep").join("data").join("employees_test.csv");

    GenerationEngine::new(fixed_options(1, 50))
        .run(&Dataset::Employees.schema(), &path, TargetSize::bytes(4 * 1024))
        .expect("generation");

    assert!(path.exists());

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn invalid_schema_is_rejected_before_writing() {
    let out_dir = temp_out_dir("invalid");
    let path = out_dir.join("broken.csv");
    let schema = TableSchema::new("broken").column(ColumnSpec::new(
        "ville",
        FieldType::String,
        FieldGenerator::Choice {
            list: "villes".to_string(),
        },
    ));

    let result = GenerationEngine::new(fixed_options(1, 10)).run(
        &schema,
        &path,
        TargetSize::bytes(1024),
    );

    assert!(matches!(result, Err(GenerationError::InvalidSchema(_))));
    assert!(!path.exists());

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn unwritable_destination_is_fatal() {
    let out_dir = temp_out_dir("unwritable");
    // the destination path is an existing directory
    let result = GenerationEngine::new(fixed_options(1, 10)).run(
        &Dataset::Employees.schema(),
        &out_dir,
        TargetSize::bytes(1024),
    );

    assert!(matches!(result, Err(GenerationError::Io(_))));

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn field_errors_are_counted_per_column() {
    let out_dir = temp_out_dir("field_errors");
    let path = out_dir.join("errors.csv");
    let schema = TableSchema::new("errors")
        .column(ColumnSpec::new("id", FieldType::Int64, FieldGenerator::RowId).required())
        .column(ColumnSpec::new(
            "age",
            FieldType::Int64,
            FieldGenerator::Lorem { max_chars: 20 },
        ));

    let report = GenerationEngine::new(fixed_options(3, 50))
        .run(&schema, &path, TargetSize::bytes(2 * 1024))
        .expect("generation")
        .report;

    assert!(report.rows_written > 0);
    assert_eq!(report.field_errors, report.rows_written);
    assert_eq!(report.row_fallbacks, 0);
    assert_eq!(
        report.field_errors_by_column,
        BTreeMap::from([("age".to_string(), report.rows_written)])
    );
    assert_eq!(report.error_count(), report.rows_written);

    let contents = fs::read_to_string(&path).expect("read csv");
    for (row, line) in contents.lines().skip(1).enumerate() {
        assert_eq!(line, format!("{};", row + 1));
    }

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn fallback_rows_are_counted() {
    let out_dir = temp_out_dir("fallbacks");
    let path = out_dir.join("fallbacks.csv");
    let schema = TableSchema::new("fallbacks")
        .column(ColumnSpec::new("id", FieldType::Int64, FieldGenerator::RowId).required())
        .column(ColumnSpec::new(
            "zero",
            FieldType::Int64,
            FieldGenerator::IntRange { min: 0, max: 0 },
        ))
        .column(
            ColumnSpec::new(
                "ratio",
                FieldType::Float64,
                FieldGenerator::Ratio {
                    numerator: "id".to_string(),
                    denominator: "zero".to_string(),
                },
            )
            .fallback("n/a"),
        );

    let report = GenerationEngine::new(fixed_options(5, 50))
        .run(&schema, &path, TargetSize::bytes(1024))
        .expect("generation")
        .report;

    assert!(report.rows_written > 0);
    assert_eq!(report.row_fallbacks, report.rows_written);
    assert_eq!(report.field_errors, report.rows_written);
    assert_eq!(
        report.field_errors_by_column,
        BTreeMap::from([("ratio".to_string(), report.rows_written)])
    );
    assert_eq!(report.error_count(), 2 * report.rows_written);

    let contents = fs::read_to_string(&path).expect("read csv");
    let first = contents.lines().nth(1).expect("first row");
    assert_eq!(first, "1;;");

    fs::remove_dir_all(&out_dir).ok();
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("odsgen_generate_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}
