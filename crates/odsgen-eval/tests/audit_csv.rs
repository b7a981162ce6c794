use std::fs;
use std::path::PathBuf;

use odsgen_core::{ColumnSpec, Dataset, FieldGenerator, FieldType, TableSchema};
use odsgen_eval::{AuditEngine, AuditOptions, EvalError, ViolationCode};
use odsgen_generate::{GenerateOptions, GenerationEngine, TargetSize};

fn small_schema() -> TableSchema {
    TableSchema::new("people")
        .column(
            ColumnSpec::new("id", FieldType::Int64, FieldGenerator::RowId)
                .required()
                .min(1.0),
        )
        .column(
            ColumnSpec::new("nom", FieldType::String, FieldGenerator::LastName).max_length(6),
        )
        .column(
            ColumnSpec::new(
                "age",
                FieldType::Int64,
                FieldGenerator::IntRange { min: 18, max: 65 },
            )
            .bounds(16.0, 70.0),
        )
}

#[test]
fn generated_file_passes_audit() {
    let out_dir = temp_out_dir("clean");
    let path = out_dir.join("employees_audit.csv");
    let schema = Dataset::Employees.schema();

    let options = GenerateOptions {
        seed: Some(5),
        batch_size: 100,
        ..GenerateOptions::default()
    };
    GenerationEngine::new(options)
        .run(&schema, &path, TargetSize::bytes(64 * 1024))
        .expect("generation");

    let result = AuditEngine::new(AuditOptions::default())
        .run(&schema, &path)
        .expect("audit");

    assert!(result.report.header_ok);
    assert!(result.report.rows_checked > 0);
    assert!(result.report.is_clean(), "{:?}", result.report.samples);
    assert_eq!(result.report.file_size, fs::metadata(&path).expect("meta").len());
}

#[test]
fn hand_written_violations_are_grouped_by_code() {
    let out_dir = temp_out_dir("dirty");
    let path = out_dir.join("people.csv");
    fs::write(
        &path,
        "id;nom;age\n1;Dupont;30\n;Martin;90\n3;Lefebvre;x\n4;Roux\n",
    )
    .expect("write csv");

    let result = AuditEngine::new(AuditOptions::default())
        .run(&small_schema(), &path)
        .expect("audit");
    let report = result.report;

    assert!(report.header_ok);
    assert_eq!(report.rows_checked, 4);
    assert_eq!(report.count(ViolationCode::MissingRequired), 1);
    assert_eq!(report.count(ViolationCode::AboveMax), 1);
    assert_eq!(report.count(ViolationCode::TooLong), 1);
    assert_eq!(report.count(ViolationCode::ParseError), 1);
    assert_eq!(report.count(ViolationCode::ColumnCount), 1);
    assert_eq!(report.violations_total, 5);
}

#[test]
fn header_mismatch_is_reported() {
    let out_dir = temp_out_dir("header");
    let path = out_dir.join("people.csv");
    fs::write(&path, "id;name;age\n1;Dupont;30\n").expect("write csv");

    let result = AuditEngine::new(AuditOptions::default())
        .run(&small_schema(), &path)
        .expect("audit");

    assert!(!result.report.header_ok);
    assert_eq!(result.report.count(ViolationCode::HeaderMismatch), 1);
}

#[test]
fn strict_mode_fails_and_reports_are_written() {
    let out_dir = temp_out_dir("strict");
    let path = out_dir.join("people.csv");
    fs::write(&path, "id;nom;age\n1;Dupont;12\n").expect("write csv");

    let options = AuditOptions {
        strict: true,
        out_dir: Some(out_dir.clone()),
        ..AuditOptions::default()
    };
    let result = AuditEngine::new(options).run(&small_schema(), &path);

    assert!(matches!(result, Err(EvalError::Violations(1))));
    assert!(out_dir.join("people.audit.json").exists());
    assert!(out_dir.join("people.audit.md").exists());
}

#[test]
fn samples_are_capped() {
    let out_dir = temp_out_dir("cap");
    let path = out_dir.join("people.csv");
    let mut contents = String::from("id;nom;age\n");
    for row in 1..=30 {
        contents.push_str(&format!("{row};Dupont;99\n"));
    }
    fs::write(&path, contents).expect("write csv");

    let options = AuditOptions {
        max_samples: 10,
        ..AuditOptions::default()
    };
    let report = AuditEngine::new(options)
        .run(&small_schema(), &path)
        .expect("audit")
        .report;

    assert_eq!(report.violations_total, 30);
    assert_eq!(report.samples.len(), 10);
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("odsgen_eval_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}
