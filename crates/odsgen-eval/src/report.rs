use crate::model::AuditReport;

/// Render a deterministic markdown summary of an audit.
pub fn render_report(report: &AuditReport) -> String {
    let mut lines = Vec::new();

    lines.push("# odsgen audit report".to_string());
    lines.push(String::new());
    lines.push("## File".to_string());
    lines.push(format!("- path: {}", report.file.display()));
    lines.push(format!("- table: {}", report.table));
    lines.push(format!("- size_bytes: {}", report.file_size));
    lines.push(format!("- header_ok: {}", report.header_ok));
    lines.push(format!("- rows_checked: {}", report.rows_checked));
    lines.push(format!("- fields_checked: {}", report.fields_checked));
    lines.push(String::new());

    lines.push("## Violations".to_string());
    if report.violations_by_code.is_empty() {
        lines.push("- none".to_string());
    } else {
        lines.push("| code | count |".to_string());
        lines.push("| --- | --- |".to_string());
        for (code, count) in &report.violations_by_code {
            lines.push(format!("| {code} | {count} |"));
        }
    }
    lines.push(String::new());

    if !report.samples.is_empty() {
        lines.push("## Samples".to_string());
        for violation in &report.samples {
            let column = violation.column.as_deref().unwrap_or("-");
            let row = violation
                .row_index
                .map(|row| format!(" row {row}"))
                .unwrap_or_default();
            let example = violation
                .example
                .as_ref()
                .map(|value| format!(" example={value:?}"))
                .unwrap_or_default();
            lines.push(format!(
                "- {} {}{}: {}{}",
                violation.code, column, row, violation.message, example
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::{Violation, ViolationCode};

    #[test]
    fn lists_counts_and_samples() {
        let mut report = AuditReport::new(PathBuf::from("data/employees_5mb.csv"), "employees".into());
        report.record(
            Violation {
                code: ViolationCode::TooLong,
                column: Some("nom".to_string()),
                row_index: Some(3),
                message: "60 characters, max_length is 50".to_string(),
                example: None,
            },
            10,
        );

        let rendered = render_report(&report);
        assert!(rendered.contains("| too_long | 1 |"));
        assert!(rendered.contains("- too_long nom row 3: 60 characters"));
    }

    #[test]
    fn clean_report_says_none() {
        let report = AuditReport::new(PathBuf::from("x.csv"), "t".into());
        assert!(render_report(&report).contains("## Violations\n- none"));
    }
}
