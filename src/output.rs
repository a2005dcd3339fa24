//! Output formatting and persistence for grade reports.
//!
//! Supports pretty-printing, JSON serialization, plain-text rendering and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::grading::types::GradeReport;

/// One CSV row per assignment group.
#[derive(Debug, Serialize)]
pub struct GroupRecord<'a> {
    pub generated_at: DateTime<Utc>,
    pub group_id: &'a str,
    pub group_name: &'a str,
    pub group_weight: f64,
    pub points_earned: f64,
    pub total_points: f64,
    pub percent: Option<f64>,
    pub counted: bool,
    pub error: Option<&'a str>,
    pub overall: Option<f64>,
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &GradeReport) {
    debug!("{:#?}", report);
}

/// Prints the report to stdout as pretty-printed JSON.
pub fn print_json(report: &GradeReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Renders the report the way the grades page shows it: one line per group
/// with its percentage and raw points, then the course total.
pub fn render_text(report: &GradeReport) -> String {
    report.to_string()
}

impl fmt::Display for GradeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            let label = if group.name.is_empty() {
                group.group_id.as_str()
            } else {
                group.name.as_str()
            };

            if let Some(error) = &group.error {
                writeln!(f, "{label}: error: {error}")?;
                continue;
            }

            match group.percent() {
                Some(p) => writeln!(f, "{label}: {p:.2} ({})", group.fraction())?,
                None => writeln!(f, "{label}: - ({})", group.fraction())?,
            }
        }

        writeln!(f, "Total: {}", self.overall)
    }
}

/// Appends one row per group of `report` to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, report: &GradeReport) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for group in &report.groups {
        writer.serialize(GroupRecord {
            generated_at: report.generated_at,
            group_id: &group.group_id,
            group_name: &group.name,
            group_weight: group.group_weight,
            points_earned: group.points_earned,
            total_points: group.total_points,
            percent: group.percent(),
            counted: group.counted,
            error: group.error.as_deref(),
            overall: report.overall.percent(),
        })?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::types::{FinalGrade, GroupReport, NeverDropPolicy, WeightingScheme};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn report() -> GradeReport {
        GradeReport {
            generated_at: Utc::now(),
            weighting_scheme: WeightingScheme::Percent,
            never_drop: NeverDropPolicy::Exclude,
            groups: vec![
                GroupReport {
                    group_id: "1".into(),
                    name: "Homework".into(),
                    group_weight: 30.0,
                    points_earned: 18.0,
                    total_points: 20.0,
                    counted: true,
                    error: None,
                },
                GroupReport {
                    group_id: "2".into(),
                    name: String::new(),
                    group_weight: 70.0,
                    points_earned: 0.0,
                    total_points: 0.0,
                    counted: false,
                    error: None,
                },
            ],
            overall: FinalGrade::Percent(90.0),
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&report());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&report()).unwrap();
    }

    #[test]
    fn test_report_json_shape() {
        let value = serde_json::to_value(report()).unwrap();

        assert_eq!(value["weighting_scheme"], "percent");
        assert_eq!(value["overall"]["status"], "percent");
        assert_eq!(value["overall"]["percent"], 90.0);
        assert_eq!(value["groups"][0]["group_id"], "1");
        assert!(value["groups"][0].get("error").is_none());
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&report());
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines, ["Homework: 90.00 (18.00/20.00)", "2: - (0.00/0.00)", "Total: 90.00%"]);
    }

    #[test]
    fn test_render_text_undefined_and_error() {
        let mut r = report();
        r.overall = FinalGrade::Undefined;
        r.groups[1].error = Some("bad rules".into());

        let text = render_text(&r);

        assert!(text.contains("2: error: bad rules"));
        assert!(text.ends_with("Total: undefined\n"));
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("grade_unblocker_test_header.csv");
        let _ = fs::remove_file(&path);

        append_record(&path, &report()).unwrap();
        append_record(&path, &report()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("generated_at")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 runs of 2 groups
        assert_eq!(content.lines().count(), 5);

        fs::remove_file(&path).unwrap();
    }
}
