//! Turning report rows into text.
//!
//! Rows stay data until this step, so the same report can be printed as a
//! terminal table, as tab-separated lines or as JSON.

use std::io::{self, Write};
use tabled::builder::Builder;
use tabled::settings::{object::Columns, Modify, Style, Width};

use crate::types::{Report, ReportRow};

/// Width of the label column.
pub const LABEL_WIDTH: usize = 14;
/// Width at which values are truncated.
pub const VALUE_WIDTH: usize = 96;

const INDENT: &str = "  ";

/// A report output format.
pub trait Render {
    fn render(&self, report: &Report, out: &mut dyn Write) -> io::Result<()>;

    fn render_to_string(&self, report: &Report) -> io::Result<String> {
        let mut buf = Vec::new();
        self.render(report, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn label_text(row: &ReportRow) -> String {
    format!("{}{}", INDENT.repeat(usize::from(row.indent)), row.label)
}

/// Fixed-width monospace table with the report title as header.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer;

impl Render for TableRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> io::Result<()> {
        let mut builder = Builder::default();
        builder.push_record([String::new(), report.title.clone()]);
        for row in &report.rows {
            builder.push_record([label_text(row), row.value.clone()]);
        }

        let mut table = builder.build();
        table
            .with(Style::blank())
            .with(Modify::new(Columns::single(0)).with(Width::truncate(LABEL_WIDTH)))
            .with(Modify::new(Columns::single(0)).with(Width::increase(LABEL_WIDTH)))
            .with(Modify::new(Columns::single(1)).with(Width::truncate(VALUE_WIDTH)));

        writeln!(out, "{table}")
    }
}

/// One `label<TAB>value` line per row; indentation is kept in the label.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsvRenderer;

impl Render for TsvRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> io::Result<()> {
        for row in &report.rows {
            if row.is_blank() {
                writeln!(out)?;
            } else {
                writeln!(out, "{}\t{}", label_text(row), row.value)?;
            }
        }
        Ok(())
    }
}

/// The report serialized as a JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Render for JsonRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        Report {
            title: "example.com".into(),
            rows: vec![
                ReportRow::new("Subject", "CN=example.com"),
                ReportRow::blank(),
                ReportRow::header("Fingerprints"),
                ReportRow::new("SHA-1", "AB:CD").indented(),
            ],
        }
    }

    #[test]
    fn tsv_keeps_rows_in_order() {
        let text = TsvRenderer.render_to_string(&sample()).unwrap();
        assert_eq!(
            text,
            "Subject\tCN=example.com\n\nFingerprints\t\n  SHA-1\tAB:CD\n"
        );
    }

    #[test]
    fn table_has_title_and_fixed_label_column() {
        let text = TableRenderer.render_to_string(&sample()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("example.com"));

        let subject = lines[1];
        assert!(subject.contains("Subject"));
        let value_at = subject.find("CN=example.com").unwrap();
        assert!(value_at >= LABEL_WIDTH);
        assert_eq!(lines[4].find("AB:CD"), Some(value_at));
    }

    #[test]
    fn table_truncates_long_values() {
        let report = Report {
            title: String::new(),
            rows: vec![ReportRow::new("Subject", "x".repeat(200))],
        };
        let text = TableRenderer.render_to_string(&report).unwrap();
        let longest = text.lines().map(|l| l.matches('x').count()).max().unwrap();
        assert_eq!(longest, VALUE_WIDTH);
    }

    #[test]
    fn json_round_trips() {
        let text = JsonRenderer.render_to_string(&sample()).unwrap();
        let parsed: Report = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample());
    }
}
