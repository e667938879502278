//! Report rows, kept as data until the final rendering step.

use serde::{Deserialize, Serialize};

/// One label/value row of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Left column text (may be empty for continuation rows)
    pub label: String,
    /// Right column text
    pub value: String,
    /// Visual nesting level under the preceding header row
    #[serde(default, skip_serializing_if = "is_zero")]
    pub indent: u8,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(v: &u8) -> bool {
    *v == 0
}

impl ReportRow {
    /// A top-level label/value row.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            indent: 0,
        }
    }

    /// A section header row with no value.
    pub fn header(label: impl Into<String>) -> Self {
        Self::new(label, "")
    }

    /// An empty separator row.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Nest this row one level deeper.
    #[must_use]
    pub const fn indented(mut self) -> Self {
        self.indent += 1;
        self
    }

    /// Returns true for separator rows.
    pub fn is_blank(&self) -> bool {
        self.label.is_empty() && self.value.is_empty()
    }
}

/// An ordered sequence of rows with a title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Heading shown above the value column
    pub title: String,
    /// Rows in display order
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Find the first row with the given label.
    pub fn row(&self, label: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}
