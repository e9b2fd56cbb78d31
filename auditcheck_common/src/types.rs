use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One side of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// System A, the left-hand input
    A,
    /// System B, the right-hand input
    B,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::A => f.write_str("A"),
            Source::B => f.write_str("B"),
        }
    }
}

/// A text-only table: named columns and rows of string cells.
///
/// Every row holds exactly one cell per column. Missing cells are stored as
/// empty strings, so lookups never have to deal with nulls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, padding short rows with empty cells.
    ///
    /// Rows longer than the header are a loader bug; callers reject them
    /// before they get here.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                debug_assert!(row.len() <= width, "row wider than header");
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// A table with the given header and no rows
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string literals. Handy in tests and examples.
    pub fn from_strs(columns: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Number of rows (the header is not counted)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell value by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// All values of one column, in row order
    pub fn column_values(&self, column: &str) -> Option<Vec<&str>> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(|r| r[col].as_str()).collect())
    }
}

/// Normalization applied to key and compare columns before comparing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Trim leading and trailing whitespace
    pub strip: bool,
    /// Compare case-insensitively
    pub casefold: bool,
}

impl NormalizeOptions {
    pub fn new(strip: bool, casefold: bool) -> Self {
        Self { strip, casefold }
    }

    /// True when neither toggle is set and normalization is a no-op
    pub fn is_identity(&self) -> bool {
        !self.strip && !self.casefold
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            strip: true,
            casefold: false,
        }
    }
}

/// Counts describing one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconSummary {
    /// Rows loaded from A, before deduplication
    pub rows_a: usize,
    /// Rows loaded from B, before deduplication
    pub rows_b: usize,
    /// Rows of A that share their key with another row of A
    pub duplicates_a: usize,
    /// Rows of B that share their key with another row of B
    pub duplicates_b: usize,
    pub missing_in_b: usize,
    pub missing_in_a: usize,
    pub mismatches: usize,
    /// Key columns used
    pub keys: Vec<String>,
    /// Compare columns used, after resolving the default
    pub compare_cols: Vec<String>,
}

impl ReconSummary {
    /// `(name, value)` pairs in report order, lists joined with commas
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("rows_a", self.rows_a.to_string()),
            ("rows_b", self.rows_b.to_string()),
            ("duplicates_a", self.duplicates_a.to_string()),
            ("duplicates_b", self.duplicates_b.to_string()),
            ("missing_in_b", self.missing_in_b.to_string()),
            ("missing_in_a", self.missing_in_a.to_string()),
            ("mismatches", self.mismatches.to_string()),
            ("keys", self.keys.join(",")),
            ("compare_cols", self.compare_cols.join(",")),
        ]
    }

    /// True when the two sources reconcile cleanly
    pub fn is_clean(&self) -> bool {
        self.duplicates_a == 0
            && self.duplicates_b == 0
            && self.missing_in_a == 0
            && self.missing_in_b == 0
            && self.mismatches == 0
    }
}

/// Output of a reconciliation run. Built once and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconResult {
    missing_in_b: Table,
    missing_in_a: Table,
    mismatches: Table,
    duplicates_a: Table,
    duplicates_b: Table,
    summary: ReconSummary,
}

impl ReconResult {
    pub fn new(
        missing_in_b: Table,
        missing_in_a: Table,
        mismatches: Table,
        duplicates_a: Table,
        duplicates_b: Table,
        summary: ReconSummary,
    ) -> Self {
        Self {
            missing_in_b,
            missing_in_a,
            mismatches,
            duplicates_a,
            duplicates_b,
            summary,
        }
    }

    /// Rows of A whose key has no counterpart in B
    pub fn missing_in_b(&self) -> &Table {
        &self.missing_in_b
    }

    /// Rows of B whose key has no counterpart in A
    pub fn missing_in_a(&self) -> &Table {
        &self.missing_in_a
    }

    pub fn mismatches(&self) -> &Table {
        &self.mismatches
    }

    pub fn duplicates_a(&self) -> &Table {
        &self.duplicates_a
    }

    pub fn duplicates_b(&self) -> &Table {
        &self.duplicates_b
    }

    pub fn summary(&self) -> &ReconSummary {
        &self.summary
    }

    /// The five result tables with their report names, in output order
    pub fn tables(&self) -> [(&'static str, &Table); 5] {
        [
            ("missing_in_b", &self.missing_in_b),
            ("missing_in_a", &self.missing_in_a),
            ("mismatches", &self.mismatches),
            ("duplicates_a", &self.duplicates_a),
            ("duplicates_b", &self.duplicates_b),
        ]
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Trim whitespace in key and compare columns
    #[serde(default = "default_true")]
    pub strip: bool,

    /// Compare key and compare columns case-insensitively
    #[serde(default)]
    pub casefold: bool,

    /// Default output directory when none is given on the command line
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Write report.html next to the CSV outputs
    #[serde(default = "default_true")]
    pub html_report: bool,

    /// Enable portable mode (config alongside binary)
    #[serde(default, skip_serializing)]
    pub portable_mode: bool,
}

fn default_true() -> bool {
    true
}

impl AuditConfig {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::new(self.strip, self.casefold)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            strip: true,
            casefold: false,
            output_dir: None,
            html_report: true,
            portable_mode: false,
        }
    }
}
