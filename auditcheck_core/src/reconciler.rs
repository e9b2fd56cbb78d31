use crate::dedupe::dedupe;
use crate::differ::diff;
use crate::loader::load_table;
use crate::normalize::normalize;
use auditcheck_common::{
    AuditError, NormalizeOptions, ReconResult, ReconSummary, Source, Table,
};
use std::path::Path;
use tracing::{debug, info};

/// Reconciles two tables on a set of key columns
#[derive(Debug, Clone)]
pub struct Reconciler {
    keys: Vec<String>,
    compare_columns: Option<Vec<String>>,
    options: NormalizeOptions,
}

impl Reconciler {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            compare_columns: None,
            options: NormalizeOptions::default(),
        }
    }

    /// Columns to compare once keys match. `None` compares every column the
    /// two tables share, apart from the keys.
    pub fn with_compare_columns(mut self, columns: Option<Vec<String>>) -> Self {
        self.compare_columns = columns;
        self
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_strip(mut self, enabled: bool) -> Self {
        self.options.strip = enabled;
        self
    }

    pub fn with_casefold(mut self, enabled: bool) -> Self {
        self.options.casefold = enabled;
        self
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    /// Load both files and reconcile them
    pub fn reconcile_files(&self, path_a: &Path, path_b: &Path) -> Result<ReconResult, AuditError> {
        info!("Reconciling {} against {}", path_a.display(), path_b.display());
        let a = load_table(path_a)?;
        let b = load_table(path_b)?;
        self.reconcile_tables(&a, &b)
    }

    /// Reconcile two already loaded tables
    pub fn reconcile_tables(&self, a: &Table, b: &Table) -> Result<ReconResult, AuditError> {
        self.validate_keys(a, b)?;
        let compare = self.resolve_compare_columns(a, b)?;
        debug!("Keys: {:?}, compare columns: {:?}", self.keys, compare);

        let mut targets = self.keys.clone();
        targets.extend(compare.iter().filter(|c| !self.keys.contains(*c)).cloned());

        let a_norm = normalize(a, &targets, self.options);
        let b_norm = normalize(b, &targets, self.options);

        let a_split = dedupe(&a_norm, &self.keys, Source::A)?;
        let b_split = dedupe(&b_norm, &self.keys, Source::B)?;
        debug!(
            "Deduplicated: A {} -> {} rows, B {} -> {} rows",
            a.len(),
            a_split.unique.len(),
            b.len(),
            b_split.unique.len()
        );

        let diff = diff(&a_split.unique, &b_split.unique, &self.keys, &compare)?;

        let summary = ReconSummary {
            rows_a: a.len(),
            rows_b: b.len(),
            duplicates_a: a_split.duplicates.len(),
            duplicates_b: b_split.duplicates.len(),
            missing_in_b: diff.missing_in_b.len(),
            missing_in_a: diff.missing_in_a.len(),
            mismatches: diff.mismatches.len(),
            keys: self.keys.clone(),
            compare_cols: compare,
        };

        info!(
            "Reconciled {} vs {} rows: {} missing in B, {} missing in A, {} mismatches, {}/{} duplicate rows",
            summary.rows_a,
            summary.rows_b,
            summary.missing_in_b,
            summary.missing_in_a,
            summary.mismatches,
            summary.duplicates_a,
            summary.duplicates_b
        );

        Ok(ReconResult::new(
            diff.missing_in_b,
            diff.missing_in_a,
            diff.mismatches,
            a_split.duplicates,
            b_split.duplicates,
            summary,
        ))
    }

    /// Every key column has to exist on both sides, A checked first
    fn validate_keys(&self, a: &Table, b: &Table) -> Result<(), AuditError> {
        if self.keys.is_empty() {
            return Err(AuditError::NoKeys);
        }
        for (side, table) in [(Source::A, a), (Source::B, b)] {
            if let Some(missing) = self.keys.iter().find(|k| !table.has_column(k)) {
                return Err(AuditError::InvalidKey {
                    column: missing.clone(),
                    side,
                });
            }
        }
        Ok(())
    }

    /// Explicit columns are checked for presence; otherwise A's columns are
    /// taken in header order when B has them too and they are not keys.
    fn resolve_compare_columns(&self, a: &Table, b: &Table) -> Result<Vec<String>, AuditError> {
        match &self.compare_columns {
            Some(columns) => {
                for (side, table) in [(Source::A, a), (Source::B, b)] {
                    if let Some(missing) = columns.iter().find(|c| !table.has_column(c)) {
                        return Err(AuditError::InvalidCompareColumn {
                            column: missing.clone(),
                            side,
                        });
                    }
                }
                Ok(columns.clone())
            }
            None => Ok(shared_columns(a, b, &self.keys)),
        }
    }
}

/// Columns of `a`, in order, that `b` also has and that are not keys
pub fn shared_columns(a: &Table, b: &Table, keys: &[String]) -> Vec<String> {
    a.columns()
        .iter()
        .filter(|c| b.has_column(c) && !keys.contains(*c))
        .cloned()
        .collect()
}

/// Reconcile two files in one call.
///
/// `compare_cols` of `None` compares all shared non-key columns.
pub fn reconcile(
    path_a: &Path,
    path_b: &Path,
    keys: Vec<String>,
    compare_cols: Option<Vec<String>>,
    options: NormalizeOptions,
) -> Result<ReconResult, AuditError> {
    Reconciler::new(keys)
        .with_compare_columns(compare_cols)
        .with_options(options)
        .reconcile_files(path_a, path_b)
}
