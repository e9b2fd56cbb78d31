use crate::dedupe::KeyIndex;
use auditcheck_common::{AuditError, Source, Table};
use std::collections::{HashMap, HashSet};

/// Suffix appended to B-side compare columns in the mismatch table
pub const B_SUFFIX: &str = "_b";

/// Set and value differences between two deduplicated tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    /// Rows of A whose key is absent from B
    pub missing_in_b: Table,
    /// Rows of B whose key is absent from A
    pub missing_in_a: Table,
    /// A's row plus B's compare values for keys whose values differ
    pub mismatches: Table,
}

/// Compare two tables that each hold at most one row per key.
///
/// Cells are compared byte for byte; normalization has to happen upstream.
/// Mismatch rows carry every column of A followed by `<col>_b` for each
/// compare column.
pub fn diff(a: &Table, b: &Table, keys: &[String], compare: &[String]) -> Result<Diff, AuditError> {
    let a_keys = KeyIndex::resolve(a, keys, Source::A)?;
    let b_keys = KeyIndex::resolve(b, keys, Source::B)?;
    let a_compare = compare_positions(a, compare, Source::A)?;
    let b_compare = compare_positions(b, compare, Source::B)?;

    let b_index: HashMap<Vec<&str>, &Vec<String>> = b
        .rows()
        .iter()
        .map(|row| (b_keys.key_of(row), row))
        .collect();

    let mut missing_in_b = Vec::new();
    let mut mismatches = Vec::new();

    for row in a.rows() {
        match b_index.get(&a_keys.key_of(row)) {
            None => missing_in_b.push(row.clone()),
            Some(b_row) => {
                let differs = a_compare
                    .iter()
                    .zip(&b_compare)
                    .any(|(&ai, &bi)| row[ai] != b_row[bi]);
                if differs {
                    let mut out = row.clone();
                    out.extend(b_compare.iter().map(|&bi| b_row[bi].clone()));
                    mismatches.push(out);
                }
            }
        }
    }

    let a_index: HashSet<Vec<&str>> =
        a.rows().iter().map(|row| a_keys.key_of(row)).collect();
    let missing_in_a = b
        .rows()
        .iter()
        .filter(|row| !a_index.contains(&b_keys.key_of(row)))
        .cloned()
        .collect();

    let mut mismatch_columns = a.columns().to_vec();
    mismatch_columns.extend(compare.iter().map(|c| format!("{}{}", c, B_SUFFIX)));

    Ok(Diff {
        missing_in_b: Table::new(a.columns().to_vec(), missing_in_b),
        missing_in_a: Table::new(b.columns().to_vec(), missing_in_a),
        mismatches: Table::new(mismatch_columns, mismatches),
    })
}

fn compare_positions(table: &Table, compare: &[String], side: Source) -> Result<Vec<usize>, AuditError> {
    compare
        .iter()
        .map(|col| {
            table
                .column_index(col)
                .ok_or_else(|| AuditError::InvalidCompareColumn {
                    column: col.clone(),
                    side,
                })
        })
        .collect()
}
