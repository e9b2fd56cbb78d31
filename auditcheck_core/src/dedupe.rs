use auditcheck_common::{AuditError, Source, Table};
use std::collections::{HashMap, HashSet};

/// Resolved positions of the key columns within one table
#[derive(Debug, Clone)]
pub struct KeyIndex {
    positions: Vec<usize>,
}

impl KeyIndex {
    /// Resolve `keys` against the columns of `table`.
    ///
    /// `side` only labels the error when a key column is missing.
    pub fn resolve(table: &Table, keys: &[String], side: Source) -> Result<Self, AuditError> {
        if keys.is_empty() {
            return Err(AuditError::NoKeys);
        }

        let positions = keys
            .iter()
            .map(|key| {
                table.column_index(key).ok_or_else(|| AuditError::InvalidKey {
                    column: key.clone(),
                    side,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { positions })
    }

    /// Key tuple of one row
    pub fn key_of<'a>(&self, row: &'a [String]) -> Vec<&'a str> {
        self.positions.iter().map(|&idx| row[idx].as_str()).collect()
    }
}

/// A table split into first-occurrence rows and duplicated rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduped {
    /// One row per distinct key, first occurrence, original order
    pub unique: Table,
    /// Every row whose key occurs more than once, sorted by key
    pub duplicates: Table,
}

/// Split `table` on the key columns.
///
/// The first row for each key is kept in `unique`. Every row of a repeated
/// key, including that first one, is copied to `duplicates`.
pub fn dedupe(table: &Table, keys: &[String], side: Source) -> Result<Deduped, AuditError> {
    let index = KeyIndex::resolve(table, keys, side)?;

    let mut counts: HashMap<Vec<&str>, usize> = HashMap::with_capacity(table.len());
    for row in table.rows() {
        *counts.entry(index.key_of(row)).or_insert(0) += 1;
    }

    let mut unique = Vec::with_capacity(counts.len());
    let mut duplicates: Vec<(Vec<&str>, &Vec<String>)> = Vec::new();
    let mut emitted: HashSet<Vec<&str>> = HashSet::with_capacity(counts.len());

    for row in table.rows() {
        let key = index.key_of(row);
        if counts[&key] > 1 {
            duplicates.push((key.clone(), row));
        }
        if emitted.insert(key) {
            unique.push(row.clone());
        }
    }

    // Vec::sort_by is stable, so rows sharing a key keep their input order
    duplicates.sort_by(|(a, _), (b, _)| a.cmp(b));

    let columns = table.columns().to_vec();
    Ok(Deduped {
        unique: Table::new(columns.clone(), unique),
        duplicates: Table::new(
            columns,
            duplicates.into_iter().map(|(_, row)| row.clone()).collect(),
        ),
    })
}
