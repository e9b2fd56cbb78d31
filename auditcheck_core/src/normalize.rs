use auditcheck_common::{NormalizeOptions, Table};
use caseless::default_case_fold_str;
use std::collections::BTreeSet;

/// Normalize the named columns of `table`, returning a new table.
///
/// Cells are trimmed first and case-folded second. Columns missing from the
/// table are skipped, so the same target list can be applied to both sources
/// before their headers have been checked.
pub fn normalize(table: &Table, columns: &[String], options: NormalizeOptions) -> Table {
    if options.is_identity() {
        return table.clone();
    }

    let targets: BTreeSet<usize> = columns
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(idx, value)| {
                    if targets.contains(&idx) {
                        normalize_value(value, options)
                    } else {
                        value.clone()
                    }
                })
                .collect()
        })
        .collect();

    Table::new(table.columns().to_vec(), rows)
}

/// Normalize a single cell. Folding is full Unicode default case folding,
/// so `ß` folds to `ss` and final sigma to `σ`.
pub fn normalize_value(value: &str, options: NormalizeOptions) -> String {
    let value = if options.strip { value.trim() } else { value };
    if options.casefold {
        default_case_fold_str(value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_strip_only_targets() {
        let table = Table::from_strs(&["id", "name", "note"], &[&[" 1 ", " Bob ", " keep "]]);
        let out = normalize(&table, &cols(&["id", "name"]), NormalizeOptions::new(true, false));

        assert_eq!(out.get(0, "id"), Some("1"));
        assert_eq!(out.get(0, "name"), Some("Bob"));
        assert_eq!(out.get(0, "note"), Some(" keep "));
        // Input is untouched
        assert_eq!(table.get(0, "name"), Some(" Bob "));
    }

    #[test]
    fn test_strip_then_casefold() {
        let table = Table::from_strs(&["name"], &[&["  ÅSA Berg\t"]]);
        let out = normalize(&table, &cols(&["name"]), NormalizeOptions::new(true, true));
        assert_eq!(out.get(0, "name"), Some("åsa berg"));
    }

    #[test]
    fn test_casefold_is_full_folding() {
        let opts = NormalizeOptions::new(true, true);
        assert_eq!(normalize_value("STRASSE", opts), normalize_value("straße", opts));
        assert_eq!(normalize_value("straße", opts), "strasse");
        assert_eq!(normalize_value("ΣΑΣ", opts), normalize_value("σας", opts));
        assert_eq!(normalize_value("σας", opts), "σασ");
    }

    #[test]
    fn test_casefold_without_strip_keeps_whitespace() {
        let table = Table::from_strs(&["name"], &[&[" Bob "]]);
        let out = normalize(&table, &cols(&["name"]), NormalizeOptions::new(false, true));
        assert_eq!(out.get(0, "name"), Some(" bob "));
    }

    #[test]
    fn test_missing_columns_are_skipped() {
        let table = Table::from_strs(&["id"], &[&[" 1 "]]);
        let out = normalize(
            &table,
            &cols(&["id", "only_in_other_table"]),
            NormalizeOptions::default(),
        );
        assert_eq!(out.columns(), table.columns());
        assert_eq!(out.get(0, "id"), Some("1"));
    }

    #[test]
    fn test_identity_options_return_copy() {
        let table = Table::from_strs(&["id", "name"], &[&[" 1 ", "Bob"]]);
        let out = normalize(&table, &cols(&["id", "name"]), NormalizeOptions::new(false, false));
        assert_eq!(out, table);
    }

    #[test]
    fn test_repeated_target_applied_once() {
        let table = Table::from_strs(&["name"], &[&[" Bob "]]);
        let out = normalize(&table, &cols(&["name", "name"]), NormalizeOptions::new(true, true));
        assert_eq!(out.get(0, "name"), Some("bob"));
    }
}
