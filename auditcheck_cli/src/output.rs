use anyhow::{Context, Result};
use auditcheck_common::{ReconResult, ReconSummary, Table};
use csv::Writer;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SUMMARY_FILE: &str = "summary.txt";

/// Write the five result tables and `summary.txt` into `out_dir`.
///
/// Returns the paths written, in write order.
pub fn write_outputs(out_dir: &Path, result: &ReconResult) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output folder {}", out_dir.display()))?;

    let mut written = Vec::new();
    for (name, table) in result.tables() {
        let path = out_dir.join(format!("{}.csv", name));
        write_table(&path, table)?;
        debug!("Wrote {} rows to {}", table.len(), path.display());
        written.push(path);
    }

    let summary_path = out_dir.join(SUMMARY_FILE);
    write_summary(&summary_path, result.summary())?;
    written.push(summary_path);

    Ok(written)
}

/// Write a table as CSV: header row, then rows, no index column
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    if !table.columns().is_empty() {
        writer
            .write_record(table.columns())
            .with_context(|| format!("Failed to write header to {}", path.display()))?;
    }
    for row in table.rows() {
        writer
            .write_record(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

/// Plain `name: value` lines in summary order
pub fn render_summary(summary: &ReconSummary) -> String {
    summary
        .entries()
        .into_iter()
        .map(|(name, value)| format!("{}: {}\n", name, value))
        .collect()
}

pub fn write_summary(path: &Path, summary: &ReconSummary) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(render_summary(summary).as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
