use anyhow::{Context, Result};
use auditcheck_common::{ReconResult, Table};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

pub const REPORT_FILE: &str = "report.html";

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin-bottom:2em}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#f0f0f0}\
p.empty{color:#777}";

/// Render the summary and every result table as a standalone HTML page
pub fn render_report(name_a: &str, name_b: &str, result: &ReconResult) -> Result<String, fmt::Error> {
    let title = format!("Reconciliation: {} vs {}", name_a, name_b);
    let mut html = String::new();

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html><head><meta charset=\"utf-8\">")?;
    writeln!(html, "<title>{}</title>", escape(&title))?;
    writeln!(html, "<style>{}</style>", STYLE)?;
    writeln!(html, "</head><body>")?;
    writeln!(html, "<h1>{}</h1>", escape(&title))?;

    writeln!(html, "<h2>Summary</h2>")?;
    writeln!(html, "<table>")?;
    for (name, value) in result.summary().entries() {
        writeln!(
            html,
            "<tr><th>{}</th><td>{}</td></tr>",
            escape(name),
            escape(&value)
        )?;
    }
    writeln!(html, "</table>")?;

    for (name, table) in result.tables() {
        writeln!(html, "<h2>{}</h2>", escape(name))?;
        render_table(&mut html, table)?;
    }

    writeln!(html, "</body></html>")?;
    Ok(html)
}

fn render_table(html: &mut String, table: &Table) -> fmt::Result {
    if table.is_empty() {
        return writeln!(html, "<p class=\"empty\">No rows.</p>");
    }

    write!(html, "<table><thead><tr>")?;
    for column in table.columns() {
        write!(html, "<th>{}</th>", escape(column))?;
    }
    writeln!(html, "</tr></thead><tbody>")?;
    for row in table.rows() {
        write!(html, "<tr>")?;
        for value in row {
            write!(html, "<td>{}</td>", escape(value))?;
        }
        writeln!(html, "</tr>")?;
    }
    writeln!(html, "</tbody></table>")
}

/// Write `report.html`, titled with the two input file names
pub fn write_report(path: &Path, source_a: &Path, source_b: &Path, result: &ReconResult) -> Result<()> {
    let html = render_report(&file_label(source_a), &file_label(source_b), result)
        .context("Failed to render HTML report")?;
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditcheck_common::ReconSummary;
    use std::path::PathBuf;

    fn sample_result() -> ReconResult {
        let empty = Table::empty(vec!["id".to_string(), "name".to_string()]);
        ReconResult::new(
            Table::from_strs(&["id", "name"], &[&["1", "<Bob & Co>"]]),
            empty.clone(),
            empty.clone(),
            empty.clone(),
            empty,
            ReconSummary {
                rows_a: 1,
                rows_b: 0,
                duplicates_a: 0,
                duplicates_b: 0,
                missing_in_b: 1,
                missing_in_a: 0,
                mismatches: 0,
                keys: vec!["id".to_string()],
                compare_cols: vec!["name".to_string()],
            },
        )
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_render_report() {
        let html = render_report("a.csv", "b.xlsx", &sample_result()).unwrap();

        assert!(html.contains("<title>Reconciliation: a.csv vs b.xlsx</title>"));
        assert!(html.contains("<tr><th>missing_in_b</th><td>1</td></tr>"));
        assert!(html.contains("<td>&lt;Bob &amp; Co&gt;</td>"));
        assert!(html.contains("<h2>mismatches</h2>\n<p class=\"empty\">No rows.</p>"));
        assert_eq!(html.matches("<h2>").count(), 6);
    }

    #[test]
    fn test_file_label() {
        assert_eq!(file_label(&PathBuf::from("/data/ledger.csv")), "ledger.csv");
        assert_eq!(file_label(Path::new("ledger.xlsx")), "ledger.xlsx");
    }
}
