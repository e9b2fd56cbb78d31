use auditcheck_common::{AuditError, Table};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Input file family, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated text
    Csv,
    /// Excel or OpenDocument workbook
    Spreadsheet,
}

impl TableFormat {
    /// Detect the format from the extension, ignoring case
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "csv" => Some(TableFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(TableFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// Load a CSV or spreadsheet file as a text table.
///
/// Every cell is read as text and blank cells become empty strings. Any
/// parse failure fails the whole load.
pub fn load_table(path: &Path) -> Result<Table, AuditError> {
    let format = TableFormat::from_path(path)
        .ok_or_else(|| AuditError::UnsupportedFormat(path.to_path_buf()))?;

    let table = match format {
        TableFormat::Csv => load_csv(path)?,
        TableFormat::Spreadsheet => load_spreadsheet(path)?,
    };

    debug!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

fn load_csv(path: &Path) -> Result<Table, AuditError> {
    let bytes = fs::read(path)?;
    if let Some(line) = unterminated_quote_line(&bytes) {
        return Err(AuditError::malformed(
            path,
            format!("unterminated quoted field starting on line {}", line),
        ));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if raw_headers.is_empty() {
        return Err(AuditError::malformed(path, "no header row"));
    }

    let columns = unique_headers(raw_headers);
    let width = columns.len();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(AuditError::malformed(
                path,
                format!(
                    "expected {} fields on line {}, found {}",
                    width,
                    line,
                    record.len()
                ),
            ));
        }
        rows.push(record.iter().map(|v| v.to_string()).collect());
    }

    Ok(Table::new(columns, rows))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Line on which a quoted field opens and never closes, if any.
///
/// The csv reader ends such a field silently at EOF, taking the rest of
/// the file with it. Quotes only open a field at its first byte and `""`
/// inside a quoted field is an escaped quote.
fn unterminated_quote_line(bytes: &[u8]) -> Option<u64> {
    let mut state = QuoteState::FieldStart;
    let mut line = 1;
    let mut opened_on = 1;

    for &byte in bytes {
        state = match (state, byte) {
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (QuoteState::FieldStart, b'"') => {
                opened_on = line;
                QuoteState::Quoted
            }
            (_, b',' | b'\n' | b'\r') => QuoteState::FieldStart,
            _ => QuoteState::Unquoted,
        };
        if byte == b'\n' {
            line += 1;
        }
    }

    (state == QuoteState::Quoted).then_some(opened_on)
}

fn csv_error(path: &Path, err: csv::Error) -> AuditError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => AuditError::Io(io),
        _ => AuditError::malformed(path, message),
    }
}

#[cfg(feature = "excel")]
fn load_spreadsheet(path: &Path) -> Result<Table, AuditError> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook = open_workbook_auto(path).map_err(|e| calamine_error(path, e))?;

    // Only the first worksheet is reconciled
    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Ok(Table::default());
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| calamine_error(path, e))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let columns = unique_headers(header.iter().map(cell_text).collect());

    let body = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, calamine::Data::Empty)))
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(Table::new(columns, body))
}

#[cfg(not(feature = "excel"))]
fn load_spreadsheet(path: &Path) -> Result<Table, AuditError> {
    Err(AuditError::UnsupportedFormat(path.to_path_buf()))
}

#[cfg(feature = "excel")]
fn calamine_error(path: &Path, err: calamine::Error) -> AuditError {
    match err {
        calamine::Error::Io(io) => AuditError::Io(io),
        other => AuditError::malformed(path, other),
    }
}

/// Render a spreadsheet cell as text without interpreting it
#[cfg(feature = "excel")]
fn cell_text(cell: &calamine::Data) -> String {
    use calamine::Data;

    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => format_float(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format_float(dt.as_f64()),
    }
}

/// Integral floats lose the trailing ".0" so `3.0` reads back as `3`
#[cfg(feature = "excel")]
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Name blank headers `Unnamed: <index>` and suffix repeats with `.1`, `.2`, ...
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(raw.len());

    for (index, header) in raw.into_iter().enumerate() {
        let header = if index == 0 {
            header.trim_start_matches('\u{feff}').to_string()
        } else {
            header
        };
        let base = if header.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            header
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        columns.push(name);
    }

    columns
}

/// Check if a file path has an extension the loader understands
pub fn is_supported_file(path: &Path) -> bool {
    TableFormat::from_path(path).is_some()
}
