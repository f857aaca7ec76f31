//! Tabular ingest: parses an uploaded spreadsheet into a [`RawTable`].
//!
//! Dispatch is by lower-cased file extension: `.csv` goes through the `csv`
//! reader, `.xlsx` through calamine (first worksheet only). A zero-row file
//! is an empty table, not an error; the pipeline answers "file is empty".

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use serde_json::Value;

use crate::models::RawTable;

/// Ingest failure. `UnsupportedFormat` is a client error; the rest surface
/// as processing failures.
#[derive(Debug)]
pub enum IngestError {
    UnsupportedFormat(String),
    Parse(String),
    Io(String),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::UnsupportedFormat(ext) => {
                write!(f, "unsupported file format: .{}", ext)
            }
            IngestError::Parse(e) => write!(f, "parse failed: {}", e),
            IngestError::Io(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for IngestError {}

/// Parses `path` into an ordered table of raw cell values.
pub fn read_table(path: &Path) -> Result<RawTable, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => read_csv(path),
        "xlsx" => read_xlsx(path),
        other => Err(IngestError::UnsupportedFormat(other.to_string())),
    }
}

fn read_csv(path: &Path) -> Result<RawTable, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|e| IngestError::Io(e.to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::Parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::Parse(e.to_string()))?;
        rows.push(record.iter().map(infer_scalar).collect());
    }

    Ok(RawTable { headers, rows })
}

fn read_xlsx(path: &Path) -> Result<RawTable, IngestError> {
    let mut workbook: Xlsx<std::io::BufReader<std::fs::File>> =
        open_workbook::<Xlsx<std::io::BufReader<std::fs::File>>, _>(path)
            .map_err(|e| IngestError::Parse(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::Parse("workbook has no worksheets".to_string()))?
        .map_err(|e| IngestError::Parse(e.to_string()))?;

    let mut rows_iter = range.rows();

    // First row is the header row. Blank header cells get positional names.
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("unnamed_{}", i),
                other => other.to_string(),
            })
            .collect(),
        None => Vec::new(),
    };

    let rows = rows_iter
        .map(|row| row.iter().map(cell_to_value).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

/// CSV cells arrive as text; numeric-looking cells become numbers and empty
/// cells become null, matching what clients expect from a dataframe load.
fn infer_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(raw.to_string())
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::Number((*i).into()),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}
