//! Column normalization: lower-cased keys and a canonical `image_url` column.
//!
//! Every dataset leaves this module with the same shape: one map per row,
//! all keys lower-cased, and an `image_url` key on every record: renamed
//! and rewritten from a detected image column, or synthesized from a fixed
//! sample pool when the table has none.

use serde_json::Value;

use crate::models::{RawTable, Record};

/// A column whose lower-cased name contains any of these is treated as the
/// image reference column. First match wins.
pub const IMAGE_COLUMN_HINTS: &[&str] = &["image", "url", "img"];

/// Sample names cycled by row position when no image column is detected.
pub const SAMPLE_IMAGE_POOL: &[&str] = &[
    "sample1.jpg",
    "sample2.jpg",
    "sample3.jpg",
    "sample4.jpg",
    "sample5.jpg",
];

pub const IMAGE_URL_KEY: &str = "image_url";

/// Normalizes an ingested table into records. `image_base` is the public
/// base URL the retrieval endpoint is reachable at.
pub fn normalize_table(table: &RawTable, image_base: &str) -> Vec<Record> {
    let headers: Vec<String> = table.headers.iter().map(|h| h.to_lowercase()).collect();
    let image_col = find_image_column(&headers);

    let mut records = Vec::with_capacity(table.rows.len());
    for (row_index, row) in table.rows.iter().enumerate() {
        let mut record = Record::new();
        for (col, header) in headers.iter().enumerate() {
            let value = row.get(col).cloned().unwrap_or(Value::Null);
            if Some(col) == image_col {
                record.insert(IMAGE_URL_KEY.to_string(), format_image_ref(value, image_base));
            } else {
                // Duplicate lower-cased headers collapse; right-most wins.
                record.insert(header.clone(), value);
            }
        }
        if image_col.is_none() {
            let sample = SAMPLE_IMAGE_POOL[row_index % SAMPLE_IMAGE_POOL.len()];
            record.insert(
                IMAGE_URL_KEY.to_string(),
                Value::String(retrieval_url(image_base, sample)),
            );
        }
        records.push(record);
    }
    records
}

fn find_image_column(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| IMAGE_COLUMN_HINTS.iter().any(|hint| h.contains(hint)))
}

/// Rewrites one image reference. Absolute URLs pass through untouched;
/// anything else is reduced to its last path segment and pointed at the
/// retrieval endpoint. Empty and non-string values pass through.
fn format_image_ref(value: Value, image_base: &str) -> Value {
    match value {
        Value::String(s) if !s.is_empty() => {
            if s.starts_with("http://") || s.starts_with("https://") {
                Value::String(s)
            } else {
                let basename = s.rsplit('/').next().unwrap_or(&s).to_string();
                Value::String(retrieval_url(image_base, &basename))
            }
        }
        other => other,
    }
}

/// Canonical retrieval URL for a stored or sample image name.
pub fn retrieval_url(image_base: &str, name: &str) -> String {
    format!("{}/get_image/{}", image_base, name)
}
