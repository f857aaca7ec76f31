//! Core data types flowing through the ingest and query pipeline.

use serde_json::Value;

/// One normalized row: lower-cased column name → scalar value.
///
/// Every record of a stored dataset carries the same key set, including an
/// `image_url` key (original, reformatted, or synthesized).
pub type Record = serde_json::Map<String, Value>;

/// Parsed table as it comes out of ingest, before normalization.
///
/// Column order is preserved. Rows may be shorter than the header row
/// (flexible CSV input); the normalizer pads missing cells with null.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    /// A table with no data rows. A header-only file still counts as empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
