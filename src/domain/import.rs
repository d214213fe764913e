// ==========================================
// MatShop Catalog Pipeline - import row types
// ==========================================
// Lifecycle: RawRow -> ClassifiedRow -> ValidatedRow -> drafts;
// each stage is consumed by the next and then discarded
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// RawRow - one spreadsheet data row, unparsed
// ==========================================
// Seven fixed columns by position; missing cells arrive as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize, // sheet ordinal; data starts at row 2
    pub identifier: String,
    pub name: String,
    pub title: String,
    pub price: String, // raw, unparsed
    pub description: String,
    pub meta_description: String,
    pub image: String,
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        self.identifier.is_empty()
            && self.name.is_empty()
            && self.title.is_empty()
            && self.price.is_empty()
            && self.description.is_empty()
            && self.meta_description.is_empty()
            && self.image.is_empty()
    }
}

// ==========================================
// RowKind - category vs product
// ==========================================
// A row is a category iff its identifier contains the configured separator.
// That is the sole classification signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    Category,
    Product,
}

// ==========================================
// ClassifiedRow - RawRow tagged with its kind
// ==========================================
// `key` is the natural key: the clean category name (substring after the
// last separator, upper-cased) or the identifier verbatim as SKU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRow {
    pub row_number: usize,
    pub kind: RowKind,
    pub key: String,
    pub name: String,
    pub title: String,
    pub price_raw: String,
    pub description: String,
    pub meta_description: String,
    pub image: String,
}

// ==========================================
// ValidatedRow - classified row that passed validation
// ==========================================
// The only hard requirement is a non-empty identifier. Absent descriptive
// fields stay empty and an unparseable price becomes zero; nothing is
// fabricated on the operator's behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub row_number: usize,
    pub kind: RowKind,
    pub key: String,
    pub name: String,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub meta_description: String,
    pub image: String,
}

// ==========================================
// RowError - per-row problem with provenance
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

// ==========================================
// ImportStats - per-run accumulator
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub categories_created: usize,
    pub categories_updated: usize,
    pub products_created: usize,
    pub products_updated: usize,
    pub images_processed: usize,
    pub errors: usize,
}

// ==========================================
// ImportOutcome - result surface of one run
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    pub batch_id: String,
    pub stats: ImportStats,
    /// Rows rejected by validation or failed fatally, with row ordinals
    pub error_rows: Vec<RowError>,
    /// Non-fatal normalization notes (zeroed prices, orphan products, ...)
    pub warnings: Vec<RowError>,
    pub elapsed_ms: i64,
}

// ==========================================
// ImportBatch - audit record of one import run
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub total_rows: i64,
    pub category_rows: i64,
    pub product_rows: i64,
    pub invalid_rows: i64,
    pub images_processed: i64,
    pub success: bool,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_blank() {
        let row = RawRow {
            row_number: 2,
            ..Default::default()
        };
        assert!(row.is_blank());

        let row = RawRow {
            row_number: 2,
            image: "logo.png".to_string(),
            ..Default::default()
        };
        assert!(!row.is_blank());
    }
}
