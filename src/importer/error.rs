// ==========================================
// MatShop Catalog Pipeline - importer error types
// ==========================================
// Tool: thiserror derive macro
// ==========================================

use crate::storage::StorageError;
use thiserror::Error;

/// Importer error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .xlsx or .csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("spreadsheet parse failed: {0}")]
    SheetParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    #[error("spreadsheet has no data rows (header only or empty)")]
    EmptySheet,

    // ===== Archive errors =====
    #[error("image archive unreadable: {0}")]
    ArchiveError(String),

    // ===== Downstream errors =====
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("catalog reconciliation failed: {0}")]
    ReconcileError(String),

    // ===== Generic errors =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::SheetParseError(err.to_string())
    }
}

impl From<zip::result::ZipError> for ImportError {
    fn from(err: zip::result::ZipError) -> Self {
        ImportError::ArchiveError(err.to_string())
    }
}

/// Result type alias
pub type ImportResult<T> = Result<T, ImportError>;
