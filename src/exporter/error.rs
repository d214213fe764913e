// ==========================================
// MatShop Catalog Pipeline - exporter error types
// ==========================================
// Tool: thiserror derive macro
// ==========================================

use thiserror::Error;

/// Exporter error type
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV generation failed: {0}")]
    CsvError(String),

    #[error("XLSX generation failed: {0}")]
    XlsxError(String),

    #[error("catalog query failed: {0}")]
    QueryError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::CsvError(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::XlsxError(err.to_string())
    }
}
