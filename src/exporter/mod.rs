// ==========================================
// MatShop Catalog Pipeline - exporter layer
// ==========================================
// Responsibility: serialize the live catalog back to the tabular shape
// consumed by the importer
// ==========================================

pub mod error;
pub mod generator;

// Re-export core types
pub use error::ExportError;
pub use generator::{ExportFormat, ExportGenerator, EXPORT_HEADER};
