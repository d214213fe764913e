// ==========================================
// MatShop Catalog Pipeline - core library
// ==========================================
// Scope: bulk catalog import/export for the storefront
// Stack: Rust + SQLite + filesystem media store
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and row types
pub mod domain;

// Repository layer - catalog data access
pub mod repository;

// Importer layer - spreadsheet + archive ingestion
pub mod importer;

// Exporter layer - tabular catalog export
pub mod exporter;

// Storage layer - resilient media file persistence
pub mod storage;

// Configuration layer
pub mod config;

// Database infrastructure (connection init / unified PRAGMA)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-exports of core types
// ==========================================

// Domain entities
pub use domain::{
    CatalogStats, CategoryDraft, CategoryRecord, ClassifiedRow, ImportBatch, ImportOutcome,
    ImportStats, ProductDraft, ProductRecord, RawRow, RowError, RowKind, UpsertOutcome,
    ValidatedRow,
};

// Repository
pub use repository::{BatchOutcome, CatalogRepository, CatalogRepositoryImpl, RepositoryError};

// Importer
pub use importer::{
    ArchiveIngestor, CatalogImporter, CatalogReconciler, CategoryMatcher, ImportError,
    MediaTarget, NameSetMatcher, RowClassifier, RowValidator, UniversalSheetReader,
};

// Exporter
pub use exporter::{ExportError, ExportFormat, ExportGenerator};

// Storage
pub use storage::{FsMediaStore, MediaStore, RetryPolicy, StorageError};

// Configuration
pub use config::CatalogSettings;

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Application name
pub const APP_NAME: &str = "MatShop Catalog Pipeline";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
