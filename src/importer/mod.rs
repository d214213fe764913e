// ==========================================
// MatShop Catalog Pipeline - importer layer
// ==========================================
// Responsibility: ingest operator spreadsheets and image archives,
// reconcile them against the live catalog
// Flow: parse -> classify -> validate -> reconcile -> upsert (one tx)
// ==========================================

// Module declarations
pub mod archive_ingestor;
pub mod error;
pub mod orchestrator;
pub mod reconciler;
pub mod row_classifier;
pub mod sheet_reader;
pub mod validator;

// Re-export core types
pub use archive_ingestor::{ArchiveIngestor, CategoryMatcher, IngestOutcome, MediaTarget, NameSetMatcher};
pub use error::{ImportError, ImportResult};
pub use orchestrator::CatalogImporter;
pub use reconciler::{CatalogReconciler, ReconcileOutput};
pub use row_classifier::RowClassifier;
pub use sheet_reader::{CsvSheetReader, SheetReader, UniversalSheetReader, XlsxSheetReader};
pub use validator::{RowValidator, ValidationOutput};
