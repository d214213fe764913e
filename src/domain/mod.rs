// ==========================================
// MatShop Catalog Pipeline - domain model layer
// ==========================================
// Responsibility: catalog entities and import row types
// Rule: no data access logic, no pipeline logic
// ==========================================

pub mod catalog;
pub mod import;

// Re-export core types
pub use catalog::{
    CatalogStats, CategoryDraft, CategoryRecord, ProductDraft, ProductRecord, UpsertOutcome,
};
pub use import::{
    ClassifiedRow, ImportBatch, ImportOutcome, ImportStats, RawRow, RowError, RowKind,
    ValidatedRow,
};
