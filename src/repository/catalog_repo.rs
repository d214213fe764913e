// ==========================================
// MatShop Catalog Pipeline - catalog repository trait
// ==========================================
// Responsibility: entity-store port for the import/export pipeline
// Rule: no business rules here, only data access
// ==========================================

use crate::domain::catalog::{CatalogStats, CategoryDraft, CategoryRecord, ProductDraft, ProductRecord};
use crate::domain::import::ImportBatch;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// BatchOutcome - counts from one reconciled batch
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub categories_created: usize,
    pub categories_updated: usize,
    pub products_created: usize,
    pub products_updated: usize,
}

// ==========================================
// CatalogRepository trait
// ==========================================
// Implementor: CatalogRepositoryImpl (rusqlite)
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ===== Natural-key lookups =====

    /// Find a category by clean name (case-insensitive).
    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CategoryRecord>, Box<dyn Error>>;

    /// Find a product by SKU.
    async fn find_product_by_sku(
        &self,
        sku: &str,
    ) -> Result<Option<ProductRecord>, Box<dyn Error>>;

    // ===== Batch upsert (transactional) =====

    /// Apply a reconciled batch inside a single transaction: every draft is
    /// upserted by natural key with full field overwrite (last-write-wins),
    /// or nothing is committed at all.
    ///
    /// # Returns
    /// - Ok(BatchOutcome): created/updated counts per entity kind
    /// - Err: database error (whole transaction rolled back)
    async fn apply_catalog_batch(
        &self,
        categories: Vec<CategoryDraft>,
        products: Vec<ProductDraft>,
    ) -> Result<BatchOutcome, Box<dyn Error>>;

    // ===== Export queries =====

    /// All categories in display order (import ordinal, then name).
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, Box<dyn Error>>;

    /// Products of one category in name order.
    async fn list_products_by_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<ProductRecord>, Box<dyn Error>>;

    /// Read-only counts shown before an export is generated.
    async fn catalog_stats(&self) -> Result<CatalogStats, Box<dyn Error>>;

    // ===== Batch audit =====

    /// Record one import run.
    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error>>;

    /// Most recent import runs, newest first.
    async fn recent_batches(&self, limit: usize) -> Result<Vec<ImportBatch>, Box<dyn Error>>;
}
