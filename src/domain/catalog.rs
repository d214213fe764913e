// ==========================================
// MatShop Catalog Pipeline - catalog entities
// ==========================================
// Rule: natural keys drive upserts (category clean name, product SKU);
// surrogate ids exist for foreign keys and slugs only
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CategoryRecord - durable category entity
// ==========================================
// Natural key: `name` (clean category name, matched case-insensitively).
// Synthesized on demand when a product references an unknown category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    // ===== Keys =====
    pub id: i64,         // surrogate key (slug suffixing, product FK)
    pub name: String,    // natural key: clean name, e.g. "BMW" from "1.BMW"
    pub slug: String,    // URL slug, unique

    // ===== Descriptive fields =====
    pub display_name: String,
    pub title: String,
    pub description: String,      // rich text (storefront HTML)
    pub meta_description: String,
    pub image_path: Option<String>,

    // ===== Provenance =====
    pub row_ordinal: i64, // sheet row the category was last imported from

    // ===== Audit =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// ProductRecord - durable product entity
// ==========================================
// Natural key: `sku`. References its category, never owns it; the category
// may outlive the product or be shared by many products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    // ===== Keys =====
    pub id: i64,
    pub sku: String,         // natural key
    pub category_id: i64,    // FK to category
    pub slug: String,

    // ===== Descriptive fields =====
    pub name: String,
    pub title: String,
    pub price: f64,          // normalized monetary scalar
    pub description: String,
    pub meta_description: String,
    pub image_path: Option<String>,

    // ===== Audit =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// Drafts - reconciled rows awaiting upsert
// ==========================================

/// Category fields produced by the reconciler, keyed by clean name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub display_name: String,
    pub title: String,
    pub description: String,
    pub meta_description: String,
    pub image: Option<String>,
    pub row_ordinal: i64,
}

impl CategoryDraft {
    /// An empty draft used for gap synthesis and the fallback bucket.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: String::new(),
            title: String::new(),
            description: String::new(),
            meta_description: String::new(),
            image: None,
            row_ordinal: 0,
        }
    }
}

/// Product fields produced by the reconciler, keyed by SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub sku: String,
    pub category_name: String, // clean name of the owning category
    pub name: String,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub meta_description: String,
    pub image: Option<String>,
}

// ==========================================
// UpsertOutcome - tagged create-or-update result
// ==========================================
// Keeps "was this entity new" explicit instead of inferred from null checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome<T> {
    Created(T),
    Updated(T),
}

impl<T> UpsertOutcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            UpsertOutcome::Created(v) | UpsertOutcome::Updated(v) => v,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

// ==========================================
// CatalogStats - read-only pre-export summary
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_categories: i64,
    pub total_products: i64,
    pub products_with_images: i64,
    pub categories_with_images: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_outcome_tags() {
        let created: UpsertOutcome<i64> = UpsertOutcome::Created(1);
        let updated: UpsertOutcome<i64> = UpsertOutcome::Updated(2);
        assert!(created.is_created());
        assert!(!updated.is_created());
        assert_eq!(updated.into_inner(), 2);
    }

    #[test]
    fn test_empty_category_draft() {
        let draft = CategoryDraft::empty("AUDI");
        assert_eq!(draft.name, "AUDI");
        assert!(draft.display_name.is_empty());
        assert!(draft.image.is_none());
        assert_eq!(draft.row_ordinal, 0);
    }
}
