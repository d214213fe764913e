// ==========================================
// MatShop Catalog Pipeline - catalog reconciler
// ==========================================
// Single left-to-right pass over validated rows. The most recently seen
// category is carried forward and attached to every following product row
// until the next category row; the accumulator lives inside one call of
// reconcile and is never shared across runs.
// ==========================================

use crate::domain::catalog::{CategoryDraft, ProductDraft};
use crate::domain::import::{RowError, RowKind, ValidatedRow};
use std::collections::HashSet;
use tracing::{debug, warn};

// ==========================================
// ReconcileOutput
// ==========================================
#[derive(Debug, Default)]
pub struct ReconcileOutput {
    /// Category drafts in first-seen order, gap syntheses appended last
    pub categories: Vec<CategoryDraft>,
    /// Product drafts in sheet order
    pub products: Vec<ProductDraft>,
    /// Orphan-product notes
    pub warnings: Vec<RowError>,
}

// ==========================================
// CatalogReconciler
// ==========================================
pub struct CatalogReconciler {
    fallback_category: String,
}

impl CatalogReconciler {
    pub fn new(fallback_category: impl Into<String>) -> Self {
        Self {
            fallback_category: fallback_category.into(),
        }
    }

    /// Fold the rows into category/product drafts.
    ///
    /// - a category row updates the carry-forward context
    /// - a product row attaches to the carried category, or to the
    ///   fallback bucket (with a warning) when no category has been seen
    /// - after the pass, categories referenced by products but never seen
    ///   as rows are synthesized with all descriptive fields empty, so
    ///   every product reference resolves inside the same batch
    pub fn reconcile(&self, rows: Vec<ValidatedRow>) -> ReconcileOutput {
        let mut output = ReconcileOutput::default();
        let mut current_category: Option<String> = None;
        let mut seen: HashSet<String> = HashSet::new();
        let mut referenced: Vec<String> = Vec::new();

        for row in rows {
            match row.kind {
                RowKind::Category => {
                    output.categories.push(CategoryDraft {
                        name: row.key.clone(),
                        display_name: row.name,
                        title: row.title,
                        description: row.description,
                        meta_description: row.meta_description,
                        image: normalize_image(row.image),
                        row_ordinal: row.row_number as i64,
                    });
                    seen.insert(row.key.to_uppercase());
                    current_category = Some(row.key);
                }
                RowKind::Product => {
                    let category_name = match &current_category {
                        Some(name) => name.clone(),
                        None => {
                            warn!(
                                row = row.row_number,
                                sku = %row.key,
                                fallback = %self.fallback_category,
                                "product row precedes any category row"
                            );
                            output.warnings.push(RowError::new(
                                row.row_number,
                                format!(
                                    "no preceding category, product {} assigned to {}",
                                    row.key, self.fallback_category
                                ),
                            ));
                            self.fallback_category.clone()
                        }
                    };

                    if !referenced.iter().any(|r| r.eq_ignore_ascii_case(&category_name)) {
                        referenced.push(category_name.clone());
                    }

                    output.products.push(ProductDraft {
                        sku: row.key,
                        category_name,
                        name: row.name,
                        title: row.title,
                        price: row.price,
                        description: row.description,
                        meta_description: row.meta_description,
                        image: normalize_image(row.image),
                    });
                }
            }
        }

        // gap synthesis: every referenced category must exist in the batch
        for name in referenced {
            if !seen.contains(&name.to_uppercase()) {
                debug!(category = %name, "synthesizing empty category for gap");
                output.categories.push(CategoryDraft::empty(&name));
            }
        }

        output
    }
}

fn normalize_image(image: String) -> Option<String> {
    let trimmed = image.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(row_number: usize, key: &str) -> ValidatedRow {
        ValidatedRow {
            row_number,
            kind: RowKind::Category,
            key: key.to_string(),
            name: format!("{key} mats"),
            title: String::new(),
            price: 0.0,
            description: String::new(),
            meta_description: String::new(),
            image: String::new(),
        }
    }

    fn product(row_number: usize, sku: &str) -> ValidatedRow {
        ValidatedRow {
            row_number,
            kind: RowKind::Product,
            key: sku.to_string(),
            name: format!("Mat {sku}"),
            title: String::new(),
            price: 990.0,
            description: String::new(),
            meta_description: String::new(),
            image: String::new(),
        }
    }

    fn reconciler() -> CatalogReconciler {
        CatalogReconciler::new("UNCATEGORIZED")
    }

    #[test]
    fn test_products_attach_to_most_recent_category() {
        let output = reconciler().reconcile(vec![
            category(2, "BMW"),
            product(3, "10001"),
            product(4, "10002"),
            category(5, "AUDI"),
            product(6, "20001"),
        ]);

        assert_eq!(output.categories.len(), 2);
        assert_eq!(output.products.len(), 3);
        assert_eq!(output.products[0].category_name, "BMW");
        assert_eq!(output.products[1].category_name, "BMW");
        assert_eq!(output.products[2].category_name, "AUDI");
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_context_is_read_not_cleared() {
        // many categories earlier in the sheet must not matter; only the
        // immediately preceding one does
        let output = reconciler().reconcile(vec![
            category(2, "BMW"),
            category(3, "AUDI"),
            category(4, "LADA"),
            product(5, "30001"),
        ]);
        assert_eq!(output.products[0].category_name, "LADA");
    }

    #[test]
    fn test_orphan_product_goes_to_fallback_with_warning() {
        let output = reconciler().reconcile(vec![product(2, "10001"), category(3, "BMW")]);

        assert_eq!(output.products[0].category_name, "UNCATEGORIZED");
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].row, 2);

        // the fallback bucket is synthesized so the reference resolves
        assert!(output
            .categories
            .iter()
            .any(|c| c.name == "UNCATEGORIZED" && c.display_name.is_empty()));
    }

    #[test]
    fn test_gap_synthesis_covers_every_reference() {
        let output = reconciler().reconcile(vec![
            product(2, "1"),
            product(3, "2"),
            category(4, "BMW"),
            product(5, "3"),
        ]);

        let names: Vec<&str> = output.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["BMW", "UNCATEGORIZED"]);
        // one warning per orphan row
        assert_eq!(output.warnings.len(), 2);
    }

    #[test]
    fn test_duplicate_category_rows_stay_in_order() {
        // last-write-wins is applied by the repository; the reconciler
        // keeps both drafts in order
        let output = reconciler().reconcile(vec![
            category(2, "BMW"),
            category(3, "BMW"),
            product(4, "10001"),
        ]);
        assert_eq!(output.categories.len(), 2);
        assert_eq!(output.categories[1].row_ordinal, 3);
        assert_eq!(output.products[0].category_name, "BMW");
    }

    #[test]
    fn test_empty_image_becomes_none() {
        let mut row = category(2, "BMW");
        row.image = "  ".to_string();
        let output = reconciler().reconcile(vec![row]);
        assert!(output.categories[0].image.is_none());
    }
}
