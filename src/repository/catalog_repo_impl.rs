// ==========================================
// MatShop Catalog Pipeline - catalog repository implementation
// ==========================================
// Backing store: SQLite via rusqlite
// Rule: batch upserts run inside one transaction; a failure rolls back
// the whole batch so concurrent storefront readers never see partial state
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::catalog::{
    CatalogStats, CategoryDraft, CategoryRecord, ProductDraft, ProductRecord, UpsertOutcome,
};
use crate::domain::import::ImportBatch;
use crate::repository::catalog_repo::{BatchOutcome, CatalogRepository};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// Schema
// ==========================================
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS category (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL UNIQUE COLLATE NOCASE,
    slug             TEXT NOT NULL UNIQUE,
    display_name     TEXT NOT NULL DEFAULT '',
    title            TEXT NOT NULL DEFAULT '',
    description      TEXT NOT NULL DEFAULT '',
    meta_description TEXT NOT NULL DEFAULT '',
    image_path       TEXT,
    row_ordinal      INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS product (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    sku              TEXT NOT NULL UNIQUE,
    category_id      INTEGER NOT NULL REFERENCES category(id),
    slug             TEXT NOT NULL UNIQUE,
    name             TEXT NOT NULL DEFAULT '',
    title            TEXT NOT NULL DEFAULT '',
    price            REAL NOT NULL DEFAULT 0,
    description      TEXT NOT NULL DEFAULT '',
    meta_description TEXT NOT NULL DEFAULT '',
    image_path       TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_product_category ON product(category_id);

CREATE TABLE IF NOT EXISTS import_batch (
    batch_id         TEXT PRIMARY KEY,
    file_name        TEXT,
    total_rows       INTEGER NOT NULL,
    category_rows    INTEGER NOT NULL,
    product_rows     INTEGER NOT NULL,
    invalid_rows     INTEGER NOT NULL,
    images_processed INTEGER NOT NULL,
    success          INTEGER NOT NULL,
    imported_at      TEXT NOT NULL,
    elapsed_ms       INTEGER NOT NULL
);
"#;

// ==========================================
// CatalogRepositoryImpl
// ==========================================
pub struct CatalogRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepositoryImpl {
    /// Open (or create) the catalog database at `db_path`.
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== Slug derivation =====

    /// Lower-cased alphanumeric runs joined by '-'.
    fn slugify(text: &str) -> String {
        let mut slug = String::with_capacity(text.len());
        let mut pending_dash = false;
        for ch in text.chars() {
            if ch.is_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                for lower in ch.to_lowercase() {
                    slug.push(lower);
                }
            } else {
                pending_dash = true;
            }
        }
        slug
    }

    /// Derive a slug from the display name (falling back to the natural
    /// key), appending an incrementing numeric suffix on collision with an
    /// existing different entity.
    fn unique_slug(
        tx: &Transaction,
        table: &str,
        display_name: &str,
        natural_key: &str,
    ) -> RepositoryResult<String> {
        let mut base = Self::slugify(display_name);
        if base.is_empty() {
            base = Self::slugify(natural_key);
        }
        if base.is_empty() {
            base = "item".to_string();
        }

        let query = format!("SELECT 1 FROM {table} WHERE slug = ?1 LIMIT 1");
        let mut candidate = base.clone();
        let mut suffix = 2u32;
        loop {
            let taken: Option<i64> = tx
                .query_row(&query, params![candidate], |row| row.get(0))
                .optional()?;
            if taken.is_none() {
                return Ok(candidate);
            }
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
    }

    // ===== Per-entity upserts (inside a caller transaction) =====

    /// Upsert one category by clean name. All descriptive fields are
    /// overwritten on update (last-write-wins, no field-level merge).
    fn upsert_category_tx(
        tx: &Transaction,
        draft: &CategoryDraft,
    ) -> RepositoryResult<UpsertOutcome<i64>> {
        let now = Utc::now();
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM category WHERE name = ?1",
                params![draft.name],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                tx.execute(
                    r#"
                    UPDATE category SET
                        display_name = ?1, title = ?2, description = ?3,
                        meta_description = ?4, image_path = ?5,
                        row_ordinal = ?6, updated_at = ?7
                    WHERE id = ?8
                    "#,
                    params![
                        draft.display_name,
                        draft.title,
                        draft.description,
                        draft.meta_description,
                        draft.image,
                        draft.row_ordinal,
                        now,
                        id,
                    ],
                )?;
                Ok(UpsertOutcome::Updated(id))
            }
            None => {
                let slug = Self::unique_slug(tx, "category", &draft.display_name, &draft.name)?;
                tx.execute(
                    r#"
                    INSERT INTO category (
                        name, slug, display_name, title, description,
                        meta_description, image_path, row_ordinal,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                    params![
                        draft.name,
                        slug,
                        draft.display_name,
                        draft.title,
                        draft.description,
                        draft.meta_description,
                        draft.image,
                        draft.row_ordinal,
                        now,
                        now,
                    ],
                )?;
                Ok(UpsertOutcome::Created(tx.last_insert_rowid()))
            }
        }
    }

    /// Upsert one product by SKU.
    fn upsert_product_tx(
        tx: &Transaction,
        draft: &ProductDraft,
        category_id: i64,
    ) -> RepositoryResult<UpsertOutcome<i64>> {
        let now = Utc::now();
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM product WHERE sku = ?1",
                params![draft.sku],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                tx.execute(
                    r#"
                    UPDATE product SET
                        category_id = ?1, name = ?2, title = ?3, price = ?4,
                        description = ?5, meta_description = ?6,
                        image_path = ?7, updated_at = ?8
                    WHERE id = ?9
                    "#,
                    params![
                        category_id,
                        draft.name,
                        draft.title,
                        draft.price,
                        draft.description,
                        draft.meta_description,
                        draft.image,
                        now,
                        id,
                    ],
                )?;
                Ok(UpsertOutcome::Updated(id))
            }
            None => {
                let slug = Self::unique_slug(tx, "product", &draft.name, &draft.sku)?;
                tx.execute(
                    r#"
                    INSERT INTO product (
                        sku, category_id, slug, name, title, price,
                        description, meta_description, image_path,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    "#,
                    params![
                        draft.sku,
                        category_id,
                        slug,
                        draft.name,
                        draft.title,
                        draft.price,
                        draft.description,
                        draft.meta_description,
                        draft.image,
                        now,
                        now,
                    ],
                )?;
                Ok(UpsertOutcome::Created(tx.last_insert_rowid()))
            }
        }
    }

    // ===== Row mapping =====

    fn map_category_row(row: &Row) -> rusqlite::Result<CategoryRecord> {
        Ok(CategoryRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            display_name: row.get(3)?,
            title: row.get(4)?,
            description: row.get(5)?,
            meta_description: row.get(6)?,
            image_path: row.get(7)?,
            row_ordinal: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn map_product_row(row: &Row) -> rusqlite::Result<ProductRecord> {
        Ok(ProductRecord {
            id: row.get(0)?,
            sku: row.get(1)?,
            category_id: row.get(2)?,
            slug: row.get(3)?,
            name: row.get(4)?,
            title: row.get(5)?,
            price: row.get(6)?,
            description: row.get(7)?,
            meta_description: row.get(8)?,
            image_path: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn map_batch_row(row: &Row) -> rusqlite::Result<ImportBatch> {
        Ok(ImportBatch {
            batch_id: row.get(0)?,
            file_name: row.get(1)?,
            total_rows: row.get(2)?,
            category_rows: row.get(3)?,
            product_rows: row.get(4)?,
            invalid_rows: row.get(5)?,
            images_processed: row.get(6)?,
            success: row.get(7)?,
            imported_at: row.get(8)?,
            elapsed_ms: row.get(9)?,
        })
    }
}

const CATEGORY_COLUMNS: &str = "id, name, slug, display_name, title, description, \
     meta_description, image_path, row_ordinal, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, sku, category_id, slug, name, title, price, description, \
     meta_description, image_path, created_at, updated_at";

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CategoryRecord>, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM category WHERE name = ?1"),
                params![name],
                Self::map_category_row,
            )
            .optional()
            .map_err(RepositoryError::from)?;
        Ok(record)
    }

    async fn find_product_by_sku(
        &self,
        sku: &str,
    ) -> Result<Option<ProductRecord>, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE sku = ?1"),
                params![sku],
                Self::map_product_row,
            )
            .optional()
            .map_err(RepositoryError::from)?;
        Ok(record)
    }

    async fn apply_catalog_batch(
        &self,
        categories: Vec<CategoryDraft>,
        products: Vec<ProductDraft>,
    ) -> Result<BatchOutcome, Box<dyn Error>> {
        let mut conn = self.lock_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut outcome = BatchOutcome::default();
        // clean name (upper-cased) -> category id, for product FK resolution
        let mut category_ids: HashMap<String, i64> = HashMap::new();

        for draft in &categories {
            let upsert = Self::upsert_category_tx(&tx, draft)?;
            if upsert.is_created() {
                outcome.categories_created += 1;
            } else {
                outcome.categories_updated += 1;
            }
            category_ids.insert(draft.name.to_uppercase(), upsert.into_inner());
        }

        for draft in &products {
            let lookup_key = draft.category_name.to_uppercase();
            let category_id = match category_ids.get(&lookup_key) {
                Some(id) => *id,
                None => {
                    // the reconciler synthesizes gaps, so this only fires for
                    // pre-existing categories not part of this batch
                    let existing: Option<i64> = tx
                        .query_row(
                            "SELECT id FROM category WHERE name = ?1",
                            params![draft.category_name],
                            |row| row.get(0),
                        )
                        .optional()
                        .map_err(RepositoryError::from)?;
                    let id = match existing {
                        Some(id) => id,
                        None => {
                            let empty = CategoryDraft::empty(&draft.category_name);
                            let upsert = Self::upsert_category_tx(&tx, &empty)?;
                            outcome.categories_created += 1;
                            upsert.into_inner()
                        }
                    };
                    category_ids.insert(lookup_key, id);
                    id
                }
            };

            let upsert = Self::upsert_product_tx(&tx, draft, category_id)?;
            if upsert.is_created() {
                outcome.products_created += 1;
            } else {
                outcome.products_updated += 1;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(
            categories_created = outcome.categories_created,
            categories_updated = outcome.categories_updated,
            products_created = outcome.products_created,
            products_updated = outcome.products_updated,
            "catalog batch committed"
        );
        Ok(outcome)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category ORDER BY row_ordinal, name"
        ))?;
        let records = stmt
            .query_map([], Self::map_category_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(RepositoryError::from)?;
        Ok(records)
    }

    async fn list_products_by_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<ProductRecord>, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE category_id = ?1 ORDER BY name, sku"
        ))?;
        let records = stmt
            .query_map(params![category_id], Self::map_product_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(RepositoryError::from)?;
        Ok(records)
    }

    async fn catalog_stats(&self) -> Result<CatalogStats, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let stats = conn
            .query_row(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM category),
                    (SELECT COUNT(*) FROM product),
                    (SELECT COUNT(*) FROM product
                      WHERE image_path IS NOT NULL AND image_path != ''),
                    (SELECT COUNT(*) FROM category
                      WHERE image_path IS NOT NULL AND image_path != '')
                "#,
                [],
                |row| {
                    Ok(CatalogStats {
                        total_categories: row.get(0)?,
                        total_products: row.get(1)?,
                        products_with_images: row.get(2)?,
                        categories_with_images: row.get(3)?,
                    })
                },
            )
            .map_err(RepositoryError::from)?;
        Ok(stats)
    }

    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), Box<dyn Error>> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, total_rows, category_rows, product_rows,
                invalid_rows, images_processed, success, imported_at, elapsed_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.total_rows,
                batch.category_rows,
                batch.product_rows,
                batch.invalid_rows,
                batch.images_processed,
                batch.success,
                batch.imported_at,
                batch.elapsed_ms,
            ],
        )
        .map_err(RepositoryError::from)?;
        Ok(())
    }

    async fn recent_batches(&self, limit: usize) -> Result<Vec<ImportBatch>, Box<dyn Error>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, file_name, total_rows, category_rows, product_rows,
                   invalid_rows, images_processed, success, imported_at, elapsed_ms
            FROM import_batch
            ORDER BY imported_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;
        let batches = stmt
            .query_map(params![limit as i64], Self::map_batch_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(RepositoryError::from)?;
        Ok(batches)
    }
}
