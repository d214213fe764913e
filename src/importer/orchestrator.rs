// ==========================================
// MatShop Catalog Pipeline - import orchestrator
// ==========================================
// Sequencing: archive ingestion first (separate failure domain, so image
// existence checks by storefront consumers succeed), then spreadsheet
// read -> classify/validate -> reconcile inside one transaction.
// ==========================================

use crate::config::CatalogSettings;
use crate::domain::import::{ImportBatch, ImportOutcome, ImportStats, RowError, RowKind};
use crate::importer::archive_ingestor::{ArchiveIngestor, NameSetMatcher};
use crate::importer::reconciler::CatalogReconciler;
use crate::importer::row_classifier::RowClassifier;
use crate::importer::sheet_reader::UniversalSheetReader;
use crate::importer::validator::RowValidator;
use crate::repository::CatalogRepository;
use crate::storage::{FsMediaStore, MediaStore};
use chrono::Utc;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// ==========================================
// CatalogImporter
// ==========================================
pub struct CatalogImporter<R>
where
    R: CatalogRepository,
{
    repo: Arc<R>,
    settings: CatalogSettings,
    category_store: Arc<dyn MediaStore>,
    product_store: Arc<dyn MediaStore>,
}

impl<R> CatalogImporter<R>
where
    R: CatalogRepository,
{
    pub fn new(
        repo: Arc<R>,
        settings: CatalogSettings,
        category_store: Arc<dyn MediaStore>,
        product_store: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            repo,
            settings,
            category_store,
            product_store,
        }
    }

    /// Build an importer whose media areas are the filesystem directories
    /// named by the settings.
    pub fn with_fs_stores(repo: Arc<R>, settings: CatalogSettings) -> Self {
        let retry = settings.retry.to_policy();
        let category_store = Arc::new(FsMediaStore::new(settings.category_media_root(), retry));
        let product_store = Arc::new(FsMediaStore::new(settings.product_media_root(), retry));
        Self::new(repo, settings, category_store, product_store)
    }

    /// Run one import: optional image archive plus the spreadsheet.
    ///
    /// Fatal input errors and a rolled-back reconciliation surface as
    /// `success=false`; row-level problems and normalization warnings are
    /// absorbed into the outcome with `success=true`.
    pub async fn run<P: AsRef<Path> + Send>(
        &self,
        sheet_path: P,
        archive_bytes: Option<&[u8]>,
    ) -> Result<ImportOutcome, Box<dyn Error>> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let sheet_path = sheet_path.as_ref();
        let file_name = sheet_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string());

        info!(
            batch_id = %batch_id,
            file = %sheet_path.display(),
            with_archive = archive_bytes.is_some(),
            "starting catalog import"
        );

        let mut error_rows: Vec<RowError> = Vec::new();
        let mut warnings: Vec<RowError> = Vec::new();
        let mut stats = ImportStats::default();

        // === Step 1: archive ingestion (independent failure domain) ===
        if let Some(bytes) = archive_bytes {
            debug!("step 1: archive ingestion");
            let known_names: Vec<String> = self
                .repo
                .list_categories()
                .await?
                .into_iter()
                .map(|c| c.name)
                .collect();
            let matcher = NameSetMatcher::new(known_names);
            let ingestor = ArchiveIngestor::new(
                self.category_store.as_ref(),
                self.product_store.as_ref(),
                &self.settings.image_extensions,
            );

            match ingestor.ingest(bytes, &matcher) {
                Ok(outcome) => {
                    stats.images_processed = outcome.processed;
                    for failure in outcome.failures {
                        warnings.push(RowError::new(0, format!("image skipped: {failure}")));
                    }
                }
                Err(e) => {
                    // image ingestion is lost, spreadsheet processing continues
                    error!(error = %e, "archive ingestion aborted");
                    error_rows.push(RowError::new(0, format!("image archive: {e}")));
                }
            }
        }

        // === Step 2: spreadsheet read (fail fast) ===
        debug!("step 2: spreadsheet read");
        let raw_rows = match UniversalSheetReader.read(sheet_path) {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "spreadsheet unreadable");
                error_rows.push(RowError::new(0, format!("spreadsheet: {e}")));
                stats.errors = error_rows.len();
                let outcome = ImportOutcome {
                    success: false,
                    batch_id: batch_id.clone(),
                    stats,
                    error_rows,
                    warnings,
                    elapsed_ms: start.elapsed().as_millis() as i64,
                };
                self.record_batch(&batch_id, file_name, 0, 0, 0, 0, &outcome)
                    .await;
                return Ok(outcome);
            }
        };
        let total_rows = raw_rows.len();
        info!(total_rows, "spreadsheet read complete");

        // === Step 3: classification and validation ===
        debug!("step 3: classification and validation");
        let classifier = RowClassifier::new(self.settings.category_separator);
        let classified = classifier.classify_rows(raw_rows);
        let validation = RowValidator.validate(classified);

        let category_rows = validation
            .rows
            .iter()
            .filter(|r| r.kind == RowKind::Category)
            .count();
        let product_rows = validation.rows.len() - category_rows;
        let invalid_rows = validation.invalid.len();
        error_rows.extend(validation.invalid);
        warnings.extend(validation.warnings);
        info!(
            categories = category_rows,
            products = product_rows,
            invalid = invalid_rows,
            "validation complete"
        );

        // === Step 4: reconciliation (single transaction) ===
        debug!("step 4: reconciliation");
        let reconciler = CatalogReconciler::new(self.settings.fallback_category.clone());
        let reconciled = reconciler.reconcile(validation.rows);
        warnings.extend(reconciled.warnings);

        let success = match self
            .repo
            .apply_catalog_batch(reconciled.categories, reconciled.products)
            .await
        {
            Ok(batch) => {
                stats.categories_created = batch.categories_created;
                stats.categories_updated = batch.categories_updated;
                stats.products_created = batch.products_created;
                stats.products_updated = batch.products_updated;
                true
            }
            Err(e) => {
                // partial catalog states are unacceptable; the repository
                // rolled the whole batch back
                error!(error = %e, "reconciliation failed, batch rolled back");
                error_rows.push(RowError::new(0, format!("reconciliation rolled back: {e}")));
                false
            }
        };

        // === Step 5: final statistics ===
        stats.errors = error_rows.len();
        let outcome = ImportOutcome {
            success,
            batch_id: batch_id.clone(),
            stats,
            error_rows,
            warnings,
            elapsed_ms: start.elapsed().as_millis() as i64,
        };

        self.record_batch(
            &batch_id,
            file_name,
            total_rows,
            category_rows,
            product_rows,
            invalid_rows,
            &outcome,
        )
        .await;

        info!(
            batch_id = %batch_id,
            success = outcome.success,
            categories_created = outcome.stats.categories_created,
            categories_updated = outcome.stats.categories_updated,
            products_created = outcome.stats.products_created,
            products_updated = outcome.stats.products_updated,
            images = outcome.stats.images_processed,
            errors = outcome.stats.errors,
            elapsed_ms = outcome.elapsed_ms,
            "catalog import finished"
        );
        Ok(outcome)
    }

    /// Write the audit record; auditing must never fail the import itself.
    #[allow(clippy::too_many_arguments)]
    async fn record_batch(
        &self,
        batch_id: &str,
        file_name: Option<String>,
        total_rows: usize,
        category_rows: usize,
        product_rows: usize,
        invalid_rows: usize,
        outcome: &ImportOutcome,
    ) {
        let batch = ImportBatch {
            batch_id: batch_id.to_string(),
            file_name,
            total_rows: total_rows as i64,
            category_rows: category_rows as i64,
            product_rows: product_rows as i64,
            invalid_rows: invalid_rows as i64,
            images_processed: outcome.stats.images_processed as i64,
            success: outcome.success,
            imported_at: Utc::now(),
            elapsed_ms: outcome.elapsed_ms,
        };
        if let Err(e) = self.repo.insert_batch(batch).await {
            warn!(batch_id = %batch_id, error = %e, "import batch audit write failed");
        }
    }
}
