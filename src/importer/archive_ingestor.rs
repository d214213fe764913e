// ==========================================
// MatShop Catalog Pipeline - image archive ingestor
// ==========================================
// Unpacks a zip archive of images and routes every entry to the category
// or product media area. Runs to completion independently of spreadsheet
// validity; a failure on one entry never aborts the rest.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::storage::MediaStore;
use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

// ==========================================
// MediaTarget - where an archive entry belongs
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTarget {
    Category,
    Product,
}

// ==========================================
// CategoryMatcher trait
// ==========================================
// Injected so tests can substitute deterministic fixtures for the live
// set of category names.
pub trait CategoryMatcher: Send + Sync {
    /// Classify a base filename (without extension).
    fn classify(&self, stem: &str) -> MediaTarget;
}

// ==========================================
// NameSetMatcher - match against known category names
// ==========================================
// Exact case-insensitive match first, then substring containment in
// either direction; anything unmatched defaults to the product area.
pub struct NameSetMatcher {
    names: Vec<String>, // upper-cased
}

impl NameSetMatcher {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_uppercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }
}

impl CategoryMatcher for NameSetMatcher {
    fn classify(&self, stem: &str) -> MediaTarget {
        let stem = stem.trim().to_uppercase();
        if stem.is_empty() {
            return MediaTarget::Product;
        }

        if self.names.iter().any(|name| *name == stem) {
            return MediaTarget::Category;
        }
        if self
            .names
            .iter()
            .any(|name| stem.contains(name.as_str()) || name.contains(stem.as_str()))
        {
            return MediaTarget::Category;
        }
        MediaTarget::Product
    }
}

// ==========================================
// IngestOutcome
// ==========================================
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Entries successfully written
    pub processed: usize,
    /// Entries skipped (directories, metadata, non-image extensions)
    pub skipped: usize,
    /// Per-entry failures, recorded and stepped over
    pub failures: Vec<String>,
}

// ==========================================
// ArchiveIngestor
// ==========================================
pub struct ArchiveIngestor<'a> {
    category_store: &'a dyn MediaStore,
    product_store: &'a dyn MediaStore,
    image_extensions: HashSet<String>,
}

impl<'a> ArchiveIngestor<'a> {
    pub fn new(
        category_store: &'a dyn MediaStore,
        product_store: &'a dyn MediaStore,
        image_extensions: &[String],
    ) -> Self {
        Self {
            category_store,
            product_store,
            image_extensions: image_extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Platform metadata entries that never carry catalog images.
    fn is_metadata_entry(entry_path: &str, base_name: &str) -> bool {
        entry_path.contains("__MACOSX") || base_name.starts_with('.') || base_name == "Thumbs.db"
    }

    /// Unpack `archive_bytes` and write every accepted image through the
    /// media stores. An unopenable archive aborts the whole ingestion;
    /// anything else is per-entry.
    pub fn ingest(
        &self,
        archive_bytes: &[u8],
        matcher: &dyn CategoryMatcher,
    ) -> ImportResult<IngestOutcome> {
        let mut archive = ZipArchive::new(Cursor::new(archive_bytes))
            .map_err(|e| ImportError::ArchiveError(e.to_string()))?;

        let mut outcome = IngestOutcome::default();

        for index in 0..archive.len() {
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(index, error = %e, "archive entry unreadable");
                    outcome.failures.push(format!("entry {index}: {e}"));
                    continue;
                }
            };

            if entry.is_dir() {
                outcome.skipped += 1;
                continue;
            }

            let entry_path = entry.name().to_string();
            let base_name = Path::new(&entry_path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string();

            if base_name.is_empty() || Self::is_metadata_entry(&entry_path, &base_name) {
                outcome.skipped += 1;
                continue;
            }

            let extension = Path::new(&base_name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            if !self.image_extensions.contains(&extension) {
                debug!(entry = %entry_path, "skipping non-image entry");
                outcome.skipped += 1;
                continue;
            }

            let stem = Path::new(&base_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("");

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            if let Err(e) = entry.read_to_end(&mut bytes) {
                warn!(entry = %entry_path, error = %e, "archive entry read failed");
                outcome.failures.push(format!("{entry_path}: {e}"));
                continue;
            }

            let (target, store) = match matcher.classify(stem) {
                MediaTarget::Category => ("category", self.category_store),
                MediaTarget::Product => ("product", self.product_store),
            };

            match store.put(&base_name, &bytes) {
                Ok(_) => {
                    debug!(entry = %base_name, target = target, "image stored");
                    outcome.processed += 1;
                }
                Err(e) => {
                    warn!(entry = %base_name, error = %e, "image write failed, skipping entry");
                    outcome.failures.push(format!("{base_name}: {e}"));
                }
            }
        }

        info!(
            processed = outcome.processed,
            skipped = outcome.skipped,
            failed = outcome.failures.len(),
            "archive ingestion finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FsMediaStore, RetryPolicy};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut cursor);
            for (name, bytes) in entries {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(bytes).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn stores() -> (TempDir, FsMediaStore, FsMediaStore) {
        let dir = TempDir::new().unwrap();
        let categories = FsMediaStore::new(dir.path().join("category"), RetryPolicy::new(3, 0));
        let products = FsMediaStore::new(dir.path().join("product"), RetryPolicy::new(3, 0));
        (dir, categories, products)
    }

    fn extensions() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    #[test]
    fn test_matcher_exact_substring_default() {
        let matcher = NameSetMatcher::new(["BMW", "AUDI"]);
        assert_eq!(matcher.classify("bmw"), MediaTarget::Category);
        assert_eq!(matcher.classify("bmw_floor_mat_front"), MediaTarget::Category);
        assert_eq!(matcher.classify("au"), MediaTarget::Category); // contained in AUDI
        assert_eq!(matcher.classify("product123"), MediaTarget::Product);
        assert_eq!(matcher.classify(""), MediaTarget::Product);
    }

    #[test]
    fn test_entries_route_by_matcher() {
        let (_dir, categories, products) = stores();
        let ingestor = ArchiveIngestor::new(&categories, &products, &extensions());
        let matcher = NameSetMatcher::new(["BMW"]);

        let archive = build_zip(&[
            ("bmw.jpg", b"cat-img"),
            ("nested/product123.png", b"prod-img"),
        ]);
        let outcome = ingestor.ingest(&archive, &matcher).unwrap();

        assert_eq!(outcome.processed, 2);
        assert!(categories.exists("bmw.jpg"));
        assert!(products.exists("product123.png"));
        assert!(!products.exists("bmw.jpg"));
    }

    #[test]
    fn test_metadata_and_non_images_skipped() {
        let (_dir, categories, products) = stores();
        let ingestor = ArchiveIngestor::new(&categories, &products, &extensions());
        let matcher = NameSetMatcher::new(["BMW"]);

        let archive = build_zip(&[
            ("__MACOSX/bmw.jpg", b"resource-fork"),
            (".DS_Store", b"meta"),
            ("Thumbs.db", b"meta"),
            ("readme.txt", b"text"),
            ("real.jpg", b"img"),
        ]);
        let outcome = ingestor.ingest(&archive, &matcher).unwrap();

        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.skipped, 4);
        assert!(products.exists("real.jpg"));
    }

    #[test]
    fn test_corrupt_archive_aborts_ingestion() {
        let (_dir, categories, products) = stores();
        let ingestor = ArchiveIngestor::new(&categories, &products, &extensions());
        let matcher = NameSetMatcher::new(["BMW"]);

        let result = ingestor.ingest(b"this is not a zip file", &matcher);
        assert!(matches!(result, Err(ImportError::ArchiveError(_))));
    }
}
