// ==========================================
// Integration test helpers
// ==========================================
// Responsibility: shared fixtures for the pipeline integration tests
// ==========================================

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use matshop_catalog::importer::CatalogImporter;
use matshop_catalog::repository::CatalogRepositoryImpl;
use matshop_catalog::storage::FsMediaStore;
use matshop_catalog::CatalogSettings;

/// Pipeline settings whose media area lives inside the test directory.
pub fn test_settings(root: &Path) -> CatalogSettings {
    CatalogSettings {
        media_root: root.join("media"),
        ..CatalogSettings::default()
    }
}

/// Fresh repository backed by a SQLite file inside the test directory.
pub fn create_test_repo(root: &TempDir) -> Arc<CatalogRepositoryImpl> {
    let db_path = root.path().join("catalog.db");
    let repo = CatalogRepositoryImpl::new(db_path.to_str().expect("utf8 temp path"))
        .expect("test database should open");
    Arc::new(repo)
}

/// Full importer wired to the test repository and a test-local media area.
pub fn build_importer(
    root: &TempDir,
) -> (Arc<CatalogRepositoryImpl>, CatalogImporter<CatalogRepositoryImpl>) {
    let repo = create_test_repo(root);
    let settings = test_settings(root.path());
    let retry = settings.retry.to_policy();
    let category_store = Arc::new(FsMediaStore::new(settings.category_media_root(), retry));
    let product_store = Arc::new(FsMediaStore::new(settings.product_media_root(), retry));
    let importer = CatalogImporter::new(repo.clone(), settings, category_store, product_store);
    (repo, importer)
}

/// Write a CSV spreadsheet fixture with the fixed seven-column layout.
/// Row 1 is always a header; data starts at row 2.
pub fn write_sheet(root: &TempDir, name: &str, rows: &[[&str; 7]]) -> PathBuf {
    let path = root.path().join(name);
    let mut writer = csv::Writer::from_path(&path).expect("fixture file should open");
    writer
        .write_record([
            "identifier",
            "name",
            "title",
            "price",
            "description",
            "meta description",
            "image",
        ])
        .expect("header write");
    for row in rows {
        writer.write_record(row).expect("row write");
    }
    writer.flush().expect("fixture flush");
    path
}

/// Build an in-memory zip archive from (entry name, bytes) pairs.
pub fn build_image_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let cursor = std::io::Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(cursor);
    let options = zip::write::FileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(*name, options).expect("zip entry");
        writer.write_all(bytes).expect("zip entry bytes");
    }
    writer.finish().expect("zip finish").into_inner()
}

/// Compact spreadsheet with two categories and three products, the shape
/// most fixtures in this suite start from.
pub fn standard_rows() -> Vec<[&'static str; 7]> {
    vec![
        [
            "1.BMW",
            "BMW floor mats",
            "BMW mats title",
            "",
            "<p>Mats for <b>BMW</b> models</p>",
            "bmw meta",
            "bmw.jpg",
        ],
        [
            "10001",
            "BMW 3 Series set",
            "3 Series",
            "1 990",
            "Full set",
            "",
            "10001.jpg",
        ],
        ["10002", "BMW 5 Series set", "5 Series", "2490.50", "", "", ""],
        ["2.Audi", "Audi floor mats", "", "", "", "", ""],
        ["20001", "Audi Q7 set", "Q7", "3 100", "", "", "20001.jpg"],
    ]
}
