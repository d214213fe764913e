// ==========================================
// MatShop Catalog Pipeline - configuration layer
// ==========================================
// Responsibility: runtime settings for the import/export pipeline
// Source: built-in defaults, optionally overridden from a JSON file
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::storage::RetryPolicy;

/// Configuration layer error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("settings file not readable: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("settings file not valid JSON: {0}")]
    ParseError(#[from] serde_json::Error),
}

// ==========================================
// RetrySettings - storage retry policy knobs
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum attempts per file operation
    pub max_attempts: u32,
    /// Base delay in milliseconds; attempt n waits n * base
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 50,
        }
    }
}

impl RetrySettings {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.base_delay_ms)
    }
}

// ==========================================
// CatalogSettings - pipeline configuration
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Separator that marks a spreadsheet identifier as a category
    /// (e.g. "1.BMW"); identifiers without it are product SKUs.
    pub category_separator: char,

    /// Bucket assigned to product rows with no preceding category row
    pub fallback_category: String,

    /// Accepted raster image extensions inside the archive (lower-case)
    pub image_extensions: Vec<String>,

    /// Root directory of the catalog media area
    pub media_root: PathBuf,

    /// Subdirectory for category images
    pub category_media_dir: String,

    /// Subdirectory for product images
    pub product_media_dir: String,

    /// Maximum length of flattened descriptions in export cells
    pub description_preview_len: usize,

    /// Storage retry policy
    pub retry: RetrySettings,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            category_separator: '.',
            fallback_category: "UNCATEGORIZED".to_string(),
            image_extensions: ["jpg", "jpeg", "png", "gif", "webp", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            media_root: PathBuf::from("media/catalog"),
            category_media_dir: "category".to_string(),
            product_media_dir: "product".to_string(),
            description_preview_len: 200,
            retry: RetrySettings::default(),
        }
    }
}

impl CatalogSettings {
    /// Load settings from a JSON file; missing keys fall back to defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&raw)?;
        Ok(settings)
    }

    /// Media directory for category images
    pub fn category_media_root(&self) -> PathBuf {
        self.media_root.join(&self.category_media_dir)
    }

    /// Media directory for product images
    pub fn product_media_root(&self) -> PathBuf {
        self.media_root.join(&self.product_media_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = CatalogSettings::default();
        assert_eq!(settings.category_separator, '.');
        assert_eq!(settings.fallback_category, "UNCATEGORIZED");
        assert!(settings.image_extensions.contains(&"jpg".to_string()));
        assert_eq!(settings.retry.max_attempts, 3);
    }

    #[test]
    fn test_load_partial_override() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{ "category_separator": "#", "fallback_category": "MISC" }}"##
        )
        .unwrap();

        let settings = CatalogSettings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.category_separator, '#');
        assert_eq!(settings.fallback_category, "MISC");
        // untouched keys keep their defaults
        assert_eq!(settings.description_preview_len, 200);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(CatalogSettings::load_from_file(file.path()).is_err());
    }
}
