// ==========================================
// MatShop Catalog Pipeline - media store
// ==========================================
// Contract: put/delete/exists with exact names and overwrite semantics.
// A later put with the same name fully replaces the prior content and is
// observed atomically by readers (temp file + fsync + rename into place).
// ==========================================

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::retry::{with_retry, RetryPolicy};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

// ==========================================
// MediaStore trait
// ==========================================
// Consumers: archive ingestor (writes), storefront pages (existence checks)
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under exactly `name`, replacing any prior content.
    /// Returns the stored name.
    fn put(&self, name: &str, bytes: &[u8]) -> StorageResult<String>;

    /// Remove `name`. Returns false when the file did not exist.
    fn delete(&self, name: &str) -> StorageResult<bool>;

    /// Whether `name` currently exists in the store.
    fn exists(&self, name: &str) -> bool;
}

// ==========================================
// FsMediaStore - filesystem-backed store
// ==========================================
// The deployment target exhibits transient sharing violations when a
// consumer holds a file open; every delete/replace goes through the
// bounded-retry combinator.
pub struct FsMediaStore {
    root: PathBuf,
    retry: RetryPolicy,
}

impl FsMediaStore {
    pub fn new<P: Into<PathBuf>>(root: P, retry: RetryPolicy) -> Self {
        Self {
            root: root.into(),
            retry,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject names that would escape the store root.
    fn target_path(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name == "."
            || name == ".."
        {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// One replace attempt: clear the target if present, then write a temp
    /// file in the same directory, fsync it and rename it into place.
    fn replace_once(&self, target: &Path, bytes: &[u8]) -> StorageResult<()> {
        if target.exists() {
            fs::remove_file(target)?;
        }

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(target).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}

impl MediaStore for FsMediaStore {
    fn put(&self, name: &str, bytes: &[u8]) -> StorageResult<String> {
        let target = self.target_path(name)?;
        fs::create_dir_all(&self.root)?;

        with_retry(&self.retry, name, || self.replace_once(&target, bytes)).map_err(|e| {
            StorageError::WriteExhausted {
                name: name.to_string(),
                attempts: self.retry.max_attempts,
                message: e.to_string(),
            }
        })?;

        debug!(name = name, size = bytes.len(), "media file stored");
        Ok(name.to_string())
    }

    fn delete(&self, name: &str) -> StorageResult<bool> {
        let target = self.target_path(name)?;
        if !target.exists() {
            return Ok(false);
        }

        with_retry(&self.retry, name, || fs::remove_file(&target)).map_err(|e| {
            StorageError::DeleteExhausted {
                name: name.to_string(),
                attempts: self.retry.max_attempts,
                message: e.to_string(),
            }
        })?;

        Ok(true)
    }

    fn exists(&self, name: &str) -> bool {
        match self.target_path(name) {
            Ok(target) => target.is_file(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FsMediaStore) {
        let dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(dir.path(), RetryPolicy::new(3, 0));
        (dir, store)
    }

    #[test]
    fn test_put_and_exists() {
        let (_dir, store) = store();
        assert!(!store.exists("logo.png"));

        let name = store.put("logo.png", b"first").unwrap();
        assert_eq!(name, "logo.png");
        assert!(store.exists("logo.png"));
    }

    #[test]
    fn test_put_overwrites_with_exact_name() {
        let (dir, store) = store();
        store.put("logo.png", b"first").unwrap();
        store.put("logo.png", b"second").unwrap();

        // exact name, no disambiguating suffix, full replacement
        let content = fs::read(dir.path().join("logo.png")).unwrap();
        assert_eq!(content, b"second");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_delete_present_and_absent() {
        let (_dir, store) = store();
        store.put("mat.jpg", b"bytes").unwrap();

        assert!(store.delete("mat.jpg").unwrap());
        assert!(!store.exists("mat.jpg"));
        assert!(!store.delete("mat.jpg").unwrap());
    }

    #[test]
    fn test_rejects_path_escaping_names() {
        let (_dir, store) = store();
        assert!(matches!(
            store.put("../escape.png", b"x"),
            Err(StorageError::InvalidName(_))
        ));
        assert!(matches!(
            store.put("a/b.png", b"x"),
            Err(StorageError::InvalidName(_))
        ));
        assert!(matches!(
            store.put("", b"x"),
            Err(StorageError::InvalidName(_))
        ));
    }

    #[test]
    fn test_put_creates_root_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("media").join("category");
        let store = FsMediaStore::new(&nested, RetryPolicy::default());

        store.put("bmw.jpg", b"img").unwrap();
        assert!(nested.join("bmw.jpg").is_file());
    }
}
