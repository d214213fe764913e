// ==========================================
// MatShop Catalog Pipeline - storage layer error types
// ==========================================
// Tool: thiserror derive macro
// ==========================================

use thiserror::Error;

/// Storage layer error type
#[derive(Error, Debug)]
pub enum StorageError {
    // ===== Naming errors =====
    #[error("invalid media file name: {0}")]
    InvalidName(String),

    // ===== I/O errors =====
    #[error("media I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ===== Contention errors =====
    #[error("write of {name} failed after {attempts} attempts: {message}")]
    WriteExhausted {
        name: String,
        attempts: u32,
        message: String,
    },

    #[error("delete of {name} failed after {attempts} attempts: {message}")]
    DeleteExhausted {
        name: String,
        attempts: u32,
        message: String,
    },
}

/// Result type alias
pub type StorageResult<T> = Result<T, StorageError>;
