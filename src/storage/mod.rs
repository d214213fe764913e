// ==========================================
// MatShop Catalog Pipeline - storage layer
// ==========================================
// Responsibility: exact-name, overwrite-on-write media file persistence
// resilient to transient sharing violations on the deployment target
// ==========================================

pub mod error;
pub mod media_store;
pub mod retry;

// Re-export core types
pub use error::StorageError;
pub use media_store::{FsMediaStore, MediaStore};
pub use retry::{with_retry, RetryPolicy};
