// ==========================================
// MatShop Catalog Pipeline - repository layer
// ==========================================
// Responsibility: catalog data access, hiding database details
// Rule: repositories hold no business rules, only CRUD
// Constraint: every query is parameterized
// ==========================================

pub mod catalog_repo;
pub mod catalog_repo_impl;
pub mod error;

// Re-export core repositories
pub use catalog_repo::{BatchOutcome, CatalogRepository};
pub use catalog_repo_impl::CatalogRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
