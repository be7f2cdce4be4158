//! feed-doctor adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `catalog`: JSON-file product catalog and rules
//! - `store`: SQLite and in-memory analysis stores
//! - `llm`: AI provider adapters (OpenAI, Anthropic, etc.)

mod catalog_fs;
mod store_memory;
mod store_sqlite;

pub mod llm;

/// Re-exports for catalog adapters
pub mod catalog {
    pub use crate::catalog_fs::{CatalogFile, FsCatalog};
}

/// Re-exports for store adapters
pub mod store {
    pub use crate::store_memory::InMemoryAnalysisStore;
    pub use crate::store_sqlite::SqliteAnalysisStore;
}
