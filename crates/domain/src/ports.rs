//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::{
    AnalysisInput, FeedAnalysis, OptimizationRule, Product, ProviderAnalysis, ResultFilter,
    ReviewUpdate,
};

/// Error type for product catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Port for reading products from the catalog
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up a product owned by the tenant
    async fn get_product(
        &self,
        tenant_id: &str,
        product_id: &str,
    ) -> Result<Option<Product>, CatalogError>;

    /// Count the tenant's products
    async fn count_products(&self, tenant_id: &str) -> Result<u64, CatalogError>;

    /// List the tenant's product IDs in catalog order
    async fn list_product_ids(&self, tenant_id: &str) -> Result<Vec<String>, CatalogError>;
}

/// Error type for rules repository operations
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("Rules unavailable: {0}")]
    Unavailable(String),
}

/// Port for loading optimization rules
#[async_trait]
pub trait RulesRepo: Send + Sync {
    /// Rules scoped to the tenant plus global rules
    async fn active_rules(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<OptimizationRule>, RulesError>;
}

/// Error type for AI provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not configured")]
    NotConfigured,
    #[error("Provider API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Port for an external AI text-analysis provider
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Short provider name for diagnostics
    fn name(&self) -> &'static str;

    /// True only when a usable credential is present
    fn is_configured(&self) -> bool;

    /// Analyze a product's content
    async fn analyze(&self, input: &AnalysisInput) -> Result<ProviderAnalysis, ProviderError>;

    /// Generate an SEO-friendly title
    async fn generate_seo_title(
        &self,
        name: &str,
        category: Option<&str>,
    ) -> Result<String, ProviderError>;
}

/// Error type for analysis store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for persisting analysis results
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Insert or replace the result for (tenant_id, product_id).
    ///
    /// Returns the persisted record ID, which is kept from the first insert.
    async fn upsert(&self, analysis: &FeedAnalysis) -> Result<Uuid, StoreError>;

    /// Point lookup; a missing result is `Ok(None)`
    async fn get(
        &self,
        tenant_id: &str,
        product_id: &str,
    ) -> Result<Option<FeedAnalysis>, StoreError>;

    /// List the tenant's results, newest first
    async fn list(
        &self,
        tenant_id: &str,
        filter: &ResultFilter,
    ) -> Result<Vec<FeedAnalysis>, StoreError>;

    /// Record a human review; returns false when no result exists
    async fn record_review(
        &self,
        tenant_id: &str,
        product_id: &str,
        review: &ReviewUpdate,
    ) -> Result<bool, StoreError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
