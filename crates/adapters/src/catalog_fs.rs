//! JSON-file product catalog and rules repository

use async_trait::async_trait;
use feed_doctor_domain::{
    CatalogError, OptimizationRule, Product, ProductCatalog, RulesError, RulesRepo,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Catalog file layout: `{"products": [...], "rules": [...]}`
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub rules: Vec<OptimizationRule>,
}

/// Catalog backed by a JSON file, re-read on every call
pub struct FsCatalog {
    path: PathBuf,
}

impl FsCatalog {
    /// Create a catalog over an existing file
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(CatalogError::Unavailable(format!(
                "Catalog file not found: {}",
                path.display()
            )));
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the whole file
    pub async fn load(&self) -> Result<CatalogFile, CatalogError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CatalogError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let catalog: CatalogFile = serde_json::from_str(&content)
            .map_err(|e| CatalogError::Parse(format!("{}: {}", self.path.display(), e)))?;

        let mut seen = HashSet::new();
        for product in &catalog.products {
            if !seen.insert((product.tenant_id.as_str(), product.id.as_str())) {
                return Err(CatalogError::Parse(format!(
                    "Duplicate product {} for tenant {}",
                    product.id, product.tenant_id
                )));
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            products = catalog.products.len(),
            rules = catalog.rules.len(),
            "Loaded catalog"
        );

        Ok(catalog)
    }
}

#[async_trait]
impl ProductCatalog for FsCatalog {
    async fn get_product(
        &self,
        tenant_id: &str,
        product_id: &str,
    ) -> Result<Option<Product>, CatalogError> {
        let catalog = self.load().await?;
        Ok(catalog
            .products
            .into_iter()
            .find(|p| p.tenant_id == tenant_id && p.id == product_id))
    }

    async fn count_products(&self, tenant_id: &str) -> Result<u64, CatalogError> {
        let catalog = self.load().await?;
        Ok(catalog
            .products
            .iter()
            .filter(|p| p.tenant_id == tenant_id)
            .count() as u64)
    }

    async fn list_product_ids(&self, tenant_id: &str) -> Result<Vec<String>, CatalogError> {
        let catalog = self.load().await?;
        Ok(catalog
            .products
            .into_iter()
            .filter(|p| p.tenant_id == tenant_id)
            .map(|p| p.id)
            .collect())
    }
}

#[async_trait]
impl RulesRepo for FsCatalog {
    async fn active_rules(&self, tenant_id: &str) -> Result<Vec<OptimizationRule>, RulesError> {
        let catalog = self
            .load()
            .await
            .map_err(|e| RulesError::Unavailable(e.to_string()))?;

        Ok(catalog
            .rules
            .into_iter()
            .filter(|rule| rule.is_active)
            .filter(|rule| rule.tenant_id.as_deref().is_none_or(|owner| owner == tenant_id))
            .collect())
    }
}
