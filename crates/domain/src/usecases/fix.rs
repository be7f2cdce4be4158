//! Auto-fix preview from a stored analysis

use thiserror::Error;

use crate::{
    content::{self, ProductPatch},
    ports::{
        AiProvider, AnalysisStore, CatalogError, Clock, ProductCatalog, RulesRepo, StoreError,
    },
    usecases::analyze::FeedDoctor,
};

#[derive(Debug, Error)]
pub enum FixError {
    #[error("product {product_id} not found for tenant {tenant_id}")]
    ProductNotFound {
        tenant_id: String,
        product_id: String,
    },

    #[error("product {product_id} has no stored analysis for tenant {tenant_id}")]
    NotAnalyzed {
        tenant_id: String,
        product_id: String,
    },

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl<P, R, A, S, Cl> FeedDoctor<P, R, A, S, Cl>
where
    P: ProductCatalog + ?Sized,
    R: RulesRepo + ?Sized,
    A: AiProvider + ?Sized,
    S: AnalysisStore + ?Sized,
    Cl: Clock + ?Sized,
{
    /// Apply the stored result's auto-fixable suggestions to the current
    /// catalog product. Nothing is written back.
    pub async fn auto_fix(
        &self,
        tenant_id: &str,
        product_id: &str,
    ) -> Result<ProductPatch, FixError> {
        let product = self
            .catalog
            .get_product(tenant_id, product_id)
            .await?
            .ok_or_else(|| FixError::ProductNotFound {
                tenant_id: tenant_id.to_string(),
                product_id: product_id.to_string(),
            })?;

        let analysis = self
            .store
            .get(tenant_id, product_id)
            .await?
            .ok_or_else(|| FixError::NotAnalyzed {
                tenant_id: tenant_id.to_string(),
                product_id: product_id.to_string(),
            })?;

        let patch = content::apply_auto_fixes(&product, &analysis.suggestions);

        tracing::debug!(
            tenant_id = %tenant_id,
            product_id = %product_id,
            applied = patch.applied.len(),
            "Built auto-fix patch"
        );

        Ok(patch)
    }
}
