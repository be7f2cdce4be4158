//! Bulk analysis with per-item failure isolation

use futures::stream::{self, StreamExt};

use crate::{
    model::{BulkItemError, BulkResult},
    ports::{AiProvider, AnalysisStore, CatalogError, Clock, ProductCatalog, RulesRepo},
    usecases::analyze::FeedDoctor,
};

impl<P, R, A, S, Cl> FeedDoctor<P, R, A, S, Cl>
where
    P: ProductCatalog + ?Sized,
    R: RulesRepo + ?Sized,
    A: AiProvider + ?Sized,
    S: AnalysisStore + ?Sized,
    Cl: Clock + ?Sized,
{
    /// Analyze each product, recording failures instead of stopping.
    ///
    /// Up to `max_concurrent` products are in flight at once; errors are
    /// reported in input order either way.
    pub async fn bulk_analyze(&self, tenant_id: &str, product_ids: &[String]) -> BulkResult {
        let max_concurrent = self.config.max_concurrent.max(1);

        tracing::info!(
            tenant_id = %tenant_id,
            products = product_ids.len(),
            max_concurrent,
            "Starting bulk analysis"
        );

        let outcomes: Vec<_> = stream::iter(product_ids)
            .map(|product_id| async move {
                (product_id, self.analyze(tenant_id, product_id).await)
            })
            .buffered(max_concurrent)
            .collect()
            .await;

        let mut result = BulkResult::default();
        for (product_id, outcome) in outcomes {
            match outcome {
                Ok(_) => result.succeeded += 1,
                Err(e) => {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        product_id = %product_id,
                        error = %e,
                        "Bulk item failed"
                    );
                    result.failed += 1;
                    result.errors.push(BulkItemError {
                        product_id: product_id.clone(),
                        error_message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            tenant_id = %tenant_id,
            succeeded = result.succeeded,
            failed = result.failed,
            "Bulk analysis finished"
        );

        result
    }

    /// Bulk-analyze every product the catalog lists for the tenant
    pub async fn bulk_analyze_all(&self, tenant_id: &str) -> Result<BulkResult, CatalogError> {
        let product_ids = self.catalog.list_product_ids(tenant_id).await?;
        Ok(self.bulk_analyze(tenant_id, &product_ids).await)
    }
}
