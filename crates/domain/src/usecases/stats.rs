//! Aggregate statistics over a tenant's results

use crate::{
    model::{AnalysisStats, FeedAnalysis, ResultFilter},
    ports::{AiProvider, AnalysisStore, CatalogError, Clock, ProductCatalog, RulesRepo, StoreError},
    usecases::analyze::FeedDoctor,
};

const LOW_BELOW: u8 = 50;
const HIGH_ABOVE: u8 = 75;

/// Errors surfaced by `get_stats`
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Fold stored results into stats.
///
/// `total_products` comes from the catalog, so it can disagree with the
/// store; a negative pending count is clamped to zero and logged.
pub fn compute_stats(total_products: u64, results: &[FeedAnalysis]) -> AnalysisStats {
    let analyzed_count = results.len() as u64;

    let mut stats = AnalysisStats {
        total_products,
        analyzed_count,
        ..Default::default()
    };

    for result in results {
        match result.overall_score {
            s if s < LOW_BELOW => stats.low += 1,
            s if s <= HIGH_ABOVE => stats.medium += 1,
            _ => stats.high += 1,
        }
    }

    if analyzed_count > 0 {
        let sum: u64 = results.iter().map(|r| u64::from(r.overall_score)).sum();
        let mean = sum as f64 / analyzed_count as f64;
        stats.average_score = (mean * 100.0).round() / 100.0;
    }

    if analyzed_count > total_products {
        tracing::warn!(
            total_products,
            analyzed_count,
            "More analyses than catalog products; pending clamped to zero"
        );
    }
    stats.pending = total_products.saturating_sub(analyzed_count);

    stats
}

impl<P, R, A, S, Cl> FeedDoctor<P, R, A, S, Cl>
where
    P: ProductCatalog + ?Sized,
    R: RulesRepo + ?Sized,
    A: AiProvider + ?Sized,
    S: AnalysisStore + ?Sized,
    Cl: Clock + ?Sized,
{
    /// Stats for a tenant, combining the catalog count with stored results
    pub async fn get_stats(&self, tenant_id: &str) -> Result<AnalysisStats, StatsError> {
        let total_products = self.catalog.count_products(tenant_id).await?;
        let results = self.store.list(tenant_id, &ResultFilter::default()).await?;
        Ok(compute_stats(total_products, &results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisStatus;
    use crate::usecases::analyze::EngineConfig;
    use crate::usecases::analyze::tests::{FakeStore, ProviderMode, doctor_with, product};
    use time::OffsetDateTime;

    fn scored(product_id: &str, score: u8) -> FeedAnalysis {
        let mut record = FeedAnalysis::placeholder(
            "acme",
            product_id,
            AnalysisStatus::Completed,
            OffsetDateTime::UNIX_EPOCH,
        );
        record.overall_score = score;
        record
    }

    #[test]
    fn test_compute_stats_buckets() {
        let results = vec![
            scored("a", 49),
            scored("b", 50),
            scored("c", 75),
            scored("d", 76),
        ];

        let stats = compute_stats(10, &results);

        assert_eq!(stats.analyzed_count, 4);
        assert_eq!(stats.low, 1);
        assert_eq!(stats.medium, 2);
        assert_eq!(stats.high, 1);
        assert_eq!(stats.pending, 6);
        assert_eq!(stats.average_score, 62.5);
    }

    #[test]
    fn test_compute_stats_rounds_average() {
        let results = vec![scored("a", 70), scored("b", 70), scored("c", 71)];
        assert_eq!(compute_stats(3, &results).average_score, 70.33);
    }

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(5, &[]);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.pending, 5);
    }

    #[test]
    fn test_compute_stats_pending_never_negative() {
        let results = vec![scored("a", 80), scored("b", 90)];
        let stats = compute_stats(1, &results);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.total_products, 1);
    }

    #[tokio::test]
    async fn test_get_stats_after_analysis() {
        let doctor = doctor_with(
            vec![product("p1", "Phone", ""), product("p2", "Tablet", "")],
            ProviderMode::NotConfigured,
            FakeStore::default(),
            EngineConfig::default(),
        );
        doctor.analyze("acme", "p1").await.unwrap();

        let stats = doctor.get_stats("acme").await.unwrap();

        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.analyzed_count, 1);
        assert_eq!(stats.pending, 1);
    }
}
