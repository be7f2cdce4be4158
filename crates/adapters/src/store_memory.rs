//! In-memory analysis store for testing and offline mode

use async_trait::async_trait;
use feed_doctor_domain::{AnalysisStore, FeedAnalysis, ResultFilter, ReviewUpdate, StoreError};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

type Key = (String, String);

/// In-memory analysis store implementation
pub struct InMemoryAnalysisStore {
    analyses: RwLock<HashMap<Key, FeedAnalysis>>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self {
            analyses: RwLock::new(HashMap::new()),
        }
    }

    fn make_key(tenant_id: &str, product_id: &str) -> Key {
        (tenant_id.to_string(), product_id.to_string())
    }
}

impl Default for InMemoryAnalysisStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn upsert(&self, analysis: &FeedAnalysis) -> Result<Uuid, StoreError> {
        let key = Self::make_key(&analysis.tenant_id, &analysis.product_id);
        let mut analyses = self
            .analyses
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let id = analyses.get(&key).map_or(analysis.id, |existing| existing.id);
        let mut stored = analysis.clone();
        stored.id = id;
        analyses.insert(key, stored);
        Ok(id)
    }

    async fn get(
        &self,
        tenant_id: &str,
        product_id: &str,
    ) -> Result<Option<FeedAnalysis>, StoreError> {
        let analyses = self
            .analyses
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(analyses.get(&Self::make_key(tenant_id, product_id)).cloned())
    }

    async fn list(
        &self,
        tenant_id: &str,
        filter: &ResultFilter,
    ) -> Result<Vec<FeedAnalysis>, StoreError> {
        let analyses = self
            .analyses
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut results: Vec<FeedAnalysis> = analyses
            .values()
            .filter(|a| a.tenant_id == tenant_id && filter.matches(a))
            .cloned()
            .collect();

        results.sort_by(|a, b| {
            b.analyzed_at
                .cmp(&a.analyzed_at)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }

        Ok(results)
    }

    async fn record_review(
        &self,
        tenant_id: &str,
        product_id: &str,
        review: &ReviewUpdate,
    ) -> Result<bool, StoreError> {
        let mut analyses = self
            .analyses
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        match analyses.get_mut(&Self::make_key(tenant_id, product_id)) {
            Some(analysis) => {
                analysis.review.is_reviewed = true;
                analysis.review.reviewed_by = Some(review.reviewer.clone());
                analysis.review.reviewed_at = Some(review.reviewed_at);
                analysis.review.review_notes = review.notes.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed_doctor_domain::AnalysisStatus;
    use time::{Duration, OffsetDateTime};

    fn analysis(product_id: &str, score: u8, minutes: i64) -> FeedAnalysis {
        let mut record = FeedAnalysis::placeholder(
            "acme",
            product_id,
            AnalysisStatus::Completed,
            OffsetDateTime::UNIX_EPOCH + Duration::minutes(minutes),
        );
        record.overall_score = score;
        record
    }

    #[tokio::test]
    async fn test_upsert_keeps_first_id() {
        let store = InMemoryAnalysisStore::new();

        let first = analysis("p1", 40, 0);
        let first_id = store.upsert(&first).await.unwrap();
        let second_id = store.upsert(&analysis("p1", 90, 5)).await.unwrap();

        assert_eq!(first_id, first.id);
        assert_eq!(second_id, first_id);

        let stored = store.get("acme", "p1").await.unwrap().unwrap();
        assert_eq!(stored.overall_score, 90);
        assert_eq!(store.list("acme", &ResultFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = InMemoryAnalysisStore::new();
        assert!(store.get("acme", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let store = InMemoryAnalysisStore::new();
        store.upsert(&analysis("old", 30, 0)).await.unwrap();
        store.upsert(&analysis("mid", 60, 10)).await.unwrap();
        store.upsert(&analysis("new", 80, 20)).await.unwrap();

        let mut other = analysis("x", 99, 30);
        other.tenant_id = "globex".to_string();
        store.upsert(&other).await.unwrap();

        let all = store.list("acme", &ResultFilter::default()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|a| a.product_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        let filter = ResultFilter {
            min_score: Some(50),
            limit: Some(1),
            ..Default::default()
        };
        let top = store.list("acme", &filter).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].product_id, "new");
    }

    #[tokio::test]
    async fn test_review_then_reanalysis_resets() {
        let store = InMemoryAnalysisStore::new();
        store.upsert(&analysis("p1", 70, 0)).await.unwrap();

        let review = ReviewUpdate {
            reviewer: "sam".to_string(),
            notes: None,
            reviewed_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert!(store.record_review("acme", "p1", &review).await.unwrap());
        assert!(!store.record_review("acme", "p2", &review).await.unwrap());
        assert!(store.get("acme", "p1").await.unwrap().unwrap().review.is_reviewed);

        store.upsert(&analysis("p1", 75, 1)).await.unwrap();
        assert!(!store.get("acme", "p1").await.unwrap().unwrap().review.is_reviewed);
    }
}
