//! SQLite analysis store implementation

use async_trait::async_trait;
use feed_doctor_domain::{
    AnalysisStatus, AnalysisStore, FeedAnalysis, ResultFilter, ReviewInfo, ReviewUpdate,
    StoreError,
};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, tenant_id, product_id, overall_score,
           title_score, description_score, image_score, category_score, price_score,
           analysis_data, issues, suggestions,
           optimized_title, optimized_description, optimized_keywords,
           status, error_message,
           is_reviewed, reviewed_by, reviewed_at, review_notes,
           analyzed_at
    FROM feed_analyses
"#;

/// SQLite-backed analysis store
pub struct SqliteAnalysisStore {
    pool: SqlitePool,
}

impl SqliteAnalysisStore {
    /// Create a new SQLite store, initializing the database if needed
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("Failed to create directory: {}", e)))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(db_error)?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(db_error)?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feed_analyses (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                product_id TEXT NOT NULL,
                overall_score INTEGER NOT NULL,
                title_score INTEGER,
                description_score INTEGER,
                image_score INTEGER,
                category_score INTEGER,
                price_score INTEGER,
                analysis_data TEXT NOT NULL,
                issues TEXT NOT NULL,
                suggestions TEXT NOT NULL,
                optimized_title TEXT,
                optimized_description TEXT,
                optimized_keywords TEXT NOT NULL,
                status TEXT NOT NULL,
                error_message TEXT,
                is_reviewed INTEGER NOT NULL DEFAULT 0,
                reviewed_by TEXT,
                reviewed_at TEXT,
                review_notes TEXT,
                analyzed_at TEXT NOT NULL,
                analyzed_ts INTEGER NOT NULL,
                UNIQUE(tenant_id, product_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_feed_analyses_recent
            ON feed_analyses(tenant_id, analyzed_ts)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn format_time(at: OffsetDateTime) -> Result<String, StoreError> {
    at.format(&Rfc3339)
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

fn parse_time(raw: &str) -> Result<OffsetDateTime, StoreError> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn score(value: i64) -> Result<u8, StoreError> {
    u8::try_from(value)
        .map_err(|_| StoreError::Serialization(format!("Score out of range: {}", value)))
}

fn optional_score(row: &SqliteRow, column: &str) -> Result<Option<u8>, StoreError> {
    row.try_get::<Option<i64>, _>(column)
        .map_err(db_error)?
        .map(score)
        .transpose()
}

fn row_to_analysis(row: &SqliteRow) -> Result<FeedAnalysis, StoreError> {
    let get_text = |column: &str| row.try_get::<String, _>(column).map_err(db_error);
    let get_opt_text = |column: &str| row.try_get::<Option<String>, _>(column).map_err(db_error);

    let id = Uuid::parse_str(&get_text("id")?)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    let status: AnalysisStatus = get_text("status")?
        .parse()
        .map_err(StoreError::Serialization)?;
    let reviewed_at = get_opt_text("reviewed_at")?
        .as_deref()
        .map(parse_time)
        .transpose()?;

    Ok(FeedAnalysis {
        id,
        tenant_id: get_text("tenant_id")?,
        product_id: get_text("product_id")?,
        overall_score: score(row.try_get("overall_score").map_err(db_error)?)?,
        title_score: optional_score(row, "title_score")?,
        description_score: optional_score(row, "description_score")?,
        image_score: optional_score(row, "image_score")?,
        category_score: optional_score(row, "category_score")?,
        price_score: optional_score(row, "price_score")?,
        analysis_data: from_json(&get_text("analysis_data")?)?,
        issues: from_json(&get_text("issues")?)?,
        suggestions: from_json(&get_text("suggestions")?)?,
        optimized_title: get_opt_text("optimized_title")?,
        optimized_description: get_opt_text("optimized_description")?,
        optimized_keywords: from_json(&get_text("optimized_keywords")?)?,
        status,
        error_message: get_opt_text("error_message")?,
        review: ReviewInfo {
            is_reviewed: row.try_get("is_reviewed").map_err(db_error)?,
            reviewed_by: get_opt_text("reviewed_by")?,
            reviewed_at,
            review_notes: get_opt_text("review_notes")?,
        },
        analyzed_at: parse_time(&get_text("analyzed_at")?)?,
    })
}

#[async_trait]
impl AnalysisStore for SqliteAnalysisStore {
    async fn upsert(&self, analysis: &FeedAnalysis) -> Result<Uuid, StoreError> {
        let reviewed_at = analysis.review.reviewed_at.map(format_time).transpose()?;

        // Conflicts keep the original id; everything else, review included, is replaced
        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO feed_analyses (
                id, tenant_id, product_id, overall_score,
                title_score, description_score, image_score, category_score, price_score,
                analysis_data, issues, suggestions,
                optimized_title, optimized_description, optimized_keywords,
                status, error_message,
                is_reviewed, reviewed_by, reviewed_at, review_notes,
                analyzed_at, analyzed_ts
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(tenant_id, product_id) DO UPDATE SET
                overall_score = excluded.overall_score,
                title_score = excluded.title_score,
                description_score = excluded.description_score,
                image_score = excluded.image_score,
                category_score = excluded.category_score,
                price_score = excluded.price_score,
                analysis_data = excluded.analysis_data,
                issues = excluded.issues,
                suggestions = excluded.suggestions,
                optimized_title = excluded.optimized_title,
                optimized_description = excluded.optimized_description,
                optimized_keywords = excluded.optimized_keywords,
                status = excluded.status,
                error_message = excluded.error_message,
                is_reviewed = excluded.is_reviewed,
                reviewed_by = excluded.reviewed_by,
                reviewed_at = excluded.reviewed_at,
                review_notes = excluded.review_notes,
                analyzed_at = excluded.analyzed_at,
                analyzed_ts = excluded.analyzed_ts
            RETURNING id
            "#,
        )
        .bind(analysis.id.to_string())
        .bind(&analysis.tenant_id)
        .bind(&analysis.product_id)
        .bind(i64::from(analysis.overall_score))
        .bind(analysis.title_score.map(i64::from))
        .bind(analysis.description_score.map(i64::from))
        .bind(analysis.image_score.map(i64::from))
        .bind(analysis.category_score.map(i64::from))
        .bind(analysis.price_score.map(i64::from))
        .bind(to_json(&analysis.analysis_data)?)
        .bind(to_json(&analysis.issues)?)
        .bind(to_json(&analysis.suggestions)?)
        .bind(&analysis.optimized_title)
        .bind(&analysis.optimized_description)
        .bind(to_json(&analysis.optimized_keywords)?)
        .bind(analysis.status.as_str())
        .bind(&analysis.error_message)
        .bind(analysis.review.is_reviewed)
        .bind(&analysis.review.reviewed_by)
        .bind(reviewed_at)
        .bind(&analysis.review.review_notes)
        .bind(format_time(analysis.analyzed_at)?)
        .bind(analysis.analyzed_at.unix_timestamp_nanos() as i64)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Uuid::parse_str(&id).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn get(
        &self,
        tenant_id: &str,
        product_id: &str,
    ) -> Result<Option<FeedAnalysis>, StoreError> {
        let row = sqlx::query(&format!(
            "{} WHERE tenant_id = ? AND product_id = ?",
            SELECT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(row_to_analysis).transpose()
    }

    async fn list(
        &self,
        tenant_id: &str,
        filter: &ResultFilter,
    ) -> Result<Vec<FeedAnalysis>, StoreError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COLUMNS);
        query.push(" WHERE tenant_id = ").push_bind(tenant_id);

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(min) = filter.min_score {
            query.push(" AND overall_score >= ").push_bind(i64::from(min));
        }
        if let Some(max) = filter.max_score {
            query.push(" AND overall_score <= ").push_bind(i64::from(max));
        }

        query.push(" ORDER BY analyzed_ts DESC, product_id ASC");

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(row_to_analysis).collect()
    }

    async fn record_review(
        &self,
        tenant_id: &str,
        product_id: &str,
        review: &ReviewUpdate,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE feed_analyses
            SET is_reviewed = 1, reviewed_by = ?, reviewed_at = ?, review_notes = ?
            WHERE tenant_id = ? AND product_id = ?
            "#,
        )
        .bind(&review.reviewer)
        .bind(format_time(review.reviewed_at)?)
        .bind(&review.notes)
        .bind(tenant_id)
        .bind(product_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
