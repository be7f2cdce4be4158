//! Domain models and value objects

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// A product record as held by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID
    pub id: String,
    /// Owning tenant
    pub tenant_id: String,
    /// Product name (used as the listing title)
    pub name: String,
    /// Long-form description
    #[serde(default)]
    pub description: String,
    /// Assigned category, if any
    #[serde(default)]
    pub category_id: Option<String>,
    /// Listed price, if any
    #[serde(default)]
    pub price: Option<f64>,
    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
    /// Existing tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for a single analysis run, built from a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub product_id: String,
    pub tenant_id: String,
    pub title: String,
    pub description: String,
    pub category_id: Option<String>,
    pub price: Option<f64>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
}

impl AnalysisInput {
    /// SHA-256 over every analyzed field, hex encoded.
    ///
    /// Two runs with the same fingerprint saw identical input.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.tenant_id.as_bytes());
        hasher.update([0]);
        hasher.update(self.product_id.as_bytes());
        hasher.update([0]);
        hasher.update(self.title.as_bytes());
        hasher.update([0]);
        hasher.update(self.description.as_bytes());
        hasher.update([0]);
        hasher.update(self.category_id.as_deref().unwrap_or_default().as_bytes());
        hasher.update([0]);
        if let Some(price) = self.price {
            hasher.update(price.to_le_bytes());
        }
        hasher.update([0]);
        for image in &self.images {
            hasher.update(image.as_bytes());
            hasher.update([1]);
        }
        hasher.update([0]);
        for tag in &self.tags {
            hasher.update(tag.as_bytes());
            hasher.update([1]);
        }
        format!("{:x}", hasher.finalize())
    }
}

impl From<&Product> for AnalysisInput {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            tenant_id: product.tenant_id.clone(),
            title: product.name.clone(),
            description: product.description.clone(),
            category_id: product.category_id.clone(),
            price: product.price,
            images: product.images.clone(),
            tags: product.tags.clone(),
        }
    }
}

/// The five scored quality dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Title,
    Description,
    Images,
    Category,
    Price,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Title,
        Dimension::Description,
        Dimension::Images,
        Dimension::Category,
        Dimension::Price,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Title => "title",
            Dimension::Description => "description",
            Dimension::Images => "images",
            Dimension::Category => "category",
            Dimension::Price => "price",
        }
    }

    /// Product field the dimension reads
    pub fn field(&self) -> &'static str {
        match self {
            Dimension::Title => "name",
            Dimension::Description => "description",
            Dimension::Images => "images",
            Dimension::Category => "category_id",
            Dimension::Price => "price",
        }
    }

    /// Rule category that targets this dimension
    pub fn rule_category(&self) -> RuleCategory {
        match self {
            Dimension::Title => RuleCategory::Title,
            Dimension::Description => RuleCategory::Description,
            Dimension::Images => RuleCategory::Image,
            Dimension::Category => RuleCategory::Category,
            Dimension::Price => RuleCategory::Price,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category an optimization rule targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Title,
    Description,
    Image,
    Category,
    Price,
    General,
}

/// How a rule's configuration payload is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Length,
    Keyword,
    Format,
    Regex,
    AiCheck,
    Custom,
}

/// Issue severity, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Parse a provider-supplied severity; unknown values become `Warning`
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" | "low" => Severity::Info,
            "warning" | "warn" | "medium" => Severity::Warning,
            "error" | "high" => Severity::Error,
            "critical" => Severity::Critical,
            _ => Severity::Warning,
        }
    }
}

/// A tenant-scoped or global optimization rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRule {
    pub id: String,
    /// `None` applies the rule to every tenant
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub name: String,
    pub category: RuleCategory,
    pub rule_type: RuleType,
    /// Type-specific configuration payload
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default = "default_rule_weight")]
    pub weight: f64,
    #[serde(default)]
    pub penalty_points: u32,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub auto_fix_template: Option<String>,
}

fn default_rule_weight() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Machine-applicable remediation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixAction {
    CleanSpecialChars,
    ConvertTitleCase,
    AddParagraphs,
}

impl FixAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixAction::CleanSpecialChars => "clean_special_chars",
            FixAction::ConvertTitleCase => "convert_title_case",
            FixAction::AddParagraphs => "add_paragraphs",
        }
    }
}

/// A detected quality problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A recommended remediation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub suggestion_type: String,
    pub message: String,
    pub auto_fixable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_action: Option<FixAction>,
}

/// Lifecycle status of a persisted analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Analyzing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Analyzing => "analyzing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AnalysisStatus::Pending),
            "analyzing" => Ok(AnalysisStatus::Analyzing),
            "completed" => Ok(AnalysisStatus::Completed),
            "failed" => Ok(AnalysisStatus::Failed),
            other => Err(format!("unknown analysis status: {}", other)),
        }
    }
}

/// Human review metadata, owned by the review workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewInfo {
    pub is_reviewed: bool,
    pub reviewed_by: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    pub review_notes: Option<String>,
}

/// A review to record against an existing analysis
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub reviewer: String,
    pub notes: Option<String>,
    pub reviewed_at: OffsetDateTime,
}

/// Persisted result of analyzing one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedAnalysis {
    /// Assigned on first insert and kept across re-analysis
    pub id: Uuid,
    pub tenant_id: String,
    pub product_id: String,
    pub overall_score: u8,
    pub title_score: Option<u8>,
    pub description_score: Option<u8>,
    pub image_score: Option<u8>,
    pub category_score: Option<u8>,
    pub price_score: Option<u8>,
    /// Free-form diagnostic metadata
    pub analysis_data: serde_json::Value,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    pub optimized_title: Option<String>,
    pub optimized_description: Option<String>,
    pub optimized_keywords: Vec<String>,
    pub status: AnalysisStatus,
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub review: ReviewInfo,
    #[serde(with = "time::serde::rfc3339")]
    pub analyzed_at: OffsetDateTime,
}

impl FeedAnalysis {
    /// Empty record in the given status
    pub fn placeholder(
        tenant_id: &str,
        product_id: &str,
        status: AnalysisStatus,
        analyzed_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.to_string(),
            product_id: product_id.to_string(),
            overall_score: 0,
            title_score: None,
            description_score: None,
            image_score: None,
            category_score: None,
            price_score: None,
            analysis_data: serde_json::Value::Object(Default::default()),
            issues: vec![],
            suggestions: vec![],
            optimized_title: None,
            optimized_description: None,
            optimized_keywords: vec![],
            status,
            error_message: None,
            review: ReviewInfo::default(),
            analyzed_at,
        }
    }

    /// Failed record carrying the error message and a zero score
    pub fn failed(
        tenant_id: &str,
        product_id: &str,
        error_message: impl Into<String>,
        analyzed_at: OffsetDateTime,
    ) -> Self {
        let mut record =
            Self::placeholder(tenant_id, product_id, AnalysisStatus::Failed, analyzed_at);
        record.error_message = Some(error_message.into());
        record
    }

    /// Score for one dimension, if it was computed
    pub fn dimension_score(&self, dimension: Dimension) -> Option<u8> {
        match dimension {
            Dimension::Title => self.title_score,
            Dimension::Description => self.description_score,
            Dimension::Images => self.image_score,
            Dimension::Category => self.category_score,
            Dimension::Price => self.price_score,
        }
    }
}

/// Filter for listing a tenant's results
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub status: Option<AnalysisStatus>,
    pub min_score: Option<u8>,
    pub max_score: Option<u8>,
    pub limit: Option<usize>,
}

impl ResultFilter {
    /// Whether a record passes the status and score bounds (limit is applied by the store)
    pub fn matches(&self, analysis: &FeedAnalysis) -> bool {
        if let Some(status) = self.status {
            if analysis.status != status {
                return false;
            }
        }
        if let Some(min) = self.min_score {
            if analysis.overall_score < min {
                return false;
            }
        }
        if let Some(max) = self.max_score {
            if analysis.overall_score > max {
                return false;
            }
        }
        true
    }
}

/// Aggregate statistics over a tenant's results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total_products: u64,
    pub analyzed_count: u64,
    pub average_score: f64,
    /// Overall score below 50
    pub low: u64,
    /// Overall score 50 through 75
    pub medium: u64,
    /// Overall score above 75
    pub high: u64,
    pub pending: u64,
}

/// One failed item in a bulk run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemError {
    pub product_id: String,
    pub error_message: String,
}

/// Outcome of a bulk run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<BulkItemError>,
}

/// An issue as reported by the AI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderIssue {
    #[serde(default = "default_provider_category")]
    pub category: String,
    #[serde(default)]
    pub severity: String,
    pub message: String,
}

fn default_provider_category() -> String {
    "general".to_string()
}

/// Rewrites proposed by the AI provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderOptimizations {
    #[serde(default)]
    pub suggested_title: Option<String>,
    #[serde(default)]
    pub suggested_description: Option<String>,
    #[serde(default)]
    pub suggested_keywords: Vec<String>,
}

/// SEO sub-scores reported by the AI provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeoScore {
    #[serde(default)]
    pub title_score: f64,
    #[serde(default)]
    pub description_score: f64,
    #[serde(default)]
    pub keyword_density: f64,
    #[serde(default)]
    pub readability: f64,
    #[serde(default)]
    pub overall: f64,
}

/// Normalized response of an AI provider analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderAnalysis {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub issues: Vec<ProviderIssue>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub optimizations: ProviderOptimizations,
    #[serde(default)]
    pub seo_score: SeoScore,
    #[serde(default)]
    pub market_insights: Option<serde_json::Value>,
}

/// Clamp a provider-supplied score into 0..=100
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
