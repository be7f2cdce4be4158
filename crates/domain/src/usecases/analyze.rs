//! Analysis orchestrator - provider path, rule path, and persistence

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::{
    content,
    model::{
        AnalysisInput, AnalysisStatus, Dimension, FeedAnalysis, Issue, OptimizationRule,
        ProviderAnalysis, ResultFilter, ReviewUpdate, Severity, Suggestion, clamp_score,
    },
    ports::{
        AiProvider, AnalysisStore, CatalogError, Clock, ProductCatalog, ProviderError,
        RulesError, RulesRepo, StoreError,
    },
    rules, scoring,
};

const AI_IMAGES_GOOD: u8 = 85;
const AI_IMAGES_FEW: u8 = 50;
const AI_CATEGORY_PRESENT: u8 = 90;
const AI_CATEGORY_MISSING: u8 = 40;
const AI_PRICE_PRESENT: u8 = 80;
const AI_PRICE_MISSING: u8 = 30;

/// Configuration for the analysis engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on a single provider call
    pub provider_timeout: Duration,
    /// Products analyzed at once by `bulk_analyze` (1 = sequential)
    pub max_concurrent: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(60),
            max_concurrent: 1,
        }
    }
}

/// Errors surfaced by `analyze`
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Product {product_id} not found for tenant {tenant_id}")]
    ProductNotFound {
        tenant_id: String,
        product_id: String,
    },
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result of scoring, before it becomes a persisted record
struct Evaluation {
    scores: [u8; 5],
    overall_score: u8,
    issues: Vec<Issue>,
    suggestions: Vec<Suggestion>,
    optimized_title: String,
    optimized_description: String,
    optimized_keywords: Vec<String>,
    data: serde_json::Value,
}

/// Content-quality analysis engine
pub struct FeedDoctor<P, R, A, S, Cl>
where
    P: ProductCatalog + ?Sized,
    R: RulesRepo + ?Sized,
    A: AiProvider + ?Sized,
    S: AnalysisStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub(crate) catalog: Arc<P>,
    rules: Arc<R>,
    provider: Arc<A>,
    pub(crate) store: Arc<S>,
    clock: Arc<Cl>,
    pub(crate) config: EngineConfig,
}

impl<P, R, A, S, Cl> FeedDoctor<P, R, A, S, Cl>
where
    P: ProductCatalog + ?Sized,
    R: RulesRepo + ?Sized,
    A: AiProvider + ?Sized,
    S: AnalysisStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        catalog: Arc<P>,
        rules: Arc<R>,
        provider: Arc<A>,
        store: Arc<S>,
        clock: Arc<Cl>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            rules,
            provider,
            store,
            clock,
            config,
        }
    }

    /// Analyze one product and upsert its result.
    ///
    /// A missing product is returned as an error with nothing persisted. Any
    /// later failure is recorded as a `failed` result before being returned.
    pub async fn analyze(
        &self,
        tenant_id: &str,
        product_id: &str,
    ) -> Result<FeedAnalysis, AnalyzeError> {
        let product = self
            .catalog
            .get_product(tenant_id, product_id)
            .await?
            .ok_or_else(|| AnalyzeError::ProductNotFound {
                tenant_id: tenant_id.to_string(),
                product_id: product_id.to_string(),
            })?;

        let input = AnalysisInput::from(&product);

        match self.run_analysis(&input, &product.name).await {
            Ok(analysis) => Ok(analysis),
            Err(error) => {
                tracing::error!(
                    tenant_id = %tenant_id,
                    product_id = %product_id,
                    error = %error,
                    "Analysis failed"
                );
                let failed = FeedAnalysis::failed(
                    tenant_id,
                    product_id,
                    error.to_string(),
                    self.clock.now(),
                );
                if let Err(store_error) = self.store.upsert(&failed).await {
                    tracing::error!(error = %store_error, "Failed to record failed analysis");
                }
                Err(error)
            }
        }
    }

    async fn run_analysis(
        &self,
        input: &AnalysisInput,
        product_name: &str,
    ) -> Result<FeedAnalysis, AnalyzeError> {
        let marker = FeedAnalysis::placeholder(
            &input.tenant_id,
            &input.product_id,
            AnalysisStatus::Analyzing,
            self.clock.now(),
        );
        self.store.upsert(&marker).await?;

        let all_rules = self.rules.active_rules(&input.tenant_id).await?;
        let applicable = rules::applicable_rules(&all_rules, &input.tenant_id);

        tracing::info!(
            tenant_id = %input.tenant_id,
            product_id = %input.product_id,
            rules = applicable.len(),
            "Analyzing product"
        );

        let evaluation = if self.provider.is_configured() {
            match self.call_provider(input).await {
                Ok(provider_result) => {
                    provider_evaluation(input, &provider_result, self.provider.name())
                }
                Err(error) => {
                    tracing::warn!(
                        product_id = %input.product_id,
                        provider = self.provider.name(),
                        error = %error,
                        "AI analysis failed, falling back to rule-based scoring"
                    );
                    let mut evaluation = rule_evaluation(input, &applicable);
                    evaluation.data["ai_fallback_reason"] = json!(error.to_string());
                    evaluation
                }
            }
        } else {
            tracing::debug!(provider = self.provider.name(), "AI provider not configured");
            rule_evaluation(input, &applicable)
        };

        let mut analysis = self.build_record(input, product_name, &applicable, evaluation);
        analysis.id = self.store.upsert(&analysis).await?;

        tracing::info!(
            product_id = %input.product_id,
            overall_score = analysis.overall_score,
            issues = analysis.issues.len(),
            "Analysis completed"
        );

        Ok(analysis)
    }

    async fn call_provider(
        &self,
        input: &AnalysisInput,
    ) -> Result<ProviderAnalysis, ProviderError> {
        tokio::time::timeout(self.config.provider_timeout, self.provider.analyze(input))
            .await
            .unwrap_or(Err(ProviderError::Timeout))
    }

    fn build_record(
        &self,
        input: &AnalysisInput,
        product_name: &str,
        applicable: &[&OptimizationRule],
        evaluation: Evaluation,
    ) -> FeedAnalysis {
        let mut data = evaluation.data;
        data["product_name"] = json!(product_name);
        let fields: Vec<_> = Dimension::ALL.iter().map(|d| d.as_str()).collect();
        data["analyzed_fields"] = json!(fields);
        data["rules_applied"] = json!(applicable.len());
        data["rules_by_dimension"] = json!(rules::rule_counts(applicable));
        data["input_fingerprint"] = json!(input.fingerprint());

        let [title, description, images, category, price] = evaluation.scores;

        let mut record = FeedAnalysis::placeholder(
            &input.tenant_id,
            &input.product_id,
            AnalysisStatus::Completed,
            self.clock.now(),
        );
        record.overall_score = evaluation.overall_score;
        record.title_score = Some(title);
        record.description_score = Some(description);
        record.image_score = Some(images);
        record.category_score = Some(category);
        record.price_score = Some(price);
        record.analysis_data = data;
        record.issues = evaluation.issues;
        record.suggestions = evaluation.suggestions;
        record.optimized_title = Some(evaluation.optimized_title);
        record.optimized_description = Some(evaluation.optimized_description);
        record.optimized_keywords = evaluation.optimized_keywords;
        record
    }

    /// Point lookup of a stored result
    pub async fn get_result(
        &self,
        tenant_id: &str,
        product_id: &str,
    ) -> Result<Option<FeedAnalysis>, StoreError> {
        self.store.get(tenant_id, product_id).await
    }

    /// List a tenant's stored results
    pub async fn get_results(
        &self,
        tenant_id: &str,
        filter: &ResultFilter,
    ) -> Result<Vec<FeedAnalysis>, StoreError> {
        self.store.list(tenant_id, filter).await
    }

    /// Record a human review; returns false when the product has no result
    pub async fn review(
        &self,
        tenant_id: &str,
        product_id: &str,
        reviewer: &str,
        notes: Option<String>,
    ) -> Result<bool, StoreError> {
        let update = ReviewUpdate {
            reviewer: reviewer.to_string(),
            notes,
            reviewed_at: self.clock.now(),
        };
        self.store.record_review(tenant_id, product_id, &update).await
    }

    /// SEO title from the provider, or the local rewrite when it is unavailable
    pub async fn generate_seo_title(&self, name: &str, category: Option<&str>) -> String {
        generate_seo_title(&*self.provider, self.config.provider_timeout, name, category).await
    }
}

/// Ask the provider for an SEO title, falling back to the local rewrite when
/// no usable title comes back in time
pub async fn generate_seo_title<A: AiProvider + ?Sized>(
    provider: &A,
    timeout: Duration,
    name: &str,
    category: Option<&str>,
) -> String {
    if provider.is_configured() {
        let generated = tokio::time::timeout(timeout, provider.generate_seo_title(name, category))
            .await
            .unwrap_or(Err(ProviderError::Timeout));

        match generated {
            Ok(title) if !title.trim().is_empty() => return title.trim().to_string(),
            Ok(_) => tracing::warn!("Provider returned an empty SEO title"),
            Err(error) => tracing::warn!(error = %error, "SEO title generation failed"),
        }
    }
    content::fallback_seo_title(name, category)
}

/// Deterministic scoring with the five rule-based scorers
fn rule_evaluation(input: &AnalysisInput, applicable: &[&OptimizationRule]) -> Evaluation {
    let reports = [
        scoring::score_title(
            &input.title,
            &rules::rules_for_dimension(applicable, Dimension::Title),
        ),
        scoring::score_description(
            &input.description,
            &rules::rules_for_dimension(applicable, Dimension::Description),
        ),
        scoring::score_images(
            &input.images,
            &rules::rules_for_dimension(applicable, Dimension::Images),
        ),
        scoring::score_category(
            input.category_id.as_deref(),
            &rules::rules_for_dimension(applicable, Dimension::Category),
        ),
        scoring::score_price(
            input.price,
            &rules::rules_for_dimension(applicable, Dimension::Price),
        ),
    ];

    let scores = reports.each_ref().map(|r| r.score);
    let mut issues = Vec::new();
    let mut suggestions = Vec::new();
    for report in reports {
        issues.extend(report.issues);
        suggestions.extend(report.suggestions);
    }

    Evaluation {
        scores,
        overall_score: scoring::overall_score(&scores),
        issues,
        suggestions,
        optimized_title: content::optimize_title(&input.title),
        optimized_description: content::optimize_description(&input.description),
        optimized_keywords: content::extract_keywords(&format!(
            "{} {}",
            input.title, input.description
        )),
        data: json!({ "ai_powered": false }),
    }
}

/// Provider-backed scoring; structural dimensions use presence heuristics
fn provider_evaluation(
    input: &AnalysisInput,
    result: &ProviderAnalysis,
    provider_name: &str,
) -> Evaluation {
    let images = if input.images.len() >= 3 {
        AI_IMAGES_GOOD
    } else {
        AI_IMAGES_FEW
    };
    let category = if input.category_id.as_deref().is_some_and(|c| !c.trim().is_empty()) {
        AI_CATEGORY_PRESENT
    } else {
        AI_CATEGORY_MISSING
    };
    let price = if input.price.is_some_and(|p| p > 0.0) {
        AI_PRICE_PRESENT
    } else {
        AI_PRICE_MISSING
    };

    let scores = [
        clamp_score(result.seo_score.title_score),
        clamp_score(result.seo_score.description_score),
        images,
        category,
        price,
    ];

    let issues = result
        .issues
        .iter()
        .map(|issue| Issue {
            issue_type: issue.category.clone(),
            severity: Severity::parse_lenient(&issue.severity),
            message: issue.message.clone(),
            field: Some(issue.category.clone()),
        })
        .collect();

    let suggestions = result
        .suggestions
        .iter()
        .map(|message| Suggestion {
            suggestion_type: "ai".to_string(),
            message: message.clone(),
            auto_fixable: false,
            fix_action: None,
        })
        .collect();

    let optimizations = &result.optimizations;
    let optimized_title = non_empty(optimizations.suggested_title.as_deref())
        .unwrap_or_else(|| content::optimize_title(&input.title));
    let optimized_description = non_empty(optimizations.suggested_description.as_deref())
        .unwrap_or_else(|| content::optimize_description(&input.description));
    let optimized_keywords = if optimizations.suggested_keywords.is_empty() {
        content::extract_keywords(&format!("{} {}", input.title, input.description))
    } else {
        optimizations.suggested_keywords.clone()
    };

    Evaluation {
        scores,
        overall_score: clamp_score(result.score),
        issues,
        suggestions,
        optimized_title,
        optimized_description,
        optimized_keywords,
        data: json!({
            "ai_powered": true,
            "provider": provider_name,
            "seo_score": result.seo_score,
            "market_insights": result.market_insights,
        }),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
