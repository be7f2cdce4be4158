//! Subcommand implementations and the wiring they share

pub mod analyze;
pub mod bulk;
pub mod config;
pub mod doctor;
pub mod fix;
pub mod results;
pub mod review;
pub mod seo_title;
pub mod stats;

use anyhow::{Context, Result, bail};
use feed_doctor_adapters::{
    catalog::FsCatalog,
    llm::{
        AnthropicProvider, LlmConfig as AdapterLlmConfig, OpenAiCompatProvider, OpenAiProvider,
        StubProvider,
    },
    store::SqliteAnalysisStore,
};
use feed_doctor_domain::usecases::{EngineConfig, FeedDoctor};
use feed_doctor_domain::{AiProvider, Dimension, FeedAnalysis, SystemClock};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;

use crate::config::AppConfig;

/// Options accepted by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub db: Option<PathBuf>,
}

impl GlobalOpts {
    /// Load configuration and apply the path overrides
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;

        if let Some(ref catalog) = self.catalog {
            config.general.catalog_path = catalog.clone();
        }
        if let Some(ref db) = self.db {
            config.general.state_db_path = db.clone();
        }

        Ok(config)
    }
}

pub(crate) type Doctor =
    FeedDoctor<FsCatalog, FsCatalog, dyn AiProvider, SqliteAnalysisStore, SystemClock>;

/// Assemble the engine from configuration
pub(crate) async fn build_doctor(config: &AppConfig) -> Result<Doctor> {
    let catalog = Arc::new(
        FsCatalog::new(&config.general.catalog_path)
            .context("Failed to open product catalog")?,
    );

    let store = SqliteAnalysisStore::new(&config.general.state_db_path)
        .await
        .with_context(|| {
            format!(
                "Failed to open results database: {}",
                config.general.state_db_path.display()
            )
        })?;

    let provider = build_provider(config)?;
    tracing::debug!(
        provider = provider.name(),
        configured = provider.is_configured(),
        "AI provider ready"
    );

    Ok(FeedDoctor::new(
        catalog.clone(),
        catalog,
        provider,
        Arc::new(store),
        Arc::new(SystemClock),
        engine_config(config),
    ))
}

pub(crate) fn engine_config(config: &AppConfig) -> EngineConfig {
    EngineConfig {
        provider_timeout: Duration::from_secs(config.engine.provider_timeout_secs),
        max_concurrent: config.engine.max_concurrent.max(1),
    }
}

pub(crate) fn build_provider(config: &AppConfig) -> Result<Arc<dyn AiProvider>> {
    let llm_config = adapter_llm_config(&config.llm);

    match config.llm.provider.as_str() {
        "openai" => {
            let api_key = load_api_key(&config.llm.openai.api_key_env, "openai");
            Ok(Arc::new(
                OpenAiProvider::with_base_url(
                    api_key,
                    config.llm.openai.base_url.clone(),
                    llm_config,
                )
                .context("Failed to configure OpenAI provider")?,
            ))
        }
        "anthropic" => {
            let api_key = load_api_key(&config.llm.anthropic.api_key_env, "anthropic");
            Ok(Arc::new(
                AnthropicProvider::with_base_url(
                    api_key,
                    config.llm.anthropic.base_url.clone(),
                    llm_config,
                )
                .context("Failed to configure Anthropic provider")?,
            ))
        }
        "openai_compat" => {
            let base_url = config.llm.openai_compat.base_url.trim();
            if base_url.is_empty() {
                bail!("OpenAI-compatible base_url is required");
            }
            let api_key = load_api_key(&config.llm.openai_compat.api_key_env, "openai_compat");
            Ok(Arc::new(
                OpenAiCompatProvider::new(api_key, base_url.to_string(), llm_config)
                    .context("Failed to configure OpenAI-compatible provider")?,
            ))
        }
        "stub" => Ok(Arc::new(StubProvider::echo())),
        "none" | "" => Ok(Arc::new(StubProvider::unconfigured())),
        other => bail!("Unknown LLM provider: {}", other),
    }
}

fn adapter_llm_config(config: &crate::config::LlmConfig) -> AdapterLlmConfig {
    AdapterLlmConfig {
        model: config.model.clone(),
        temperature: config.temperature,
        max_output_tokens: config.max_output_tokens,
        timeout_secs: config.timeout_secs,
        retries: config.retries,
    }
}

/// Read an API key from the environment.
///
/// A missing key is not fatal: the provider reports itself unconfigured and
/// analyses run on the rule path.
pub(crate) fn load_api_key(env_var: &str, provider: &str) -> Option<SecretString> {
    if env_var.trim().is_empty() {
        tracing::warn!(provider, "No API key env var configured, using rules only");
        return None;
    }

    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Some(SecretString::new(key.into())),
        _ => {
            tracing::warn!(
                provider,
                env_var,
                "API key env var is missing or empty, using rules only"
            );
            None
        }
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

pub(crate) fn format_score(score: Option<u8>) -> String {
    score.map_or_else(|| "-".to_string(), |s| s.to_string())
}

pub(crate) fn format_timestamp(ts: time::OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

/// Multi-line human summary of one stored result
pub(crate) fn print_analysis(analysis: &FeedAnalysis) {
    println!("Product:  {} (tenant {})", analysis.product_id, analysis.tenant_id);
    println!("Status:   {}", analysis.status.as_str());
    println!("Analyzed: {}", format_timestamp(analysis.analyzed_at));
    println!("Overall:  {}", analysis.overall_score);
    let scores = Dimension::ALL
        .iter()
        .map(|&d| {
            let score = format_score(analysis.dimension_score(d));
            format!("{} {}", d.as_str(), score)
        })
        .collect::<Vec<_>>();
    println!("Scores:   {}", scores.join(" | "));

    if let Some(ref error) = analysis.error_message {
        println!("Error:    {}", error);
    }

    println!();
    if analysis.issues.is_empty() {
        println!("No issues found.");
    } else {
        println!("Issues:");
        for issue in &analysis.issues {
            println!("  - [{}] {}", issue.severity.as_str(), issue.message);
        }
    }

    if !analysis.suggestions.is_empty() {
        println!();
        println!("Suggestions:");
        for suggestion in &analysis.suggestions {
            let marker = if suggestion.auto_fixable {
                " (auto-fix)"
            } else {
                ""
            };
            println!("  - {}{}", suggestion.message, marker);
        }
    }

    if let Some(ref title) = analysis.optimized_title {
        println!();
        println!("Optimized title: {}", title);
    }
    if !analysis.optimized_keywords.is_empty() {
        println!("Keywords: {}", analysis.optimized_keywords.join(", "));
    }

    if analysis.review.is_reviewed {
        println!();
        println!(
            "Reviewed by {}{}",
            analysis.review.reviewed_by.as_deref().unwrap_or("unknown"),
            analysis
                .review
                .review_notes
                .as_deref()
                .map(|notes| format!(": {}", notes))
                .unwrap_or_default()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_provider_none_is_unconfigured() {
        let config = AppConfig::default();
        let provider = build_provider(&config).unwrap();
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_build_provider_stub_is_configured() {
        let mut config = AppConfig::default();
        config.llm.provider = "stub".to_string();
        assert!(build_provider(&config).unwrap().is_configured());
    }

    #[test]
    fn test_build_provider_unknown_fails() {
        let mut config = AppConfig::default();
        config.llm.provider = "mystery".to_string();
        assert!(build_provider(&config).is_err());
    }

    #[test]
    fn test_openai_compat_requires_base_url() {
        let mut config = AppConfig::default();
        config.llm.provider = "openai_compat".to_string();
        assert!(build_provider(&config).is_err());
    }

    #[test]
    fn test_missing_api_key_is_not_fatal() {
        let mut config = AppConfig::default();
        config.llm.provider = "openai".to_string();
        config.llm.openai.api_key_env = "FEED_DOCTOR_TEST_KEY_THAT_IS_NOT_SET".to_string();

        let provider = build_provider(&config).unwrap();

        assert!(!provider.is_configured());
    }

    #[test]
    fn test_engine_config_clamps_concurrency() {
        let mut config = AppConfig::default();
        config.engine.max_concurrent = 0;
        config.engine.provider_timeout_secs = 5;

        let engine = engine_config(&config);

        assert_eq!(engine.max_concurrent, 1);
        assert_eq!(engine.provider_timeout, Duration::from_secs(5));
    }
}
