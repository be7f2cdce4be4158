//! Anthropic Claude API adapter

use async_trait::async_trait;
use feed_doctor_domain::{AiProvider, AnalysisInput, ProviderAnalysis, ProviderError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{
    ANALYSIS_INSTRUCTIONS, LlmConfig, SEO_TITLE_INSTRUCTIONS, build_analysis_prompt,
    build_seo_title_prompt, check_status, http_client, map_send_error, parse_analysis_response,
    parse_title_response, usable_key, with_retries,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    config: LlmConfig,
}

impl AnthropicProvider {
    pub fn new(api_key: Option<SecretString>, config: LlmConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, "https://api.anthropic.com/v1".to_string(), config)
    }

    pub fn with_base_url(
        api_key: Option<SecretString>,
        base_url: String,
        config: LlmConfig,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(&config)?,
            api_key,
            base_url,
            config,
        })
    }

    async fn call_api(&self, prompt: &str, system: &str) -> Result<String, ProviderError> {
        let api_key = usable_key(self.api_key.as_ref()).ok_or(ProviderError::NotConfigured)?;

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_output_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            system: Some(system.to_string()),
            temperature: Some(self.config.temperature),
        };

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let api_response: AnthropicResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .content
            .into_iter()
            .filter(|c| c.r#type == "text")
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ProviderError::InvalidFormat("Empty response".to_string()));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    r#type: String,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn is_configured(&self) -> bool {
        usable_key(self.api_key.as_ref()).is_some()
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<ProviderAnalysis, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured);
        }
        let prompt = build_analysis_prompt(input);
        let prompt = prompt.as_str();

        with_retries(self.config.retries, "analyze", || async move {
            let text = self.call_api(prompt, ANALYSIS_INSTRUCTIONS).await?;
            parse_analysis_response(&text).map_err(ProviderError::InvalidFormat)
        })
        .await
    }

    async fn generate_seo_title(
        &self,
        name: &str,
        category: Option<&str>,
    ) -> Result<String, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured);
        }
        let prompt = build_seo_title_prompt(name, category);
        let prompt = prompt.as_str();

        with_retries(self.config.retries, "seo_title", || async move {
            let text = self.call_api(prompt, SEO_TITLE_INSTRUCTIONS).await?;
            parse_title_response(&text).map_err(ProviderError::InvalidFormat)
        })
        .await
    }
}
