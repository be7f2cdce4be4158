//! OpenAI-compatible API adapter for generic providers

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

/// Provider for third-party `/chat/completions` endpoints
pub struct OpenAiCompatProvider {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    config: LlmConfig,
}

impl OpenAiCompatProvider {
    pub fn new(
        api_key: Option<SecretString>,
        base_url: String,
        config: LlmConfig,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(&config)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    async fn call_api(&self, prompt: &str, system: &str) -> Result<String, ProviderError> {
        let api_key = usable_key(self.api_key.as_ref()).ok_or(ProviderError::NotConfigured)?;

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_output_tokens),
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let api_response: ChatCompletionResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ProviderError::InvalidFormat("Empty response".to_string()));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl AiProvider for OpenAiCompatProvider {
    fn name(&self) -> &'static str {
        "openai_compat"
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
