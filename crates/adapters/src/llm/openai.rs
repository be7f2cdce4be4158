//! OpenAI Responses API adapter

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

/// OpenAI provider using the Responses API
pub struct OpenAiProvider {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    config: LlmConfig,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<SecretString>, config: LlmConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, "https://api.openai.com/v1".to_string(), config)
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

    async fn call_api(&self, prompt: &str, instructions: &str) -> Result<String, ProviderError> {
        let api_key = usable_key(self.api_key.as_ref()).ok_or(ProviderError::NotConfigured)?;

        let request = OpenAiRequest {
            model: self.config.model.clone(),
            input: prompt.to_string(),
            instructions: Some(instructions.to_string()),
            temperature: Some(self.config.temperature),
            max_output_tokens: Some(self.config.max_output_tokens),
        };

        let url = format!("{}/responses", self.base_url);

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

        let api_response: OpenAiResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .output
            .into_iter()
            .filter(|item| item.r#type == "message")
            .filter_map(|item| {
                item.content
                    .into_iter()
                    .find(|c| c.r#type == "output_text")
                    .map(|c| c.text)
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ProviderError::InvalidFormat("Empty response".to_string()));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    r#type: String,
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Deserialize)]
struct ContentItem {
    r#type: String,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tests::{ANALYSIS_JSON, sample_input};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message(text: &str) -> serde_json::Value {
        serde_json::json!({
            "output": [
                {
                    "type": "message",
                    "content": [
                        {
                            "type": "output_text",
                            "text": text
                        }
                    ]
                }
            ]
        })
    }

    fn provider(uri: String, retries: u32) -> OpenAiProvider {
        OpenAiProvider::with_base_url(
            Some(SecretString::new("test-key".into())),
            uri,
            LlmConfig {
                retries,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message(ANALYSIS_JSON)))
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri(), 2)
            .analyze(&sample_input())
            .await
            .unwrap();

        assert_eq!(result.score, 82.0);
        assert_eq!(result.suggestions, vec!["Show the sole"]);
    }

    #[tokio::test]
    async fn test_analyze_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri(), 2).analyze(&sample_input()).await;

        assert!(matches!(result, Err(ProviderError::RateLimited)));
    }

    #[tokio::test]
    async fn test_analyze_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri(), 0).analyze(&sample_input()).await;

        assert!(matches!(result, Err(ProviderError::Api(_))));
    }

    #[tokio::test]
    async fn test_analyze_unparseable_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message("no json here")))
            .mount(&mock_server)
            .await;

        let result = provider(mock_server.uri(), 0).analyze(&sample_input()).await;

        assert!(matches!(result, Err(ProviderError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_generate_seo_title() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(message("\"Lightweight Trail Running Shoes\"")),
            )
            .mount(&mock_server)
            .await;

        let title = provider(mock_server.uri(), 0)
            .generate_seo_title("trail shoes", Some("footwear"))
            .await
            .unwrap();

        assert_eq!(title, "Lightweight Trail Running Shoes");
    }

    #[tokio::test]
    async fn test_placeholder_key_is_not_configured() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = OpenAiProvider::with_base_url(
            Some(SecretString::new("your-api-key".into())),
            mock_server.uri(),
            LlmConfig::default(),
        )
        .unwrap();

        assert!(!provider.is_configured());
        assert!(matches!(
            provider.analyze(&sample_input()).await,
            Err(ProviderError::NotConfigured)
        ));
    }
}
