//! AI provider adapters

pub mod anthropic;
pub mod openai;
pub mod openai_compat;
pub mod stub;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use stub::StubProvider;

use std::future::Future;
use std::time::Duration;

use feed_doctor_domain::{AnalysisInput, ProviderAnalysis, ProviderError};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub(crate) const ANALYSIS_INSTRUCTIONS: &str =
    "You are an e-commerce content quality analyst. Output only valid JSON.";
pub(crate) const SEO_TITLE_INSTRUCTIONS: &str =
    "You write concise, search-friendly product titles. Output only the title.";

/// Common LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Temperature (0.0-1.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries on failure
    pub retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_output_tokens: 1200,
            timeout_secs: 45,
            retries: 2,
        }
    }
}

/// True when the key is empty or an obvious template value
pub fn is_placeholder_key(key: &str) -> bool {
    const PLACEHOLDERS: &[&str] = &[
        "your-api-key",
        "your_api_key",
        "changeme",
        "placeholder",
        "xxx",
        "sk-xxx",
        "<api-key>",
    ];

    let key = key.trim().to_ascii_lowercase();
    key.is_empty()
        || PLACEHOLDERS.contains(&key.as_str())
        || key.starts_with("your-")
        || key.starts_with("your_")
        || key.starts_with("sk-your")
}

/// Usable API key, if one was supplied
pub(crate) fn usable_key(api_key: Option<&SecretString>) -> Option<&SecretString> {
    api_key.filter(|key| !is_placeholder_key(key.expose_secret()))
}

pub(crate) fn http_client(config: &LlmConfig) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ProviderError::Config(format!("Failed to build HTTP client: {}", e)))
}

pub(crate) fn map_send_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Api(error.to_string())
    }
}

/// Turn 429 and other non-success statuses into provider errors
pub(crate) async fn check_status(response: Response) -> Result<Response, ProviderError> {
    if response.status() == 429 {
        return Err(ProviderError::RateLimited);
    }

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api(format!(
            "API returned {}: {}",
            status, body
        )));
    }

    Ok(response)
}

/// Run `call` up to `retries + 1` times with exponential backoff.
///
/// Rate limiting is returned immediately.
pub(crate) async fn with_retries<T, F, Fut>(
    retries: u32,
    operation: &str,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut last_error = None;
    for attempt in 0..=retries {
        if attempt > 0 {
            tracing::warn!(attempt = attempt, operation, "Retrying provider call");
            tokio::time::sleep(Duration::from_millis(500 * 2_u64.pow(attempt))).await;
        }

        match call().await {
            Ok(value) => return Ok(value),
            Err(ProviderError::RateLimited) => return Err(ProviderError::RateLimited),
            Err(e) => {
                tracing::warn!(error = %e, operation, "Provider call failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ProviderError::Api("Unknown error".to_string())))
}

/// Build the content analysis prompt
pub fn build_analysis_prompt(input: &AnalysisInput) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "Analyze the following product listing for content quality and search visibility.\n\n",
    );

    prompt.push_str("## Product\n");
    prompt.push_str(&format!("Title: {}\n", input.title));
    prompt.push_str(&format!("Description: {}\n", input.description));
    prompt.push_str(&format!(
        "Category: {}\n",
        input.category_id.as_deref().unwrap_or("(none)")
    ));
    match input.price {
        Some(price) => prompt.push_str(&format!("Price: {:.2}\n", price)),
        None => prompt.push_str("Price: (none)\n"),
    }
    prompt.push_str(&format!("Image count: {}\n", input.images.len()));
    if !input.tags.is_empty() {
        prompt.push_str(&format!("Tags: {}\n", input.tags.join(", ")));
    }

    prompt.push_str(
        r#"
## Output Format
Respond with ONLY a JSON object matching this exact schema:
{
  "score": 0 to 100,
  "issues": [
    {"category": "title|description|images|category|price|general", "severity": "info|warning|error|critical", "message": "..."}
  ],
  "suggestions": ["actionable suggestion"],
  "optimizations": {
    "suggested_title": "...",
    "suggested_description": "...",
    "suggested_keywords": ["keyword"]
  },
  "seo_score": {
    "title_score": 0 to 100,
    "description_score": 0 to 100,
    "keyword_density": 0 to 100,
    "readability": 0 to 100,
    "overall": 0 to 100
  },
  "market_insights": {}
}
"#,
    );

    prompt
}

/// Build the SEO title prompt
pub fn build_seo_title_prompt(name: &str, category: Option<&str>) -> String {
    let mut prompt = format!(
        "Write one SEO-optimized product title of at most 60 characters.\n\nProduct name: {}\n",
        name
    );
    if let Some(category) = category {
        prompt.push_str(&format!("Category: {}\n", category));
    }
    prompt
}

/// Parse an analysis response into the normalized shape
pub fn parse_analysis_response(response: &str) -> Result<ProviderAnalysis, String> {
    let json_str = extract_json(response);

    serde_json::from_str(json_str).map_err(|e| format!("Failed to parse JSON: {}", e))
}

/// First non-empty line of a title response, without surrounding quotes
pub fn parse_title_response(response: &str) -> Result<String, String> {
    response
        .lines()
        .map(|line| line.trim().trim_matches('"').trim())
        .find(|line| !line.is_empty())
        .map(String::from)
        .ok_or_else(|| "Empty title".to_string())
}

/// Extract JSON from response (handles markdown code blocks)
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        if let Some(end) = trimmed[start + 7..].find("```") {
            return trimmed[start + 7..start + 7 + end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        if let Some(end) = trimmed[start + 3..].find("```") {
            let content = trimmed[start + 3..start + 3 + end].trim();
            // Skip language identifier if present
            if let Some(newline) = content.find('\n') {
                let first_line = &content[..newline];
                if !first_line.starts_with('{') {
                    return content[newline + 1..].trim();
                }
            }
            return content;
        }
    }

    trimmed
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_input() -> AnalysisInput {
        AnalysisInput {
            product_id: "p1".to_string(),
            tenant_id: "acme".to_string(),
            title: "Trail running shoes".to_string(),
            description: "Lightweight shoes for rough terrain.".to_string(),
            category_id: Some("footwear".to_string()),
            price: Some(89.0),
            images: vec!["1.jpg".to_string()],
            tags: vec!["running".to_string()],
        }
    }

    pub(crate) const ANALYSIS_JSON: &str = r#"{"score":82,"issues":[{"category":"images","severity":"warning","message":"Add more photos"}],"suggestions":["Show the sole"],"optimizations":{"suggested_title":"Trail Running Shoes","suggested_keywords":["trail","running"]},"seo_score":{"title_score":78,"description_score":66,"keyword_density":2.5,"readability":80,"overall":74}}"#;

    #[test]
    fn test_extract_json_raw() {
        let input = r#"{"score": 50}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn test_extract_json_code_block() {
        let input = "```json\n{\"score\": 50}\n```";
        assert_eq!(extract_json(input), r#"{"score": 50}"#);
    }

    #[test]
    fn test_parse_valid_response() {
        let result = parse_analysis_response(ANALYSIS_JSON).unwrap();
        assert_eq!(result.score, 82.0);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].category, "images");
        assert_eq!(result.seo_score.title_score, 78.0);
        assert!(result.optimizations.suggested_description.is_none());
        assert!(result.market_insights.is_none());
    }

    #[test]
    fn test_parse_lenient_missing_fields() {
        let result = parse_analysis_response(r#"{"score": 40}"#).unwrap();
        assert!(result.issues.is_empty());
        assert_eq!(result.seo_score.description_score, 0.0);
    }

    #[test]
    fn test_parse_invalid_response() {
        assert!(parse_analysis_response("not json").is_err());
    }

    #[test]
    fn test_parse_title_response() {
        assert_eq!(
            parse_title_response("\n\"Trail Running Shoes for Men\"\n").unwrap(),
            "Trail Running Shoes for Men"
        );
        assert!(parse_title_response("  \n ").is_err());
    }

    #[test]
    fn test_placeholder_keys() {
        for key in [
            "",
            "   ",
            "your-api-key",
            "YOUR_API_KEY",
            "changeme",
            "placeholder",
            "xxx",
            "sk-xxx",
            "<api-key>",
            "your-openai-key",
            "your_key_here",
            "sk-your-key",
        ] {
            assert!(is_placeholder_key(key), "{key:?} should be a placeholder");
        }

        assert!(!is_placeholder_key("sk-proj-abc123"));
        assert!(!is_placeholder_key("test-key"));
    }

    #[test]
    fn test_prompt_mentions_product_fields() {
        let prompt = build_analysis_prompt(&sample_input());
        assert!(prompt.contains("Title: Trail running shoes"));
        assert!(prompt.contains("Price: 89.00"));
        assert!(prompt.contains("Image count: 1"));
        assert!(prompt.contains("\"seo_score\""));
    }
}
