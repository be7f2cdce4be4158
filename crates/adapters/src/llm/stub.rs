//! Stub provider for testing and offline mode

use async_trait::async_trait;
use feed_doctor_domain::{
    AiProvider, AnalysisInput, ProviderAnalysis, ProviderError, ProviderOptimizations, SeoScore,
    content,
};

/// Stub provider that returns configurable responses
pub struct StubProvider {
    configured: bool,
    response: Option<ProviderAnalysis>,
    error: Option<ProviderError>,
}

impl StubProvider {
    /// A provider that reports itself unconfigured, forcing the rule path
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            response: None,
            error: None,
        }
    }

    /// Create a stub that returns a specific response
    pub fn with_response(response: ProviderAnalysis) -> Self {
        Self {
            configured: true,
            response: Some(response),
            error: None,
        }
    }

    /// Create a stub that always returns an error
    pub fn with_error(error: ProviderError) -> Self {
        Self {
            configured: true,
            response: None,
            error: Some(error),
        }
    }

    /// Create a stub that derives a response from the input
    pub fn echo() -> Self {
        Self {
            configured: true,
            response: None,
            error: None,
        }
    }

    fn configured_error(&self) -> Option<ProviderError> {
        self.error.as_ref().map(|error| match error {
            ProviderError::NotConfigured => ProviderError::NotConfigured,
            ProviderError::Api(msg) => ProviderError::Api(msg.clone()),
            ProviderError::InvalidFormat(msg) => ProviderError::InvalidFormat(msg.clone()),
            ProviderError::RateLimited => ProviderError::RateLimited,
            ProviderError::Timeout => ProviderError::Timeout,
            ProviderError::Config(msg) => ProviderError::Config(msg.clone()),
        })
    }
}

impl Default for StubProvider {
    fn default() -> Self {
        Self::unconfigured()
    }
}

#[async_trait]
impl AiProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<ProviderAnalysis, ProviderError> {
        if !self.configured {
            return Err(ProviderError::NotConfigured);
        }
        if let Some(error) = self.configured_error() {
            return Err(error);
        }
        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }

        // Echo mode: reuse the local rewrites and score by how much they changed
        let title = content::optimize_title(&input.title);
        let title_score = if title == input.title { 80.0 } else { 60.0 };
        let description_score = match input.description.chars().count() {
            0..50 => 30.0,
            50..150 => 60.0,
            _ => 85.0,
        };

        Ok(ProviderAnalysis {
            score: (title_score + description_score) / 2.0,
            issues: vec![],
            suggestions: vec![format!("Stub review of product {}", input.product_id)],
            optimizations: ProviderOptimizations {
                suggested_title: Some(title),
                suggested_description: Some(content::optimize_description(&input.description)),
                suggested_keywords: content::extract_keywords(&input.description),
            },
            seo_score: SeoScore {
                title_score,
                description_score,
                overall: (title_score + description_score) / 2.0,
                ..Default::default()
            },
            market_insights: None,
        })
    }

    async fn generate_seo_title(
        &self,
        name: &str,
        category: Option<&str>,
    ) -> Result<String, ProviderError> {
        if !self.configured {
            return Err(ProviderError::NotConfigured);
        }
        if let Some(error) = self.configured_error() {
            return Err(error);
        }
        Ok(content::fallback_seo_title(name, category))
    }
}
