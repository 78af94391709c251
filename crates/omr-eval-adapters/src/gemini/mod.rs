//! Gemini adapter for the [`Evaluator`] port.
//!
//! One `generateContent` call per evaluation with a schema-constrained JSON
//! response. No retries and no client-side timeout.

mod wire;

use anyhow::Context;
use async_trait::async_trait;
use omr_eval_core::{
    parse_evaluation, AnswerKey, EncodedImage, EvaluationError, EvaluationRequest,
    EvaluationResult, Evaluator, Validation,
};
use tracing::{debug, error};

use wire::{GenerateContentRequest, GenerateContentResponse};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Public Gemini API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Longest error body echoed into logs.
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Base URL, without the `/v1beta` path.
    pub endpoint: String,
    /// How strictly to check returned results.
    pub validation: Validation,
}

impl GeminiConfig {
    /// Settings with default model and endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            validation: Validation::Permissive,
        }
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Overrides the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the validation mode.
    #[must_use]
    pub const fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }
}

/// Evaluator backed by the Gemini `generateContent` API.
pub struct GeminiEvaluator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiEvaluator {
    /// Creates the evaluator.
    ///
    /// # Errors
    ///
    /// Fails if the API key is empty or the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("{API_KEY_ENV} environment variable not set");
        }
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(&self, body: &GenerateContentRequest) -> anyhow::Result<String> {
        let url = self.url();
        debug!(%url, model = %self.config.model, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.config.model))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            anyhow::bail!("{} returned HTTP {status}: {body}", self.config.model);
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to read generateContent response")?;

        envelope
            .text()
            .context("Response contained no candidate text")
    }
}

#[async_trait]
impl Evaluator for GeminiEvaluator {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn evaluate(
        &self,
        image: &EncodedImage,
        answer_key: &AnswerKey,
    ) -> Result<EvaluationResult, EvaluationError> {
        let request = EvaluationRequest::build(image, answer_key);
        let body = GenerateContentRequest::from_request(&request);

        let text = self.generate(&body).await.map_err(|e| {
            error!("Gemini call failed: {e:#}");
            EvaluationError::transport(e)
        })?;

        parse_evaluation(&text, self.config.validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        let err = GeminiEvaluator::new(GeminiConfig::new("  ")).err();
        assert!(err.is_some_and(|e| e.to_string().contains("API_KEY")));
    }

    #[test]
    fn test_url_layout() {
        let evaluator = GeminiEvaluator::new(
            GeminiConfig::new("key")
                .with_endpoint("http://localhost:8080/")
                .with_model("gemini-test"),
        );
        let url = evaluator.map(|e| e.url()).unwrap_or_default();
        assert_eq!(
            url,
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::new("key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.validation, Validation::Permissive);
    }
}
