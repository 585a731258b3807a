//! HTTP client for the Gemini `generateContent` API.
//!
//! Sends one user turn with an optional grounding tool and returns the
//! candidate text together with any grounding citations. Non-2xx responses
//! are decoded from Gemini's `{"error": {...}}` envelope into
//! [`GenerateError::Api`] so the retry controller can classify them.

mod types;

use std::time::Duration;

use reqwest::{Client, Url};
use wayfind_core::AppConfig;

use crate::error::GenerateError;
use crate::generator::{GenerateRequest, Generation, Generator};
use types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini REST API.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl GeminiClient {
    /// Creates a client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, GenerateError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GenerateError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GenerateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("wayfind/0.1 (place-extraction)")
            .build()?;

        let endpoint = build_endpoint(base_url, model)?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            endpoint,
        })
    }

    /// Creates a client from loaded application config.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerateError> {
        Self::with_base_url(
            &config.gemini_api_key,
            &config.gemini_model,
            config.request_timeout_secs,
            &config.gemini_base_url,
        )
    }

    async fn generate_content(&self, request: &GenerateRequest) -> Result<Generation, GenerateError> {
        let body = GenerateContentRequest::new(&request.prompt, request.grounding);

        tracing::debug!(
            model = %self.model,
            grounding = %request.grounding,
            prompt_len = request.prompt.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let upstream = ErrorEnvelope::upstream_error(Some(status.as_u16()), &text);
            tracing::debug!(status = status.as_u16(), error = %upstream, "generateContent failed");
            return Err(GenerateError::Api(upstream));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| GenerateError::Deserialize {
                context: format!("generateContent(model={})", self.model),
                source: e,
            })?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            return Err(GenerateError::EmptyResponse);
        };

        let text = candidate.text();
        if text.trim().is_empty() {
            return Err(GenerateError::EmptyResponse);
        }

        let evidence = candidate
            .grounding_metadata
            .map(|meta| {
                meta.grounding_chunks
                    .into_iter()
                    .filter_map(types::GroundingChunk::into_citation)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Generation { text, evidence })
    }
}

impl Generator for GeminiClient {
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl std::future::Future<Output = Result<Generation, GenerateError>> + Send {
        self.generate_content(request)
    }
}

/// `{base}/v1beta/models/{model}:generateContent`
fn build_endpoint(base_url: &str, model: &str) -> Result<Url, GenerateError> {
    let invalid = |reason: String| GenerateError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };

    // Ensure exactly one trailing slash so `join` appends rather than
    // replacing the last path segment.
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    base.join(&format!("v1beta/models/{model}:generateContent"))
        .map_err(|e| invalid(e.to_string()))
}
