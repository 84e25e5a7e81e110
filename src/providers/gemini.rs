//! Gemini provider implementation using the `generateContent` REST API.

use serde::{Deserialize, Serialize};

use crate::credentials::ApiKey;

use super::{
    check_http_response, sanitize_http_error_body, CompletionProvider, CompletionRequest, ProviderError,
    SamplingConfig,
};

/// Default Gemini API base URL (versioned).
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used for every request.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// `generateContent` request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns; always a single user turn here.
    pub contents: Vec<GeminiContent>,
    /// Sampling parameters.
    pub generation_config: GeminiGenerationConfig,
}

/// A conversation turn.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct GeminiContent {
    /// Role: "user" or "model".
    pub role: String,
    /// Text parts.
    pub parts: Vec<GeminiPart>,
}

/// A text part of a request turn.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct GeminiPart {
    /// Part text.
    pub text: String,
}

/// Gemini `generationConfig` object.
#[doc(hidden)]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Top-k cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Nucleus sampling cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl From<SamplingConfig> for GeminiGenerationConfig {
    fn from(sampling: SamplingConfig) -> Self {
        Self {
            temperature: sampling.temperature,
            top_k: sampling.top_k,
            top_p: sampling.top_p,
        }
    }
}

/// `generateContent` response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Response candidates.
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Safety feedback on the prompt, present when it was blocked.
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

/// A response candidate.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Candidate content.
    pub content: Option<GeminiResponseContent>,
    /// Why generation stopped.
    pub finish_reason: Option<String>,
}

/// Content of a response candidate.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct GeminiResponseContent {
    /// Response parts.
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

/// A single response part.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct GeminiResponsePart {
    /// Text, absent for non-text parts.
    pub text: Option<String>,
}

/// Prompt safety feedback.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    /// Block reason, e.g. `"SAFETY"`.
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: Option<String>,
    status: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Gemini `generateContent` API provider.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider for `model` served from `base_url`.
    pub fn new(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Full `generateContent` URL for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new(DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_BASE_URL)
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build a Gemini request body from a completion request.
#[doc(hidden)]
pub fn build_request(request: &CompletionRequest) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user".to_owned(),
            parts: vec![GeminiPart {
                text: request.prompt.clone(),
            }],
        }],
        generation_config: request.sampling.into(),
    }
}

/// Extract the completion text from a Gemini response body.
///
/// Text parts of the first candidate are concatenated.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body cannot be deserialized or
/// carries no text.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: GeminiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let candidate = resp.candidates.into_iter().next();
    let text: String = candidate
        .as_ref()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::Parse(format!("prompt was blocked: {reason}")));
    }
    match candidate.and_then(|c| c.finish_reason) {
        Some(reason) => Err(ProviderError::Parse(format!(
            "response contained no text (finish reason: {reason})"
        ))),
        None => Err(ProviderError::Parse("response contained no text".to_owned())),
    }
}

/// Map a non-2xx response body to a [`ProviderError::HttpStatus`].
///
/// Gemini error envelopes are unwrapped to `STATUS: message`; anything else
/// is passed through sanitized.
#[doc(hidden)]
pub fn map_http_error(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| {
            let msg = envelope.error.message?;
            Some(match envelope.error.status {
                Some(status_text) if !status_text.is_empty() => format!("{status_text}: {msg}"),
                _ => msg,
            })
        })
        .unwrap_or_else(|| body.to_owned());

    ProviderError::HttpStatus {
        status,
        body: sanitize_http_error_body(&message),
    }
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(
        &self,
        api_key: &ApiKey,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        let body = build_request(&request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key.expose())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let payload = match check_http_response(response).await {
            Ok(payload) => payload,
            Err(ProviderError::HttpStatus { status, body }) => {
                return Err(map_http_error(status, &body));
            }
            Err(e) => return Err(e),
        };
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
