//! LLM provider abstraction layer.
//!
//! Defines the [`CompletionProvider`] trait and the shared request types
//! used by provider implementations.
//!
//! One provider is implemented:
//! - [`gemini::GeminiProvider`]: Gemini `models/{model}:generateContent` API

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::credentials::ApiKey;

pub mod gemini;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Sampling parameters sent with a completion.
///
/// `top_k` / `top_p` are only set for initial generation; refinement sends
/// temperature alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Top-k cutoff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Nucleus sampling cutoff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl SamplingConfig {
    /// Sampling used for a full document generation pass.
    pub const GENERATION: Self = Self {
        temperature: 0.7,
        top_k: Some(40),
        top_p: Some(0.95),
    };

    /// Sampling used when refining an existing document.
    pub const REFINEMENT: Self = Self {
        temperature: 0.5,
        top_k: None,
        top_p: None,
    };
}

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The full prompt text.
    pub prompt: String,
    /// Sampling parameters.
    pub sampling: SamplingConfig,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by model providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body or unwrapped error message.
        body: String,
    },
    /// Provider cannot satisfy the request with current configuration.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure, `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"AIza[0-9A-Za-z_\-]{20,}",
        r"sk-ant-[A-Za-z0-9_\-]{10,}",
        r"sk-[A-Za-z0-9]{32,}",
        r"ya29\.[0-9A-Za-z_\-]{20,}",
    ]
    .into_iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

const MAX_ERROR_BODY_CHARS: usize = 256;

/// Collapse whitespace, redact key-like tokens and cap the length of an
/// upstream error body so it is safe to log and show to the user.
pub fn sanitize_http_error_body(raw: &str) -> String {
    let mut sanitized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    for regex in SECRET_PATTERNS.iter() {
        sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
    }

    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The remote text-completion capability.
///
/// Implementations must be `Send + Sync` so one provider can serve every
/// concurrent request of a generation pass.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a single completion. No retries are performed.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure.
    async fn complete(
        &self,
        api_key: &ApiKey,
        request: CompletionRequest,
    ) -> Result<String, ProviderError>;

    /// The model identifier this provider is instantiated for.
    fn model_id(&self) -> &str;
}
