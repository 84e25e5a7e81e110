//! Generation client: credential gate, single-attempt completion and
//! response clean-up on top of a [`CompletionProvider`].

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::credentials::CredentialSource;
use crate::providers::{CompletionProvider, CompletionRequest, SamplingConfig};

/// Message used when no usable credential is configured.
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "API key is missing or empty. Set the API_KEY environment variable to enable document generation.";

/// Failures surfaced by [`GenerationClient::generate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// No usable credential; no request was issued.
    #[error("{0}")]
    Configuration(String),
    /// The remote call failed.
    #[error("{0}")]
    Upstream(String),
}

impl GenerationError {
    /// Whether this is a missing-credential failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Wraps the remote completion capability.
///
/// Cheap to clone; every generation task holds its own handle.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn CompletionProvider>,
    credentials: Arc<dyn CredentialSource>,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("model", &self.provider.model_id())
            .finish_non_exhaustive()
    }
}

impl GenerationClient {
    /// Build a client from a provider and a credential source.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            provider,
            credentials,
        }
    }

    /// Whether a usable credential is currently available.
    pub fn has_credential(&self) -> bool {
        self.credentials.api_key().is_some()
    }

    /// Model identifier of the underlying provider.
    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    /// Issue one completion for `prompt` and return the cleaned-up text.
    ///
    /// # Errors
    ///
    /// [`GenerationError::Configuration`] if no credential is available (the
    /// provider is never called), [`GenerationError::Upstream`] if the remote
    /// call fails.
    pub async fn generate(
        &self,
        prompt: String,
        sampling: SamplingConfig,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .credentials
            .api_key()
            .ok_or_else(|| GenerationError::Configuration(MISSING_CREDENTIAL_MESSAGE.to_owned()))?;

        debug!(
            model = self.provider.model_id(),
            prompt_chars = prompt.chars().count(),
            temperature = sampling.temperature,
            "requesting completion"
        );

        let raw = self
            .provider
            .complete(&api_key, CompletionRequest { prompt, sampling })
            .await
            .map_err(|e| {
                warn!(model = self.provider.model_id(), error = %e, "completion failed");
                GenerationError::Upstream(e.to_string())
            })?;

        Ok(strip_code_fence(&raw))
    }
}

static FENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s)\A```[\w+.\-]*[ \t]*\r?\n?(.*?)\r?\n?[ \t]*```\z").ok()
});

/// Trim `text` and, if the whole of it is one fenced block, return the
/// fence's inner text trimmed.
///
/// The block must open at the very start and close at the very end, and its
/// body must not contain fence lines of its own. Applying this twice gives
/// the same result as applying it once.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(inner) = FENCE
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return trimmed.to_owned();
    };

    let nested_fence = inner
        .lines()
        .any(|line| line.trim_start().starts_with("```"));
    if nested_fence || inner.trim().is_empty() {
        return trimmed.to_owned();
    }
    inner.trim().to_owned()
}
