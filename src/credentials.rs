//! API credential resolution.
//!
//! The generation client asks its [`CredentialSource`] for a key before every
//! remote call, so a key exported after startup is picked up and a key that
//! disappears blocks further requests.

use std::path::Path;

use anyhow::Context;
use tracing::debug;

/// Default environment variable holding the model API key.
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";

/// Secondary variable consulted when the primary one is unset.
pub const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// A non-empty model API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw value. Returns `None` when the value is empty or whitespace.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// The secret value, for placing in a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Anything that can hand out the current API key.
pub trait CredentialSource: Send + Sync {
    /// The usable key, or `None` when no credential is configured.
    fn api_key(&self) -> Option<ApiKey>;
}

/// Reads the key from process environment variables on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    vars: Vec<String>,
}

impl EnvCredentials {
    /// Look up `var`, then [`FALLBACK_API_KEY_ENV`].
    pub fn new(var: impl Into<String>) -> Self {
        let var = var.into();
        let mut vars = vec![var];
        if !vars.iter().any(|v| v == FALLBACK_API_KEY_ENV) {
            vars.push(FALLBACK_API_KEY_ENV.to_owned());
        }
        Self { vars }
    }

    /// Variable names consulted, in order.
    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    /// Resolve using a custom env resolver (for testing).
    pub fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<ApiKey> {
        self.vars.iter().find_map(|var| env(var).and_then(ApiKey::new))
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_ENV)
    }
}

impl CredentialSource for EnvCredentials {
    fn api_key(&self) -> Option<ApiKey> {
        self.resolve_with(|key| std::env::var(key).ok())
    }
}

/// A fixed credential, mostly useful in tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(Option<ApiKey>);

impl StaticCredentials {
    /// A source that always yields `key` (if non-empty).
    pub fn new(key: &str) -> Self {
        Self(ApiKey::new(key))
    }

    /// A source with no credential at all.
    pub fn missing() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticCredentials {
    fn api_key(&self) -> Option<ApiKey> {
        self.0.clone()
    }
}

/// Load `KEY=value` pairs from a `.env` file into the process environment.
///
/// Existing variables are not overwritten. Returns `false` when the file does
/// not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_env_file(path: &Path) -> anyhow::Result<bool> {
    if !path.exists() {
        debug!(path = %path.display(), "no env file found");
        return Ok(false);
    }
    dotenvy::from_path(path)
        .with_context(|| format!("failed to load env file at {}", path.display()))?;
    debug!(path = %path.display(), "loaded env file");
    Ok(true)
}
