//! Configuration loading.
//!
//! Loads configuration from `./ideaforge.toml` (or `$IDEAFORGE_CONFIG_PATH`).
//! Environment variables override file values; file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::credentials::DEFAULT_API_KEY_ENV;
use crate::orchestrator::SamplingPlan;
use crate::providers::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::providers::SamplingConfig;

/// Default config file name in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ideaforge.toml";

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Model selection.
    pub model: ModelConfig,
    /// Where the API key comes from.
    pub credentials: CredentialsConfig,
    /// Sampling for initial generation.
    pub generation: SamplingConfig,
    /// Sampling for refinement.
    pub refinement: SamplingConfig,
    /// Output locations.
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            model: ModelConfig::default(),
            credentials: CredentialsConfig::default(),
            generation: SamplingConfig::GENERATION,
            refinement: SamplingConfig::REFINEMENT,
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$IDEAFORGE_CONFIG_PATH` or `./ideaforge.toml`.
    /// If the file does not exist, returns defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`Config::load`] with a custom env resolver (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = Self::config_path_with(&env);
        let mut config = Self::load_from_file(&path)?;
        config.apply_overrides(&env);
        Ok(config)
    }

    fn load_from_file(path: &std::path::Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("invalid config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config file {}: {e}",
                path.display()
            )),
        }
    }

    /// Resolve the config file path using a custom env resolver.
    pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        env("IDEAFORGE_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids `set_var` in tests).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("IDEAFORGE_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = env("IDEAFORGE_MODEL") {
            self.model.name = v;
        }
        if let Some(v) = env("IDEAFORGE_BASE_URL") {
            self.model.base_url = v;
        }
        if let Some(v) = env("IDEAFORGE_API_KEY_ENV") {
            self.credentials.api_key_env = v;
        }
        if let Some(v) = env("IDEAFORGE_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(v);
        }
        if let Some(v) = env("IDEAFORGE_TEMPERATURE") {
            match v.parse() {
                Ok(t) => self.generation.temperature = t,
                Err(_) => tracing::warn!(
                    var = "IDEAFORGE_TEMPERATURE",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrong field types.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }

    /// Sampling parameters for the orchestrator.
    pub fn sampling(&self) -> SamplingPlan {
        SamplingPlan {
            generation: self.generation,
            refinement: self.refinement,
        }
    }
}

// ── Sections ────────────────────────────────────────────────────

/// Model selection (`[model]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Gemini model name.
    pub name: String,
    /// API base URL, including the version segment.
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_GEMINI_MODEL.to_owned(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_owned(),
        }
    }
}

/// Credential lookup (`[credentials]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_owned(),
        }
    }
}

/// Output locations (`[output]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory downloads are written to.
    pub dir: PathBuf,
    /// Directory for rolling JSON logs (interactive shell only).
    pub log_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            log_dir: PathBuf::from("logs"),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
