//! Provider binding configuration

use crate::error::{Error, Result};
use crate::provider::{self, ProviderAdapter};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Supported provider families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Messages API wire protocol
    Claude,
    /// OpenAI chat-completions wire protocol
    OpenAi,
    /// Google Gemini generateContent wire protocol
    Gemini,
}

impl ProviderKind {
    /// Adapter implementing this family's wire protocol
    pub(crate) fn adapter(&self) -> &'static dyn ProviderAdapter {
        match self {
            Self::Claude => &provider::claude::ClaudeAdapter,
            Self::OpenAi => &provider::openai::OpenAiAdapter,
            Self::Gemini => &provider::gemini::GeminiAdapter,
        }
    }

    /// Infer the family from a model identifier.
    ///
    /// Configuration-time convenience only. Call-time dispatch always goes
    /// through the kind tag carried on the binding, never through model-name
    /// matching.
    pub fn infer(model: &str) -> Result<Self> {
        let lower = model.to_ascii_lowercase();
        if lower.contains("claude") {
            Ok(Self::Claude)
        } else if lower.contains("gpt") || lower.starts_with("o1") || lower.starts_with("o3") {
            Ok(Self::OpenAi)
        } else if lower.contains("gemini") {
            Ok(Self::Gemini)
        } else {
            Err(Error::unsupported_model(model))
        }
    }

    /// Family name for logs and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one provider binding.
///
/// Immutable once constructed; the credential is held as a [`SecretString`]
/// and never appears in `Debug` output or logs.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider family, fixed at construction
    pub kind: ProviderKind,
    /// Model identifier sent to (or embedded in the path of) the endpoint
    pub model: String,
    /// Endpoint base URL
    pub base_url: Url,
    /// API credential
    api_key: SecretString,
    /// Completion token budget, at least 1
    pub max_tokens: u32,
    /// Sampling temperature in `[0, 2]`
    pub temperature: f32,
    /// Per-call network timeout
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Default completion token budget
    pub const DEFAULT_MAX_TOKENS: u32 = 4096;
    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.0;
    /// Default per-call timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a binding with default generation parameters
    pub fn new(
        kind: ProviderKind,
        model: impl Into<String>,
        base_url: Url,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            model: model.into(),
            base_url,
            api_key: SecretString::from(api_key.into()),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Read one binding from `<PREFIX>_MODEL`, `<PREFIX>_BASE_URL` and
    /// `<PREFIX>_API_KEY`, with optional `<PREFIX>_PROVIDER`,
    /// `<PREFIX>_MAX_TOKENS` and `<PREFIX>_TEMPERATURE` overrides.
    ///
    /// When `<PREFIX>_PROVIDER` is absent the family is inferred from the
    /// model identifier via [`ProviderKind::infer`].
    pub fn from_env(prefix: &str) -> Result<Self> {
        // Load .env if present so local development picks up the bindings
        let _ = dotenvy::dotenv();

        let var = |suffix: &str| -> Result<String> {
            let name = format!("{prefix}_{suffix}");
            std::env::var(&name).map_err(|_| Error::config(format!("{name} not set")))
        };

        let model = var("MODEL")?;
        let base_url = Url::parse(&var("BASE_URL")?)
            .map_err(|e| Error::config(format!("{prefix}_BASE_URL is not a valid URL: {e}")))?;
        let api_key = var("API_KEY")?;

        let kind = match std::env::var(format!("{prefix}_PROVIDER")) {
            Ok(name) => match name.to_ascii_lowercase().as_str() {
                "claude" => ProviderKind::Claude,
                "openai" => ProviderKind::OpenAi,
                "gemini" => ProviderKind::Gemini,
                other => {
                    return Err(Error::config(format!(
                        "{prefix}_PROVIDER must be one of claude/openai/gemini, got '{other}'"
                    )))
                }
            },
            Err(_) => ProviderKind::infer(&model)?,
        };

        let mut config = Self::new(kind, model, base_url, api_key);

        if let Ok(raw) = std::env::var(format!("{prefix}_MAX_TOKENS")) {
            config.max_tokens = raw
                .parse()
                .map_err(|_| Error::config(format!("{prefix}_MAX_TOKENS must be an integer")))?;
        }
        if let Ok(raw) = std::env::var(format!("{prefix}_TEMPERATURE")) {
            config.temperature = raw
                .parse()
                .map_err(|_| Error::config(format!("{prefix}_TEMPERATURE must be a number")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the completion token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check credential and parameter bounds
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::config("model identifier must not be empty"));
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(Error::config(format!(
                "missing API key for {} binding",
                self.kind
            )));
        }
        if self.max_tokens < 1 {
            return Err(Error::config("max_tokens must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::config(format!(
                "temperature {} outside the [0, 2] range",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Get the API key as a string
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"***REDACTED***")
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}
