//! Model client configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// `api_key` value meaning "read the provider's environment variable"
pub const ENV_SENTINEL: &str = "__ENV__";

/// Providers with a live client implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// OpenAI chat completions
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// Google Generative Language API
    Google,
}

impl Provider {
    /// All known providers
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Google];

    /// Parse a configured provider name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Provider::OpenAi),
            "anthropic" => Some(Provider::Anthropic),
            "google" => Some(Provider::Google),
            _ => None,
        }
    }

    /// Canonical configuration name
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
        }
    }

    /// Environment variable conventionally holding this provider's key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Google => "GOOGLE_AI_API_KEY",
        }
    }

    /// Default API base URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Google => "https://generativelanguage.googleapis.com",
        }
    }

    /// Whether this provider's binding was compiled in
    pub fn is_available(&self) -> bool {
        match self {
            Provider::OpenAi => cfg!(feature = "openai"),
            Provider::Anthropic => cfg!(feature = "anthropic"),
            Provider::Google => cfg!(feature = "google"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for model client resolution
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai", "anthropic", "google")
    pub provider: String,

    /// Model name passed to the provider
    pub model: String,

    /// Provider API key; `"__ENV__"` defers to the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout (seconds)
    pub timeout_secs: u64,

    /// Override for the provider's API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum output tokens (required by the Anthropic API)
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            temperature: 0.1,
            timeout_secs: 60,
            base_url: None,
            max_tokens: 4096,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmConfig {
    /// Create a configuration for a provider and model
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Configured provider, if it is one we know
    pub fn parsed_provider(&self) -> Option<Provider> {
        Provider::parse(&self.provider)
    }

    /// The API key, if one is present and usable
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != ENV_SENTINEL)
    }

    /// Base URL for a provider, honoring the override
    pub fn base_url_for(&self, provider: Provider) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fill a missing or `"__ENV__"` API key from the provider's environment
    /// variable
    pub fn with_env_fallback(self) -> Self {
        self.with_key_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`with_env_fallback`](Self::with_env_fallback) with an explicit
    /// lookup function
    pub fn with_key_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.usable_api_key().is_some() {
            return self;
        }
        if let Some(provider) = self.parsed_provider() {
            self.api_key = lookup(provider.api_key_env()).filter(|key| !key.trim().is_empty());
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}
