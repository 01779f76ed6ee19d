//! Configuration for the engine

use std::path::{Path, PathBuf};

use mailsift_llm::LlmConfig;
use mailsift_topics::TopicsConfig;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Prompt templates shipped with this crate
pub const BUNDLED_PROMPTS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/prompts");

/// Settings for LLM-driven classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Messages per model call in batch classification
    pub batch_size: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self { batch_size: 10 }
    }
}

/// Complete engine configuration
///
/// ```toml
/// prompts_dir = "./prompts"
///
/// [llm]
/// provider = "anthropic"
/// model = "claude-3-haiku-20240307"
/// api_key = "__ENV__"
///
/// [topics]
/// n_topics = 8
///
/// [classification]
/// batch_size = 20
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Template directory; the bundled templates when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,

    /// Model client settings
    pub llm: LlmConfig,

    /// Clustering settings
    pub topics: TopicsConfig,

    /// Batch classification settings
    pub classification: ClassificationConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Resolve a missing or `"__ENV__"` API key from the environment
    pub fn with_env_fallback(mut self) -> Self {
        self.llm = self.llm.with_env_fallback();
        self
    }

    /// Directory templates are loaded from
    pub fn prompts_dir(&self) -> PathBuf {
        self.prompts_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(BUNDLED_PROMPTS_DIR))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), EngineError> {
        self.llm.validate().map_err(EngineError::Config)?;
        self.topics
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        if self.classification.batch_size == 0 {
            return Err(EngineError::Config(
                "classification.batch_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
