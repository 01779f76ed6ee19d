//! Error types for the engine

use mailsift_llm::LlmError;
use mailsift_prompts::PromptError;
use thiserror::Error;

/// Errors that can occur while building, sending or parsing a request
#[derive(Error, Debug)]
pub enum EngineError {
    /// Template missing, malformed or not renderable
    #[error("Template error: {0}")]
    Template(#[from] PromptError),

    /// The model client failed
    #[error("Model request failed: {0}")]
    ModelRequest(#[from] LlmError),

    /// The model answered with something other than the expected JSON
    #[error("Could not parse model response: {0}")]
    ResponseParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::ResponseParse(e.to_string())
    }
}
