//! Mailsift LLM Provider Layer
//!
//! Pluggable chat-model clients behind the `ModelClient` trait from
//! `mailsift-domain`, plus the resolution logic that picks one from
//! configuration.
//!
//! # Clients
//!
//! - `StubClient`: fixed placeholder response, used when nothing is configured
//! - `MockClient`: scripted responses for tests
//! - `OpenAiClient`, `AnthropicClient`, `GoogleClient`: live providers
//!   (behind the `openai`, `anthropic` and `google` features)
//!
//! # Examples
//!
//! ```
//! use mailsift_llm::{ClientManager, LlmConfig, STUB_RESPONSE};
//!
//! // No API key: resolution degrades to the stub instead of failing.
//! let manager = ClientManager::new(LlmConfig::default());
//! assert_eq!(manager.send("hello").unwrap(), STUB_RESPONSE);
//! assert!(manager.is_stub());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod manager;
pub mod mock;
pub mod resolve;
pub mod stub;

mod http;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "openai")]
pub mod openai;

use thiserror::Error;

pub use config::{LlmConfig, Provider, ENV_SENTINEL};
pub use manager::{ClientInfo, ClientManager, DynClient};
pub use mock::MockClient;
pub use resolve::{resolve_client_kind, ClientKind, StubReason};
pub use stub::{StubClient, STUB_RESPONSE};

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicClient;
#[cfg(feature = "google")]
pub use google::GoogleClient;
#[cfg(feature = "openai")]
pub use openai::OpenAiClient;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Provider returned a non-success HTTP status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Response body did not have the provider's expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider cannot be used with the current configuration
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}
