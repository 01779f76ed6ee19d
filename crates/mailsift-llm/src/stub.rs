//! Stub client used when no live provider can be resolved

use crate::LlmError;
use mailsift_domain::{ModelClient, ModelResponse};

/// Fixed placeholder returned by [`StubClient`]
pub const STUB_RESPONSE: &str =
    "Stub response: no language model is configured, this is placeholder output.";

/// Deterministic client that answers every prompt with [`STUB_RESPONSE`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StubClient;

impl StubClient {
    /// Create a stub client
    pub fn new() -> Self {
        Self
    }
}

impl ModelClient for StubClient {
    type Error = LlmError;

    fn invoke(&self, _prompt: &str) -> Result<ModelResponse, Self::Error> {
        Ok(ModelResponse::text(STUB_RESPONSE))
    }

    fn client_type(&self) -> &'static str {
        "StubClient"
    }
}
