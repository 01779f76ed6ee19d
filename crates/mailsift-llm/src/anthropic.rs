//! Anthropic messages API client

use crate::config::{LlmConfig, Provider};
use crate::http::{build_client, content_from_value, send_json};
use crate::LlmError;
use mailsift_domain::{Content, ModelClient, ModelResponse};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

/// API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Client for the Anthropic messages API
///
/// Responses arrive as a list of content blocks and are surfaced as
/// [`Content::Parts`].
pub struct AnthropicClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Create a client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .usable_api_key()
            .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY is required".to_string()))?;

        Ok(Self {
            client: build_client(config.timeout())?,
            endpoint: format!("{}/v1/messages", config.base_url_for(Provider::Anthropic)),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

fn extract_content(mut body: Value) -> Result<Content, LlmError> {
    match body.get_mut("content").map(Value::take) {
        Some(content @ Value::Array(_)) => Ok(content_from_value(content)),
        _ => Err(LlmError::InvalidResponse(
            "Response has no content blocks".to_string(),
        )),
    }
}

impl ModelClient for AnthropicClient {
    type Error = LlmError;

    fn invoke(&self, prompt: &str) -> Result<ModelResponse, Self::Error> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let body = send_json(
            self.client
                .post(&self.endpoint)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&request),
        )?;

        Ok(ModelResponse {
            content: extract_content(body)?,
        })
    }

    fn client_type(&self) -> &'static str {
        "AnthropicClient"
    }
}
