//! OpenAI chat completions client

use crate::config::{LlmConfig, Provider};
use crate::http::{build_client, content_from_value, send_json};
use crate::LlmError;
use mailsift_domain::{Content, ModelClient, ModelResponse};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Client for the OpenAI chat completions API
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::NotConfigured` when no API key is present.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .usable_api_key()
            .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY is required".to_string()))?;

        Ok(Self {
            client: build_client(config.timeout())?,
            endpoint: format!("{}/chat/completions", config.base_url_for(Provider::OpenAi)),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Model name sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Pull `choices[0].message.content` out of a response body
fn extract_content(mut body: Value) -> Result<Content, LlmError> {
    let content = body
        .pointer_mut("/choices/0/message/content")
        .map(Value::take)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?;
    Ok(content_from_value(content))
}

impl ModelClient for OpenAiClient {
    type Error = LlmError;

    fn invoke(&self, prompt: &str) -> Result<ModelResponse, Self::Error> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let body = send_json(
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request),
        )?;

        Ok(ModelResponse {
            content: extract_content(body)?,
        })
    }

    fn client_type(&self) -> &'static str {
        "OpenAiClient"
    }
}
