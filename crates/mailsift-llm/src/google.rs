//! Google Generative Language API client

use crate::config::{LlmConfig, Provider};
use crate::http::{build_client, content_from_value, send_json};
use crate::LlmError;
use mailsift_domain::{Content, ModelClient, ModelResponse};
use reqwest::blocking::Client;
use serde_json::{json, Value};

/// Client for Gemini models via `generateContent`
pub struct GoogleClient {
    client: Client,
    endpoint: String,
    api_key: String,
    temperature: f32,
}

impl GoogleClient {
    /// Create a client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .usable_api_key()
            .ok_or_else(|| LlmError::NotConfigured("GOOGLE_AI_API_KEY is required".to_string()))?;

        Ok(Self {
            client: build_client(config.timeout())?,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url_for(Provider::Google),
                config.model
            ),
            api_key: api_key.to_string(),
            temperature: config.temperature,
        })
    }
}

fn extract_content(mut body: Value) -> Result<Content, LlmError> {
    match body
        .pointer_mut("/candidates/0/content/parts")
        .map(Value::take)
    {
        Some(parts @ Value::Array(_)) => Ok(content_from_value(parts)),
        _ => Err(LlmError::InvalidResponse(
            "Response has no candidates".to_string(),
        )),
    }
}

impl ModelClient for GoogleClient {
    type Error = LlmError;

    fn invoke(&self, prompt: &str) -> Result<ModelResponse, Self::Error> {
        let request = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {"temperature": self.temperature},
        });

        let body = send_json(
            self.client
                .post(&self.endpoint)
                .header("x-goog-api-key", &self.api_key)
                .json(&request),
        )?;

        Ok(ModelResponse {
            content: extract_content(body)?,
        })
    }

    fn client_type(&self) -> &'static str {
        "GoogleClient"
    }
}
