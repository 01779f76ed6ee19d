//! Shared HTTP plumbing for the live provider clients

use crate::LlmError;
use mailsift_domain::Content;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Build a blocking HTTP client with a request timeout
pub(crate) fn build_client(timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))
}

/// Send a request and decode the JSON body of a successful response
pub(crate) fn send_json(request: RequestBuilder) -> Result<Value, LlmError> {
    let response = request
        .send()
        .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimitExceeded);
    }
    if !status.is_success() {
        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<Value>()
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Convert a provider `content` value into [`Content`]
///
/// Arrays become parts; each part is either a bare string or an object with
/// a `text` field. Parts without text are skipped.
pub(crate) fn content_from_value(value: Value) -> Content {
    match value {
        Value::String(text) => Content::Text(text),
        Value::Array(items) => Content::Parts(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text),
                    Value::Object(mut obj) => match obj.remove("text") {
                        Some(Value::String(text)) => Some(text),
                        _ => None,
                    },
                    _ => None,
                })
                .collect(),
        ),
        other => Content::Other(other),
    }
}
