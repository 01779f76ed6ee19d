//! Trait definitions for external interactions
//!
//! These traits define the boundary between engine logic and the model
//! backends. Implementations live in `mailsift-llm`.

use serde_json::Value;
use std::fmt;

/// Content returned by a chat-style model
///
/// Providers disagree on shape: some return a single string, some a list of
/// content blocks. Anything else is kept as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// A single text body
    Text(String),
    /// A sequence of text parts
    Parts(Vec<String>),
    /// Any other payload
    Other(Value),
}

impl Content {
    /// Normalize to a single string
    ///
    /// Text is returned as-is, parts are joined with single spaces, and
    /// anything else is stringified.
    pub fn into_text(self) -> String {
        match self {
            Content::Text(text) => text,
            Content::Parts(parts) => parts.join(" "),
            Content::Other(value) => value.to_string(),
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clone().into_text())
    }
}

/// Response object returned by [`ModelClient::invoke`]
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    /// Model output
    pub content: Content,
}

impl ModelResponse {
    /// Response carrying a single text body
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Content::Text(text.into()),
        }
    }

    /// Response carrying a list of parts
    pub fn parts(parts: Vec<String>) -> Self {
        Self {
            content: Content::Parts(parts),
        }
    }
}

/// Trait for chat-style model backends
///
/// Implemented by the infrastructure layer (mailsift-llm). Calls are
/// blocking; implementations must be shareable read-only across threads.
pub trait ModelClient: Send + Sync {
    /// Error type for model operations
    type Error;

    /// Send a prompt and return the model's response
    fn invoke(&self, prompt: &str) -> Result<ModelResponse, Self::Error>;

    /// Short name of the concrete client, for diagnostics
    fn client_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_content_unchanged() {
        assert_eq!(Content::Text("hello".into()).into_text(), "hello");
    }

    #[test]
    fn test_parts_joined_with_spaces() {
        let content = Content::Parts(vec!["one".into(), "two".into(), "three".into()]);
        assert_eq!(content.into_text(), "one two three");
    }

    #[test]
    fn test_other_is_stringified() {
        let content = Content::Other(json!({"a": 1}));
        assert_eq!(content.into_text(), r#"{"a":1}"#);
    }

    #[test]
    fn test_display_matches_into_text() {
        let content = Content::Parts(vec!["a".into(), "b".into()]);
        assert_eq!(content.to_string(), "a b");
    }
}
