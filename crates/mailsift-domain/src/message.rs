//! Message capability consumed by the engine

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The read-only view of an email that the engine needs
///
/// The engine never mutates a message and never assumes any attribute beyond
/// these three, so any provider's message representation can implement it.
pub trait MailMessage {
    /// Subject line
    fn subject(&self) -> &str;

    /// Plain-text body, if the message has one
    fn body_text(&self) -> Option<&str>;

    /// Sender address or display name
    fn sender(&self) -> &str;

    /// Template-facing representation of the message
    ///
    /// An absent body is exposed as an empty string so templates can test it
    /// with `{% if message.body_text %}`.
    fn to_context(&self) -> Value {
        json!({
            "subject": self.subject(),
            "body_text": self.body_text().unwrap_or_default(),
            "sender": self.sender(),
        })
    }
}

impl<T: MailMessage + ?Sized> MailMessage for &T {
    fn subject(&self) -> &str {
        (**self).subject()
    }

    fn body_text(&self) -> Option<&str> {
        (**self).body_text()
    }

    fn sender(&self) -> &str {
        (**self).sender()
    }
}

/// A plain owned message
///
/// Used by the CLI when reading exported mail from JSON and by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Subject line
    #[serde(default)]
    pub subject: String,

    /// Plain-text body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,

    /// Sender
    #[serde(default)]
    pub sender: String,
}

impl Message {
    /// Create a message with a body
    pub fn new(
        subject: impl Into<String>,
        body_text: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body_text: Some(body_text.into()),
            sender: sender.into(),
        }
    }

    /// Create a message that only has a subject line
    pub fn subject_only(subject: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body_text: None,
            sender: sender.into(),
        }
    }
}

impl MailMessage for Message {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn body_text(&self) -> Option<&str> {
        self.body_text.as_deref()
    }

    fn sender(&self) -> &str {
        &self.sender
    }
}
