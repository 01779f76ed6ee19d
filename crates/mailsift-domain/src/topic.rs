//! Topic records produced by extraction

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A topic discovered by clustering the input messages
///
/// `messages` and `message_indices` are parallel: `messages[i]` is the input
/// message at position `message_indices[i]`. Indices always point into the
/// sequence handed to the extraction call.
#[derive(Debug, Serialize)]
#[serde(bound(serialize = "M: Serialize"))]
pub struct ClusterTopic<'a, M> {
    /// Human-readable name built from the strongest terms
    pub name: String,

    /// Short description naming the member count and key terms
    pub description: String,

    /// Member messages, in input order
    pub messages: Vec<&'a M>,

    /// Positions of the member messages in the input sequence
    pub message_indices: Vec<usize>,

    /// Highest-weighted centroid terms, strongest first
    pub top_terms: Vec<String>,
}

impl<'a, M> ClusterTopic<'a, M> {
    /// Number of member messages
    pub fn len(&self) -> usize {
        self.message_indices.len()
    }

    /// Whether the topic has no members
    pub fn is_empty(&self) -> bool {
        self.message_indices.is_empty()
    }
}

/// A topic proposed by a language model
///
/// Only `name` is required. Anything else the model attaches (keywords,
/// example indices, counts) is preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmTopic {
    /// Topic name
    pub name: String,

    /// Topic description
    #[serde(default)]
    pub description: String,

    /// Additional fields returned by the model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
