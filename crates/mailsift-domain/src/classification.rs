//! Classification records

use serde::{Deserialize, Serialize};

/// One message's position mapped to a topic label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Position of the message in the sequence that was classified
    pub email_index: usize,

    /// Assigned topic name
    pub topic: String,

    /// Model confidence in [0.0, 1.0]
    pub confidence: f64,
}

impl Classification {
    /// Create a new classification
    pub fn new(email_index: usize, topic: impl Into<String>, confidence: f64) -> Self {
        Self {
            email_index,
            topic: topic.into(),
            confidence,
        }
    }

    /// Re-express the index relative to a sequence in which the classified
    /// slice started at `offset`
    pub fn offset_by(mut self, offset: usize) -> Self {
        self.email_index += offset;
        self
    }
}
