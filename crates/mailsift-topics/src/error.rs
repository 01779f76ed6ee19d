//! Error types for topic extraction

use thiserror::Error;

/// Errors that can occur during topic extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopicsError {
    /// Text could not be turned into feature vectors
    #[error("Vectorization failed: {0}")]
    Vectorization(String),

    /// Extraction settings are unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
