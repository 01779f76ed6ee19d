//! Mailsift Domain Layer
//!
//! Core types shared by every Mailsift crate. Nothing in here performs I/O:
//! this crate defines the message capability the engine consumes, the records
//! it produces, and the trait boundary to language-model backends.
//!
//! ## Key Concepts
//!
//! - **MailMessage**: the three accessors the engine needs from an email
//! - **ClusterTopic**: a topic discovered by local clustering
//! - **LlmTopic**: a topic proposed by a language model
//! - **Classification**: one message's position mapped to a topic label
//! - **ModelClient**: "send a prompt, get content back"

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classification;
pub mod message;
pub mod text;
pub mod topic;
pub mod traits;

// Re-exports for convenience
pub use classification::Classification;
pub use message::{MailMessage, Message};
pub use topic::{ClusterTopic, LlmTopic};
pub use traits::{Content, ModelClient, ModelResponse};
