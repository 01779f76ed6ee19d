//! Mailsift Engine
//!
//! Topic discovery and classification for email, driven by prompt
//! templates and a pluggable language model.
//!
//! # Architecture
//!
//! ```text
//! messages → TopicEngine ─┬→ TopicExtractor (TF-IDF + k-means) → ClusterTopic
//!                         └→ TemplateStore → ClientManager → parser → LlmTopic / Classification
//! ```
//!
//! # Key Features
//!
//! - **Local clustering**: topics without any model call
//! - **LLM topics and classification**: prompt templates rendered with the
//!   messages, JSON answers validated entry by entry
//! - **Batch classification**: large inputs split into chunks with indices
//!   remapped to the full list
//! - **Soft failure**: structured operations log and return empty results;
//!   `try_` variants surface the error
//!
//! # Example Usage
//!
//! ```
//! use mailsift_domain::Message;
//! use mailsift_engine::{EngineConfig, TopicEngine};
//! use mailsift_llm::MockClient;
//!
//! let llm = MockClient::new(
//!     r#"{"classifications": [{"email_index": 0, "topic": "Work", "confidence": 0.9}]}"#,
//! );
//! let engine = TopicEngine::with_client(EngineConfig::default(), llm).unwrap();
//!
//! let messages = vec![Message::subject_only("Quarterly planning meeting", "boss@example.com")];
//! let results = engine.classify_messages(&messages, "Work: anything about the job");
//!
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].topic, "Work");
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
pub mod parser;

#[cfg(test)]
mod tests;

pub use config::{ClassificationConfig, EngineConfig, BUNDLED_PROMPTS_DIR};
pub use engine::{
    TopicEngine, ANALYSIS_TEMPLATE, CLASSIFICATION_TEMPLATE, TOPIC_EXTRACTION_TEMPLATE,
};
pub use error::EngineError;

pub use mailsift_llm::ClientInfo;
pub use mailsift_prompts::{ValidationReport, Variables};
