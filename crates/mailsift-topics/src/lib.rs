//! Mailsift Topics
//!
//! Unsupervised topic discovery over email text. Messages are turned into
//! TF-IDF vectors (unigrams and bigrams, English stop words removed) and
//! grouped with seeded k-means. Each non-empty cluster becomes a
//! [`ClusterTopic`](mailsift_domain::ClusterTopic) named after its
//! strongest centroid terms.
//!
//! Nothing in this crate talks to a language model.
//!
//! # Example
//!
//! ```
//! use mailsift_domain::Message;
//! use mailsift_topics::{TopicExtractor, TopicsConfig};
//!
//! let messages = vec![
//!     Message::subject_only("work meeting", "boss@example.com"),
//!     Message::subject_only("invoice payment due", "billing@example.com"),
//!     Message::subject_only("newsletter AI trends", "news@example.com"),
//! ];
//!
//! let extractor = TopicExtractor::new(TopicsConfig::default());
//! let topics = extractor.extract_topics_knn(&messages, 2);
//! assert_eq!(topics.len(), 2);
//! assert_eq!(topics.iter().map(|t| t.len()).sum::<usize>(), 3);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extraction;
pub mod kmeans;
pub mod stopwords;
pub mod tfidf;

pub use config::TopicsConfig;
pub use error::TopicsError;
pub use extraction::TopicExtractor;
pub use kmeans::{KMeans, KMeansFit};
pub use tfidf::{TfIdfMatrix, TfIdfVectorizer};
