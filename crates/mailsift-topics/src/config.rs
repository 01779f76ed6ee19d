//! Configuration for topic extraction

use serde::{Deserialize, Serialize};

use crate::TopicsError;

/// Settings for TF-IDF vectorization and k-means clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicsConfig {
    /// Topics requested when the caller does not say
    pub n_topics: usize,

    /// Vocabulary bound: keep the most frequent terms across the corpus
    pub max_features: usize,

    /// Independent k-means restarts; the lowest-inertia run wins
    pub n_init: usize,

    /// Lloyd iterations per restart
    pub max_iter: usize,

    /// RNG seed for centroid initialization
    pub seed: u64,

    /// Centroid terms kept per topic
    pub top_terms: usize,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            n_topics: 5,
            max_features: 1000,
            n_init: 10,
            max_iter: 300,
            seed: 42,
            top_terms: 10,
        }
    }
}

impl TopicsConfig {
    /// Check that every count is usable
    pub fn validate(&self) -> Result<(), TopicsError> {
        let positive = [
            ("max_features", self.max_features),
            ("n_init", self.n_init),
            ("max_iter", self.max_iter),
            ("top_terms", self.top_terms),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(TopicsError::InvalidConfig(format!(
                    "{} must be greater than 0",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TopicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.n_topics, 5);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_zero_restarts_rejected() {
        let config = TopicsConfig {
            n_init: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            TopicsError::InvalidConfig("n_init must be greater than 0".into())
        );
    }

    #[test]
    fn test_partial_deserialize() {
        let config: TopicsConfig = serde_json::from_str(r#"{"n_topics": 3}"#).unwrap();
        assert_eq!(config.n_topics, 3);
        assert_eq!(config.max_features, 1000);
    }
}
