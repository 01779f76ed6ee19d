//! Topic extraction by clustering message text

use mailsift_domain::text::title_case;
use mailsift_domain::{ClusterTopic, MailMessage};
use tracing::{debug, error, info, warn};

use crate::config::TopicsConfig;
use crate::kmeans::KMeans;
use crate::tfidf::TfIdfVectorizer;
use crate::TopicsError;

/// Terms used to name a topic
const NAME_TERMS: usize = 3;

/// Terms listed in a topic description
const DESCRIPTION_TERMS: usize = 5;

/// Name used when a cluster has no weighted terms
const UNTITLED: &str = "Untitled Topic";

/// Groups messages into topics without a language model
#[derive(Debug, Clone, Default)]
pub struct TopicExtractor {
    config: TopicsConfig,
}

impl TopicExtractor {
    /// Create an extractor with the given settings
    pub fn new(config: TopicsConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    pub fn config(&self) -> &TopicsConfig {
        &self.config
    }

    /// Cluster `messages` into at most `n_topics` topics
    ///
    /// A request for more topics than messages is reduced to the message
    /// count. Text that yields no vocabulary produces an empty list.
    pub fn extract_topics_knn<'a, M: MailMessage>(
        &self,
        messages: &'a [M],
        n_topics: usize,
    ) -> Vec<ClusterTopic<'a, M>> {
        match self.try_extract_topics_knn(messages, n_topics) {
            Ok(topics) => topics,
            Err(e) => {
                error!(error = %e, "Failed to vectorize message text");
                Vec::new()
            }
        }
    }

    /// Fallible form of [`extract_topics_knn`](Self::extract_topics_knn)
    pub fn try_extract_topics_knn<'a, M: MailMessage>(
        &self,
        messages: &'a [M],
        n_topics: usize,
    ) -> Result<Vec<ClusterTopic<'a, M>>, TopicsError> {
        if messages.is_empty() {
            warn!("No messages to extract topics from");
            return Ok(Vec::new());
        }

        let mut n_topics = n_topics;
        if n_topics > messages.len() || n_topics == 0 {
            let clamped = n_topics.clamp(1, messages.len());
            warn!(
                requested = n_topics,
                messages = messages.len(),
                using = clamped,
                "Adjusting topic count to the number of messages"
            );
            n_topics = clamped;
        }

        let texts: Vec<String> = messages
            .iter()
            .map(|m| format!("{} {}", m.subject(), m.body_text().unwrap_or_default()))
            .collect();

        let matrix = TfIdfVectorizer::new(self.config.max_features).fit_transform(&texts)?;
        debug!(
            documents = texts.len(),
            features = matrix.n_features(),
            "Vectorized message text"
        );

        let fit = KMeans::new(n_topics)
            .with_n_init(self.config.n_init)
            .with_max_iter(self.config.max_iter)
            .with_seed(self.config.seed)
            .fit(&matrix.rows);

        let mut topics = Vec::new();
        for (cluster, centroid) in fit.centroids.iter().enumerate() {
            let message_indices: Vec<usize> = fit
                .labels
                .iter()
                .enumerate()
                .filter(|(_, &label)| label == cluster)
                .map(|(i, _)| i)
                .collect();
            if message_indices.is_empty() {
                continue;
            }

            let top_terms = self.top_terms(centroid, &matrix.vocabulary);
            let name = if top_terms.is_empty() {
                UNTITLED.to_string()
            } else {
                title_case(&top_terms[..top_terms.len().min(NAME_TERMS)].join(" "))
            };
            let description = format!(
                "Topic derived from {} emails with key terms: {}",
                message_indices.len(),
                top_terms[..top_terms.len().min(DESCRIPTION_TERMS)].join(", ")
            );

            topics.push(ClusterTopic {
                name,
                description,
                messages: message_indices.iter().map(|&i| &messages[i]).collect(),
                message_indices,
                top_terms,
            });
        }

        info!(count = topics.len(), "Extracted topics using k-means clustering");
        Ok(topics)
    }

    /// Highest-weighted centroid terms, strongest first
    fn top_terms(&self, centroid: &[f64], vocabulary: &[String]) -> Vec<String> {
        let mut weighted: Vec<(usize, f64)> = centroid
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, w)| *w > 0.0)
            .collect();
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        weighted
            .into_iter()
            .take(self.config.top_terms)
            .map(|(i, _)| vocabulary[i].clone())
            .collect()
    }
}
