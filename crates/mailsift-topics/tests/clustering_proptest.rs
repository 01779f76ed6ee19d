use mailsift_domain::Message;
use mailsift_topics::{TopicExtractor, TopicsConfig};
use proptest::prelude::*;

const WORDS: &[&str] = &[
    "invoice", "payment", "meeting", "budget", "project", "release", "newsletter", "travel",
    "flight", "hotel", "security", "alert", "password", "football", "tickets", "dinner",
];

fn subject() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1..5).prop_map(|w| w.join(" "))
}

fn fast_extractor() -> TopicExtractor {
    TopicExtractor::new(TopicsConfig {
        n_init: 3,
        max_iter: 50,
        ..Default::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn topics_partition_the_input(
        subjects in prop::collection::vec(subject(), 1..12),
        n_topics in 1usize..6,
    ) {
        let messages: Vec<Message> = subjects
            .iter()
            .map(|s| Message::subject_only(s.as_str(), "sender@example.com"))
            .collect();

        let topics = fast_extractor().extract_topics_knn(&messages, n_topics);

        prop_assert!(topics.len() <= n_topics.min(messages.len()));

        let mut seen: Vec<usize> = topics
            .iter()
            .flat_map(|t| t.message_indices.iter().copied())
            .collect();
        seen.sort_unstable();
        let expected: Vec<usize> = (0..messages.len()).collect();
        prop_assert_eq!(seen, expected);

        for topic in &topics {
            prop_assert!(!topic.is_empty());
            prop_assert_eq!(topic.messages.len(), topic.message_indices.len());
            for (m, &i) in topic.messages.iter().zip(&topic.message_indices) {
                prop_assert!(std::ptr::eq(*m, &messages[i]));
            }
        }
    }

    #[test]
    fn oversized_request_matches_message_count(
        subjects in prop::collection::vec(subject(), 1..6),
        extra in 1usize..5,
    ) {
        let messages: Vec<Message> = subjects
            .iter()
            .map(|s| Message::subject_only(s.as_str(), "sender@example.com"))
            .collect();
        let extractor = fast_extractor();

        let clamped = extractor.extract_topics_knn(&messages, messages.len() + extra);
        let exact = extractor.extract_topics_knn(&messages, messages.len());

        let indices = |topics: &[mailsift_domain::ClusterTopic<'_, Message>]| {
            topics.iter().map(|t| t.message_indices.clone()).collect::<Vec<_>>()
        };
        prop_assert_eq!(indices(&clamped), indices(&exact));
    }
}
