//! End-to-end tests for the engine

#[cfg(test)]
mod tests {
    use crate::{EngineConfig, EngineError, TopicEngine, Variables};
    use mailsift_domain::{Classification, Message};
    use mailsift_llm::{LlmConfig, LlmError, MockClient, STUB_RESPONSE};
    use mailsift_prompts::PromptError;
    use serde_json::json;
    use std::fs;

    fn messages(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                Message::new(
                    format!("Subject {}", i),
                    format!("Body of message {}", i),
                    format!("sender{}@example.com", i),
                )
            })
            .collect()
    }

    fn engine_with(mock: &MockClient) -> TopicEngine {
        TopicEngine::with_client(EngineConfig::default(), mock.clone()).unwrap()
    }

    #[test]
    fn test_full_classification_flow() {
        let mock = MockClient::new(
            r#"{"classifications":[{"email_index":0,"topic":"Work","confidence":0.9}]}"#,
        );
        let engine = engine_with(&mock);

        let msgs = vec![Message::subject_only("work meeting", "boss@example.com")];
        let results = engine.classify_messages(&msgs, "Work: job related mail");

        assert_eq!(results, vec![Classification::new(0, "Work", 0.9)]);
        assert_eq!(mock.call_count(), 1);

        let prompt = &mock.prompts()[0];
        assert!(prompt.contains("Work: job related mail"));
        assert!(prompt.contains("work meeting"));
        assert!(prompt.contains("boss@example.com"));
        assert!(!prompt.contains("{{") && !prompt.contains("{%"));
    }

    #[test]
    fn test_missing_credentials_fall_back_to_stub() {
        let config = EngineConfig {
            llm: LlmConfig::new("openai", "gpt-3.5-turbo"),
            ..Default::default()
        };
        let engine = TopicEngine::new(config).unwrap();

        assert_eq!(engine.send_request("hello").unwrap(), STUB_RESPONSE);
        let info = engine.client_info();
        assert!(info.is_stub);
        assert_eq!(info.provider, "openai");
        assert_eq!(info.client_type, "StubClient");
    }

    #[test]
    fn test_stub_output_degrades_to_empty() {
        let engine = TopicEngine::new(EngineConfig::default()).unwrap();
        let msgs = messages(2);
        assert!(engine.extract_topics_llm(&msgs).is_empty());
        assert!(engine.classify_messages(&msgs, "Work").is_empty());
    }

    #[test]
    fn test_malformed_json_classifies_nothing() {
        let mock = MockClient::new("Sure! Here are the classifications: Work, Work, Billing");
        let engine = engine_with(&mock);
        let msgs = messages(3);

        assert!(engine.classify_messages(&msgs, "Work").is_empty());
        assert!(matches!(
            engine.try_classify_messages(&msgs, "Work"),
            Err(EngineError::ResponseParse(_))
        ));
    }

    #[test]
    fn test_model_error_classifies_nothing() {
        let mock = MockClient::default();
        mock.push_error("connection reset");
        let engine = engine_with(&mock);
        let msgs = messages(1);

        assert!(engine.classify_messages(&msgs, "Work").is_empty());
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_batch_remaps_indices() {
        let mock = MockClient::default();
        mock.push_response(
            r#"{"classifications":[{"email_index":0,"topic":"A","confidence":0.9},{"email_index":1,"topic":"B","confidence":0.8}]}"#,
        );
        mock.push_response(
            r#"{"classifications":[{"email_index":1,"topic":"C","confidence":0.7},{"email_index":0,"topic":"D","confidence":0.6}]}"#,
        );
        mock.push_response(r#"{"classifications":[{"email_index":0,"topic":"E","confidence":0.5}]}"#);
        let engine = engine_with(&mock);

        let results = engine.batch_classify_messages(&messages(5), "topics", 2);

        let indices: Vec<usize> = results.iter().map(|c| c.email_index).collect();
        assert_eq!(indices, vec![0, 1, 3, 2, 4]);
        assert_eq!(results[2].topic, "C");
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn test_batch_skips_failed_chunk() {
        let mock = MockClient::default();
        mock.push_response(r#"{"classifications":[{"email_index":0,"topic":"A","confidence":0.9}]}"#);
        mock.push_error("timeout");
        mock.push_response(r#"{"classifications":[{"email_index":1,"topic":"C","confidence":0.9}]}"#);
        let engine = engine_with(&mock);

        let results = engine.batch_classify_messages(&messages(6), "topics", 2);

        let indices: Vec<usize> = results.iter().map(|c| c.email_index).collect();
        assert_eq!(indices, vec![0, 5]);
    }

    #[test]
    fn test_batch_chunk_only_sees_its_messages() {
        let mock = MockClient::new(r#"{"classifications": []}"#);
        let engine = engine_with(&mock);

        engine.batch_classify_messages(&messages(3), "topics", 2);

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Subject 1") && !prompts[0].contains("Subject 2"));
        assert!(prompts[1].contains("Subject 2") && !prompts[1].contains("Subject 0"));
    }

    #[test]
    fn test_batch_entries_past_chunk_dropped() {
        let mock = MockClient::new(
            r#"{"classifications":[{"email_index":2,"topic":"A","confidence":0.9}]}"#,
        );
        let engine = engine_with(&mock);
        assert!(engine.batch_classify_messages(&messages(4), "t", 2).is_empty());
    }

    #[test]
    fn test_batch_empty_input_makes_no_calls() {
        let mock = MockClient::default();
        let engine = engine_with(&mock);
        let none: Vec<Message> = Vec::new();
        assert!(engine.batch_classify_messages(&none, "t", 10).is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_extract_topics_llm() {
        let mock = MockClient::new(
            "```json\n{\"topics\": [{\"name\": \"Billing\", \"description\": \"Invoices\"}, {\"name\": \"Travel\"}]}\n```",
        );
        let engine = engine_with(&mock);

        let topics = engine.extract_topics_llm(&messages(4));
        let names: Vec<&str> = topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Billing", "Travel"]);
    }

    #[test]
    fn test_model_error_extracts_no_topics() {
        let mock = MockClient::default();
        mock.push_error("connection reset");
        mock.push_error("connection reset");
        let engine = engine_with(&mock);
        let msgs = messages(2);

        assert!(engine.extract_topics_llm(&msgs).is_empty());
        assert!(matches!(
            engine.try_extract_topics_llm(&msgs),
            Err(EngineError::ModelRequest(LlmError::Communication(_)))
        ));
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_analyze_messages_returns_text() {
        let mock = MockClient::new("Two of the emails need a reply today.");
        let engine = engine_with(&mock);

        let answer = engine.analyze_messages(&messages(2), "Find urgent emails", "");
        assert_eq!(answer, "Two of the emails need a reply today.");

        let prompt = &mock.prompts()[0];
        assert!(prompt.contains("Task: Find urgent emails"));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn test_analyze_messages_failure_is_descriptive() {
        let mock = MockClient::default();
        mock.push_error("quota exceeded");
        let engine = engine_with(&mock);

        let answer = engine.analyze_messages(&messages(1), "Summarize", "weekly review");
        assert!(answer.starts_with("Analysis failed: "));
        assert!(answer.contains("quota exceeded"));
    }

    #[test]
    fn test_create_document_unknown_template() {
        let engine = engine_with(&MockClient::default());
        let err = engine
            .create_document(&messages(1), "does_not_exist", Variables::new())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Template(PromptError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_create_document_missing_variable() {
        let engine = engine_with(&MockClient::default());
        let err = engine
            .create_document(&messages(1), "email_classification", Variables::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::Template(PromptError::Render { .. })));
    }

    #[test]
    fn test_create_document_extra_vars() {
        let engine = engine_with(&MockClient::default());
        let mut vars = Variables::new();
        vars.insert("task".into(), json!("Count senders"));
        vars.insert("context".into(), json!("Only work mail"));

        let doc = engine
            .create_document(&messages(2), "general_analysis", vars)
            .unwrap();
        assert!(doc.contains("Count senders"));
        assert!(doc.contains("Context: Only work mail"));
        assert!(doc.contains("Email 2 of 2"));
        assert!(doc.contains("Body of message 1"));
    }

    #[test]
    fn test_bundled_templates_validate() {
        let engine = engine_with(&MockClient::default());
        assert_eq!(
            engine.available_templates(),
            vec!["email_classification", "general_analysis", "topic_extraction"]
        );
        for name in engine.available_templates() {
            let report = engine.validate_template(&name);
            assert!(report.valid, "{} failed: {:?}", name, report.error);
            assert!(report.input_variables.unwrap().contains(&"messages".to_string()));
        }
    }

    #[test]
    fn test_validate_unknown_template() {
        let engine = engine_with(&MockClient::default());
        let report = engine.validate_template("nope");
        assert!(!report.valid);
        assert_eq!(report.available.unwrap().len(), 3);
    }

    #[test]
    fn test_client_info_reports_injected_client() {
        let engine = engine_with(&MockClient::default());
        let info = engine.client_info();
        assert_eq!(info.client_type, "MockClient");
        assert!(!info.is_stub);
        assert_eq!(info.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_reload_prompts_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("general_analysis.txt"), "Old: {{ task }}").unwrap();

        let config = EngineConfig {
            prompts_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mock = MockClient::new("ok");
        let engine = TopicEngine::with_client(config, mock.clone()).unwrap();

        engine.analyze_messages(&messages(1), "first", "");
        fs::write(dir.path().join("general_analysis.txt"), "New: {{ task }}").unwrap();
        fs::write(dir.path().join("extra.txt"), "{{ x }}").unwrap();
        assert_eq!(engine.reload_prompts().unwrap(), 2);
        engine.analyze_messages(&messages(1), "second", "");

        assert_eq!(mock.prompts(), vec!["Old: first", "New: second"]);
    }

    #[test]
    fn test_missing_prompt_dir_still_clusters() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            prompts_dir: Some(dir.path().join("missing")),
            ..Default::default()
        };
        let engine = TopicEngine::with_client(config, MockClient::default()).unwrap();

        assert!(engine.available_templates().is_empty());
        assert!(engine.classify_messages(&messages(2), "t").is_empty());

        let msgs = vec![
            Message::subject_only("work meeting", "a@example.com"),
            Message::subject_only("invoice payment due", "b@example.com"),
            Message::subject_only("newsletter AI trends", "c@example.com"),
        ];
        let topics = engine.extract_topics_knn(&msgs, 2);
        assert_eq!(topics.len(), 2);
        assert_eq!(topics.iter().map(|t| t.len()).sum::<usize>(), 3);
        assert!(topics.iter().all(|t| !t.top_terms.is_empty()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.llm.timeout_secs = 0;
        assert!(matches!(
            TopicEngine::new(config),
            Err(EngineError::Config(_))
        ));
    }
}
