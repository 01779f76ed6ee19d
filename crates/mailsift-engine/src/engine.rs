//! Core engine implementation

use mailsift_domain::{Classification, ClusterTopic, LlmTopic, MailMessage, ModelClient};
use mailsift_llm::{ClientInfo, ClientManager, LlmError};
use mailsift_prompts::{validate_template, PromptError, TemplateStore, ValidationReport, Variables};
use mailsift_topics::TopicExtractor;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::parser::{parse_classifications, parse_topics};

/// Template rendered by [`TopicEngine::extract_topics_llm`]
pub const TOPIC_EXTRACTION_TEMPLATE: &str = "topic_extraction";

/// Template rendered by [`TopicEngine::classify_messages`]
pub const CLASSIFICATION_TEMPLATE: &str = "email_classification";

/// Template rendered by [`TopicEngine::analyze_messages`]
pub const ANALYSIS_TEMPLATE: &str = "general_analysis";

/// Topic discovery and classification over a list of messages
///
/// Every structured operation follows the same path: render a template
/// with the messages, send it through the model client, parse the JSON
/// answer. The plain-named operations never fail; they log the problem and
/// return an empty result. The `try_` forms return the error instead.
pub struct TopicEngine {
    config: EngineConfig,
    prompts: TemplateStore,
    client: ClientManager,
    extractor: TopicExtractor,
}

impl TopicEngine {
    /// Create an engine, resolving the model client lazily from `config.llm`
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let client = ClientManager::new(config.llm.clone());
        Self::build(config, client)
    }

    /// Create an engine that sends every prompt to `client`
    pub fn with_client<C>(config: EngineConfig, client: C) -> Result<Self, EngineError>
    where
        C: ModelClient<Error = LlmError> + 'static,
    {
        let client = ClientManager::with_client(config.llm.clone(), client);
        Self::build(config, client)
    }

    fn build(config: EngineConfig, client: ClientManager) -> Result<Self, EngineError> {
        config.validate()?;

        let prompts = TemplateStore::new(config.prompts_dir());
        match prompts.load() {
            Ok(count) => info!(
                "Loaded {} prompt templates from {}",
                count,
                prompts.dir().display()
            ),
            // a missing directory leaves the engine usable for clustering
            Err(PromptError::Io(e)) => warn!(
                "Prompt directory {} could not be read: {}",
                prompts.dir().display(),
                e
            ),
            Err(e) => return Err(e.into()),
        }

        let extractor = TopicExtractor::new(config.topics.clone());

        Ok(Self {
            config,
            prompts,
            client,
            extractor,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Template store
    pub fn prompts(&self) -> &TemplateStore {
        &self.prompts
    }

    /// Render `template_name` with `messages` and the extra variables
    ///
    /// `messages` is exposed to the template as a list of
    /// `{subject, body_text, sender}` objects. Extra variables win over
    /// `messages` if they use the same name.
    pub fn create_document<M: MailMessage>(
        &self,
        messages: &[M],
        template_name: &str,
        vars: Variables,
    ) -> Result<String, EngineError> {
        let mut context = Variables::new();
        context.insert(
            "messages".to_string(),
            Value::Array(messages.iter().map(|m| m.to_context()).collect()),
        );
        context.extend(vars);

        let document = self.prompts.render(template_name, &context).map_err(|e| {
            error!(
                "Failed to create document with template '{}': {}",
                template_name, e
            );
            e
        })?;

        debug!(
            "Created document using template '{}' with {} messages",
            template_name,
            messages.len()
        );
        Ok(document)
    }

    /// Send a prompt to the model client and return its text
    pub fn send_request(&self, prompt: &str) -> Result<String, EngineError> {
        debug!("Prompt length: {} chars", prompt.len());
        let response = self.client.send(prompt)?;
        debug!("Model response length: {} chars", response.len());
        Ok(response)
    }

    /// Cluster messages into topics locally, without the model client
    pub fn extract_topics_knn<'a, M: MailMessage>(
        &self,
        messages: &'a [M],
        n_topics: usize,
    ) -> Vec<ClusterTopic<'a, M>> {
        self.extractor.extract_topics_knn(messages, n_topics)
    }

    /// Ask the model to propose topics for `messages`
    pub fn try_extract_topics_llm<M: MailMessage>(
        &self,
        messages: &[M],
    ) -> Result<Vec<LlmTopic>, EngineError> {
        let prompt = self.create_document(messages, TOPIC_EXTRACTION_TEMPLATE, Variables::new())?;
        let response = self.send_request(&prompt)?;
        let topics = parse_topics(&response)?;
        info!("Extracted {} topics using LLM analysis", topics.len());
        Ok(topics)
    }

    /// [`try_extract_topics_llm`](Self::try_extract_topics_llm), with any
    /// failure logged and reported as no topics
    pub fn extract_topics_llm<M: MailMessage>(&self, messages: &[M]) -> Vec<LlmTopic> {
        self.try_extract_topics_llm(messages).unwrap_or_else(|e| {
            error!("Failed to extract topics: {}", e);
            Vec::new()
        })
    }

    /// Ask the model to assign each message to a topic described in
    /// `topics_document`
    ///
    /// Indices in the result are positions in `messages`.
    pub fn try_classify_messages<M: MailMessage>(
        &self,
        messages: &[M],
        topics_document: &str,
    ) -> Result<Vec<Classification>, EngineError> {
        let mut vars = Variables::new();
        vars.insert(
            "topics_document".to_string(),
            Value::String(topics_document.to_string()),
        );

        let prompt = self.create_document(messages, CLASSIFICATION_TEMPLATE, vars)?;
        let response = self.send_request(&prompt)?;
        let classifications = parse_classifications(&response, messages.len())?;
        info!("Classified {} messages", classifications.len());
        Ok(classifications)
    }

    /// [`try_classify_messages`](Self::try_classify_messages), with any
    /// failure logged and reported as no classifications
    pub fn classify_messages<M: MailMessage>(
        &self,
        messages: &[M],
        topics_document: &str,
    ) -> Vec<Classification> {
        self.try_classify_messages(messages, topics_document)
            .unwrap_or_else(|e| {
                error!("Failed to classify messages: {}", e);
                Vec::new()
            })
    }

    /// Classify `messages` in contiguous chunks of `batch_size`
    ///
    /// Each chunk is one model call. Indices are shifted by the chunk's
    /// start so they refer to `messages`. A chunk that fails is logged and
    /// contributes nothing.
    pub fn batch_classify_messages<M: MailMessage>(
        &self,
        messages: &[M],
        topics_document: &str,
        batch_size: usize,
    ) -> Vec<Classification> {
        let batch_size = if batch_size == 0 {
            warn!("Batch size 0 is not usable, classifying one message per batch");
            1
        } else {
            batch_size
        };

        let mut all = Vec::new();
        for (batch, chunk) in messages.chunks(batch_size).enumerate() {
            let start = batch * batch_size;
            info!(
                "Processing batch {}: messages {}-{}",
                batch + 1,
                start + 1,
                start + chunk.len()
            );

            match self.try_classify_messages(chunk, topics_document) {
                Ok(results) => all.extend(results.into_iter().map(|c| c.offset_by(start))),
                Err(e) => error!("Failed to process batch {}: {}", batch + 1, e),
            }
        }
        all
    }

    /// [`batch_classify_messages`](Self::batch_classify_messages) with the
    /// configured batch size
    pub fn batch_classify_default<M: MailMessage>(
        &self,
        messages: &[M],
        topics_document: &str,
    ) -> Vec<Classification> {
        self.batch_classify_messages(
            messages,
            topics_document,
            self.config.classification.batch_size,
        )
    }

    /// Run a free-form analysis task over `messages`
    ///
    /// Returns the model's text, or a message starting with
    /// `"Analysis failed: "` when any step fails.
    pub fn analyze_messages<M: MailMessage>(
        &self,
        messages: &[M],
        task: &str,
        context: &str,
    ) -> String {
        let mut vars = Variables::new();
        vars.insert("task".to_string(), Value::String(task.to_string()));
        vars.insert("context".to_string(), Value::String(context.to_string()));

        let result = self
            .create_document(messages, ANALYSIS_TEMPLATE, vars)
            .and_then(|prompt| self.send_request(&prompt));

        match result {
            Ok(text) => {
                info!("Completed analysis task: {}", task);
                text
            }
            Err(e) => {
                error!("Failed to analyze messages: {}", e);
                format!("Analysis failed: {}", e)
            }
        }
    }

    /// Render a template with placeholder inputs and report the outcome
    pub fn validate_template(&self, name: &str) -> ValidationReport {
        validate_template(&self.prompts, name)
    }

    /// Registered template names, sorted
    pub fn available_templates(&self) -> Vec<String> {
        self.prompts.names()
    }

    /// Configured provider and the client it resolved to
    pub fn client_info(&self) -> ClientInfo {
        self.client.info()
    }

    /// Drop all templates and load the template directory again
    pub fn reload_prompts(&self) -> Result<usize, EngineError> {
        let count = self.prompts.reload()?;
        info!("Reloaded {} prompt templates", count);
        Ok(count)
    }
}

impl std::fmt::Debug for TopicEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicEngine")
            .field("config", &self.config)
            .field("prompts", &self.prompts)
            .finish_non_exhaustive()
    }
}
