//! Scripted client for deterministic testing

use crate::LlmError;
use mailsift_domain::{Content, ModelClient, ModelResponse};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Scripted {
    Reply(Content),
    Fail(String),
}

#[derive(Debug, Default)]
struct MockState {
    by_prompt: HashMap<String, Scripted>,
    queue: VecDeque<Scripted>,
    prompts: Vec<String>,
}

/// Mock model client
///
/// Returns pre-configured responses without making any network calls. Lookup
/// order for each prompt: an exact-prompt response, then the next queued
/// response, then the default.
///
/// # Examples
///
/// ```
/// use mailsift_llm::MockClient;
/// use mailsift_domain::ModelClient;
///
/// let mock = MockClient::new("fallback");
/// mock.push_response("first");
/// assert_eq!(mock.invoke("a").unwrap().content.into_text(), "first");
/// assert_eq!(mock.invoke("b").unwrap().content.into_text(), "fallback");
/// assert_eq!(mock.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockClient {
    default_response: Content,
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    /// Create a mock with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_content(Content::Text(response.into()))
    }

    /// Create a mock whose default response has an arbitrary content shape
    pub fn with_content(content: Content) -> Self {
        Self {
            default_response: content,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        self.state()
            .by_prompt
            .insert(prompt.into(), Scripted::Reply(Content::Text(response.into())));
    }

    /// Configure a failure for a specific prompt
    pub fn add_error(&self, prompt: impl Into<String>) {
        self.state()
            .by_prompt
            .insert(prompt.into(), Scripted::Fail("mock failure".to_string()));
    }

    /// Queue a response for the next call that has no exact-prompt match
    pub fn push_response(&self, response: impl Into<String>) {
        self.state()
            .queue
            .push_back(Scripted::Reply(Content::Text(response.into())));
    }

    /// Queue a failure for the next call that has no exact-prompt match
    pub fn push_error(&self, message: impl Into<String>) {
        self.state().queue.push_back(Scripted::Fail(message.into()));
    }

    /// Number of times `invoke` was called
    pub fn call_count(&self) -> usize {
        self.state().prompts.len()
    }

    /// Every prompt received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        self.state().prompts.clear();
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ModelClient for MockClient {
    type Error = LlmError;

    fn invoke(&self, prompt: &str) -> Result<ModelResponse, Self::Error> {
        let mut state = self.state();
        state.prompts.push(prompt.to_string());

        let scripted = match state.by_prompt.get(prompt) {
            Some(scripted) => Some(scripted.clone()),
            None => state.queue.pop_front(),
        };

        match scripted {
            Some(Scripted::Reply(content)) => Ok(ModelResponse { content }),
            Some(Scripted::Fail(message)) => Err(LlmError::Communication(message)),
            None => Ok(ModelResponse {
                content: self.default_response.clone(),
            }),
        }
    }

    fn client_type(&self) -> &'static str {
        "MockClient"
    }
}
