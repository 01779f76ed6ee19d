//! Memoized client resolution

use crate::config::{LlmConfig, Provider};
use crate::resolve::{resolve_client_kind, ClientKind};
use crate::stub::StubClient;
use crate::LlmError;
use mailsift_domain::ModelClient;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn};

/// Object-safe model client handle used by the manager
pub type DynClient = dyn ModelClient<Error = LlmError>;

/// Diagnostic description of the resolved client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    /// Configured provider name
    pub provider: String,
    /// Configured model name
    pub model: String,
    /// Concrete client type
    pub client_type: String,
    /// Whether the stub client is in use
    pub is_stub: bool,
}

/// Owns the model configuration and the lazily resolved client
///
/// The client is resolved on first use and cached for the lifetime of the
/// manager. After that it is only read, so one manager can serve several
/// threads.
pub struct ClientManager {
    config: LlmConfig,
    client: OnceLock<Arc<DynClient>>,
}

impl ClientManager {
    /// Create a manager that resolves its client from `config` on first use
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    /// Create a manager with an already constructed client
    pub fn with_client<C>(config: LlmConfig, client: C) -> Self
    where
        C: ModelClient<Error = LlmError> + 'static,
    {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::new(client) as Arc<DynClient>);
        Self {
            config,
            client: cell,
        }
    }

    /// Model configuration
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// The resolved client, resolving it if this is the first use
    pub fn client(&self) -> Arc<DynClient> {
        Arc::clone(self.client.get_or_init(|| self.create_client()))
    }

    /// Whether the resolved client is the stub
    pub fn is_stub(&self) -> bool {
        self.client().client_type() == StubClient.client_type()
    }

    /// Send a prompt and normalize the response content to one string
    ///
    /// No retries are performed here.
    pub fn send(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.client().invoke(prompt).map_err(|e| {
            error!("Failed to send LLM request: {}", e);
            e
        })?;
        Ok(response.content.into_text())
    }

    /// Describe the configured provider and the resolved client
    pub fn info(&self) -> ClientInfo {
        let client = self.client();
        ClientInfo {
            provider: self.config.provider.to_ascii_lowercase(),
            model: self.config.model.clone(),
            client_type: client.client_type().to_string(),
            is_stub: client.client_type() == StubClient.client_type(),
        }
    }

    fn create_client(&self) -> Arc<DynClient> {
        info!(
            "Creating LLM client: provider={}, model={}",
            self.config.provider, self.config.model
        );

        match resolve_client_kind(&self.config, |p| p.is_available()) {
            ClientKind::Live(provider) => match build_live(provider, &self.config) {
                Ok(client) => client,
                Err(e) => {
                    warn!("Failed to create {} client: {}", provider, e);
                    stub_client()
                }
            },
            ClientKind::Stub(reason) => {
                warn!("Using stub LLM client: {}", reason);
                stub_client()
            }
        }
    }
}

fn stub_client() -> Arc<DynClient> {
    Arc::new(StubClient)
}

#[cfg_attr(
    not(any(feature = "openai", feature = "anthropic", feature = "google")),
    allow(unused_variables)
)]
fn build_live(provider: Provider, config: &LlmConfig) -> Result<Arc<DynClient>, LlmError> {
    match provider {
        #[cfg(feature = "openai")]
        Provider::OpenAi => {
            let client: Arc<DynClient> = Arc::new(crate::OpenAiClient::from_config(config)?);
            Ok(client)
        }
        #[cfg(feature = "anthropic")]
        Provider::Anthropic => {
            let client: Arc<DynClient> = Arc::new(crate::AnthropicClient::from_config(config)?);
            Ok(client)
        }
        #[cfg(feature = "google")]
        Provider::Google => {
            let client: Arc<DynClient> = Arc::new(crate::GoogleClient::from_config(config)?);
            Ok(client)
        }
        #[allow(unreachable_patterns)]
        other => Err(LlmError::NotConfigured(format!(
            "provider '{}' is not available in this build",
            other
        ))),
    }
}
