//! Client resolution
//!
//! Choosing a client is a pure function of configuration and of which
//! provider bindings are compiled in. Nothing here touches the network.

use crate::config::{LlmConfig, Provider};
use std::fmt;

/// Why resolution fell back to the stub client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubReason {
    /// Provider name is not one we support
    UnknownProvider(String),
    /// Provider binding was compiled out
    Unavailable(Provider),
    /// Provider is supported but no API key was configured
    MissingApiKey(Provider),
}

impl fmt::Display for StubReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StubReason::UnknownProvider(name) => {
                write!(f, "provider '{}' is not supported", name)
            }
            StubReason::Unavailable(provider) => {
                write!(f, "provider '{}' is not available in this build", provider)
            }
            StubReason::MissingApiKey(provider) => {
                write!(f, "{} not found in configuration", provider.api_key_env())
            }
        }
    }
}

/// Outcome of client resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientKind {
    /// Build the live client for this provider
    Live(Provider),
    /// Use the stub client
    Stub(StubReason),
}

/// Decide which client a configuration should get
///
/// `available` reports whether a provider's binding can be used; production
/// code passes [`Provider::is_available`].
pub fn resolve_client_kind(config: &LlmConfig, available: impl Fn(Provider) -> bool) -> ClientKind {
    let Some(provider) = config.parsed_provider() else {
        return ClientKind::Stub(StubReason::UnknownProvider(config.provider.clone()));
    };

    if !available(provider) {
        return ClientKind::Stub(StubReason::Unavailable(provider));
    }

    if config.usable_api_key().is_none() {
        return ClientKind::Stub(StubReason::MissingApiKey(provider));
    }

    ClientKind::Live(provider)
}
