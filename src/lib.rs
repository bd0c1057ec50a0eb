//! Switchboard - local reverse proxy for chat-completion APIs
//!
//! This library provides the core functionality for the Switchboard proxy.
//! It resolves a named provider for each inbound request, injects the
//! provider's credential, pins the outbound `model` field, and relays the
//! upstream response.

pub mod auth;
pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

pub use crate::auth::{AzureCliCredential, CredentialSource, TokenProvider};
pub use crate::config::Settings;
pub use crate::proxy::Forwarder;

/// A configured upstream provider, resolved and ready to serve requests
pub struct Provider {
    pub endpoint: String,
    pub model: String,
    pub token_provider: TokenProvider,
}

/// Application state shared across all request handlers
pub struct AppState {
    pub providers: HashMap<String, Provider>,
    pub forwarder: Forwarder,
}

impl AppState {
    /// Create application state from loaded settings
    ///
    /// Managed-credential providers share a single Azure CLI credential
    /// source, so its token cache is process-wide.
    pub fn new(settings: Settings) -> Result<Self> {
        let source: Arc<dyn CredentialSource> = Arc::new(AzureCliCredential::new());
        Self::with_credential_source(settings, source)
    }

    /// Create application state with an injected credential source
    ///
    /// Used by tests to substitute the Azure CLI with a stub.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_testing(
        settings: Settings,
        source: Arc<dyn CredentialSource>,
    ) -> Result<Self> {
        Self::with_credential_source(settings, source)
    }

    fn with_credential_source(
        settings: Settings,
        source: Arc<dyn CredentialSource>,
    ) -> Result<Self> {
        let forwarder = Forwarder::new()?;
        let providers = settings
            .providers
            .into_iter()
            .map(|(name, cfg)| {
                let provider = Provider {
                    endpoint: cfg.endpoint,
                    model: cfg.model,
                    token_provider: TokenProvider::from_strategy(cfg.auth, source.clone()),
                };
                (name, provider)
            })
            .collect();

        Ok(Self {
            providers,
            forwarder,
        })
    }
}
