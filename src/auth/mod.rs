//! Token acquisition
//!
//! Unifies static API keys and externally managed credentials behind one
//! interface, so the forwarding path stays ignorant of which strategy a
//! provider uses. Freshness is the token provider's own responsibility;
//! callers request a token once per inbound request and never cache it.

pub mod azure_cli;

pub use azure_cli::AzureCliCredential;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AuthStrategy;

/// Credential acquisition errors
///
/// These are a distinct failure kind: a provider configured for managed
/// credentials that cannot obtain one fails the request, it is never
/// silently downgraded to "no auth".
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to invoke credential tool: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("credential tool exited with status {status}: {stderr}")]
    ToolFailed { status: i32, stderr: String },

    #[error("could not parse credential tool output: {0}")]
    Malformed(String),
}

/// Source of externally managed bearer tokens
///
/// Implementations may block on I/O (subprocess, network) and may cache
/// tokens internally until expiry.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Obtain a bearer token for the given scope.
    async fn token(&self, scope: &str) -> Result<String, CredentialError>;
}

/// Per-provider token provider, one variant per auth strategy.
///
/// Adding a strategy means adding a variant here and a match arm in
/// [`TokenProvider::get_token`], the single dispatch point.
pub enum TokenProvider {
    /// No credential; the Authorization header is omitted.
    None,
    /// Static API key captured from the environment at config load.
    ApiKey(Option<String>),
    /// Token fetched per request from an external credential source.
    Managed {
        source: Arc<dyn CredentialSource>,
        scope: String,
    },
}

impl TokenProvider {
    /// Build a token provider from a resolved auth strategy.
    ///
    /// The credential source is shared across providers; only `Managed`
    /// variants hold on to it.
    pub fn from_strategy(strategy: AuthStrategy, source: Arc<dyn CredentialSource>) -> Self {
        match strategy {
            AuthStrategy::None => TokenProvider::None,
            AuthStrategy::ApiKey(value) => TokenProvider::ApiKey(value),
            AuthStrategy::AzureCli { scope } => TokenProvider::Managed { source, scope },
        }
    }

    /// Resolve the credential for one request.
    ///
    /// `Ok(None)` means "send no Authorization header". A managed source
    /// that cannot produce a token is an error, not an absent token.
    pub async fn get_token(&self) -> Result<Option<String>, CredentialError> {
        match self {
            TokenProvider::None => Ok(None),
            TokenProvider::ApiKey(value) => Ok(value.clone()),
            TokenProvider::Managed { source, scope } => Ok(Some(source.token(scope).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedToken(&'static str);

    #[async_trait]
    impl CredentialSource for FixedToken {
        async fn token(&self, scope: &str) -> Result<String, CredentialError> {
            assert_eq!(scope, "https://cognitiveservices.azure.com/.default");
            Ok(self.0.to_string())
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl CredentialSource for AlwaysFails {
        async fn token(&self, _scope: &str) -> Result<String, CredentialError> {
            Err(CredentialError::ToolFailed {
                status: 1,
                stderr: "Please run 'az login'".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn none_variant_yields_no_token() {
        let provider = TokenProvider::None;
        assert_eq!(provider.get_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn apikey_variant_yields_captured_value() {
        let provider = TokenProvider::ApiKey(Some("secret-token".to_string()));
        assert_eq!(
            provider.get_token().await.unwrap(),
            Some("secret-token".to_string())
        );

        let unset = TokenProvider::ApiKey(None);
        assert_eq!(unset.get_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn managed_variant_passes_scope_to_source() {
        let provider = TokenProvider::Managed {
            source: Arc::new(FixedToken("cli-token")),
            scope: "https://cognitiveservices.azure.com/.default".to_string(),
        };
        assert_eq!(
            provider.get_token().await.unwrap(),
            Some("cli-token".to_string())
        );
    }

    #[tokio::test]
    async fn managed_failure_propagates() {
        let provider = TokenProvider::Managed {
            source: Arc::new(AlwaysFails),
            scope: "scope".to_string(),
        };
        let err = provider.get_token().await.unwrap_err();
        assert!(matches!(err, CredentialError::ToolFailed { status: 1, .. }));
    }
}
