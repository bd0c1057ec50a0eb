//! Common test utilities for Switchboard
//!
//! Shared fixtures for the integration suite: provider/settings builders,
//! credential source stubs, and a TestServer wrapper around the real router.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use switchboard::auth::{CredentialError, CredentialSource};
use switchboard::config::{AuthStrategy, ProviderConfig, Settings, DEFAULT_AZURE_SCOPE};
use switchboard::{routes, AppState};

/// Credential source stub that returns a fixed token after checking the scope
pub struct StaticCredential {
    pub token: String,
    pub expected_scope: String,
}

impl StaticCredential {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            expected_scope: DEFAULT_AZURE_SCOPE.to_string(),
        }
    }
}

#[async_trait]
impl CredentialSource for StaticCredential {
    async fn token(&self, scope: &str) -> Result<String, CredentialError> {
        assert_eq!(scope, self.expected_scope);
        Ok(self.token.clone())
    }
}

/// Credential source stub that always fails
pub struct FailingCredential;

#[async_trait]
impl CredentialSource for FailingCredential {
    async fn token(&self, _scope: &str) -> Result<String, CredentialError> {
        Err(CredentialError::ToolFailed {
            status: 1,
            stderr: "Please run 'az login' to setup account.".to_string(),
        })
    }
}

/// Build a provider entry pointing at a mock upstream
pub fn provider(endpoint: &str, model: &str, auth: AuthStrategy) -> ProviderConfig {
    ProviderConfig {
        endpoint: endpoint.to_string(),
        model: model.to_string(),
        auth,
    }
}

/// Build settings with a single named provider
pub fn settings_with_provider(name: &str, config: ProviderConfig) -> Settings {
    let mut providers = HashMap::new();
    providers.insert(name.to_string(), config);
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        providers,
    }
}

/// Spin up a TestServer around the real router with an injected credential source
pub fn test_server(settings: Settings, source: Arc<dyn CredentialSource>) -> TestServer {
    let state = Arc::new(
        AppState::new_for_testing(settings, source).expect("Failed to build test app state"),
    );
    TestServer::new(routes::create_router(state)).expect("Failed to create test server")
}

/// Mount a chat-completions mock returning 200 `{"ok": true}`
pub async fn mock_ok_upstream(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
        )
        .mount(server)
        .await;
}

/// Endpoint URL for a mock server's chat-completions route
pub fn chat_endpoint(server: &MockServer) -> String {
    format!("{}/chat/completions", server.uri())
}
