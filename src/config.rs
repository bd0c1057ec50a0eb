//! Configuration management for Switchboard
//!
//! Provider definitions are loaded exactly once at startup from a YAML file;
//! the listen address comes from environment variables. The loaded settings
//! are immutable for the lifetime of the process.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Scope passed to the Azure CLI when an `azcli` auth entry omits one.
pub const DEFAULT_AZURE_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Configuration errors. All of these are fatal to startup: the process
/// must not serve traffic with partial or invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("provider `{provider}`: {reason}")]
    InvalidProvider { provider: String, reason: String },

    #[error("provider `{provider}`: required environment variable `{env_key}` is not set")]
    MissingEnv { provider: String, env_key: String },

    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("invalid SWITCHBOARD_PORT: {0}")]
    InvalidPort(String),
}

/// Authentication strategy for a provider, resolved at load time.
///
/// For `ApiKey` the environment variable is read once during
/// [`Settings::load_from`] and its value (or absence) captured here; later
/// changes to the environment are not observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// No credential; the Authorization header is omitted.
    None,
    /// Static API key captured from the environment at load time.
    ApiKey(Option<String>),
    /// Bearer token obtained per request from the Azure CLI.
    AzureCli { scope: String },
}

/// A single upstream provider entry.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Absolute URL of the upstream chat-completion API.
    pub endpoint: String,
    /// Model identifier the upstream expects; overrides the caller's choice.
    pub model: String,
    /// How to authenticate against the upstream.
    pub auth: AuthStrategy,
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Providers keyed by routing name
    pub providers: HashMap<String, ProviderConfig>,
}

impl Settings {
    /// Load settings from the well-known config path.
    ///
    /// The path is `~/.switchboard/config.yaml`, overridable with the
    /// `SWITCHBOARD_CONFIG` environment variable.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match env::var("SWITCHBOARD_CONFIG") {
            Ok(p) => PathBuf::from(p),
            Err(_) => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(".switchboard")
                .join("config.yaml"),
        };
        Self::load_from(&path)
    }

    /// Load settings from an explicit config file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: RawSettings =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut providers = HashMap::new();
        for (name, entry) in parsed.providers {
            let resolved = entry.resolve(&name)?;
            providers.insert(name, resolved);
        }

        Ok(Self {
            host: env::var("SWITCHBOARD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SWITCHBOARD_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidPort(env::var("SWITCHBOARD_PORT").unwrap_or_default())
                })?,
            providers,
        })
    }
}

/// On-disk settings shape.
#[derive(Debug, Deserialize)]
struct RawSettings {
    providers: HashMap<String, RawProvider>,
}

#[derive(Debug, Deserialize)]
struct RawProvider {
    endpoint: String,
    model: String,
    auth: RawAuth,
}

/// Auth entry as written in the config file, selected by the `type` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawAuth {
    None,
    ApiKey {
        #[serde(rename = "envKey")]
        env_key: String,
        /// When true, an unset environment variable fails config load
        /// instead of silently falling back to no auth.
        #[serde(default)]
        required: bool,
    },
    AzCli {
        #[serde(default)]
        scope: Option<String>,
    },
}

impl RawProvider {
    /// Validate the entry and capture environment-derived values.
    fn resolve(self, name: &str) -> Result<ProviderConfig, ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::InvalidProvider {
                provider: name.to_string(),
                reason: "endpoint must not be empty".to_string(),
            });
        }
        if let Err(e) = reqwest::Url::parse(&self.endpoint) {
            return Err(ConfigError::InvalidProvider {
                provider: name.to_string(),
                reason: format!("endpoint is not a valid URL: {e}"),
            });
        }
        if self.model.is_empty() {
            return Err(ConfigError::InvalidProvider {
                provider: name.to_string(),
                reason: "model must not be empty".to_string(),
            });
        }

        let auth = match self.auth {
            RawAuth::None => AuthStrategy::None,
            RawAuth::ApiKey { env_key, required } => match env::var(&env_key) {
                Ok(value) => AuthStrategy::ApiKey(Some(value)),
                Err(_) if required => {
                    return Err(ConfigError::MissingEnv {
                        provider: name.to_string(),
                        env_key,
                    })
                }
                Err(_) => AuthStrategy::ApiKey(None),
            },
            RawAuth::AzCli { scope } => AuthStrategy::AzureCli {
                scope: scope.unwrap_or_else(|| DEFAULT_AZURE_SCOPE.to_string()),
            },
        };

        Ok(ProviderConfig {
            endpoint: self.endpoint,
            model: self.model,
            auth,
        })
    }
}
