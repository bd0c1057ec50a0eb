//! Azure CLI credential source
//!
//! Obtains short-lived bearer tokens by invoking `az account get-access-token`
//! and caches them per scope until shortly before expiry, so steady request
//! load does not spawn one subprocess per request.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

use super::{CredentialError, CredentialSource};

/// Tokens are refreshed this many seconds before their reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Shape of `az account get-access-token -o json` output.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    expires_on: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now()
    }
}

/// Credential source backed by the Azure CLI.
#[derive(Default)]
pub struct AzureCliCredential {
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialSource for AzureCliCredential {
    async fn token(&self, scope: &str) -> Result<String, CredentialError> {
        // The lock is held across the subprocess call so concurrent requests
        // for the same scope trigger a single refresh.
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(scope) {
            if cached.is_fresh() {
                return Ok(cached.token.clone());
            }
        }

        let output = Command::new("az")
            .args(["account", "get-access-token", "--scope", scope, "--output", "json"])
            .output()
            .await
            .map_err(CredentialError::Spawn)?;

        if !output.status.success() {
            return Err(CredentialError::ToolFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let parsed: CliToken = serde_json::from_slice(&output.stdout)
            .map_err(|e| CredentialError::Malformed(e.to_string()))?;
        let expires_at = parse_expires_on(&parsed.expires_on)?;

        debug!(scope = %scope, expires_at = %expires_at, "Acquired token from Azure CLI");
        cache.insert(
            scope.to_string(),
            CachedToken {
                token: parsed.access_token.clone(),
                expires_at,
            },
        );

        Ok(parsed.access_token)
    }
}

/// Parse the CLI's `expiresOn` field, a local-time timestamp like
/// `2026-08-06 14:03:22.000000`.
fn parse_expires_on(raw: &str) -> Result<DateTime<Utc>, CredentialError> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| CredentialError::Malformed(format!("bad expiresOn `{raw}`: {e}")))?;
    match Local.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            Ok(dt.with_timezone(&Utc))
        }
        chrono::LocalResult::None => Err(CredentialError::Malformed(format!(
            "bad expiresOn `{raw}`: nonexistent local time"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_expiry_format() {
        let parsed = parse_expires_on("2030-01-15 10:30:00.000000").unwrap();
        assert!(parsed > Utc::now());
    }

    #[test]
    fn rejects_garbage_expiry() {
        let err = parse_expires_on("not a timestamp").unwrap_err();
        assert!(matches!(err, CredentialError::Malformed(_)));
    }

    #[test]
    fn cached_token_freshness_honors_margin() {
        let fresh = CachedToken {
            token: "t".to_string(),
            expires_at: Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS + 30),
        };
        assert!(fresh.is_fresh());

        let nearly_expired = CachedToken {
            token: "t".to_string(),
            expires_at: Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS - 30),
        };
        assert!(!nearly_expired.is_fresh());
    }

    #[test]
    fn parses_cli_token_json() {
        let json = r#"{
            "accessToken": "cli-token",
            "expiresOn": "2030-01-15 10:30:00.000000",
            "subscription": "sub-id",
            "tenant": "tenant-id",
            "tokenType": "Bearer"
        }"#;
        let parsed: CliToken = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "cli-token");
        assert_eq!(parsed.expires_on, "2030-01-15 10:30:00.000000");
    }
}
