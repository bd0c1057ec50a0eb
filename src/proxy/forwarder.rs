//! Upstream request dispatch
//!
//! The forwarder owns the long-lived outbound HTTP client and its connection
//! pool. It performs no body interpretation: the upstream's status, headers,
//! and raw body are captured as-is, and a non-2xx upstream status is a
//! successful forward, not an error.

use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::AppResult;

/// Captured upstream response, relayed verbatim by the endpoint handler.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Forwards requests to upstream providers over a pooled client.
///
/// One instance is created at startup and shared by all in-flight requests;
/// the reqwest pool handles its own synchronization.
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    /// Create a forwarder with a pooled outbound client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self { client })
    }

    /// POST `body` to `endpoint` with the given headers and capture the
    /// upstream response.
    ///
    /// Transport-level failures (DNS, refused connection, timeout) surface
    /// as errors; HTTP error statuses from the upstream do not.
    pub async fn forward(
        &self,
        endpoint: &str,
        body: Bytes,
        headers: HeaderMap,
    ) -> AppResult<UpstreamResponse> {
        debug!(endpoint = %endpoint, body_len = body.len(), "Dispatching upstream request");

        let response = self
            .client
            .post(endpoint)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!(endpoint = %endpoint, status = %status, body_len = body.len(), "Captured upstream response");

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }

    /// Release the pooled connections.
    ///
    /// Consumes the forwarder; call once at shutdown after the server has
    /// drained.
    pub fn close(self) {
        drop(self.client);
    }
}
