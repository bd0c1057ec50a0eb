//! Request logging utilities for upstream forwarding
//!
//! Provides structured logging with correlation IDs for tracing a request
//! from inbound arrival through the upstream round trip.

use std::time::Instant;

use tracing::{debug, error, info};
use uuid::Uuid;

/// Context for tracking a request through the proxy
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Provider handling this request
    pub provider: String,
    /// Upstream endpoint being called
    pub endpoint: String,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(provider: &str, endpoint: &str) -> Self {
        Self {
            // Short ID for readability
            trace_id: Uuid::new_v4().to_string()[..8].to_string(),
            start_time: Instant::now(),
            provider: provider.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log request initiation
    pub fn log_request_start(&self) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            "Forwarding request"
        );
    }

    /// Log request being sent to upstream
    pub fn log_upstream_request(&self, body_size: usize) {
        debug!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            body_size = %body_size,
            "Sending request to upstream"
        );
    }

    /// Log response received from upstream
    pub fn log_upstream_response(&self, status: u16, body_size: usize) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            status = %status,
            body_size = %body_size,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    /// Log request failure
    pub fn log_error(&self, error: &str) {
        error!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_creation() {
        let ctx = RequestContext::new("azure", "https://example.com/chat/completions");

        assert_eq!(ctx.provider, "azure");
        assert_eq!(ctx.endpoint, "https://example.com/chat/completions");
        assert_eq!(ctx.trace_id.len(), 8);
    }

    #[test]
    fn test_elapsed_time() {
        let ctx = RequestContext::new("azure", "/test");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed_ms() >= 10);
    }
}
