//! Provider chat-completions endpoint
//!
//! The single forwarding endpoint: resolves the provider named in the path,
//! acquires its credential, pins the `model` field, dispatches upstream, and
//! relays the upstream response verbatim.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::Response,
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    proxy::{logging::RequestContext, rewrite},
    AppState,
};

/// Headers stripped when relaying the upstream response
/// (hop-by-hop per RFC 2616 Section 13.5.1)
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Check if a header is hop-by-hop (must not be relayed)
fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// Handle a proxied chat completion request
///
/// Unknown providers are rejected before any upstream call. A body that is
/// not a JSON object is forwarded as received.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    body: Bytes,
) -> AppResult<Response> {
    let target = state
        .providers
        .get(&provider)
        .ok_or_else(|| AppError::UnknownProvider(provider.clone()))?;

    let ctx = RequestContext::new(&provider, &target.endpoint);
    ctx.log_request_start();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Some(token) = target.token_provider.get_token().await? {
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("Invalid bearer token"),
        );
    }

    let outbound = rewrite::override_model(&body, &target.model);
    debug!(trace_id = %ctx.trace_id, body = %rewrite::pretty(&outbound), "Outgoing body");
    ctx.log_upstream_request(outbound.len());

    let upstream = match state.forwarder.forward(&target.endpoint, outbound, headers).await {
        Ok(upstream) => upstream,
        Err(e) => {
            ctx.log_error(&e.to_string());
            return Err(e);
        }
    };

    ctx.log_upstream_response(upstream.status.as_u16(), upstream.body.len());
    debug!(trace_id = %ctx.trace_id, body = %rewrite::pretty(&upstream.body), "Upstream body");
    if let Some(usage) = rewrite::extract_usage(&upstream.body) {
        info!(trace_id = %ctx.trace_id, usage = %usage, "Usage reported by upstream");
    }

    let mut response = Response::builder().status(upstream.status);
    for (name, value) in &upstream.headers {
        if !is_hop_by_hop(name.as_str()) {
            response = response.header(name, value);
        }
    }
    response
        .body(Body::from(upstream.body))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}
