//! HTTP routes for Switchboard
//!
//! This module defines all HTTP endpoints exposed by the proxy.

pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/provider/:provider/chat/completions",
            post(chat::chat_completions),
        )
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
