//! Web server module for the interactions relay.
//!
//! This module provides a thin, fast endpoint that:
//! - Receives interaction callbacks on `POST /interactions`
//! - Verifies the detached Ed25519 signature
//! - Answers liveness pings inline
//! - Immediately acknowledges everything else and forwards it to the FIFO
//!   queue in the background
//!
//! All command processing happens in the downstream queue consumer.

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, interactions, AppState, HealthResponse};
pub use signature::verify_interaction;

/// Build the application router.
///
/// Method routing yields `405` for a non-POST on `/interactions`; unknown
/// paths fall through to `404`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/interactions", post(interactions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
