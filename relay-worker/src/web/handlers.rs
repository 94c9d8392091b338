//! Interaction endpoint handlers.
//!
//! The relay handler is designed to be extremely fast - it only:
//! 1. Verifies the detached signature
//! 2. Answers liveness pings inline
//! 3. Hands everything else to a background forward and returns immediately
//!
//! All command processing happens in the downstream queue consumer.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::interaction::{Interaction, InteractionCallback};
use crate::queue::Forwarder;
use crate::web::signature::verify_interaction;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: Config, forwarder: Forwarder) -> Self {
        Self {
            config: Arc::new(config),
            forwarder,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Interactions Webhook
// =============================================================================

/// Interactions endpoint.
///
/// This handler:
/// 1. Verifies the Ed25519 signature over the timestamp and raw body
/// 2. Responds to pings synchronously, before any network call
/// 3. Schedules the queue forward in the background and acknowledges with a
///    deferred callback - the sender only ever learns "accepted", never
///    whether the forward succeeded
pub async fn interactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    info!(body_length = body.len(), "interaction_received");

    if !verify_interaction(&headers, &body, &state.config.discord_public_key) {
        warn!("interaction_unauthorized");
        return (StatusCode::UNAUTHORIZED, "invalid request signature").into_response();
    }

    let interaction: Interaction = match serde_json::from_str(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "interaction_body_malformed");
            return (StatusCode::BAD_REQUEST, "malformed interaction payload").into_response();
        }
    };

    if interaction.is_ping() {
        info!("interaction_ping");
        return (StatusCode::OK, Json(InteractionCallback::pong())).into_response();
    }

    // Fire and forget: the spawned task outlives this handler, and its
    // failure must never reach the already-acknowledged sender.
    let forwarder = state.forwarder.clone();
    tokio::spawn(async move {
        if let Err(e) = forwarder.forward(&body).await {
            error!(error = %e, "interaction_forward_failed");
        }
    });

    (StatusCode::OK, Json(InteractionCallback::deferred())).into_response()
}
