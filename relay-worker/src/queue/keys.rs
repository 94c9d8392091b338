//! Ordering and deduplication key derivation.
//!
//! The FIFO queue serializes delivery per group key and suppresses duplicates
//! by content hash. The dedup token derived here carries a fresh timestamp on
//! every attempt, so it identifies a send for tracing rather than suppressing
//! retries; content-based deduplication on the queue is what catches true
//! duplicates.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::interaction::Interaction;

/// Derive the ordering group key and the deduplication token for a payload.
///
/// The group key pins all messages of one interaction (or, failing that, one
/// user) to the same delivery lane. Payloads that do not parse still get
/// forwarded under a time-scoped fallback group.
pub fn derive_keys(raw_body: &str) -> (String, String) {
    let now_ms = epoch_millis();

    let group_key = match serde_json::from_str::<Interaction>(raw_body) {
        Ok(interaction) => {
            if let Some(id) = interaction.id.as_deref() {
                format!("interaction-{}", id)
            } else if let Some(user_id) = interaction.user_id() {
                format!("user-{}-{}", user_id, now_ms)
            } else {
                format!("default-{}", now_ms)
            }
        }
        Err(_) => format!("fallback-{}", now_ms),
    };

    let dedup_key = format!("{}-{}", group_key, now_ms);

    (group_key, dedup_key)
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
