//! Discord interaction payload types.
//!
//! The relay only needs a thin view of the interaction: the type discriminant
//! (to answer pings inline), the interaction id, and the invoking user id
//! (both feed the queue ordering keys). Everything else rides through as the
//! untouched raw body.

use serde::{Deserialize, Serialize};

/// Interaction type sent by the platform as a liveness probe.
pub const INTERACTION_PING: u64 = 1;

/// Callback type acknowledging a ping.
pub const CALLBACK_PONG: u64 = 1;

/// Callback type deferring the visible response to the queue consumer.
pub const CALLBACK_DEFERRED: u64 = 5;

/// Inbound interaction payload.
///
/// All fields default so that minimal payloads still parse; the relay never
/// requires more structure than it reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    /// Event identifier, present on real interactions.
    #[serde(default)]
    pub id: Option<String>,

    /// Type discriminant (1 = ping).
    #[serde(rename = "type", default)]
    pub kind: u64,

    /// Guild-context invoker (`member.user`).
    #[serde(default)]
    pub member: Option<Member>,

    /// DM-context invoker.
    #[serde(default)]
    pub user: Option<User>,
}

impl Interaction {
    /// Whether this payload is the platform's liveness probe.
    pub fn is_ping(&self) -> bool {
        self.kind == INTERACTION_PING
    }

    /// Invoking user id: `member.user.id` in guilds, `user.id` in DMs.
    pub fn user_id(&self) -> Option<&str> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .and_then(|u| u.id.as_deref())
    }
}

/// Guild member wrapper around the invoking user.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
}

/// Platform user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
}

/// Synchronous interaction callback body.
#[derive(Debug, Serialize)]
pub struct InteractionCallback {
    #[serde(rename = "type")]
    pub kind: u64,
}

impl InteractionCallback {
    /// Ping acknowledgment (`{"type": 1}`).
    pub fn pong() -> Self {
        Self {
            kind: CALLBACK_PONG,
        }
    }

    /// Deferred acknowledgment (`{"type": 5}`).
    pub fn deferred() -> Self {
        Self {
            kind: CALLBACK_DEFERRED,
        }
    }
}
