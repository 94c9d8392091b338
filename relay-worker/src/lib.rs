//! TickerBot Relay - Authenticated interactions webhook relay.
//!
//! This library backs the `tickerbot-relay` binary, a thin edge between the
//! interaction platform and the stock-monitoring backend:
//!
//! ## Architecture
//!
//! ```text
//! Interactions → Relay (verify, ack) → FIFO queue → Consumer (commands, alerts)
//! ```
//!
//! The relay verifies each callback's detached Ed25519 signature, answers
//! liveness pings inline, and forwards everything else to the FIFO queue with
//! a hand-rolled SigV4 signer - acknowledging the sender before the forward
//! completes.

pub mod config;
pub mod interaction;
pub mod queue;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use interaction::{Interaction, InteractionCallback};
pub use queue::{derive_keys, Forwarder};
pub use web::{router, AppState};
