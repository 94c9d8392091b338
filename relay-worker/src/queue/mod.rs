//! Queue module for the outbound FIFO relay.
//!
//! This module provides:
//! - Ordering/deduplication key derivation for the queue's per-group FIFO
//! - The hand-rolled request signer for the queue's HTTP API
//! - The forwarder that assembles, signs, and sends `SendMessage` calls
//!
//! ## Architecture
//!
//! ```text
//! Web Server → (sign + SendMessage) → interactions FIFO queue → consumer
//! ```

pub mod forwarder;
pub mod keys;
pub mod sigv4;

pub use forwarder::Forwarder;
pub use keys::derive_keys;
pub use sigv4::Credentials;
