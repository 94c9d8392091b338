//! Configuration module for environment variable parsing.
//!
//! All configuration comes from environment variables injected by the host.
//! Tunables fall back to defaults; the verification key, signer credentials,
//! and queue endpoint are hard requirements and fail startup when absent.

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Hex-encoded Ed25519 public key for interaction signature verification
    pub discord_public_key: String,

    /// Region bound into the outbound signing credential scope
    pub aws_region: String,

    /// Access key id for the queue signer
    pub aws_access_key_id: String,

    /// Secret access key for the queue signer
    pub aws_secret_access_key: String,

    /// Full URL of the FIFO queue endpoint
    pub queue_url: String,

    /// HTTP request timeout in milliseconds for the outbound forward
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            discord_public_key: require("DISCORD_PUBLIC_KEY")?,

            aws_region: env::var("AWS_REGION")
                .unwrap_or_else(|_| "ap-northeast-1".to_string()),

            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,

            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,

            queue_url: require("QUEUE_URL")?,

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        })
    }
}

/// Read a required environment variable.
fn require(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} is not set", name))
}
