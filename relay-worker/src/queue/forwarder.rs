//! Forwarder for relaying raw interaction payloads to the FIFO queue.
//!
//! Speaks the queue service's query API directly over HTTPS: a form-encoded
//! `SendMessage` call, authenticated per request with the hand-rolled signer.
//! No managed SDK, no connection state beyond the shared HTTP client.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use reqwest::Client;
use tracing::info;
use url::Url;

use super::keys::derive_keys;
use super::sigv4::{self, Credentials};
use crate::config::Config;

/// Queue API action and version for sending a message.
const ACTION: &str = "SendMessage";
const API_VERSION: &str = "2012-11-05";

/// Service name bound into the signing credential scope.
const SERVICE: &str = "sqs";

/// Value of the `source` message attribute attached to every forward.
const SOURCE_ATTRIBUTE: &str = "discord-interactions";

/// Clonable queue forwarder sharing one HTTP client.
///
/// Holds no mutable state; every forward derives its keys and signature
/// fresh, so clones may be handed to detached tasks freely.
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    queue_url: Url,
    host: String,
    credentials: Credentials,
}

impl Forwarder {
    /// Create a forwarder from the application configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let queue_url =
            Url::parse(&config.queue_url).context("QUEUE_URL is not a valid URL")?;
        let host = queue_url
            .host_str()
            .ok_or_else(|| anyhow!("QUEUE_URL has no host"))?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            queue_url,
            host,
            credentials: Credentials {
                access_key_id: config.aws_access_key_id.clone(),
                secret_access_key: config.aws_secret_access_key.clone(),
                region: config.aws_region.clone(),
            },
        })
    }

    /// Forward one raw payload to the queue.
    ///
    /// Fails on network errors and on any non-2xx status from the queue
    /// endpoint. The caller decides what a failure means; this method never
    /// retries.
    pub async fn forward(&self, raw_body: &str) -> Result<()> {
        let (group_key, dedup_key) = derive_keys(raw_body);
        let body = send_message_form(raw_body, &group_key, &dedup_key);

        let mut headers = vec![
            ("host".to_string(), self.host.clone()),
            (
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ),
        ];
        sigv4::sign_request(
            "POST",
            &self.queue_url,
            &mut headers,
            body.as_bytes(),
            &self.credentials,
            SERVICE,
        )?;

        let mut request = self.client.post(self.queue_url.clone());
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .body(body)
            .send()
            .await
            .context("Queue request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("Queue endpoint returned {}: {}", status, detail));
        }

        info!(
            group_key = %group_key,
            dedup_key = %dedup_key,
            body_length = raw_body.len(),
            "interaction_forwarded"
        );

        Ok(())
    }
}

/// Assemble the form-encoded `SendMessage` body.
fn send_message_form(raw_body: &str, group_key: &str, dedup_key: &str) -> String {
    let timestamp = Utc::now().to_rfc3339();

    let fields = [
        ("Action", ACTION),
        ("Version", API_VERSION),
        ("MessageBody", raw_body),
        ("MessageGroupId", group_key),
        ("MessageDeduplicationId", dedup_key),
        ("MessageAttribute.1.Name", "source"),
        ("MessageAttribute.1.Value.StringValue", SOURCE_ATTRIBUTE),
        ("MessageAttribute.1.Value.DataType", "String"),
        ("MessageAttribute.2.Name", "timestamp"),
        ("MessageAttribute.2.Value.StringValue", timestamp.as_str()),
        ("MessageAttribute.2.Value.DataType", "String"),
    ];

    fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
