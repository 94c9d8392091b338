//! Interaction signature verification.
//!
//! The platform signs every callback with a detached Ed25519 signature over
//! the concatenation of a timestamp header and the exact raw request body.
//! Reference: https://discord.com/developers/docs/interactions/overview#setting-up-an-endpoint-validating-security-request-headers

use axum::http::HeaderMap;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;
use tracing::warn;

/// Header carrying the hex-encoded detached signature.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";

/// Header carrying the timestamp the signature binds to.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Why a request failed verification. Never escapes this module as an error;
/// the public entry point logs it and fails closed.
#[derive(Debug, Error)]
enum VerifyError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("missing timestamp header")]
    MissingTimestamp,

    #[error("signature is not valid hex")]
    MalformedSignature,

    #[error("signature is not 64 bytes")]
    BadSignatureLength,

    #[error("public key is not valid hex")]
    MalformedPublicKey,

    #[error("public key is not a valid 32-byte Ed25519 key")]
    BadPublicKey,

    #[error("signature does not match")]
    Mismatch,
}

/// Verify the detached signature on an inbound interaction request.
///
/// The signed message is the timestamp header value followed by the exact raw
/// request body. Verification must run over the received bytes, never over a
/// re-serialization of the parsed payload.
///
/// Returns `true` only when the signature is cryptographically valid; every
/// failure mode (missing headers, malformed hex, wrong lengths, mismatch) is
/// logged and collapses to `false`. This function never panics.
pub fn verify_interaction(headers: &HeaderMap, raw_body: &str, public_key_hex: &str) -> bool {
    match check(headers, raw_body, public_key_hex) {
        Ok(()) => true,
        Err(reason) => {
            warn!(reason = %reason, "interaction_signature_rejected");
            false
        }
    }
}

fn check(headers: &HeaderMap, raw_body: &str, public_key_hex: &str) -> Result<(), VerifyError> {
    let signature_hex = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(VerifyError::MissingSignature)?;

    let timestamp = headers
        .get(TIMESTAMP_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(VerifyError::MissingTimestamp)?;

    let signature_bytes =
        hex::decode(signature_hex).map_err(|_| VerifyError::MalformedSignature)?;
    let signature_bytes: [u8; 64] = signature_bytes
        .try_into()
        .map_err(|_| VerifyError::BadSignatureLength)?;
    let signature = Signature::from_bytes(&signature_bytes);

    let key_bytes = hex::decode(public_key_hex).map_err(|_| VerifyError::MalformedPublicKey)?;
    let key_bytes: [u8; 32] = key_bytes
        .try_into()
        .map_err(|_| VerifyError::BadPublicKey)?;
    let verifying_key =
        VerifyingKey::from_bytes(&key_bytes).map_err(|_| VerifyError::BadPublicKey)?;

    let message = format!("{}{}", timestamp, raw_body);

    verifying_key
        .verify(message.as_bytes(), &signature)
        .map_err(|_| VerifyError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use ed25519_dalek::{Signer, SigningKey};

    const SEED: [u8; 32] = [42u8; 32];

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&SEED)
    }

    fn public_key_hex() -> String {
        hex::encode(signing_key().verifying_key().to_bytes())
    }

    fn sign(timestamp: &str, body: &str) -> String {
        let message = format!("{}{}", timestamp, body);
        hex::encode(signing_key().sign(message.as_bytes()).to_bytes())
    }

    fn headers_for(signature: &str, timestamp: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(signature).unwrap());
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_str(timestamp).unwrap());
        headers
    }

    #[test]
    fn test_valid_signature_accepted() {
        let body = r#"{"type":1}"#;
        let timestamp = "1700000000";
        let headers = headers_for(&sign(timestamp, body), timestamp);

        assert!(verify_interaction(&headers, body, &public_key_hex()));
    }

    #[test]
    fn test_mutated_body_rejected() {
        let body = r#"{"type":1}"#;
        let timestamp = "1700000000";
        let headers = headers_for(&sign(timestamp, body), timestamp);

        assert!(!verify_interaction(&headers, r#"{"type":2}"#, &public_key_hex()));
    }

    #[test]
    fn test_mutated_timestamp_rejected() {
        let body = r#"{"type":1}"#;
        let headers = headers_for(&sign("1700000000", body), "1700000001");

        assert!(!verify_interaction(&headers, body, &public_key_hex()));
    }

    #[test]
    fn test_mutated_signature_rejected() {
        let body = r#"{"type":1}"#;
        let timestamp = "1700000000";
        let mut signature = sign(timestamp, body);
        // Flip the last hex digit while keeping the string valid hex.
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });
        let headers = headers_for(&signature, timestamp);

        assert!(!verify_interaction(&headers, body, &public_key_hex()));
    }

    #[test]
    fn test_missing_signature_header_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static("1700000000"));

        assert!(!verify_interaction(&headers, "{}", &public_key_hex()));
    }

    #[test]
    fn test_missing_timestamp_header_rejected() {
        let body = "{}";
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&sign("1700000000", body)).unwrap(),
        );

        assert!(!verify_interaction(&headers, body, &public_key_hex()));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        let headers = headers_for("zz-not-hex", "1700000000");
        assert!(!verify_interaction(&headers, "{}", &public_key_hex()));
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let body = "{}";
        let timestamp = "1700000000";
        let signature = sign(timestamp, body);
        let headers = headers_for(&signature[..64], timestamp);

        assert!(!verify_interaction(&headers, body, &public_key_hex()));
    }

    #[test]
    fn test_bad_public_key_rejected() {
        let body = "{}";
        let timestamp = "1700000000";
        let headers = headers_for(&sign(timestamp, body), timestamp);

        assert!(!verify_interaction(&headers, body, "not-hex"));
        assert!(!verify_interaction(&headers, body, "abcd"));
    }
}
