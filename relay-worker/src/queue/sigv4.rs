//! Outbound request signing for the queue endpoint.
//!
//! Implements the AWS Signature Version 4 scheme by hand: canonical request
//! assembly, credential scoping, and the four-stage chained-HMAC key
//! derivation. The queue service rejects any request whose signature does not
//! match these bytes exactly, so the canonical forms here must not drift.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm identifier emitted in the string-to-sign and authorization header.
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Fixed terminator closing the credential scope and the key chain.
const REQUEST_TERMINATOR: &str = "aws4_request";

/// Static signing credentials scoped to a region.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

/// Sign an outbound request, appending `x-amz-date` and `authorization` to
/// `headers`.
///
/// Every header already present (except any stale `authorization`) is bound
/// into the signature, so callers must add `host` and `content-type` before
/// signing and must not alter signed headers afterwards.
pub fn sign_request(
    method: &str,
    url: &Url,
    headers: &mut Vec<(String, String)>,
    body: &[u8],
    credentials: &Credentials,
    service: &str,
) -> Result<()> {
    sign_request_at(method, url, headers, body, credentials, service, Utc::now())
}

/// Signing with an explicit clock. The derived key chain is bound to `now`,
/// which is why no stage of it may be cached across calls.
pub(crate) fn sign_request_at(
    method: &str,
    url: &Url,
    headers: &mut Vec<(String, String)>,
    body: &[u8],
    credentials: &Credentials,
    service: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = amz_date[..8].to_string();

    // The date header participates in signing, so it joins the map before the
    // canonical block is computed.
    headers.push(("x-amz-date".to_string(), amz_date.clone()));

    let (canonical_request, signed_headers) = canonical_request(method, url, headers, body);
    let credential_scope = format!(
        "{}/{}/{}/{}",
        date, credentials.region, service, REQUEST_TERMINATOR
    );
    let string_to_sign = string_to_sign(&amz_date, &credential_scope, &canonical_request);

    let signing_key = derive_signing_key(
        &credentials.secret_access_key,
        &date,
        &credentials.region,
        service,
    )?;
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

    headers.push((
        "authorization".to_string(),
        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, credentials.access_key_id, credential_scope, signed_headers, signature
        ),
    ));

    Ok(())
}

/// Build the canonical request and the signed-headers list.
///
/// Header names are compared case-insensitively for both sorting and the
/// signed-headers list; a pre-existing `authorization` header is never a
/// signing input.
pub(crate) fn canonical_request(
    method: &str,
    url: &Url,
    headers: &[(String, String)],
    body: &[u8],
) -> (String, String) {
    let mut entries: Vec<(String, String)> = headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("authorization"))
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    entries.sort();

    let canonical_headers = entries
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value))
        .collect::<Vec<_>>()
        .join("\n");
    let signed_headers = entries
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let payload_hash = hex_sha256(body);
    let canonical = [
        method,
        url.path(),
        url.query().unwrap_or(""),
        canonical_headers.as_str(),
        "",
        signed_headers.as_str(),
        payload_hash.as_str(),
    ]
    .join("\n");

    (canonical, signed_headers)
}

pub(crate) fn string_to_sign(
    amz_date: &str,
    credential_scope: &str,
    canonical_request: &str,
) -> String {
    let request_hash = hex_sha256(canonical_request.as_bytes());
    [ALGORITHM, amz_date, credential_scope, request_hash.as_str()].join("\n")
}

/// Four-stage keyed-hash chain: date, region, service, terminator, seeded
/// with `"AWS4" + secret`.
pub(crate) fn derive_signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<[u8; 32]> {
    let seed = format!("AWS4{}", secret);
    let mut key = hmac_sha256(seed.as_bytes(), date.as_bytes())?;
    for input in [region, service, REQUEST_TERMINATOR] {
        key = hmac_sha256(&key, input.as_bytes())?;
    }
    Ok(key)
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(key).context("HMAC keying failed")?;
    mac.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Published reference vector: GET iam.amazonaws.com ListUsers, signed
    // with AKIDEXAMPLE in us-east-1 at 2015-08-30T12:36:00Z.
    const ACCESS_KEY: &str = "AKIDEXAMPLE";
    const SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";

    fn reference_credentials() -> Credentials {
        Credentials {
            access_key_id: ACCESS_KEY.to_string(),
            secret_access_key: SECRET_KEY.to_string(),
            region: "us-east-1".to_string(),
        }
    }

    fn reference_url() -> Url {
        Url::parse("https://iam.amazonaws.com/?Action=ListUsers&Version=2010-05-08").unwrap()
    }

    fn reference_headers() -> Vec<(String, String)> {
        vec![
            (
                "content-type".to_string(),
                "application/x-www-form-urlencoded; charset=utf-8".to_string(),
            ),
            ("host".to_string(), "iam.amazonaws.com".to_string()),
        ]
    }

    fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
    }

    #[test]
    fn test_signing_key_reference_vector() {
        let key = derive_signing_key(SECRET_KEY, "20150830", "us-east-1", "iam").unwrap();
        assert_eq!(
            hex::encode(key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn test_canonical_request_reference_vector() {
        let mut headers = reference_headers();
        headers.push(("x-amz-date".to_string(), "20150830T123600Z".to_string()));

        let (canonical, signed) = canonical_request("GET", &reference_url(), &headers, b"");

        let expected = "GET\n\
            /\n\
            Action=ListUsers&Version=2010-05-08\n\
            content-type:application/x-www-form-urlencoded; charset=utf-8\n\
            host:iam.amazonaws.com\n\
            x-amz-date:20150830T123600Z\n\
            \n\
            content-type;host;x-amz-date\n\
            e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(canonical, expected);
        assert_eq!(signed, "content-type;host;x-amz-date");
        assert_eq!(
            hex_sha256(canonical.as_bytes()),
            "f536975d06c0309214f805bb90ccff089219ecd68b2577efef23edd43b7e1a59"
        );
    }

    #[test]
    fn test_string_to_sign_reference_vector() {
        let mut headers = reference_headers();
        headers.push(("x-amz-date".to_string(), "20150830T123600Z".to_string()));
        let (canonical, _) = canonical_request("GET", &reference_url(), &headers, b"");

        let string_to_sign = string_to_sign(
            "20150830T123600Z",
            "20150830/us-east-1/iam/aws4_request",
            &canonical,
        );

        assert_eq!(
            string_to_sign,
            "AWS4-HMAC-SHA256\n\
             20150830T123600Z\n\
             20150830/us-east-1/iam/aws4_request\n\
             f536975d06c0309214f805bb90ccff089219ecd68b2577efef23edd43b7e1a59"
        );
    }

    #[test]
    fn test_sign_request_reference_vector() {
        let mut headers = reference_headers();
        sign_request_at(
            "GET",
            &reference_url(),
            &mut headers,
            b"",
            &reference_credentials(),
            "iam",
            reference_time(),
        )
        .unwrap();

        assert!(headers
            .iter()
            .any(|(name, value)| name == "x-amz-date" && value == "20150830T123600Z"));

        let authorization = headers
            .iter()
            .find(|(name, _)| name == "authorization")
            .map(|(_, value)| value.as_str())
            .unwrap();
        assert_eq!(
            authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, \
             Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let run = || {
            let mut headers = reference_headers();
            sign_request_at(
                "GET",
                &reference_url(),
                &mut headers,
                b"",
                &reference_credentials(),
                "iam",
                reference_time(),
            )
            .unwrap();
            headers
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_existing_authorization_header_excluded() {
        let mut headers = reference_headers();
        headers.push(("Authorization".to_string(), "stale value".to_string()));
        headers.push(("x-amz-date".to_string(), "20150830T123600Z".to_string()));

        let (canonical, signed) = canonical_request("GET", &reference_url(), &headers, b"");

        assert!(!canonical.contains("stale value"));
        assert_eq!(signed, "content-type;host;x-amz-date");
    }

    #[test]
    fn test_header_names_sorted_case_insensitively() {
        let headers = vec![
            ("Host".to_string(), "example.com".to_string()),
            ("CONTENT-TYPE".to_string(), "text/plain".to_string()),
        ];
        let url = Url::parse("https://example.com/path").unwrap();

        let (canonical, signed) = canonical_request("POST", &url, &headers, b"hi");

        assert_eq!(signed, "content-type;host");
        assert!(canonical.starts_with("POST\n/path\n\ncontent-type:text/plain\nhost:example.com\n"));
    }
}
