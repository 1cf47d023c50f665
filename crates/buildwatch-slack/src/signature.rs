//! Slack request signature verification.
//!
//! Slack signs each request with `v0=HMAC_SHA256(secret, "v0:{timestamp}:{body}")`
//! in the `X-Slack-Signature` header, alongside `X-Slack-Request-Timestamp`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

/// Requests older than this are rejected to prevent replays.
pub const MAX_REQUEST_AGE_SECS: i64 = 60 * 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("request timestamp is too old")]
    Stale,

    #[error("malformed signature")]
    Malformed,

    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a request signature.
///
/// `now` is the current unix time in seconds.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_string()))?;
    if now.abs_diff(ts) > MAX_REQUEST_AGE_SECS.unsigned_abs() {
        return Err(SignatureError::Stale);
    }

    let sig_hex = signature
        .strip_prefix("v0=")
        .ok_or(SignatureError::Malformed)?;
    let sig_bytes = hex::decode(sig_hex).map_err(|_| SignatureError::Malformed)?;

    let mac = signing_mac(secret, timestamp, body)?;
    mac.verify_slice(&sig_bytes).map_err(|_| SignatureError::Mismatch)
}

/// Compute the `v0=` signature for a request.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mac = signing_mac(secret, timestamp, body)?;
    Ok(format!("v0={}", hex::encode(mac.finalize().into_bytes())))
}

fn signing_mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<Hmac<Sha256>, SignatureError> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Malformed)?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}
