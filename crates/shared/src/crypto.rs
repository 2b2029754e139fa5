//! Webhook signature helpers.
//!
//! The backend signs every webhook delivery body with HMAC-SHA256 keyed by
//! the webhook secret and sends it as `X-Webhook-Signature: sha256=<hex>`.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Webhook secret must not be empty")]
    EmptySecret,
    #[error("Signature header must start with `sha256=`")]
    MissingPrefix,
    #[error("Signature is not valid hex")]
    InvalidHex,
}

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_ref());
    hex::encode(hasher.finalize())
}

fn mac_for(secret: &str) -> Result<HmacSha256, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::EmptySecret);
    }
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::EmptySecret)
}

/// Signs a delivery body, producing the `X-Webhook-Signature` header value.
pub fn sign_webhook_payload(secret: &str, payload: &str) -> Result<String, SignatureError> {
    let mut mac = mac_for(secret)?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    Ok(format!("{SIGNATURE_PREFIX}{signature}"))
}

/// Verifies a captured delivery against the webhook secret in constant time.
///
/// Returns `Ok(false)` for a well-formed signature that does not match.
pub fn verify_webhook_signature(
    secret: &str,
    payload: &str,
    header_value: &str,
) -> Result<bool, SignatureError> {
    let hex_part = header_value
        .trim()
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::MissingPrefix)?;
    let expected = hex::decode(hex_part).map_err(|_| SignatureError::InvalidHex)?;

    let mut mac = mac_for(secret)?;
    mac.update(payload.as_bytes());
    Ok(mac.verify_slice(&expected).is_ok())
}
