use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;

// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

/// Serializes a payload to its canonical on-wire form: compact JSON with the
/// fields in insertion order.
///
/// This exact byte sequence is both the request body and part of the signed
/// text, so any reordering or added whitespace breaks verification on the
/// remote side.
pub fn canonical_body(payload: &Map<String, Value>) -> String {
    serde_json::to_string(payload).expect("a JSON map always serializes")
}

/// Builds the text to be signed: canonical payload, then the vendor id, then
/// the millisecond timestamp, concatenated in that order with no separators.
pub fn signing_input(body: &str, vendor: &str, timestamp_ms: &str) -> String {
    format!("{body}{vendor}{timestamp_ms}")
}

/// Creates an HMAC-SHA256 signature for a given signing input.
///
/// The Vyapar API requires every call to be signed. This function implements
/// the required signing logic according to their documentation.
///
/// # Arguments
///
/// * `secret` - The vendor's API secret key.
/// * `signing_input` - The full text to sign, as built by [`signing_input`].
///
/// # Returns
///
/// A lowercase hexadecimal string representation of the signature.
pub fn sign_request(secret: &str, signing_input: &str) -> String {
    // Create a new HMAC-SHA256 instance with the secret key.
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");

    // Update the HMAC instance with the data to be signed.
    mac.update(signing_input.as_bytes());

    // Finalize the HMAC computation and get the raw byte result.
    let result = mac.finalize();
    let code_bytes = result.into_bytes();

    // Convert the raw bytes into a hexadecimal string, which is what the API expects.
    hex::encode(code_bytes)
}

/// Canonicalizes and signs a payload in one step.
///
/// Pure and deterministic; identical arguments always yield the identical
/// digest. Request signing composes the three primitives directly so the
/// transmitted body is the signed text verbatim; this one-step form exists
/// for the test suite.
#[cfg(test)]
pub fn sign_payload(
    payload: &Map<String, Value>,
    vendor: &str,
    secret: &str,
    timestamp_ms: &str,
) -> String {
    let body = canonical_body(payload);
    sign_request(secret, &signing_input(&body, vendor, timestamp_ms))
}
