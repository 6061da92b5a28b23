//! Canonical serialization: the only wire format used for signing and hashing.
//!
//! JSON with keys sorted lexicographically (RFC 8785 JSON Canonicalization
//! Scheme, via `serde_jcs`). Callers are responsible for encoding instants as
//! ISO-8601 `Z` strings (see [`iso8601_millis`]) and byte fields as lowercase
//! hex *before* the value reaches `canonical_bytes` — JCS canonicalizes key
//! order and number formatting, not domain representations.
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::CryptoError;

/// Serialize `value` to its canonical byte representation.
///
/// Signing and verification must both call this function on the same
/// logical record (with the signature field absent/zeroed) — any deviation
/// between signer and verifier breaks interop.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CryptoError> {
    serde_jcs::to_string(value)
        .map(|s| s.into_bytes())
        .map_err(|e| CryptoError::CanonicalizationError(e.to_string()))
}

/// Render a Unix-seconds timestamp as an ISO-8601 `Z` instant at millisecond
/// precision, e.g. `2026-07-26T00:00:00.000Z`.
pub fn iso8601_millis(unix_seconds: i64) -> String {
    let dt: DateTime<Utc> = Utc
        .timestamp_opt(unix_seconds, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).single().unwrap());
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Lowercase hex encoding, the canonical byte representation.
pub fn lower_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Unordered {
        zeta: u32,
        alpha: u32,
    }

    #[test]
    fn keys_are_sorted_regardless_of_struct_field_order() {
        let a = canonical_bytes(&Unordered { zeta: 1, alpha: 2 }).unwrap();
        let expected = br#"{"alpha":2,"zeta":1}"#.to_vec();
        assert_eq!(a, expected);
    }

    #[test]
    fn iso8601_is_millisecond_precision_zulu() {
        let s = iso8601_millis(0);
        assert_eq!(s, "1970-01-01T00:00:00.000Z");
    }
}
