//! # Canonicalizer & Hasher
//!
//! Deterministic byte-level encoding and SHA-256 content hashing. Every
//! artifact identity, chain link, and signature in clawforge is computed over
//! the bytes this crate produces, so canonicalization is intentionally the
//! smallest, most heavily tested piece of the whole system.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

mod canonicalize;

pub use canonicalize::canonicalize_value;

/// Errors raised while canonicalizing or hashing a value.
#[derive(Error, Debug)]
pub enum CanonError {
    #[error("value could not be represented as JSON: {0}")]
    NotJson(#[from] serde_json::Error),
    #[error("canonicalization depth limit exceeded (possible cyclic structure)")]
    DepthExceeded,
}

/// Serializes `value` to JSON, then canonicalizes: object keys sorted by
/// Unicode code point at every nesting depth, no insignificant whitespace,
/// array order preserved, UTF-8 output. Byte-identical for structurally
/// equal inputs regardless of field order.
pub fn canonicalize<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonError> {
    let as_value = serde_json::to_value(value)?;
    canonicalize_value(&as_value)
}

/// SHA-256 of arbitrary bytes, rendered as 64 lowercase hex characters.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 over the canonical encoding of `value`.
pub fn sha256_hex_of<T: Serialize>(value: &T) -> Result<String, CanonError> {
    Ok(sha256_hex(&canonicalize(value)?))
}

/// SHA-256 over the canonical encoding of a raw [`Value`], for callers that
/// already hold a parsed JSON document (e.g. artifacts with opaque extras).
pub fn sha256_hex_of_value(value: &Value) -> Result<String, CanonError> {
    Ok(sha256_hex(&canonicalize_value(value)?))
}

/// True if `hash` looks like a 64-character lowercase hex SHA-256 digest.
#[must_use]
pub fn looks_like_sha256_hex(hash: &str) -> bool {
    hash.len() == 64 && hash.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}
