use std::collections::HashSet;

use serde_json::Value;
use uuid::Uuid;

use clawforge_canon::sha256_hex_of_value;
use clawforge_model::{ApprovalBundle, ClawforgeError, ClawforgeResult, ErrorCode};

use crate::signature::verify_signature_entry;

/// Computes the bundle hash: the bundle with `bundleHash` cleared and its
/// signatures sorted by `signatureId`, canonicalized and hashed.
pub fn compute_bundle_hash(bundle: &ApprovalBundle) -> ClawforgeResult<String> {
    let mut normalized = bundle.clone();
    normalized.bundle_hash = String::new();
    normalized.signatures.sort_by_key(|s| s.signature_id);
    let value = serde_json::to_value(&normalized).map_err(|e| ClawforgeError::new(ErrorCode::ApprovalSignatureInvalid, e.to_string()))?;
    let Value::Object(mut map) = value else {
        return Err(ClawforgeError::new(ErrorCode::ApprovalSignatureInvalid, "bundle did not serialize to an object"));
    };
    map.remove("bundleHash");
    sha256_hex_of_value(&Value::Object(map)).map_err(|e| ClawforgeError::new(ErrorCode::ApprovalSignatureInvalid, e.to_string()))
}

/// Checks that `nonce` has not been observed before in `seen_nonces`,
/// recording it if it is new. `seen_nonces` is scoped to a single
/// validation call (or session), never process-wide, so the same nonce
/// may legitimately appear again in an unrelated validation.
pub fn check_nonce_replay(nonce: Uuid, seen_nonces: &mut HashSet<Uuid>) -> ClawforgeResult<()> {
    if !seen_nonces.insert(nonce) {
        return Err(ClawforgeError::field(ErrorCode::ApprovalNonceReplay, "nonce", "nonce has already been used in this session"));
    }
    Ok(())
}

/// A resolver from `approverId` to that approver's PEM-encoded RSA public
/// key, supplied by the caller (e.g. backed by an operator keystore).
pub trait ApproverKeyResolver {
    fn public_key_pem(&self, approver_id: &str) -> Option<String>;
}

impl<F: Fn(&str) -> Option<String>> ApproverKeyResolver for F {
    fn public_key_pem(&self, approver_id: &str) -> Option<String> {
        self(approver_id)
    }
}

/// Verifies a full approval bundle: the stored `bundleHash` matches the
/// recomputed one, every signature verifies against its approver's public
/// key, the signatures carry distinct `signatureId`s, and none of the
/// bundle's nonces have been seen before in `seen_nonces`.
pub fn verify_bundle(bundle: &ApprovalBundle, resolver: &dyn ApproverKeyResolver, seen_nonces: &mut HashSet<Uuid>) -> ClawforgeResult<()> {
    let expected_hash = compute_bundle_hash(bundle)?;
    if expected_hash != bundle.bundle_hash {
        return Err(ClawforgeError::field(ErrorCode::ApprovalSignatureInvalid, "bundleHash", "bundleHash does not match the recomputed hash"));
    }

    let mut seen_signature_ids: HashSet<Uuid> = HashSet::new();
    for signature in &bundle.signatures {
        if !seen_signature_ids.insert(signature.signature_id) {
            return Err(ClawforgeError::field(ErrorCode::ApprovalSignatureInvalid, "signatureId", "duplicate signatureId in bundle"));
        }
        if signature.session_id != bundle.session_id {
            return Err(ClawforgeError::field(ErrorCode::ApprovalSignatureInvalid, "sessionId", "signature.sessionId does not match bundle.sessionId"));
        }

        let public_key_pem = resolver
            .public_key_pem(&signature.approver_id)
            .ok_or_else(|| ClawforgeError::field(ErrorCode::ApprovalSignatureInvalid, "approverId", "no known public key for this approver"))?;
        verify_signature_entry(signature, &public_key_pem)?;
        check_nonce_replay(signature.nonce, seen_nonces)?;
    }

    Ok(())
}
