use clawforge_canon::sha256_hex_of;
use clawforge_model::{ClawforgeError, ClawforgeResult, ErrorCode, RunnerAttestation, RunnerIdentity};
use serde::Serialize;

#[derive(Serialize)]
struct IdentityIdentityPayload<'a> {
    runner_id: &'a str,
    runner_version: &'a str,
    public_key: &'a str,
    environment_fingerprint: &'a str,
    build_hash: &'a str,
    sorted_capabilities_snapshot: Vec<&'a str>,
}

/// Computes the runner identity hash: SHA-256 over the canonical encoding of
/// `{runnerId, runnerVersion, publicKey, environmentFingerprint, buildHash,
/// sortedCapabilitiesSnapshot}`.
pub fn compute_runner_identity_hash(identity: &RunnerIdentity) -> ClawforgeResult<String> {
    let mut snapshot: Vec<&str> = identity.allowed_capabilities_snapshot.iter().map(String::as_str).collect();
    snapshot.sort_unstable();
    let payload = IdentityIdentityPayload {
        runner_id: &identity.runner_id,
        runner_version: &identity.runner_version,
        public_key: &identity.runner_public_key,
        environment_fingerprint: &identity.environment_fingerprint,
        build_hash: &identity.build_hash,
        sorted_capabilities_snapshot: snapshot,
    };
    sha256_hex_of(&payload).map_err(|e| ClawforgeError::new(ErrorCode::RunnerIdentityInvalid, e.to_string()))
}

#[derive(Serialize)]
struct AttestationSignedPayload<'a> {
    evidence_chain_hashes: &'a [String],
    runner_identity_hash: &'a str,
}

/// Verifies a runner attestation: recomputes the signed payload hash over
/// the evidence chain hashes and identity hash, then verifies the runner's
/// signature over it using the public key declared in `identity`.
pub fn verify_attestation(attestation: &RunnerAttestation, identity: &RunnerIdentity) -> ClawforgeResult<()> {
    let identity_hash = compute_runner_identity_hash(identity)?;
    if attestation.runner_identity_hash != identity_hash {
        return Err(ClawforgeError::new(ErrorCode::AttestationInvalid, "attestation.runnerIdentityHash does not match the computed identity hash"));
    }

    let expected_payload_hash = sha256_hex_of(&AttestationSignedPayload {
        evidence_chain_hashes: &attestation.evidence_chain_hashes,
        runner_identity_hash: &attestation.runner_identity_hash,
    })
    .map_err(|e| ClawforgeError::new(ErrorCode::AttestationInvalid, e.to_string()))?;
    if attestation.signed_payload_hash != expected_payload_hash {
        return Err(ClawforgeError::new(ErrorCode::AttestationInvalid, "attestation.signedPayloadHash does not match the recomputed hash"));
    }

    crate::signing::verify_signature(&identity.attestation_algorithm, &identity.runner_public_key, &expected_payload_hash, &attestation.signature)
        .map_err(|_| ClawforgeError::new(ErrorCode::AttestationInvalid, "runner signature verification failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_hash_is_stable_under_capability_reorder() {
        let mut identity = RunnerIdentity {
            runner_id: "r1".into(),
            runner_version: "1.0.0".into(),
            runner_public_key: "deadbeef".into(),
            environment_fingerprint: "fp".into(),
            build_hash: "bh".into(),
            allowed_capabilities_snapshot: vec!["write_file".into(), "read_file".into()],
            attestation_timestamp: "2026-08-01T00:00:00Z".into(),
            attestation_algorithm: "ed25519".into(),
            extra: serde_json::Map::new(),
        };
        let h1 = compute_runner_identity_hash(&identity).unwrap();
        identity.allowed_capabilities_snapshot.reverse();
        let h2 = compute_runner_identity_hash(&identity).unwrap();
        assert_eq!(h1, h2);
    }
}
