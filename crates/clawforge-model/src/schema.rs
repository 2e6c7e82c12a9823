//! Structural/syntactic validators, one per artifact schema. Each checks
//! UUID/ISO-8601/SHA-256/PEM shape, enum membership, and array/string bounds
//! only — no cross-artifact checks. Those live in `clawforge-gate` and
//! `clawforge-evidence`.

use chrono::DateTime;
use regex::Regex;
use std::sync::OnceLock;

use crate::artifacts::*;
use crate::error::{ClawforgeError, ClawforgeResult, ErrorCode};
use crate::verification::is_recognized_verification_method;

const MAX_GOAL_LEN: usize = 4096;
const MAX_STRING_LEN: usize = 8192;

fn pem_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^-----BEGIN [A-Z0-9 ]+-----.*-----END [A-Z0-9 ]+-----\s*$").unwrap()
    })
}

fn is_sha256_hex(s: &str) -> bool {
    clawforge_canon::looks_like_sha256_hex(s)
}

fn is_iso8601(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}

fn is_pem_or_hex(s: &str) -> bool {
    pem_regex().is_match(s) || (!s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn bounded(s: &str, max: usize) -> bool {
    !s.is_empty() && s.chars().count() <= max
}

/// Validates a [`DefinitionOfDone`]: item ids unique, `items` non-empty,
/// every item's fields well-formed.
pub fn validate_dod(dod: &DefinitionOfDone) -> ClawforgeResult<()> {
    if dod.items.is_empty() {
        return Err(ClawforgeError::field(
            ErrorCode::DodSchemaInvalid,
            "items",
            "DefinitionOfDone.items must be non-empty",
        ));
    }
    let mut seen = std::collections::HashSet::new();
    for item in &dod.items {
        if !bounded(&item.id, MAX_STRING_LEN) {
            return Err(ClawforgeError::field(ErrorCode::DodSchemaInvalid, "items[].id", "item id must be non-empty"));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(ClawforgeError::field(
                ErrorCode::DodSchemaInvalid,
                "items[].id",
                format!("duplicate DoD item id: {}", item.id),
            ));
        }
        if !bounded(&item.description, MAX_STRING_LEN) {
            return Err(ClawforgeError::field(ErrorCode::DodSchemaInvalid, "items[].description", "description must be non-empty"));
        }
        if !bounded(&item.verification_method, MAX_STRING_LEN) {
            return Err(ClawforgeError::field(
                ErrorCode::DodSchemaInvalid,
                "items[].verificationMethod",
                "verificationMethod must be non-empty",
            ));
        }
    }
    Ok(())
}

/// Validates a [`DecisionLock`]: goal bounded non-empty, plan hash (if set)
/// looks like a SHA-256 hex digest.
pub fn validate_lock(lock: &DecisionLock) -> ClawforgeResult<()> {
    if !bounded(&lock.goal, MAX_GOAL_LEN) {
        return Err(ClawforgeError::field(ErrorCode::LockSchemaInvalid, "goal", "goal must be non-empty and bounded"));
    }
    if let Some(hash) = &lock.plan_hash {
        if !is_sha256_hex(hash) {
            return Err(ClawforgeError::field(ErrorCode::LockSchemaInvalid, "planHash", "planHash must be 64-char lowercase hex"));
        }
    }
    Ok(())
}

/// Validates an [`ExecutionPlan`]: step ids unique, non-empty collections,
/// recognized verification methods.
pub fn validate_plan(plan: &ExecutionPlan) -> ClawforgeResult<()> {
    if plan.steps.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::PlanSchemaInvalid, "steps", "steps must be non-empty"));
    }
    if plan.forbidden_actions.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::PlanSchemaInvalid, "forbiddenActions", "forbiddenActions must be non-empty"));
    }
    if plan.completion_criteria.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::PlanSchemaInvalid, "completionCriteria", "completionCriteria must be non-empty"));
    }
    let mut seen = std::collections::HashSet::new();
    for step in &plan.steps {
        if !bounded(&step.step_id, MAX_STRING_LEN) {
            return Err(ClawforgeError::field(ErrorCode::PlanSchemaInvalid, "steps[].stepId", "stepId must be non-empty"));
        }
        if !seen.insert(step.step_id.as_str()) {
            return Err(ClawforgeError::field(
                ErrorCode::PlanSchemaInvalid,
                "steps[].stepId",
                format!("duplicate step id: {}", step.step_id),
            ));
        }
        if !is_recognized_verification_method(&step.verification.method) {
            return Err(ClawforgeError::field(
                ErrorCode::PlanSchemaInvalid,
                "steps[].verification.method",
                format!("unrecognized verification method: {}", step.verification.method),
            ));
        }
    }
    Ok(())
}

/// Validates a [`StepEnvelope`].
pub fn validate_envelope(envelope: &StepEnvelope) -> ClawforgeResult<()> {
    if !bounded(&envelope.step_id, MAX_STRING_LEN) {
        return Err(ClawforgeError::field(ErrorCode::EnvelopeSchemaInvalid, "stepId", "stepId must be non-empty"));
    }
    if !is_recognized_verification_method(&envelope.expected_evidence_type) {
        return Err(ClawforgeError::field(
            ErrorCode::EnvelopeSchemaInvalid,
            "expectedEvidenceType",
            format!("unrecognized evidence type: {}", envelope.expected_evidence_type),
        ));
    }
    Ok(())
}

/// Validates a [`PatchArtifact`]: non-empty file list, non-negative counts
/// (guaranteed by `u32`), bounded diff text.
pub fn validate_patch(patch: &PatchArtifact) -> ClawforgeResult<()> {
    if patch.file_changes.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::PatchSchemaInvalid, "fileChanges", "fileChanges must be non-empty"));
    }
    for change in &patch.file_changes {
        if change.path.is_empty() {
            return Err(ClawforgeError::field(ErrorCode::PatchSchemaInvalid, "fileChanges[].path", "path must be non-empty"));
        }
    }
    Ok(())
}

/// Validates a [`RunnerEvidence`] record's shape (not its cross-artifact
/// correctness — see `clawforge_evidence::validate_evidence`).
pub fn validate_evidence_schema(evidence: &RunnerEvidence) -> ClawforgeResult<()> {
    if !is_iso8601(&evidence.timestamp) {
        return Err(ClawforgeError::field(ErrorCode::EvidenceSchemaInvalid, "timestamp", "timestamp must be ISO-8601 UTC"));
    }
    if !is_recognized_verification_method(&evidence.evidence_type) {
        return Err(ClawforgeError::field(
            ErrorCode::EvidenceSchemaInvalid,
            "evidenceType",
            format!("unrecognized evidence type: {}", evidence.evidence_type),
        ));
    }
    if !is_sha256_hex(&evidence.artifact_hash) {
        return Err(ClawforgeError::field(ErrorCode::EvidenceSchemaInvalid, "artifactHash", "artifactHash must be 64-char lowercase hex"));
    }
    if !is_sha256_hex(&evidence.plan_hash) {
        return Err(ClawforgeError::field(ErrorCode::EvidenceSchemaInvalid, "planHash", "planHash must be 64-char lowercase hex"));
    }
    if !is_sha256_hex(&evidence.evidence_hash) {
        return Err(ClawforgeError::field(ErrorCode::EvidenceSchemaInvalid, "evidenceHash", "evidenceHash must be 64-char lowercase hex"));
    }
    if let Some(prev) = &evidence.prev_evidence_hash {
        if !is_sha256_hex(prev) {
            return Err(ClawforgeError::field(ErrorCode::EvidenceSchemaInvalid, "prevEvidenceHash", "prevEvidenceHash must be 64-char lowercase hex"));
        }
    }
    if evidence.capability_used.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::EvidenceSchemaInvalid, "capabilityUsed", "capabilityUsed must be non-empty"));
    }
    Ok(())
}

/// Validates a [`RunnerIdentity`]: public key is PEM or hex, timestamps
/// well-formed.
pub fn validate_identity(identity: &RunnerIdentity) -> ClawforgeResult<()> {
    if !is_pem_or_hex(&identity.runner_public_key) {
        return Err(ClawforgeError::field(ErrorCode::IdentitySchemaInvalid, "runnerPublicKey", "runnerPublicKey must be PEM or hex"));
    }
    if !is_iso8601(&identity.attestation_timestamp) {
        return Err(ClawforgeError::field(ErrorCode::IdentitySchemaInvalid, "attestationTimestamp", "attestationTimestamp must be ISO-8601 UTC"));
    }
    if identity.runner_id.is_empty() || identity.build_hash.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::IdentitySchemaInvalid, "runnerId", "runnerId and buildHash must be non-empty"));
    }
    Ok(())
}

/// Validates a [`RunnerAttestation`]'s shape.
pub fn validate_attestation_schema(attestation: &RunnerAttestation) -> ClawforgeResult<()> {
    if !is_sha256_hex(&attestation.runner_identity_hash) {
        return Err(ClawforgeError::field(ErrorCode::AttestationSchemaInvalid, "runnerIdentityHash", "must be 64-char lowercase hex"));
    }
    if attestation.evidence_chain_hashes.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::AttestationSchemaInvalid, "evidenceChainHashes", "must be non-empty"));
    }
    for h in &attestation.evidence_chain_hashes {
        if !is_sha256_hex(h) {
            return Err(ClawforgeError::field(ErrorCode::AttestationSchemaInvalid, "evidenceChainHashes[]", "each hash must be 64-char lowercase hex"));
        }
    }
    if attestation.signature.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::AttestationSchemaInvalid, "signature", "signature must be non-empty"));
    }
    Ok(())
}

/// Validates a [`SessionAnchor`]'s shape: every present hash field looks
/// like a SHA-256 digest.
pub fn validate_anchor_schema(anchor: &SessionAnchor) -> ClawforgeResult<()> {
    if !is_sha256_hex(&anchor.plan_hash) {
        return Err(ClawforgeError::field(ErrorCode::AnchorSchemaInvalid, "planHash", "must be 64-char lowercase hex"));
    }
    if !is_sha256_hex(&anchor.final_evidence_hash) {
        return Err(ClawforgeError::field(ErrorCode::AnchorSchemaInvalid, "finalEvidenceHash", "must be 64-char lowercase hex"));
    }
    for (name, value) in [
        ("finalAttestationHash", &anchor.final_attestation_hash),
        ("runnerIdentityHash", &anchor.runner_identity_hash),
        ("policySetHash", &anchor.policy_set_hash),
        ("policyEvaluationHash", &anchor.policy_evaluation_hash),
    ] {
        if let Some(hash) = value {
            if !is_sha256_hex(hash) {
                return Err(ClawforgeError::field(ErrorCode::AnchorSchemaInvalid, name, "must be 64-char lowercase hex"));
            }
        }
    }
    Ok(())
}

/// Validates an [`ApprovalSignature`]'s shape.
pub fn validate_signature(signature: &ApprovalSignature) -> ClawforgeResult<()> {
    if signature.algorithm != "RSA-SHA256" {
        return Err(ClawforgeError::field(ErrorCode::SignatureSchemaInvalid, "algorithm", "algorithm must be RSA-SHA256"));
    }
    const RECOGNIZED_ARTIFACT_TYPES: &[&str] = &["decision_lock", "execution_plan", "prompt_capsule"];
    if !RECOGNIZED_ARTIFACT_TYPES.contains(&signature.artifact_type.as_str()) {
        return Err(ClawforgeError::field(
            ErrorCode::SignatureSchemaInvalid,
            "artifactType",
            format!("unrecognized artifactType: {}", signature.artifact_type),
        ));
    }
    if !is_sha256_hex(&signature.artifact_hash) {
        return Err(ClawforgeError::field(ErrorCode::SignatureSchemaInvalid, "artifactHash", "must be 64-char lowercase hex"));
    }
    if !is_iso8601(&signature.timestamp) {
        return Err(ClawforgeError::field(ErrorCode::SignatureSchemaInvalid, "timestamp", "must be ISO-8601 UTC"));
    }
    if signature.signature.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::SignatureSchemaInvalid, "signature", "signature must be non-empty"));
    }
    if !is_sha256_hex(&signature.payload_hash) {
        return Err(ClawforgeError::field(ErrorCode::SignatureSchemaInvalid, "payloadHash", "must be 64-char lowercase hex"));
    }
    Ok(())
}

/// Validates an [`ApprovalBundle`]'s shape (each signature independently).
pub fn validate_bundle(bundle: &ApprovalBundle) -> ClawforgeResult<()> {
    if bundle.signatures.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::BundleSchemaInvalid, "signatures", "signatures must be non-empty"));
    }
    if !is_sha256_hex(&bundle.bundle_hash) {
        return Err(ClawforgeError::field(ErrorCode::BundleSchemaInvalid, "bundleHash", "must be 64-char lowercase hex"));
    }
    for signature in &bundle.signatures {
        validate_signature(signature).map_err(|e| ClawforgeError::new(ErrorCode::BundleSchemaInvalid, e.message).with_detail("field", "signatures[]"))?;
    }
    Ok(())
}

/// Validates a [`Policy`]'s shape. Policy content is never interpreted by
/// this core; only `policyId` is structurally required.
pub fn validate_policy(policy: &Policy) -> ClawforgeResult<()> {
    if policy.policy_id.is_empty() {
        return Err(ClawforgeError::field(ErrorCode::PolicySchemaInvalid, "policyId", "policyId must be non-empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use uuid::Uuid;

    fn sample_dod() -> DefinitionOfDone {
        DefinitionOfDone {
            dod_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            items: vec![DodItem {
                id: "d1".into(),
                description: "add hash check".into(),
                verification_method: "unit_test".into(),
                extra: Map::new(),
            }],
            extra: Map::new(),
        }
    }

    #[test]
    fn empty_dod_items_rejected() {
        let mut dod = sample_dod();
        dod.items.clear();
        assert!(validate_dod(&dod).is_err());
    }

    #[test]
    fn duplicate_item_ids_rejected() {
        let mut dod = sample_dod();
        let dup = dod.items[0].clone();
        dod.items.push(dup);
        assert!(validate_dod(&dod).is_err());
    }

    #[test]
    fn valid_dod_passes() {
        assert!(validate_dod(&sample_dod()).is_ok());
    }

    #[test]
    fn lock_with_malformed_plan_hash_rejected() {
        let lock = DecisionLock {
            lock_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            dod_id: Uuid::new_v4(),
            goal: "add hash check".into(),
            plan_hash: Some("not-a-hash".into()),
            extra: Map::new(),
        };
        assert!(validate_lock(&lock).is_err());
    }
}
