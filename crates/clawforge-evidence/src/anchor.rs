use uuid::Uuid;

use clawforge_model::{ClawforgeError, ClawforgeResult, ErrorCode, SessionAnchor};

/// Expected values for a session anchor. The four required fields are the
/// mandatory `validateAnchor` arguments; the rest are optional — when
/// `Some`, the anchor must carry the same value.
#[derive(Debug, Clone, Default)]
pub struct AnchorExpectations {
    pub final_attestation_hash: Option<String>,
    pub runner_identity_hash: Option<String>,
    pub policy_set_hash: Option<String>,
    pub policy_evaluation_hash: Option<String>,
}

/// Validates a [`SessionAnchor`] against the session's known identity: the
/// four required fields must match exactly, and every optional field the
/// caller supplies an expectation for must be present on the anchor and
/// equal to that expectation.
pub fn validate_anchor(
    anchor: &SessionAnchor,
    session_id: Uuid,
    plan_hash: &str,
    lock_id: Uuid,
    final_evidence_hash: &str,
    expectations: &AnchorExpectations,
) -> ClawforgeResult<()> {
    if anchor.session_id != session_id {
        return Err(ClawforgeError::field(ErrorCode::AnchorInvalid, "sessionId", "anchor.sessionId does not match expected sessionId"));
    }
    if anchor.plan_hash != plan_hash {
        return Err(ClawforgeError::field(ErrorCode::AnchorInvalid, "planHash", "anchor.planHash does not match expected planHash"));
    }
    if anchor.lock_id != lock_id {
        return Err(ClawforgeError::field(ErrorCode::AnchorInvalid, "lockId", "anchor.lockId does not match expected lockId"));
    }
    if anchor.final_evidence_hash != final_evidence_hash {
        return Err(ClawforgeError::field(ErrorCode::AnchorInvalid, "finalEvidenceHash", "anchor.finalEvidenceHash does not match expected value"));
    }

    check_optional("finalAttestationHash", &expectations.final_attestation_hash, &anchor.final_attestation_hash)?;
    check_optional("runnerIdentityHash", &expectations.runner_identity_hash, &anchor.runner_identity_hash)?;
    check_optional("policySetHash", &expectations.policy_set_hash, &anchor.policy_set_hash)?;
    check_optional("policyEvaluationHash", &expectations.policy_evaluation_hash, &anchor.policy_evaluation_hash)?;
    Ok(())
}

fn check_optional(field: &str, expected: &Option<String>, actual: &Option<String>) -> ClawforgeResult<()> {
    let Some(expected_value) = expected else { return Ok(()) };
    match actual {
        None => Err(ClawforgeError::field(ErrorCode::AnchorInvalid, field, "missing")),
        Some(actual_value) if actual_value != expected_value => {
            Err(ClawforgeError::field(ErrorCode::AnchorInvalid, field, "does not match expected value"))
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn sample_anchor(session_id: Uuid, lock_id: Uuid) -> SessionAnchor {
        SessionAnchor {
            session_id,
            plan_hash: "a".repeat(64),
            lock_id,
            final_evidence_hash: "b".repeat(64),
            final_attestation_hash: None,
            runner_identity_hash: None,
            policy_set_hash: None,
            policy_evaluation_hash: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn matching_anchor_with_no_optional_expectations_passes() {
        let session_id = Uuid::new_v4();
        let lock_id = Uuid::new_v4();
        let anchor = sample_anchor(session_id, lock_id);
        let result = validate_anchor(&anchor, session_id, &"a".repeat(64), lock_id, &"b".repeat(64), &AnchorExpectations::default());
        assert!(result.is_ok());
    }

    #[test]
    fn missing_expected_attestation_hash_is_rejected() {
        let session_id = Uuid::new_v4();
        let lock_id = Uuid::new_v4();
        let anchor = sample_anchor(session_id, lock_id);
        let expectations = AnchorExpectations { final_attestation_hash: Some("c".repeat(64)), ..Default::default() };
        let err = validate_anchor(&anchor, session_id, &"a".repeat(64), lock_id, &"b".repeat(64), &expectations).unwrap_err();
        assert_eq!(err.code, ErrorCode::AnchorInvalid);
        assert_eq!(err.details.get("field").and_then(|v| v.as_str()), Some("finalAttestationHash"));
    }
}
