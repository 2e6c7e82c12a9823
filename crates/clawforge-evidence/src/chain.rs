use std::collections::HashSet;

use clawforge_model::{ClawforgeError, ClawforgeResult, DefinitionOfDone, ErrorCode, ExecutionPlan, RunnerEvidence};

use crate::evidence::validate_evidence;

/// Verifies an ordered evidence chain: per-evidence validation, link
/// integrity (`prevEvidenceHash`), self-hash integrity, and that every
/// entry's `planHash` matches the session's bound plan hash. Ordering is
/// the array index supplied here, never a timestamp re-sort.
pub fn verify_evidence_chain(
    evidences: &[RunnerEvidence],
    plan: &ExecutionPlan,
    dod: &DefinitionOfDone,
    session_plan_hash: &str,
) -> ClawforgeResult<()> {
    let mut seen_ids = HashSet::new();
    let mut previous_hash: Option<&str> = None;

    for (index, evidence) in evidences.iter().enumerate() {
        validate_evidence(evidence, plan, dod, &mut seen_ids)?;

        if evidence.plan_hash != session_plan_hash {
            return Err(ClawforgeError::new(ErrorCode::EvidenceChainBroken, "evidence.planHash does not match the session's bound plan hash")
                .with_detail("index", index as u64)
                .with_detail("evidenceId", evidence.evidence_id.to_string()));
        }

        let expected_prev = previous_hash.map(str::to_string);
        if evidence.prev_evidence_hash != expected_prev {
            return Err(ClawforgeError::new(ErrorCode::EvidenceChainBroken, "prevEvidenceHash does not match the previous entry's evidenceHash")
                .with_detail("index", index as u64)
                .with_detail("evidenceId", evidence.evidence_id.to_string()));
        }

        let computed = clawforge_canon::sha256_hex_of_value(&evidence.identity_payload())
            .map_err(|e| ClawforgeError::new(ErrorCode::EvidenceChainBroken, e.to_string()))?;
        if computed != evidence.evidence_hash {
            return Err(ClawforgeError::new(ErrorCode::EvidenceChainBroken, "stored evidenceHash does not match its recomputed hash")
                .with_detail("index", index as u64)
                .with_detail("evidenceId", evidence.evidence_id.to_string()));
        }

        previous_hash = Some(&evidence.evidence_hash);
    }

    Ok(())
}

/// Completion is never asserted by the runner; it is derived here from a
/// passed gate plus at least one validated evidence per plan step.
#[must_use]
pub fn derive_completion_status(gate_passed: bool, plan: &ExecutionPlan, validated_evidence: &[RunnerEvidence]) -> bool {
    if !gate_passed {
        return false;
    }
    plan.steps
        .iter()
        .all(|step| validated_evidence.iter().any(|e| e.step_id == step.step_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawforge_model::{DodItem, PlanStep, StepVerification};
    use serde_json::Map;
    use uuid::Uuid;

    fn sample() -> (DefinitionOfDone, ExecutionPlan, String) {
        let session_id = Uuid::new_v4();
        let dod_id = Uuid::new_v4();
        let lock_id = Uuid::new_v4();
        let dod = DefinitionOfDone {
            dod_id,
            session_id,
            items: vec![DodItem { id: "d1".into(), description: "x".into(), verification_method: "unit_test".into(), extra: Map::new() }],
            extra: Map::new(),
        };
        let plan = ExecutionPlan {
            session_id,
            dod_id,
            lock_id,
            steps: vec![PlanStep {
                step_id: "s1".into(),
                ai_allowed: true,
                references: vec!["d1".into()],
                required_capabilities: vec!["read_file".into()],
                verification: StepVerification { method: "unit_test".into(), extra: Map::new() },
                extra: Map::new(),
            }],
            allowed_capabilities: vec!["read_file".into()],
            forbidden_actions: vec!["delete_file".into()],
            completion_criteria: vec!["done".into()],
            extra: Map::new(),
        };
        (dod, plan, "p".repeat(64))
    }

    fn evidence_with_hash(session_id: Uuid, plan_hash: &str, prev: Option<String>) -> RunnerEvidence {
        let mut e = RunnerEvidence {
            session_id,
            step_id: "s1".into(),
            evidence_id: Uuid::new_v4(),
            timestamp: "2026-08-01T00:00:00Z".into(),
            evidence_type: "unit_test".into(),
            artifact_hash: "a".repeat(64),
            verification_metadata: Map::new(),
            capability_used: "read_file".into(),
            human_confirmation_proof: None,
            plan_hash: plan_hash.to_string(),
            prev_evidence_hash: prev,
            evidence_hash: String::new(),
            extra: Map::new(),
        };
        e.evidence_hash = clawforge_canon::sha256_hex_of_value(&e.identity_payload()).unwrap();
        e
    }

    #[test]
    fn single_item_chain_verifies() {
        let (dod, plan, plan_hash) = sample();
        let e = evidence_with_hash(plan.session_id, &plan_hash, None);
        assert!(verify_evidence_chain(&[e], &plan, &dod, &plan_hash).is_ok());
    }

    #[test]
    fn two_item_chain_with_correct_links_verifies() {
        let (dod, plan, plan_hash) = sample();
        let e0 = evidence_with_hash(plan.session_id, &plan_hash, None);
        let e1 = evidence_with_hash(plan.session_id, &plan_hash, Some(e0.evidence_hash.clone()));
        assert!(verify_evidence_chain(&[e0, e1], &plan, &dod, &plan_hash).is_ok());
    }

    #[test]
    fn tampered_prev_hash_breaks_chain_at_index_one() {
        let (dod, plan, plan_hash) = sample();
        let e0 = evidence_with_hash(plan.session_id, &plan_hash, None);
        let mut tampered_prev = e0.evidence_hash.clone();
        tampered_prev.replace_range(0..1, if tampered_prev.starts_with('0') { "1" } else { "0" });
        let e1 = evidence_with_hash(plan.session_id, &plan_hash, Some(tampered_prev));
        let err = verify_evidence_chain(&[e0, e1], &plan, &dod, &plan_hash).unwrap_err();
        assert_eq!(err.code, ErrorCode::EvidenceChainBroken);
    }

    #[test]
    fn non_null_first_prev_hash_is_rejected() {
        let (dod, plan, plan_hash) = sample();
        let e0 = evidence_with_hash(plan.session_id, &plan_hash, Some("f".repeat(64)));
        let err = verify_evidence_chain(&[e0], &plan, &dod, &plan_hash).unwrap_err();
        assert_eq!(err.code, ErrorCode::EvidenceChainBroken);
    }

    #[test]
    fn completion_true_iff_gate_passed_and_every_step_covered() {
        let (_dod, plan, plan_hash) = sample();
        let e0 = evidence_with_hash(plan.session_id, &plan_hash, None);
        assert!(derive_completion_status(true, &plan, &[e0.clone()]));
        assert!(!derive_completion_status(false, &plan, &[e0.clone()]));
        assert!(!derive_completion_status(true, &plan, &[]));
    }
}
