use std::collections::HashSet;

use clawforge_model::schema::validate_evidence_schema;
use clawforge_model::{ClawforgeError, ClawforgeResult, DefinitionOfDone, ErrorCode, ExecutionPlan, RunnerEvidence};

/// Validates one piece of evidence against the plan and DoD it claims to
/// satisfy. `seen_ids` accumulates across a chain so duplicate detection
/// works across the whole ordered sequence, not just within one call.
pub fn validate_evidence(
    evidence: &RunnerEvidence,
    plan: &ExecutionPlan,
    dod: &DefinitionOfDone,
    seen_ids: &mut HashSet<uuid::Uuid>,
) -> ClawforgeResult<()> {
    validate_evidence_schema(evidence).map_err(|e| {
        ClawforgeError::new(ErrorCode::EvidenceSchemaInvalid, e.message).with_detail("field", "evidence")
    })?;

    let Some(step) = plan.step(&evidence.step_id) else {
        return Err(ClawforgeError::field(ErrorCode::EvidenceStepUnknown, "stepId", format!("no such step: {}", evidence.step_id)));
    };

    if evidence.session_id != plan.session_id {
        return Err(ClawforgeError::field(
            ErrorCode::EvidenceStepUnknown,
            "sessionId",
            "evidence.sessionId does not match plan.sessionId",
        ));
    }

    if !seen_ids.insert(evidence.evidence_id) {
        return Err(ClawforgeError::field(
            ErrorCode::EvidenceDuplicate,
            "evidenceId",
            format!("evidenceId already recorded: {}", evidence.evidence_id),
        ));
    }

    if !clawforge_capability::is_registered(&evidence.capability_used) {
        return Err(ClawforgeError::field(
            ErrorCode::EvidenceCapUnregistered,
            "capabilityUsed",
            format!("capability not registered: {}", evidence.capability_used),
        ));
    }

    if !plan.allowed_capabilities.is_empty() && !plan.allowed_capabilities.iter().any(|c| c == &evidence.capability_used) {
        return Err(ClawforgeError::field(
            ErrorCode::EvidenceCapNotAllowed,
            "capabilityUsed",
            format!("capability not in plan.allowedCapabilities: {}", evidence.capability_used),
        ));
    }
    if !step.required_capabilities.is_empty() && !step.required_capabilities.iter().any(|c| c == &evidence.capability_used) {
        return Err(ClawforgeError::field(
            ErrorCode::EvidenceCapNotAllowed,
            "capabilityUsed",
            format!("capability not in step.requiredCapabilities: {}", evidence.capability_used),
        ));
    }

    if clawforge_capability::requires_human_confirmation(&evidence.capability_used) {
        let proof_present = evidence.human_confirmation_proof.as_ref().is_some_and(|p| !p.trim().is_empty());
        if !proof_present {
            return Err(ClawforgeError::field(
                ErrorCode::EvidenceHumanConfirmMissing,
                "humanConfirmationProof",
                "capability requires human confirmation but proof is missing",
            ));
        }
    }

    if step.references.is_empty() {
        return Err(ClawforgeError::field(
            ErrorCode::EvidenceTypeMismatch,
            "references",
            format!("step {} references no DoD items", step.step_id),
        ));
    }
    let referenced_methods: Vec<&str> = dod
        .items
        .iter()
        .filter(|item| step.references.iter().any(|r| r == &item.id))
        .map(|item| item.verification_method.as_str())
        .collect();
    if !referenced_methods.iter().any(|m| *m == evidence.evidence_type) {
        return Err(ClawforgeError::field(
            ErrorCode::EvidenceTypeMismatch,
            "evidenceType",
            format!(
                "evidenceType {} does not match any referenced DoD item's verificationMethod",
                evidence.evidence_type
            ),
        ));
    }

    if !clawforge_canon::looks_like_sha256_hex(&evidence.artifact_hash) {
        return Err(ClawforgeError::field(ErrorCode::EvidenceSchemaInvalid, "artifactHash", "artifactHash must be 64-char lowercase hex"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawforge_model::{DodItem, PlanStep, StepVerification};
    use serde_json::Map;
    use uuid::Uuid;

    fn happy_path() -> (DefinitionOfDone, ExecutionPlan, RunnerEvidence) {
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
        let evidence = RunnerEvidence {
            session_id,
            step_id: "s1".into(),
            evidence_id: Uuid::new_v4(),
            timestamp: "2026-08-01T00:00:00Z".into(),
            evidence_type: "unit_test".into(),
            artifact_hash: "a".repeat(64),
            verification_metadata: Map::new(),
            capability_used: "read_file".into(),
            human_confirmation_proof: None,
            plan_hash: "b".repeat(64),
            prev_evidence_hash: None,
            evidence_hash: "c".repeat(64),
            extra: Map::new(),
        };
        (dod, plan, evidence)
    }

    #[test]
    fn happy_path_validates() {
        let (dod, plan, evidence) = happy_path();
        let mut seen = HashSet::new();
        assert!(validate_evidence(&evidence, &plan, &dod, &mut seen).is_ok());
    }

    #[test]
    fn capability_not_in_plan_is_rejected() {
        let (dod, plan, mut evidence) = happy_path();
        evidence.capability_used = "delete_file".into();
        let mut seen = HashSet::new();
        let err = validate_evidence(&evidence, &plan, &dod, &mut seen).unwrap_err();
        assert_eq!(err.code, ErrorCode::EvidenceCapNotAllowed);
    }

    #[test]
    fn unregistered_capability_is_rejected() {
        let (dod, plan, mut evidence) = happy_path();
        evidence.capability_used = "launch_missiles".into();
        let mut seen = HashSet::new();
        let err = validate_evidence(&evidence, &plan, &dod, &mut seen).unwrap_err();
        assert_eq!(err.code, ErrorCode::EvidenceCapUnregistered);
    }

    #[test]
    fn duplicate_evidence_id_is_rejected() {
        let (dod, plan, evidence) = happy_path();
        let mut seen = HashSet::new();
        assert!(validate_evidence(&evidence, &plan, &dod, &mut seen).is_ok());
        let err = validate_evidence(&evidence, &plan, &dod, &mut seen).unwrap_err();
        assert_eq!(err.code, ErrorCode::EvidenceDuplicate);
    }

    #[test]
    fn unknown_step_is_rejected() {
        let (dod, plan, mut evidence) = happy_path();
        evidence.step_id = "does-not-exist".into();
        let mut seen = HashSet::new();
        let err = validate_evidence(&evidence, &plan, &dod, &mut seen).unwrap_err();
        assert_eq!(err.code, ErrorCode::EvidenceStepUnknown);
    }

    #[test]
    fn evidence_type_mismatch_is_rejected() {
        let (dod, plan, mut evidence) = happy_path();
        evidence.evidence_type = "manual_review".into();
        let mut seen = HashSet::new();
        let err = validate_evidence(&evidence, &plan, &dod, &mut seen).unwrap_err();
        assert_eq!(err.code, ErrorCode::EvidenceTypeMismatch);
    }

    #[test]
    fn missing_human_confirmation_is_rejected() {
        let (dod, mut plan, mut evidence) = happy_path();
        plan.steps[0].required_capabilities = vec!["delete_file".into()];
        plan.allowed_capabilities = vec!["delete_file".into()];
        evidence.capability_used = "delete_file".into();
        evidence.evidence_type = "unit_test".into();
        let mut seen = HashSet::new();
        let err = validate_evidence(&evidence, &plan, &dod, &mut seen).unwrap_err();
        assert_eq!(err.code, ErrorCode::EvidenceHumanConfirmMissing);
    }
}
