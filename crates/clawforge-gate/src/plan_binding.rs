use clawforge_canon::sha256_hex_of;
use clawforge_model::{ClawforgeError, ClawforgeResult, DecisionLock, ErrorCode, ExecutionPlan};

/// Computes the plan hash: SHA-256 over the canonical encoding of the whole
/// plan. No fields are currently excluded from plan identity.
pub fn compute_plan_hash(plan: &ExecutionPlan) -> ClawforgeResult<String> {
    sha256_hex_of(plan).map_err(|e| ClawforgeError::new(ErrorCode::PlanHashMismatch, e.to_string()))
}

/// Verifies that `lock.planHash` is present and equals `computePlanHash(plan)`.
pub fn validate_plan_hash_binding(plan: &ExecutionPlan, lock: &DecisionLock) -> ClawforgeResult<()> {
    let Some(stored) = &lock.plan_hash else {
        return Err(ClawforgeError::field(ErrorCode::PlanHashMissing, "planHash", "lock.planHash is not set"));
    };
    let computed = compute_plan_hash(plan)?;
    if &computed != stored {
        return Err(ClawforgeError::new(ErrorCode::PlanHashMismatch, "computed plan hash does not match lock.planHash")
            .with_detail("expected", stored.clone())
            .with_detail("got", computed));
    }
    Ok(())
}

/// Sanity check preceding the gate: a plan's raw JSON text must literally
/// contain the lock's goal string.
pub fn validate_plan_contains_goal(plan: &ExecutionPlan, lock: &DecisionLock) -> ClawforgeResult<()> {
    let plan_json = serde_json::to_string(plan)
        .map_err(|e| ClawforgeError::new(ErrorCode::PlanSchemaInvalid, e.to_string()))?;
    if plan_json.contains(&lock.goal) {
        Ok(())
    } else {
        Err(ClawforgeError::field(
            ErrorCode::PlanSchemaInvalid,
            "goal",
            "execution plan text does not contain the lock's goal string",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawforge_model::{PlanStep, StepVerification};
    use serde_json::Map;
    use uuid::Uuid;

    fn sample_plan(goal: &str, session_id: Uuid, dod_id: Uuid, lock_id: Uuid) -> ExecutionPlan {
        ExecutionPlan {
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
            completion_criteria: vec![format!("goal achieved: {goal}")],
            extra: Map::new(),
        }
    }

    #[test]
    fn plan_hash_is_deterministic() {
        let session_id = Uuid::new_v4();
        let dod_id = Uuid::new_v4();
        let lock_id = Uuid::new_v4();
        let plan = sample_plan("add hash check", session_id, dod_id, lock_id);
        let h1 = compute_plan_hash(&plan).unwrap();
        let h2 = compute_plan_hash(&plan).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn missing_plan_hash_is_rejected() {
        let session_id = Uuid::new_v4();
        let dod_id = Uuid::new_v4();
        let lock_id = Uuid::new_v4();
        let plan = sample_plan("add hash check", session_id, dod_id, lock_id);
        let lock = DecisionLock {
            lock_id,
            session_id,
            dod_id,
            goal: "add hash check".into(),
            plan_hash: None,
            extra: Map::new(),
        };
        let err = validate_plan_hash_binding(&plan, &lock).unwrap_err();
        assert_eq!(err.code, ErrorCode::PlanHashMissing);
    }

    #[test]
    fn mismatched_plan_hash_is_rejected_with_expected_and_got() {
        let session_id = Uuid::new_v4();
        let dod_id = Uuid::new_v4();
        let lock_id = Uuid::new_v4();
        let plan = sample_plan("add hash check", session_id, dod_id, lock_id);
        let lock = DecisionLock {
            lock_id,
            session_id,
            dod_id,
            goal: "add hash check".into(),
            plan_hash: Some("0".repeat(64)),
            extra: Map::new(),
        };
        let err = validate_plan_hash_binding(&plan, &lock).unwrap_err();
        assert_eq!(err.code, ErrorCode::PlanHashMismatch);
        assert!(err.details.contains_key("expected"));
        assert!(err.details.contains_key("got"));
    }

    #[test]
    fn plan_missing_goal_substring_fails_sanity_check() {
        let session_id = Uuid::new_v4();
        let dod_id = Uuid::new_v4();
        let lock_id = Uuid::new_v4();
        let plan = sample_plan("add hash check", session_id, dod_id, lock_id);
        let lock = DecisionLock {
            lock_id,
            session_id,
            dod_id,
            goal: "totally different goal".into(),
            plan_hash: None,
            extra: Map::new(),
        };
        assert!(validate_plan_contains_goal(&plan, &lock).is_err());
    }
}
