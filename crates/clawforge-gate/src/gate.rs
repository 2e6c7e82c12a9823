use serde::{Deserialize, Serialize};

use clawforge_model::{is_recognized_verification_method, DecisionLock, DefinitionOfDone};

const MAX_GOAL_LEN: usize = 4096;

/// Result of one named gate check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateCheck {
    pub id: String,
    pub description: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GateCheck {
    fn pass(id: &str, description: &str) -> Self {
        Self { id: id.to_string(), description: description.to_string(), passed: true, reason: None }
    }

    fn fail(id: &str, description: &str, reason: impl Into<String>) -> Self {
        Self { id: id.to_string(), description: description.to_string(), passed: false, reason: Some(reason.into()) }
    }
}

/// Outcome of evaluating the Execution Gate: every check that was run, and
/// the overall pass/fail derived from them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateResult {
    pub passed: bool,
    pub checks: Vec<GateCheck>,
}

/// Pure predicate deciding whether a session may proceed to plan binding and
/// execution. Evaluates every check unconditionally so the caller sees every
/// failing reason at once; never short-circuits.
#[must_use]
pub fn evaluate_execution_gate(dod: &DefinitionOfDone, lock: &DecisionLock) -> GateResult {
    let mut checks = Vec::with_capacity(5);

    checks.push(if lock.dod_id == dod.dod_id {
        GateCheck::pass("lock_dod_id_matches", "lock.dodId equals dod.dodId")
    } else {
        GateCheck::fail(
            "lock_dod_id_matches",
            "lock.dodId equals dod.dodId",
            format!("lock.dodId={} does not match dod.dodId={}", lock.dod_id, dod.dod_id),
        )
    });

    checks.push(if lock.session_id == dod.session_id {
        GateCheck::pass("session_ids_match", "lock.sessionId equals dod.sessionId")
    } else {
        GateCheck::fail(
            "session_ids_match",
            "lock.sessionId equals dod.sessionId",
            format!("lock.sessionId={} does not match dod.sessionId={}", lock.session_id, dod.session_id),
        )
    });

    checks.push(if dod.items.is_empty() {
        GateCheck::fail("dod_non_empty", "DoD has at least one item", "DoD.items is empty")
    } else {
        GateCheck::pass("dod_non_empty", "DoD has at least one item")
    });

    let missing_method = dod.items.iter().find(|item| item.verification_method.trim().is_empty());
    checks.push(match missing_method {
        Some(item) => GateCheck::fail(
            "every_item_has_verification_method",
            "every DoD item has a populated verificationMethod",
            format!("item {} has an empty verificationMethod", item.id),
        ),
        None => GateCheck::pass("every_item_has_verification_method", "every DoD item has a populated verificationMethod"),
    });

    checks.push(if lock.goal.trim().is_empty() {
        GateCheck::fail("goal_non_empty", "lock.goal is non-empty and length-bounded", "lock.goal is empty")
    } else if lock.goal.chars().count() > MAX_GOAL_LEN {
        GateCheck::fail(
            "goal_non_empty",
            "lock.goal is non-empty and length-bounded",
            format!("lock.goal exceeds {MAX_GOAL_LEN} characters"),
        )
    } else {
        GateCheck::pass("goal_non_empty", "lock.goal is non-empty and length-bounded")
    });

    let unrecognized: Vec<&str> = dod
        .items
        .iter()
        .map(|item| item.verification_method.as_str())
        .filter(|m| !is_recognized_verification_method(m))
        .collect();
    checks.push(if unrecognized.is_empty() {
        GateCheck::pass("verification_methods_recognized", "every verification method is a recognized enum value")
    } else {
        GateCheck::fail(
            "verification_methods_recognized",
            "every verification method is a recognized enum value",
            format!("unrecognized verification methods: {}", unrecognized.join(", ")),
        )
    });

    let passed = checks.iter().all(|c| c.passed);
    GateResult { passed, checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use uuid::Uuid;
    use clawforge_model::DodItem;

    fn sample() -> (DefinitionOfDone, DecisionLock) {
        let session_id = Uuid::new_v4();
        let dod_id = Uuid::new_v4();
        let dod = DefinitionOfDone {
            dod_id,
            session_id,
            items: vec![DodItem {
                id: "d1".into(),
                description: "add hash check".into(),
                verification_method: "unit_test".into(),
                extra: Map::new(),
            }],
            extra: Map::new(),
        };
        let lock = DecisionLock {
            lock_id: Uuid::new_v4(),
            session_id,
            dod_id,
            goal: "add hash check".into(),
            plan_hash: None,
            extra: Map::new(),
        };
        (dod, lock)
    }

    #[test]
    fn happy_path_passes_every_check() {
        let (dod, lock) = sample();
        let result = evaluate_execution_gate(&dod, &lock);
        assert!(result.passed);
        assert!(result.checks.iter().all(|c| c.passed));
    }

    #[test]
    fn empty_dod_items_fails_gate() {
        let (mut dod, lock) = sample();
        dod.items.clear();
        let result = evaluate_execution_gate(&dod, &lock);
        assert!(!result.passed);
        assert!(result.checks.iter().any(|c| c.id == "dod_non_empty" && !c.passed));
    }

    #[test]
    fn gate_totality_runs_every_check_even_with_multiple_failures() {
        let (mut dod, mut lock) = sample();
        dod.items.clear();
        lock.goal = String::new();
        let result = evaluate_execution_gate(&dod, &lock);
        assert_eq!(result.checks.len(), 6);
        assert!(!result.passed);
        let failing: Vec<&str> = result.checks.iter().filter(|c| !c.passed).map(|c| c.id.as_str()).collect();
        assert!(failing.contains(&"dod_non_empty"));
        assert!(failing.contains(&"goal_non_empty"));
    }

    #[test]
    fn passed_iff_all_checks_passed() {
        let (dod, lock) = sample();
        let result = evaluate_execution_gate(&dod, &lock);
        assert_eq!(result.passed, result.checks.iter().all(|c| c.passed));
    }
}
