use clawforge_model::{DecisionLock, DefinitionOfDone, ExecutionPlan, FileChange, PatchArtifact, StepEnvelope};

use crate::symbols::extract_diff_paths;

/// The fixed, ordered reviewer roles. Orchestration proceeds left to right
/// and stops at the first role whose rules do not all pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    Static,
    Security,
    Qa,
    E2e,
    Automation,
}

pub const ROLE_ORDER: [ReviewerRole; 5] =
    [ReviewerRole::Static, ReviewerRole::Security, ReviewerRole::Qa, ReviewerRole::E2e, ReviewerRole::Automation];

impl ReviewerRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Security => "security",
            Self::Qa => "qa",
            Self::E2e => "e2e",
            Self::Automation => "automation",
        }
    }
}

/// What a reviewer role's evaluation found.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReviewerReport {
    pub role: ReviewerRole,
    pub passed: bool,
    pub violations: Vec<String>,
}

/// Per-step reviewer state. Terminal once a rejection occurs.
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    Approved { reports: Vec<ReviewerReport> },
    Rejected { role: ReviewerRole, violations: Vec<String>, reports: Vec<ReviewerReport> },
}

struct ReviewContext<'a> {
    envelope: &'a StepEnvelope,
    patch: &'a PatchArtifact,
    dod: &'a DefinitionOfDone,
    lock: &'a DecisionLock,
    plan: &'a ExecutionPlan,
}

/// Runs every reviewer role in order over a step's envelope and patch,
/// stopping at (and reporting) the first role whose rules don't all pass.
pub fn run_reviewers(
    envelope: &StepEnvelope,
    patch: &PatchArtifact,
    dod: &DefinitionOfDone,
    lock: &DecisionLock,
    plan: &ExecutionPlan,
) -> ReviewOutcome {
    let ctx = ReviewContext { envelope, patch, dod, lock, plan };
    let mut reports = Vec::with_capacity(ROLE_ORDER.len());

    for role in ROLE_ORDER {
        let violations = evaluate_role(role, &ctx);
        let passed = violations.is_empty();
        reports.push(ReviewerReport { role, passed, violations: violations.clone() });
        if !passed {
            return ReviewOutcome::Rejected { role, violations, reports };
        }
    }

    ReviewOutcome::Approved { reports }
}

fn evaluate_role(role: ReviewerRole, ctx: &ReviewContext<'_>) -> Vec<String> {
    match role {
        ReviewerRole::Static => rules_static(ctx),
        ReviewerRole::Security => rules_security(ctx),
        ReviewerRole::Qa => rules_qa(ctx),
        ReviewerRole::E2e => rules_e2e(ctx),
        ReviewerRole::Automation => rules_automation(ctx),
    }
}

fn rules_static(ctx: &ReviewContext<'_>) -> Vec<String> {
    let mut violations = Vec::new();
    if ctx.envelope.allowed_paths.is_empty() {
        return violations;
    }
    for change in &ctx.patch.file_changes {
        if !file_change_within_allowed_paths(change, &ctx.envelope.allowed_paths) {
            violations.push(format!("file change touches path outside envelope.allowedPaths: {}", change.path));
        }
    }
    violations
}

fn file_change_within_allowed_paths(change: &FileChange, allowed_paths: &[String]) -> bool {
    let touched = extract_diff_paths(&change.diff_text);
    let candidates: Vec<&str> = if touched.is_empty() { vec![change.path.as_str()] } else { touched.iter().map(String::as_str).collect() };
    candidates.iter().all(|path| allowed_paths.iter().any(|allowed| allowed == path))
}

fn rules_security(ctx: &ReviewContext<'_>) -> Vec<String> {
    let mut violations = Vec::new();
    let patch_text: String = ctx.patch.file_changes.iter().map(|c| c.diff_text.as_str()).collect::<Vec<_>>().join("\n");

    for forbidden in &ctx.plan.forbidden_actions {
        if patch_text.contains(forbidden.as_str()) {
            violations.push(format!("patch text contains forbidden action: {forbidden}"));
        }
    }

    if !ctx.plan.allowed_capabilities.is_empty() {
        for capability in clawforge_capability::CAPABILITIES {
            if patch_text.contains(capability.id) && !ctx.plan.allowed_capabilities.iter().any(|c| c == capability.id) {
                violations.push(format!("patch hints at capability outside plan.allowedCapabilities: {}", capability.id));
            }
        }
    }

    violations
}

fn rules_qa(ctx: &ReviewContext<'_>) -> Vec<String> {
    let mut violations = Vec::new();
    let referenced_methods: Vec<&str> = ctx
        .envelope
        .referenced_dod_items
        .iter()
        .filter_map(|item_id| ctx.dod.items.iter().find(|item| &item.id == item_id))
        .map(|item| item.verification_method.as_str())
        .collect();

    if referenced_methods.is_empty() {
        violations.push("envelope references no known DoD item".to_string());
    } else if !referenced_methods.iter().any(|method| *method == ctx.envelope.expected_evidence_type) {
        violations.push(format!(
            "envelope.expectedEvidenceType {} matches no referenced DoD item's verificationMethod",
            ctx.envelope.expected_evidence_type
        ));
    }
    violations
}

fn rules_e2e(ctx: &ReviewContext<'_>) -> Vec<String> {
    let mut violations = Vec::new();
    match ctx.plan.step(&ctx.envelope.step_id) {
        None => violations.push(format!("stepId {} does not exist in plan", ctx.envelope.step_id)),
        Some(step) if step.references.is_empty() => violations.push(format!("step {} has no references", step.step_id)),
        Some(_) => {}
    }
    if ctx.patch.step_id != ctx.envelope.step_id {
        violations.push("patch.stepId does not match envelope.stepId".to_string());
    }
    violations
}

fn rules_automation(ctx: &ReviewContext<'_>) -> Vec<String> {
    let mut violations = Vec::new();
    if ctx.envelope.lock_id != ctx.lock.lock_id {
        violations.push("envelope.lockId does not match lock.lockId".to_string());
    }
    if ctx.envelope.session_id != ctx.lock.session_id || ctx.envelope.session_id != ctx.dod.session_id {
        violations.push("envelope.sessionId does not match DoD/Lock sessionId".to_string());
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use uuid::Uuid;

    fn sample(allowed_paths: Vec<String>, diff_text: &str) -> (StepEnvelope, PatchArtifact, DefinitionOfDone, DecisionLock, ExecutionPlan) {
        let session_id = Uuid::new_v4();
        let dod_id = Uuid::new_v4();
        let lock_id = Uuid::new_v4();

        let dod = DefinitionOfDone {
            dod_id,
            session_id,
            items: vec![clawforge_model::DodItem {
                id: "d1".into(),
                description: "add a test".into(),
                verification_method: "unit_test".into(),
                extra: Map::new(),
            }],
            extra: Map::new(),
        };
        let lock = DecisionLock { lock_id, session_id, dod_id, goal: "add hash check".into(), plan_hash: None, extra: Map::new() };
        let plan = ExecutionPlan {
            session_id,
            dod_id,
            lock_id,
            steps: vec![clawforge_model::PlanStep {
                step_id: "s1".into(),
                ai_allowed: true,
                references: vec!["d1".into()],
                required_capabilities: vec!["read_file".into()],
                verification: clawforge_model::StepVerification { method: "unit_test".into(), extra: Map::new() },
                extra: Map::new(),
            }],
            allowed_capabilities: vec!["read_file".into()],
            forbidden_actions: vec!["rm -rf".into()],
            completion_criteria: vec!["all steps verified".into()],
            extra: Map::new(),
        };
        let envelope = StepEnvelope {
            step_id: "s1".into(),
            lock_id,
            session_id,
            referenced_dod_items: vec!["d1".into()],
            allowed_paths,
            expected_evidence_type: "unit_test".into(),
            extra: Map::new(),
        };
        let patch = PatchArtifact {
            step_id: "s1".into(),
            file_changes: vec![FileChange {
                path: "src/lib.rs".into(),
                added_lines: 1,
                removed_lines: 0,
                diff_text: diff_text.to_string(),
                extra: Map::new(),
            }],
            extra: Map::new(),
        };
        (envelope, patch, dod, lock, plan)
    }

    #[test]
    fn fully_compliant_step_is_approved() {
        let (envelope, patch, dod, lock, plan) =
            sample(vec!["src/lib.rs".into()], "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1 +1 @@\n-old\n+new\n");
        match run_reviewers(&envelope, &patch, &dod, &lock, &plan) {
            ReviewOutcome::Approved { reports } => assert_eq!(reports.len(), 5),
            ReviewOutcome::Rejected { role, violations, .. } => panic!("unexpected rejection by {role:?}: {violations:?}"),
        }
    }

    #[test]
    fn static_role_rejects_out_of_scope_file() {
        let (envelope, patch, dod, lock, plan) =
            sample(vec!["src/other.rs".into()], "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1 +1 @@\n-old\n+new\n");
        match run_reviewers(&envelope, &patch, &dod, &lock, &plan) {
            ReviewOutcome::Rejected { role, .. } => assert_eq!(role, ReviewerRole::Static),
            ReviewOutcome::Approved { .. } => panic!("expected rejection"),
        }
    }

    #[test]
    fn security_role_rejects_forbidden_action_text() {
        let (envelope, patch, dod, lock, plan) =
            sample(vec!["src/lib.rs".into()], "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1 +1 @@\n-old\n+rm -rf /\n");
        match run_reviewers(&envelope, &patch, &dod, &lock, &plan) {
            ReviewOutcome::Rejected { role, .. } => assert_eq!(role, ReviewerRole::Security),
            ReviewOutcome::Approved { .. } => panic!("expected rejection"),
        }
    }

    #[test]
    fn rejection_is_terminal_and_reports_only_attempted_roles() {
        let (envelope, patch, dod, lock, plan) =
            sample(vec!["src/other.rs".into()], "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1 +1 @@\n-old\n+new\n");
        match run_reviewers(&envelope, &patch, &dod, &lock, &plan) {
            ReviewOutcome::Rejected { reports, .. } => assert_eq!(reports.len(), 1),
            ReviewOutcome::Approved { .. } => panic!("expected rejection"),
        }
    }
}
