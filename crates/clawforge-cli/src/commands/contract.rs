use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

use clawforge_model::schema;
use clawforge_model::{
    ApprovalBundle, ApprovalSignature, DecisionLock, DefinitionOfDone, ExecutionPlan, PatchArtifact, Policy, RunnerAttestation,
    RunnerEvidence, RunnerIdentity, SessionAnchor, StepEnvelope,
};

/// `clawctl validate-contract <file>`: reads an artifact JSON file,
/// dispatches to the matching structural validator based on its `kind`
/// field, and reports the result.
pub fn handle_validate_contract(file: &Path, json: bool) -> Result<i32> {
    let text = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", file.display()))?;

    let kind = value.get("kind").and_then(Value::as_str).map(str::to_string);
    let Some(kind) = kind else {
        warn!(file = %file.display(), "contract file has no \"kind\" field");
        report_failure(json, "unknown", "missing required top-level \"kind\" field");
        return Ok(1);
    };

    let outcome = validate_by_kind(&kind, value);
    match outcome {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({"kind": kind, "valid": true}));
            } else {
                println!("{kind}: valid");
            }
            Ok(0)
        }
        Err(message) => {
            report_failure(json, &kind, &message);
            Ok(1)
        }
    }
}

fn report_failure(json: bool, kind: &str, message: &str) {
    if json {
        println!("{}", serde_json::json!({"kind": kind, "valid": false, "error": message}));
    } else {
        println!("{kind}: invalid — {message}");
    }
}

fn validate_by_kind(kind: &str, value: Value) -> Result<(), String> {
    macro_rules! parse_and_validate {
        ($ty:ty, $validator:path) => {{
            let parsed: $ty = serde_json::from_value(value).map_err(|e| e.to_string())?;
            $validator(&parsed).map_err(|e| e.to_string())
        }};
    }

    match kind {
        "dod" => parse_and_validate!(DefinitionOfDone, schema::validate_dod),
        "decision_lock" | "lock" => parse_and_validate!(DecisionLock, schema::validate_lock),
        "execution_plan" | "plan" => parse_and_validate!(ExecutionPlan, schema::validate_plan),
        "step_envelope" | "envelope" => parse_and_validate!(StepEnvelope, schema::validate_envelope),
        "patch" | "patch_artifact" => parse_and_validate!(PatchArtifact, schema::validate_patch),
        "runner_evidence" | "evidence" => parse_and_validate!(RunnerEvidence, schema::validate_evidence_schema),
        "runner_identity" | "identity" => parse_and_validate!(RunnerIdentity, schema::validate_identity),
        "runner_attestation" | "attestation" => parse_and_validate!(RunnerAttestation, schema::validate_attestation_schema),
        "session_anchor" | "anchor" => parse_and_validate!(SessionAnchor, schema::validate_anchor_schema),
        "approval_signature" | "signature" => parse_and_validate!(ApprovalSignature, schema::validate_signature),
        "approval_bundle" | "bundle" => parse_and_validate!(ApprovalBundle, schema::validate_bundle),
        "policy" => parse_and_validate!(Policy, schema::validate_policy),
        other => Err(format!("unrecognized contract kind \"{other}\"")),
    }
}
