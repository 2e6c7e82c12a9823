use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use clawforge_gate::evaluate_execution_gate;
use clawforge_model::{DecisionLock, DefinitionOfDone, ExecutionPlan, PatchArtifact, StepEnvelope};
use clawforge_review::{run_reviewers, ReviewOutcome};

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))?;
    serde_json::from_value(value).with_context(|| format!("{} does not match the expected shape", path.display()))
}

/// `clawctl run-gate --dod --lock`: evaluates the Execution Gate over a
/// DoD and Decision Lock pair. Exit codes: 0 passed, 1 input invalid,
/// 2 gate failed.
pub fn handle_run_gate(dod_path: &Path, lock_path: &Path, json: bool) -> Result<i32> {
    let dod: DefinitionOfDone = match read_json(dod_path) {
        Ok(v) => v,
        Err(err) => {
            report_error(json, &err.to_string());
            return Ok(1);
        }
    };
    let lock: DecisionLock = match read_json(lock_path) {
        Ok(v) => v,
        Err(err) => {
            report_error(json, &err.to_string());
            return Ok(1);
        }
    };

    let result = evaluate_execution_gate(&dod, &lock);
    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({"passed": result.passed, "checks": result.checks}))?);
    } else {
        println!("gate {}", if result.passed { "passed" } else { "failed" });
        for check in &result.checks {
            let mark = if check.passed { "ok" } else { "FAIL" };
            println!("  [{mark}] {} — {}", check.id, check.description);
            if let Some(reason) = &check.reason {
                println!("        {reason}");
            }
        }
    }
    Ok(if result.passed { 0 } else { 2 })
}

/// `clawctl review-step --envelope --patch --dod --lock --plan`: runs the
/// role-ordered reviewer orchestrator over one step. Exit codes: 0
/// approved, 1 input invalid, 3 rejected.
pub fn handle_review_step(envelope_path: &Path, patch_path: &Path, dod_path: &Path, lock_path: &Path, plan_path: &Path, json: bool) -> Result<i32> {
    let envelope: StepEnvelope = match read_json(envelope_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid_input(json, &err.to_string())),
    };
    let patch: PatchArtifact = match read_json(patch_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid_input(json, &err.to_string())),
    };
    let dod: DefinitionOfDone = match read_json(dod_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid_input(json, &err.to_string())),
    };
    let lock: DecisionLock = match read_json(lock_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid_input(json, &err.to_string())),
    };
    let plan: ExecutionPlan = match read_json(plan_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid_input(json, &err.to_string())),
    };

    match run_reviewers(&envelope, &patch, &dod, &lock, &plan) {
        ReviewOutcome::Approved { reports } => {
            if json {
                println!("{}", serde_json::json!({"approved": true, "reports": reports}));
            } else {
                println!("approved ({} roles)", reports.len());
            }
            Ok(0)
        }
        ReviewOutcome::Rejected { role, violations, reports } => {
            if json {
                println!("{}", serde_json::json!({"approved": false, "rejectedBy": role, "violations": violations, "reports": reports}));
            } else {
                println!("rejected by {}", role.as_str());
                for violation in &violations {
                    println!("  - {violation}");
                }
            }
            Ok(3)
        }
    }
}

fn invalid_input(json: bool, message: &str) -> i32 {
    report_error(json, message);
    1
}

fn report_error(json: bool, message: &str) {
    if json {
        println!("{}", serde_json::json!({"error": message}));
    } else {
        println!("error: {message}");
    }
}
