use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use clawforge_evidence::verify_evidence_chain;
use clawforge_model::{DefinitionOfDone, ExecutionPlan, RunnerEvidence};

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))?;
    serde_json::from_value(value).with_context(|| format!("{} does not match the expected shape", path.display()))
}

/// `clawctl verify-evidence --evidence --plan --dod --plan-hash`: verifies
/// an ordered evidence chain against its bound plan. Exit codes: 0 valid,
/// 1 input invalid, 3 chain broken.
pub fn handle_verify_evidence(evidence_path: &Path, plan_path: &Path, dod_path: &Path, plan_hash: &str, json: bool) -> Result<i32> {
    let evidences: Vec<RunnerEvidence> = match read_json(evidence_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid(json, &err.to_string())),
    };
    let plan: ExecutionPlan = match read_json(plan_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid(json, &err.to_string())),
    };
    let dod: DefinitionOfDone = match read_json(dod_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid(json, &err.to_string())),
    };

    match verify_evidence_chain(&evidences, &plan, &dod, plan_hash) {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({"valid": true}));
            } else {
                println!("evidence chain valid ({} entries)", evidences.len());
            }
            Ok(0)
        }
        Err(err) => {
            if json {
                println!("{}", serde_json::json!({"valid": false, "code": err.code, "message": err.message, "details": err.details}));
            } else {
                println!("evidence chain invalid: {}", err.message);
            }
            Ok(3)
        }
    }
}

fn invalid(json: bool, message: &str) -> i32 {
    if json {
        println!("{}", serde_json::json!({"error": message}));
    } else {
        println!("error: {message}");
    }
    1
}
