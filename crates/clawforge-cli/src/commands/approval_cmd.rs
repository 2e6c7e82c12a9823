use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use clawforge_approval::verify_bundle;
use clawforge_model::ApprovalBundle;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))?;
    serde_json::from_value(value).with_context(|| format!("{} does not match the expected shape", path.display()))
}

/// `clawctl verify-approval --bundle --keys`: verifies an approval
/// bundle's signatures against a JSON map of `approverId -> PEM public
/// key`. Exit codes: 0 valid, 1 input invalid, 3 signature/nonce failure.
pub fn handle_verify_approval(bundle_path: &Path, keys_path: &Path, json: bool) -> Result<i32> {
    let bundle: ApprovalBundle = match read_json(bundle_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid(json, &err.to_string())),
    };
    let keys: HashMap<String, String> = match read_json(keys_path) {
        Ok(v) => v,
        Err(err) => return Ok(invalid(json, &err.to_string())),
    };

    let mut seen_nonces = HashSet::new();
    match verify_bundle(&bundle, &|approver_id: &str| keys.get(approver_id).cloned(), &mut seen_nonces) {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({"valid": true}));
            } else {
                println!("approval bundle valid");
            }
            Ok(0)
        }
        Err(err) => {
            if json {
                println!("{}", serde_json::json!({"valid": false, "code": err.code, "message": err.message, "details": err.details}));
            } else {
                println!("approval bundle invalid: {}", err.message);
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
