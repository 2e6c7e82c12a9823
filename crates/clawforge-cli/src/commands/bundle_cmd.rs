use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use clawforge_bundle::{compute_bundle_hash, ArtifactBundle};

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))?;
    serde_json::from_value(value).with_context(|| format!("{} does not match the expected shape", path.display()))
}

/// `clawctl bundle-hash --bundle`: reads one `ArtifactBundle` JSON document
/// and prints its normalized content hash. Exit codes: 0 computed,
/// 1 input invalid.
pub fn handle_bundle_hash(bundle_path: &Path, json: bool) -> Result<i32> {
    let bundle: ArtifactBundle = match read_json(bundle_path) {
        Ok(v) => v,
        Err(err) => {
            if json {
                println!("{}", serde_json::json!({"error": err.to_string()}));
            } else {
                println!("error: {err}");
            }
            return Ok(1);
        }
    };

    match compute_bundle_hash(&bundle) {
        Ok(hash) => {
            if json {
                println!("{}", serde_json::json!({"bundleHash": hash}));
            } else {
                println!("{hash}");
            }
            Ok(0)
        }
        Err(err) => {
            if json {
                println!("{}", serde_json::json!({"error": err.message}));
            } else {
                println!("error: {}", err.message);
            }
            Ok(1)
        }
    }
}
