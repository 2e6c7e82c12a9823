use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

use clawforge_audit::AuditStore;
use clawforge_canon::sha256_hex;

use crate::config::AppConfig;

/// `clawctl put-artifact --run --file`: copies a file into the run's
/// artifact directory and records its hash in the audit log.
pub fn handle_put_artifact(config: &AppConfig, run: Uuid, file: &Path, mime: Option<&str>, label: Option<&str>) -> Result<i32> {
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let hash = sha256_hex(&bytes);

    let file_name = label.map(str::to_string).or_else(|| file.file_name().map(|n| n.to_string_lossy().into_owned())).context("could not determine a destination file name")?;

    let run_dir = config.artifact_root.join(run.to_string()).join("attachments");
    std::fs::create_dir_all(&run_dir).context("failed to create run artifact directory")?;
    let destination = run_dir.join(&file_name);
    std::fs::write(&destination, &bytes).with_context(|| format!("failed to write {}", destination.display()))?;

    let store = AuditStore::open(&config.db_path).context("failed to open audit database")?;
    store
        .append_event(
            run,
            serde_json::json!({
                "kind": "artifact_put",
                "fileName": file_name,
                "mime": mime,
                "sizeBytes": bytes.len(),
                "sha256": hash,
            }),
        )
        .context("failed to record artifact_put event")?;

    println!("{}", serde_json::json!({"fileName": file_name, "sha256": hash, "path": destination}));
    Ok(0)
}
