use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;
use uuid::Uuid;
use zip::write::FileOptions;
use zip::ZipWriter;

use clawforge_audit::AuditStore;

use crate::config::AppConfig;

/// `clawctl export-evidence --run --out`: bundles a run's audit log and
/// (unless `--no-artifacts`) its attached artifact files into one ZIP
/// archive. Files larger than `max_include_bytes` are skipped and noted.
pub fn handle_export_evidence(config: &AppConfig, run: Uuid, out: &Path, max_include_bytes: Option<u64>, no_artifacts: bool) -> Result<i32> {
    let store = AuditStore::open(&config.db_path).context("failed to open audit database")?;
    let events = store.list_events(run).context("failed to list events")?;

    let zip_file = File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
    let mut writer = ZipWriter::new(zip_file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    writer.start_file("events.json", options).context("failed to start events.json entry")?;
    writer.write_all(serde_json::to_string_pretty(&events)?.as_bytes()).context("failed to write events.json entry")?;

    let mut skipped = Vec::new();
    if !no_artifacts {
        let attachments_dir = config.artifact_root.join(run.to_string()).join("attachments");
        if attachments_dir.is_dir() {
            for entry in std::fs::read_dir(&attachments_dir).context("failed to list attachments")? {
                let entry = entry?;
                let metadata = entry.metadata()?;
                if let Some(max) = max_include_bytes {
                    if metadata.len() > max {
                        skipped.push(entry.file_name().to_string_lossy().into_owned());
                        continue;
                    }
                }
                let mut file = File::open(entry.path())?;
                let mut contents = Vec::new();
                file.read_to_end(&mut contents)?;
                writer
                    .start_file(format!("attachments/{}", entry.file_name().to_string_lossy()), options)
                    .context("failed to start attachment entry")?;
                writer.write_all(&contents)?;
            }
        }
    }

    if !skipped.is_empty() {
        writer.start_file("skipped.json", options).context("failed to start skipped.json entry")?;
        writer.write_all(serde_json::to_string_pretty(&skipped)?.as_bytes())?;
        warn!(count = skipped.len(), "skipped oversized attachments during evidence export");
    }

    writer.finish().context("failed to finalize zip archive")?;
    println!("{}", serde_json::json!({"run": run, "out": out, "events": events.len(), "skipped": skipped}));
    Ok(0)
}
