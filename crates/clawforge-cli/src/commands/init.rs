use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;

/// `clawctl init`: creates the artifact root and the audit database's
/// parent directory, then opens the database once to apply its schema.
pub fn handle_init(config: &AppConfig) -> Result<i32> {
    std::fs::create_dir_all(&config.artifact_root).context("failed to create artifact root")?;
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    clawforge_audit::AuditStore::open(&config.db_path).context("failed to initialize audit database")?;

    info!(artifact_root = %config.artifact_root.display(), db_path = %config.db_path.display(), "clawforge workspace initialized");
    println!("initialized clawforge workspace at {}", config.artifact_root.display());
    Ok(0)
}
