use anyhow::Result;

use crate::config::AppConfig;

/// `clawctl config show`: prints the resolved database path and artifact
/// root, either as human-readable text or as JSON.
pub fn handle_config_show(config: &AppConfig, json: bool) -> Result<i32> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("db_path: {}", config.db_path.display());
        println!("artifact_root: {}", config.artifact_root.display());
    }
    Ok(0)
}
