use std::path::PathBuf;

use serde::Serialize;

/// Runtime configuration for `clawctl`, resolved from environment variables
/// with the documented defaults under the user's home directory.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub artifact_root: PathBuf,
}

impl AppConfig {
    #[must_use]
    pub fn load() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let db_path = std::env::var("CLAWFORGE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&home).join(".clawforge").join("db.sqlite"));
        let artifact_root = std::env::var("CLAWFORGE_ARTIFACT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&home).join(".clawforge").join("artifacts"));
        Self { db_path, artifact_root }
    }
}
