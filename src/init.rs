use crate::config::Config;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Creates the export directory and the directory holding the history file.
pub async fn ensure_directories(cfg: &Config) -> Result<()> {
    let mut dirs: Vec<&Path> = vec![cfg.output_dir.as_path()];
    if let Some(parent) = cfg.history_path.parent() {
        dirs.push(parent);
    }

    for dir in dirs {
        if dir.as_os_str().is_empty() || dir.exists() {
            continue;
        }
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        tracing::info!("Created directory: {}", dir.display());
    }
    Ok(())
}
