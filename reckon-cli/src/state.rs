use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn reckon_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".reckon"))
}

/// Resolve and create the data directory: `--data-dir` wins, else ~/.reckon.
pub fn ensure_data_dir(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match override_dir {
        Some(dir) => dir,
        None => reckon_home()?,
    };
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
