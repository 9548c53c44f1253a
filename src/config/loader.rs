// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ComposeFile, RawComposeFile};
use crate::errors::Result;

/// Read and deserialize a composefile without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawComposeFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let raw: RawComposeFile = toml::from_str(&contents)?;
    debug!(path = %path.display(), tasks = raw.task.len(), "loaded composefile");
    Ok(raw)
}

/// Read a composefile and validate it. This is the entry point the CLI
/// uses.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ComposeFile> {
    let raw = load_from_path(&path)?;
    ComposeFile::try_from(raw)
}

/// `Composefile.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Composefile.toml")
}
