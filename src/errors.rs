// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in task references: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("compose() was already called on this instance")]
    AlreadyComposed,

    #[error("{0} cannot be used as a task function")]
    NotRunnable(String),

    #[error("{0} cannot be piped into a stream")]
    NotPipeable(String),

    #[error("File not found with singular glob: {0} (set allow_empty to ignore)")]
    SingularGlob(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Task '{task}' failed: {reason}")]
    TaskFailed { task: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ComposeError>;
