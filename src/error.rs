//! Error types for the remotes library
//!
//! Library functions return [`Result<T>`]; the command layer and the binary
//! wrap these in `anyhow` for display.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::TaskState;

/// Main error type for goobits-remotes operations
#[derive(Error, Debug)]
pub enum Error {
    /// The config file could not be read from disk.
    #[error("could not read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file was read but its contents are not usable.
    #[error("invalid config: {message}")]
    ConfigParse { message: String },

    /// Neither `XDG_CONFIG_HOME` nor a home directory is available.
    #[error("could not determine the config directory")]
    NoConfigDir,

    /// The repository and remote selectors resolved to zero tasks.
    #[error("no matching repositories or remotes found")]
    NoMatchingTasks,

    /// At least one working copy could not be created; no sync task ran.
    #[error("repository initialisation failed: {}", failed.join(", "))]
    InitFailed { failed: Vec<String> },

    /// The run was cancelled before every task finished.
    #[error("interrupted")]
    Interrupted,

    /// A state change that would break the Pending → Running → terminal order.
    #[error("task {key} cannot move from {from} to {to}")]
    InvalidTransition {
        key: String,
        from: TaskState,
        to: TaskState,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Template(#[from] indicatif::style::TemplateError),
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;
