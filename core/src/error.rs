//! Error taxonomy for the runner and aggregation subsystems.
//!
//! Nothing here is process-fatal: callers log a unit's failure and move
//! on, so every variant carries enough context (command, directory,
//! sanitized output) to be useful as a log line on its own.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("empty command line")]
    EmptyCommand,

    #[error("failed to spawn `{command}` in {dir}: {source}")]
    Spawn {
        command: String,
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("command `{command}` failed in {dir}: {output}")]
    CommandFailed {
        command: String,
        dir: PathBuf,
        /// Captured output with terminal control sequences stripped.
        output: String,
    },

    #[error("command `{command}` in {dir} exceeded {limit:?} and was killed")]
    Timeout {
        command: String,
        dir: PathBuf,
        limit: Duration,
    },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("path {path} exists but is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to parse plan in {path}: {source}")]
    PlanParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize record: {source}")]
    RecordSerialize { source: serde_json::Error },
}
