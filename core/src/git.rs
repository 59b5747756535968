//! Minimal git interrogation for record metadata.

use crate::error::Error;
use crate::error::Result;
use std::path::Path;
use std::process::Stdio;
use terrascope_protocol::CommitSha;
use tokio::process::Command;

/// Resolve the commit the working tree in `dir` currently points at.
pub async fn current_sha(dir: &Path) -> Result<CommitSha> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| Error::Spawn {
            command: "git rev-parse HEAD".to_string(),
            dir: dir.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: "git rev-parse HEAD".to_string(),
            dir: dir.to_path_buf(),
            output: crate::exec::sanitize_output(&output.stderr),
        });
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(CommitSha(sha))
}
