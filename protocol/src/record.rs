//! The stored-record schema produced by one pipeline run.

use crate::Branch;
use crate::CommitSha;
use crate::Plan;
use crate::Repo;
use crate::Workspace;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Result of planning one directory once.
///
/// Owned by the pipeline invocation that creates it and immutable once
/// serialized. `output` carries captured command output only when the
/// run produced no plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,

    #[serde(rename = "start-time")]
    pub start: DateTime<Utc>,

    #[serde(rename = "end-time")]
    pub end: DateTime<Utc>,

    #[serde(rename = "commit-sha", default)]
    pub commit_sha: CommitSha,

    #[serde(default)]
    pub repo: Repo,

    #[serde(default)]
    pub branch: Branch,

    #[serde(default)]
    pub workspace: Workspace,

    /// The command line that produced the plan document.
    #[serde(default)]
    pub command: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output: String,

    #[serde(rename = "success")]
    pub succeeded: bool,
}

impl Default for PlanRecord {
    fn default() -> Self {
        Self {
            plan: None,
            start: DateTime::UNIX_EPOCH,
            end: DateTime::UNIX_EPOCH,
            commit_sha: CommitSha::default(),
            repo: Repo::default(),
            branch: Branch::default(),
            workspace: Workspace::default(),
            command: String::new(),
            output: String::new(),
            succeeded: false,
        }
    }
}
