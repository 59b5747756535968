//! Turns one directory into one plan record.
//!
//! The configured command list runs in order: every command but the
//! last is a setup stage whose failure aborts the directory, and the
//! last command's stdout is parsed as the plan document. The finished
//! record is posted to the collector under a key derived from the
//! (possibly clipped) directory path.

use crate::dispatch::DirectoryDispatcher;
use crate::error::Error;
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::git;
use chrono::Utc;
use std::path::Path;
use std::time::Duration;
use terrascope_protocol::CommitSha;
use terrascope_protocol::Plan;
use terrascope_protocol::PlanRecord;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Collector base address records are posted to.
    pub collector: String,
    /// Command sequence; the last entry must print the plan document.
    pub commands: Vec<Vec<String>>,
    /// Per-command run timeout before the interrupt escalation starts.
    pub run_timeout: Duration,
    /// Trailing path segments of the directory to keep in the
    /// destination key; zero keeps the whole path.
    pub clip_last: usize,
}

pub struct PlanPipeline {
    config: PipelineConfig,
    runner: CommandRunner,
    http: reqwest::Client,
    env: Vec<(String, String)>,
}

impl PlanPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let runner = CommandRunner::new(config.run_timeout);
        Self {
            config,
            runner,
            http: reqwest::Client::new(),
            env: command_env(),
        }
    }

    /// Convenience: wrap this pipeline in a dispatcher with the given
    /// worker count.
    pub fn into_dispatcher(self, parallel: usize) -> DirectoryDispatcher {
        DirectoryDispatcher::new(self, parallel)
    }

    /// Plan one directory and post the result to the collector.
    /// Transmission failures are logged, never returned.
    pub async fn process_dir(&self, dir: &Path) -> Result<()> {
        tracing::info!(dir = %dir.display(), "processing dir");
        let record = self.build_record(dir).await?;
        self.transmit(dir, &record).await;
        Ok(())
    }

    /// Run the command sequence and assemble the timestamped record.
    pub async fn build_record(&self, dir: &Path) -> Result<PlanRecord> {
        let start = Utc::now();

        let commit_sha = match git::current_sha(dir).await {
            Ok(sha) => sha,
            Err(err) => {
                tracing::error!(dir = %dir.display(), error = %err, "failed to get HEAD commit");
                CommitSha::default()
            }
        };

        let (plan, command) = self.produce_plan(dir).await?;

        Ok(PlanRecord {
            plan: Some(plan),
            start,
            end: Utc::now(),
            commit_sha,
            command,
            succeeded: true,
            ..Default::default()
        })
    }

    async fn produce_plan(&self, dir: &Path) -> Result<(Plan, String)> {
        let Some((capture, setup)) = self.config.commands.split_last() else {
            return Err(Error::EmptyCommand);
        };

        for argv in setup {
            if let Err(err) = self.runner.run_setup(argv, dir, &self.env).await {
                tracing::error!(dir = %dir.display(), error = %err, "error running command");
                return Err(err);
            }
        }

        let stdout = match self.runner.run_capture(capture, dir, &self.env).await {
            Ok(stdout) => stdout,
            Err(err) => {
                tracing::error!(dir = %dir.display(), error = %err, "error running command");
                return Err(err);
            }
        };

        let mut plan = match serde_json::from_slice::<Plan>(&stdout) {
            Ok(plan) => plan,
            Err(err) => {
                // Collectors expect a record even for unparseable
                // output, so degrade to an empty document.
                tracing::error!(dir = %dir.display(), error = %err, "failed to parse plan output");
                Plan::default()
            }
        };

        // Variables likely contain sensitive values; drop them before
        // the plan can be serialized anywhere.
        plan.clear_variables();

        Ok((plan, capture.join(" ")))
    }

    async fn transmit(&self, dir: &Path, record: &PlanRecord) {
        let key = clip_path(dir, self.config.clip_last);
        let collector = &self.config.collector;
        let url = format!("{collector}/{key}");
        tracing::info!(url = %url, "posting results");

        if let Err(err) = self.http.post(&url).json(record).send().await {
            tracing::error!(url = %url, error = %err, "failed to send results");
        }
    }
}

/// Keep only the last `clip_last` segments of a directory path when
/// deriving the destination key. A pure string transform; execution
/// always uses the full path.
pub fn clip_path(dir: &Path, clip_last: usize) -> String {
    let full = dir.display().to_string();
    if clip_last == 0 {
        return full;
    }

    let parts: Vec<&str> = full.split('/').collect();
    if parts.len() > clip_last {
        parts[parts.len() - clip_last..].join("/")
    } else {
        full
    }
}

/// Parse a `;`-separated command list into argv vectors. Arguments are
/// split on whitespace; there is no shell-quoting support.
pub fn parse_command_list(spec: &str) -> Vec<Vec<String>> {
    spec.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.split_whitespace().map(str::to_string).collect())
        .collect()
}

/// The environment handed to every child command: the parent
/// environment with `TERM` withheld, so tools cannot inject terminal
/// control sequences into captured output.
fn command_env() -> Vec<(String, String)> {
    std::env::vars().filter(|(name, _)| name != "TERM").collect()
}
