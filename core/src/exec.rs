//! Child-process execution with two-stage timeout enforcement.
//!
//! Every command runs under a watcher that sends SIGINT once the run
//! timeout elapses, giving the tool a chance to shut down cleanly. A
//! hard outer bound (`tokio::time::timeout` plus `kill_on_drop`) then
//! forcibly terminates anything that ignored the interrupt. The watcher
//! is retired through a `CancellationToken` drop guard, so it stops
//! exactly once no matter how the run ends.

use crate::error::Error;
use crate::error::Result;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Extra wall-clock allowance a setup command gets beyond the run
/// timeout before it is killed outright.
const KILL_GRACE: Duration = Duration::from_secs(60);

/// Runs one external command per call, in a given directory and
/// environment, under the configured run timeout.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    run_timeout: Duration,
}

impl CommandRunner {
    pub fn new(run_timeout: Duration) -> Self {
        Self { run_timeout }
    }

    pub fn run_timeout(&self) -> Duration {
        self.run_timeout
    }

    /// Run a setup-stage command: combined stdout and stderr are
    /// captured, and the hard bound is the run timeout plus a grace
    /// margin so an interrupted tool can still clean up.
    pub async fn run_setup(
        &self,
        argv: &[String],
        dir: &Path,
        env: &[(String, String)],
    ) -> Result<Vec<u8>> {
        self.run(argv, dir, env, self.run_timeout + KILL_GRACE, true)
            .await
    }

    /// Run the plan-producing command: only stdout is returned, and the
    /// hard bound is the run timeout itself with no grace margin.
    pub async fn run_capture(
        &self,
        argv: &[String],
        dir: &Path,
        env: &[(String, String)],
    ) -> Result<Vec<u8>> {
        self.run(argv, dir, env, self.run_timeout, false).await
    }

    async fn run(
        &self,
        argv: &[String],
        dir: &Path,
        env: &[(String, String)],
        hard_limit: Duration,
        combined: bool,
    ) -> Result<Vec<u8>> {
        let Some((program, args)) = argv.split_first() else {
            return Err(Error::EmptyCommand);
        };
        let command_line = argv.join(" ");

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(dir)
            .env_clear()
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(command = %command_line, dir = %dir.display(), "running command");

        let child = command.spawn().map_err(|source| Error::Spawn {
            command: command_line.clone(),
            dir: dir.to_path_buf(),
            source,
        })?;
        let pid = child.id();

        let watcher = CancellationToken::new();
        spawn_interrupt_watcher(watcher.clone(), self.run_timeout, pid, command_line.clone());
        let _retire = watcher.drop_guard();

        let output = match tokio::time::timeout(hard_limit, child.wait_with_output()).await {
            // Dropping the in-flight wait kills the process via kill_on_drop.
            Err(_) => {
                return Err(Error::Timeout {
                    command: command_line,
                    dir: dir.to_path_buf(),
                    limit: hard_limit,
                });
            }
            Ok(Err(source)) => {
                return Err(Error::Spawn {
                    command: command_line,
                    dir: dir.to_path_buf(),
                    source,
                });
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let mut captured = output.stdout;
            captured.extend_from_slice(&output.stderr);
            return Err(Error::CommandFailed {
                command: command_line,
                dir: dir.to_path_buf(),
                output: sanitize_output(&captured),
            });
        }

        if combined {
            // Stream interleaving is not preserved; stdout comes first.
            let mut captured = output.stdout;
            captured.extend_from_slice(&output.stderr);
            Ok(captured)
        } else {
            Ok(output.stdout)
        }
    }
}

/// Strip terminal control sequences from captured output before it
/// reaches a log line or an error message.
pub fn sanitize_output(bytes: &[u8]) -> String {
    let stripped = strip_ansi_escapes::strip(bytes);
    String::from_utf8_lossy(&stripped).into_owned()
}

fn spawn_interrupt_watcher(
    token: CancellationToken,
    after: Duration,
    pid: Option<u32>,
    command_line: String,
) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(after) => {
                tracing::debug!(
                    command = %command_line,
                    timeout = ?after,
                    "command exceeded run time, sending interrupt"
                );
                interrupt(pid);
            }
        }
    });
}

#[cfg(unix)]
fn interrupt(pid: Option<u32>) {
    if let Some(pid) = pid {
        // Delivery failure means the process already exited.
        unsafe {
            libc::kill(pid as i32, libc::SIGINT);
        }
    }
}

#[cfg(not(unix))]
fn interrupt(_pid: Option<u32>) {}
