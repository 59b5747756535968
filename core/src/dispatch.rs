//! Fan-out of plan runs across directories, bounded by a worker count.

use crate::pipeline::PlanPipeline;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::sync::mpsc;

/// Buffer for per-unit durations. Generous relative to any realistic
/// directory count, so senders never stall on the reporting channel.
const DURATION_BUFFER: usize = 10_000;

/// Timing report for one dispatch batch.
#[derive(Debug, Clone, Default)]
pub struct DispatchStats {
    /// Units that ran to completion (successfully or not).
    pub completed: u64,
    /// Per-unit elapsed durations, in completion order.
    pub durations: Vec<Duration>,
    /// Sum of per-unit durations.
    pub total: Duration,
    /// Mean per-unit duration, zero when nothing completed.
    pub average: Duration,
    /// Wall-clock time of the whole batch.
    pub wall: Duration,
}

/// Runs the plan pipeline over a set of directories with at most
/// `parallel` invocations in flight.
pub struct DirectoryDispatcher {
    pipeline: Arc<PlanPipeline>,
    parallel: usize,
}

impl DirectoryDispatcher {
    pub fn new(pipeline: PlanPipeline, parallel: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            parallel: parallel.max(1),
        }
    }

    /// Dispatch every directory and block until all of them finish.
    ///
    /// A directory that does not exist or is not a directory is logged
    /// and skipped. A pipeline failure is logged and counts toward the
    /// timing report, but nothing is transmitted for it.
    pub async fn dispatch(&self, dirs: Vec<PathBuf>) -> DispatchStats {
        tracing::debug!(parallel = self.parallel, "running plans concurrently");

        let semaphore = Arc::new(Semaphore::new(self.parallel));
        let (duration_tx, mut duration_rx) = mpsc::channel(DURATION_BUFFER);
        let started = Instant::now();

        let mut handles = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                // The semaphore is never closed while dispatching.
                Err(_) => break,
            };
            let pipeline = Arc::clone(&self.pipeline);
            let tx = duration_tx.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;

                match tokio::fs::metadata(&dir).await {
                    Err(err) => {
                        tracing::error!(dir = %dir.display(), error = %err, "directory not found");
                        return;
                    }
                    Ok(metadata) if !metadata.is_dir() => {
                        tracing::info!(dir = %dir.display(), "not a directory, skipping");
                        return;
                    }
                    Ok(_) => {}
                }

                let unit_start = Instant::now();
                if let Err(err) = pipeline.process_dir(&dir).await {
                    tracing::error!(dir = %dir.display(), error = %err, "plan run failed");
                }
                let _ = tx.send(unit_start.elapsed()).await;
            }));
        }
        drop(duration_tx);

        for handle in handles {
            if let Err(err) = handle.await {
                tracing::error!(error = %err, "plan run task failed");
            }
        }
        let wall = started.elapsed();

        let mut durations = Vec::new();
        while let Some(duration) = duration_rx.recv().await {
            durations.push(duration);
        }

        let total: Duration = durations.iter().sum();
        let completed = durations.len() as u64;
        let average = if completed == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(total.as_millis() as u64 / completed)
        };

        DispatchStats {
            completed,
            durations,
            total,
            average,
            wall,
        }
    }
}
