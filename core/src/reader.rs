//! Parallel construction of the summary tree from stored artifacts.

use crate::cache::TreeCache;
use crate::error::Error;
use crate::error::Result;
use crate::summary::DirectorySummary;
use crate::summary::PlanFileSummary;
use crate::summary::PlanSummary;
use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;

/// Walks a directory of stored plan documents and builds a
/// [`PlanSummary`] tree, one concurrent task per directory entry.
///
/// Concurrency here is deliberately unbounded: the fan-out per level is
/// the directory's entry count, and sources are local files. Child
/// results arrive in completion order, so sibling order is
/// non-deterministic; sort by name before presenting. A child that
/// fails to read or parse is logged and dropped from the result set.
#[derive(Clone)]
pub struct AggregationReader {
    cache: Arc<TreeCache>,
}

impl AggregationReader {
    pub fn new(cache: Arc<TreeCache>) -> Self {
        Self { cache }
    }

    /// Read `dir` as a directory node, recursing into subdirectories.
    pub async fn read_dir(&self, dir: &Path) -> Result<PlanSummary> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|source| Error::DirectoryRead {
                path: dir.to_path_buf(),
                source,
            })?;

        let mut handles = Vec::new();
        loop {
            let entry = entries
                .next_entry()
                .await
                .map_err(|source| Error::DirectoryRead {
                    path: dir.to_path_buf(),
                    source,
                })?;
            let Some(entry) = entry else {
                break;
            };
            handles.push(tokio::spawn(self.read_entry(entry.path())));
        }

        let mut children = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(Ok(child)) => children.push(child),
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "error reading plan entry, dropping it");
                }
                Err(err) => {
                    tracing::error!(error = %err, "plan read task failed, dropping its entry");
                }
            }
        }

        Ok(PlanSummary::Directory(Arc::new(DirectorySummary::new(
            base_name(dir),
            children,
        ))))
    }

    /// Dispatch on the entry kind. Boxed so the file/directory mutual
    /// recursion has somewhere to bottom out.
    fn read_entry(
        &self,
        path: PathBuf,
    ) -> Pin<Box<dyn Future<Output = Result<PlanSummary>> + Send + 'static>> {
        let reader = self.clone();
        Box::pin(async move {
            let metadata =
                tokio::fs::metadata(&path)
                    .await
                    .map_err(|source| Error::FileRead {
                        path: path.clone(),
                        source,
                    })?;

            if metadata.is_dir() {
                reader.read_dir(&path).await
            } else {
                let modified = metadata.modified().map_err(|source| Error::FileRead {
                    path: path.clone(),
                    source,
                })?;
                reader.read_file(path, modified).await
            }
        })
    }

    async fn read_file(&self, path: PathBuf, modified: SystemTime) -> Result<PlanSummary> {
        if let Some(cached) = self.cache.lookup(&path, modified) {
            return Ok(PlanSummary::Plan(cached));
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| Error::FileRead {
                path: path.clone(),
                source,
            })?;
        let summary =
            PlanFileSummary::parse(base_name(&path), &bytes).map_err(|source| Error::PlanParse {
                path: path.clone(),
                source,
            })?;

        let summary = Arc::new(summary);
        self.cache.store(path, modified, Arc::clone(&summary));
        Ok(PlanSummary::Plan(summary))
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
