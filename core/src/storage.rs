//! Flat-file record store the collector writes and the reader walks.
//!
//! Records are filed under `<root>/<key...>/` with the file name
//! `<end-time>__<branch>__<workspace>.json`, so the branch and
//! workspace sets of an existing store can be recovered from file
//! names alone.

use crate::error::Error;
use crate::error::Result;
use chrono::DateTime;
use chrono::Utc;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use terrascope_protocol::Branch;
use terrascope_protocol::PlanRecord;
use terrascope_protocol::Workspace;
use walkdir::WalkDir;

const TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// A `/`-separated storage key, usually a clipped directory path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(Vec<String>);

impl Key {
    pub fn parse(s: &str) -> Self {
        Self(s.split('/').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Key-addressed store of plan records, rooted at one directory.
pub struct Storage {
    root: PathBuf,
    branches: Mutex<BTreeSet<Branch>>,
    workspaces: Mutex<BTreeSet<Workspace>>,
}

impl Storage {
    /// Open a store, recovering branch and workspace metadata from the
    /// file names already present under `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let storage = Self {
            root: root.into(),
            branches: Mutex::new(BTreeSet::new()),
            workspaces: Mutex::new(BTreeSet::new()),
        };
        storage.scan_metadata();
        storage
    }

    /// Serialize `record` under `key`, creating intermediate
    /// directories as needed.
    pub fn store(&self, key: &Key, record: &PlanRecord) -> Result<PathBuf> {
        let file = self.record_file(key, record);
        let bytes =
            serde_json::to_vec(record).map_err(|source| Error::RecordSerialize { source })?;

        if let Some(dir) = file.parent() {
            match std::fs::metadata(dir) {
                Err(_) => {
                    std::fs::create_dir_all(dir).map_err(|source| Error::FileWrite {
                        path: dir.to_path_buf(),
                        source,
                    })?;
                }
                Ok(metadata) if !metadata.is_dir() => {
                    return Err(Error::NotADirectory {
                        path: dir.to_path_buf(),
                    });
                }
                Ok(_) => {}
            }
        }

        std::fs::write(&file, bytes).map_err(|source| Error::FileWrite {
            path: file.clone(),
            source,
        })?;

        self.remember(record.branch.clone(), record.workspace.clone());
        Ok(file)
    }

    /// Sorted snapshot of every branch seen by this store.
    pub fn branches(&self) -> Vec<Branch> {
        self.branches
            .lock()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Sorted snapshot of every workspace seen by this store.
    pub fn workspaces(&self) -> Vec<Workspace> {
        self.workspaces
            .lock()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn record_file(&self, key: &Key, record: &PlanRecord) -> PathBuf {
        let mut path = self.root.clone();
        for segment in key.segments() {
            path.push(segment);
        }
        path.push(format!(
            "{}__{}__{}.json",
            format_end_time(record.end),
            record.branch,
            record.workspace
        ));
        path
    }

    fn remember(&self, branch: Branch, workspace: Workspace) {
        if let Ok(mut branches) = self.branches.lock() {
            branches.insert(branch);
        }
        if let Ok(mut workspaces) = self.workspaces.lock() {
            workspaces.insert(workspace);
        }
    }

    fn scan_metadata(&self) {
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let parts: Vec<&str> = name.split("__").collect();
            if parts.len() > 2 {
                self.remember(
                    Branch::from(parts[1]),
                    Workspace::from(strip_extension(parts[2])),
                );
            }
        }
    }
}

fn format_end_time(end: DateTime<Utc>) -> String {
    end.format(TIME_FORMAT).to_string()
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn key_parse_splits_on_slashes() {
        assert_eq!(&["foo".to_string()], Key::parse("foo").segments());
        assert_eq!(
            &["foo".to_string(), "bar".to_string(), "baz".to_string()],
            Key::parse("foo/bar/baz").segments()
        );
        assert_eq!("foo/bar", Key::parse("foo/bar").to_string());
    }

    #[test]
    fn record_file_derives_name_from_end_time_branch_and_workspace() {
        let storage = Storage {
            root: PathBuf::from("/"),
            branches: Mutex::new(BTreeSet::new()),
            workspaces: Mutex::new(BTreeSet::new()),
        };
        let record = PlanRecord {
            end: Utc.with_ymd_and_hms(2000, 1, 2, 3, 4, 5).unwrap(),
            branch: "foo".into(),
            workspace: "bar".into(),
            ..Default::default()
        };

        let file = storage.record_file(&Key::parse("test/one/two/three"), &record);
        assert_eq!(
            PathBuf::from("/test/one/two/three/2000-01-02-03-04-05__foo__bar.json"),
            file
        );
    }

    #[test]
    fn strip_extension_takes_only_the_last_dot() {
        assert_eq!("default", strip_extension("default.json"));
        assert_eq!("my.ws", strip_extension("my.ws.json"));
        assert_eq!("noext", strip_extension("noext"));
    }
}
