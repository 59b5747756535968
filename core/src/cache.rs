//! Modification-time-validated cache of parsed leaf summaries.

use crate::lru::LruCache;
use crate::summary::PlanFileSummary;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;

/// Cache capacity used by the reading surfaces of this workspace.
pub const DEFAULT_CAPACITY: usize = 50;

struct CacheEntry {
    summary: Arc<PlanFileSummary>,
    /// The file's modification timestamp when the summary was computed.
    modified: SystemTime,
}

/// Shared, internally synchronized cache mapping a plan file's path to
/// its last parsed summary.
///
/// An entry is reusable only while the file's current modification
/// timestamp equals the stored one exactly; any mismatch forces a
/// re-parse and replaces the entry. Created once per process and
/// injected wherever reads happen — there is no ambient instance.
pub struct TreeCache {
    entries: Mutex<LruCache<PathBuf, CacheEntry>>,
}

impl TreeCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The cached summary for `path`, provided the file has not been
    /// modified since it was cached.
    pub fn lookup(&self, path: &Path, modified: SystemTime) -> Option<Arc<PlanFileSummary>> {
        let key = path.to_path_buf();
        let mut entries = self.entries.lock().ok()?;
        let entry = entries.get(&key)?;
        if entry.modified == modified {
            Some(Arc::clone(&entry.summary))
        } else {
            None
        }
    }

    pub fn store(&self, path: PathBuf, modified: SystemTime, summary: Arc<PlanFileSummary>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(path, CacheEntry { summary, modified });
        }
    }
}

impl Default for TreeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use terrascope_protocol::Plan;

    fn summary(name: &str) -> Arc<PlanFileSummary> {
        Arc::new(PlanFileSummary::new(name, Plan::default()))
    }

    #[test]
    fn lookup_hits_only_on_exact_modified_time() {
        let cache = TreeCache::new(4);
        let path = PathBuf::from("envs/prod/plan.json");
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);

        cache.store(path.clone(), stamp, summary("plan.json"));

        let hit = cache.lookup(&path, stamp).expect("exact stamp must hit");
        assert_eq!("plan.json", hit.name());

        assert!(
            cache
                .lookup(&path, stamp + Duration::from_secs(1))
                .is_none(),
            "a newer file must force a re-parse"
        );
        assert!(
            cache
                .lookup(&path, stamp - Duration::from_secs(1))
                .is_none(),
            "an older stamp is a mismatch too"
        );
    }

    #[test]
    fn store_replaces_stale_entry() {
        let cache = TreeCache::new(4);
        let path = PathBuf::from("plan.json");
        let first = SystemTime::UNIX_EPOCH + Duration::from_secs(1);
        let second = first + Duration::from_secs(60);

        let original = summary("original");
        cache.store(path.clone(), first, Arc::clone(&original));
        cache.store(path.clone(), second, summary("replacement"));

        assert!(cache.lookup(&path, first).is_none());
        let hit = cache.lookup(&path, second).expect("replacement must hit");
        assert_eq!("replacement", hit.name());
        assert!(!Arc::ptr_eq(&original, &hit));
    }

    #[test]
    fn shares_the_same_summary_instance_across_lookups() {
        let cache = TreeCache::new(4);
        let path = PathBuf::from("plan.json");
        let stamp = SystemTime::UNIX_EPOCH;

        cache.store(path.clone(), stamp, summary("plan.json"));
        let a = cache.lookup(&path, stamp).expect("hit");
        let b = cache.lookup(&path, stamp).expect("hit");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
