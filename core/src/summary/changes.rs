//! Aggregate change counts and their severity rollup.

use serde::Deserialize;
use serde::Serialize;
use std::ops::Add;
use std::ops::AddAssign;

/// Counts of resources a plan (or a whole subtree of plans) would
/// add, update and delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    pub resources_added: usize,
    pub resources_updated: usize,
    pub resources_deleted: usize,
}

impl Changes {
    pub fn new(added: usize, updated: usize, deleted: usize) -> Self {
        Self {
            resources_added: added,
            resources_updated: updated,
            resources_deleted: deleted,
        }
    }

    pub fn has_any(&self) -> bool {
        self.resources_added + self.resources_updated + self.resources_deleted > 0
    }

    /// The most severe kind of change present, with fixed precedence:
    /// deleted > updated > added > none.
    pub fn highest(&self) -> &'static str {
        if self.resources_deleted > 0 {
            "deleted"
        } else if self.resources_updated > 0 {
            "updated"
        } else if self.resources_added > 0 {
            "added"
        } else {
            "none"
        }
    }
}

impl Add for Changes {
    type Output = Changes;

    fn add(self, other: Changes) -> Changes {
        Changes {
            resources_added: self.resources_added + other.resources_added,
            resources_updated: self.resources_updated + other.resources_updated,
            resources_deleted: self.resources_deleted + other.resources_deleted,
        }
    }
}

impl AddAssign for Changes {
    fn add_assign(&mut self, other: Changes) {
        *self = *self + other;
    }
}
