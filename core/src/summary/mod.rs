//! The hierarchical change summary built over stored plan documents.
//!
//! Exactly two node shapes exist: a leaf wrapping one parsed plan
//! document and a directory node aggregating its children, so the tree
//! is a closed two-variant enum rather than an open trait. Leaves are
//! `Arc`-shared because the tree cache hands the same parsed document
//! to every read that finds the file unchanged; directory nodes are
//! built fresh on every read.

mod changes;

pub use changes::Changes;

use std::sync::Arc;
use terrascope_protocol::Actions;
use terrascope_protocol::Plan;

/// Resource type whose changes never count toward the rollup. Local
/// file churn is an artifact of planning, not an infrastructure change.
const EXCLUDED_TYPE: &str = "local_file";

/// One node of the summary tree.
#[derive(Debug, Clone)]
pub enum PlanSummary {
    Plan(Arc<PlanFileSummary>),
    Directory(Arc<DirectorySummary>),
}

impl PlanSummary {
    pub fn name(&self) -> &str {
        match self {
            PlanSummary::Plan(leaf) => leaf.name(),
            PlanSummary::Directory(dir) => dir.name(),
        }
    }

    pub fn changes(&self) -> Changes {
        match self {
            PlanSummary::Plan(leaf) => leaf.changes(),
            PlanSummary::Directory(dir) => dir.changes(),
        }
    }

    pub fn up_to_date(&self) -> bool {
        match self {
            PlanSummary::Plan(leaf) => leaf.up_to_date(),
            PlanSummary::Directory(dir) => dir.up_to_date(),
        }
    }

    /// Child nodes; empty for a leaf. Order is whatever construction
    /// produced — sort by name before presenting.
    pub fn children(&self) -> &[PlanSummary] {
        match self {
            PlanSummary::Plan(_) => &[],
            PlanSummary::Directory(dir) => dir.children(),
        }
    }

    pub fn changed_resources(&self) -> String {
        match self {
            PlanSummary::Plan(leaf) => leaf.changed_resources(),
            PlanSummary::Directory(dir) => dir.changed_resources(),
        }
    }
}

/// Leaf node: the summary view over one parsed plan document.
#[derive(Debug)]
pub struct PlanFileSummary {
    name: String,
    plan: Plan,
}

impl PlanFileSummary {
    /// Wrap a parsed document. Variables are dropped here as well —
    /// they should never have been stored, but a well-formed summary
    /// must not depend on that.
    pub fn new(name: impl Into<String>, mut plan: Plan) -> Self {
        plan.clear_variables();
        Self {
            name: name.into(),
            plan,
        }
    }

    /// Parse a raw plan document into a leaf summary.
    pub fn parse(name: impl Into<String>, bytes: &[u8]) -> serde_json::Result<Self> {
        let plan: Plan = serde_json::from_slice(bytes)?;
        Ok(Self::new(name, plan))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn up_to_date(&self) -> bool {
        self.plan.resource_changes.is_empty()
    }

    /// Classify every resource change by its action set. A replacement
    /// (either ordering) counts one addition and one deletion.
    pub fn changes(&self) -> Changes {
        let mut changes = Changes::default();

        for rc in &self.plan.resource_changes {
            if rc.resource_type == EXCLUDED_TYPE {
                continue;
            }
            let actions = &rc.change.actions;
            if actions.create() {
                changes.resources_added += 1;
            } else if actions.delete() {
                changes.resources_deleted += 1;
            } else if actions.update() {
                changes.resources_updated += 1;
            } else if actions.replace() {
                changes.resources_added += 1;
                changes.resources_deleted += 1;
            }
        }

        changes
    }

    /// One line per effective change:
    /// `<sign><module-address>.<type>.<name>`.
    pub fn changed_resources(&self) -> String {
        let mut lines = Vec::new();

        for rc in &self.plan.resource_changes {
            let actions = &rc.change.actions;
            if actions.no_op() || actions.read() {
                continue;
            }
            lines.push(format!(
                "{}{}.{}.{}",
                change_prefix(actions),
                rc.module_address,
                rc.resource_type,
                rc.name
            ));
        }

        lines.join("\n")
    }
}

/// Directory node: rolls its children up field-wise.
#[derive(Debug)]
pub struct DirectorySummary {
    name: String,
    children: Vec<PlanSummary>,
}

impl DirectorySummary {
    pub fn new(name: impl Into<String>, children: Vec<PlanSummary>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[PlanSummary] {
        &self.children
    }

    pub fn changes(&self) -> Changes {
        self.children
            .iter()
            .fold(Changes::default(), |sum, child| sum + child.changes())
    }

    pub fn up_to_date(&self) -> bool {
        self.children.iter().all(PlanSummary::up_to_date)
    }

    pub fn changed_resources(&self) -> String {
        let lines: Vec<String> = self
            .children
            .iter()
            .map(PlanSummary::changed_resources)
            .filter(|s| !s.is_empty())
            .collect();
        lines.join("\n")
    }
}

fn change_prefix(actions: &Actions) -> &'static str {
    if actions.create() {
        "+"
    } else if actions.update() {
        "~"
    } else if actions.delete() {
        "-"
    } else if actions.destroy_before_create() {
        "-+"
    } else if actions.create_before_destroy() {
        "+-"
    } else {
        // Defensive default; no known plan output reaches it.
        "?"
    }
}
