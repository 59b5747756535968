//! The external planning tool's JSON plan document.
//!
//! Only the fields the summary rollup reads are modeled; everything else
//! in the document is ignored on deserialization. `variables` is modeled
//! solely so it can be cleared — values may carry secrets and must never
//! travel further than the process that parsed them.

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// One plan document, as emitted by `terraform show -json` and friends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,

    /// Input variables of the run. Cleared before a plan leaves the
    /// producing process; see [`Plan::clear_variables`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, serde_json::Value>,
}

impl Plan {
    /// Drop all input variables. They likely contain sensitive values
    /// and nothing downstream needs them.
    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }
}

/// One entry of `resource_changes`: proposed actions on a single
/// managed resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub module_address: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub change: Change,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub actions: Actions,
}

/// The action set of one resource change.
///
/// The planning tool encodes combined operations as two-element arrays:
/// `["create", "delete"]` is create-before-destroy, `["delete", "create"]`
/// the reverse. The predicates below mirror that encoding exactly; a
/// single action only matches its own one-element form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actions(pub Vec<Action>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Create,
    Update,
    Delete,
    NoOp,
    Read,
}

impl Actions {
    pub fn create(&self) -> bool {
        self.0 == [Action::Create]
    }

    pub fn update(&self) -> bool {
        self.0 == [Action::Update]
    }

    pub fn delete(&self) -> bool {
        self.0 == [Action::Delete]
    }

    pub fn no_op(&self) -> bool {
        self.0 == [Action::NoOp]
    }

    pub fn read(&self) -> bool {
        self.0 == [Action::Read]
    }

    pub fn create_before_destroy(&self) -> bool {
        self.0 == [Action::Create, Action::Delete]
    }

    pub fn destroy_before_create(&self) -> bool {
        self.0 == [Action::Delete, Action::Create]
    }

    /// Either replacement ordering.
    pub fn replace(&self) -> bool {
        self.create_before_destroy() || self.destroy_before_create()
    }
}

impl From<Vec<Action>> for Actions {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn actions_deserialize_from_plan_json() {
        let doc = r#"{
            "resource_changes": [
                {"type": "aws_instance", "address": "aws_instance.web", "name": "web",
                 "change": {"actions": ["delete", "create"]}},
                {"type": "aws_s3_bucket", "address": "aws_s3_bucket.logs", "name": "logs",
                 "change": {"actions": ["no-op"]}}
            ],
            "variables": {"db_password": {"value": "hunter2"}}
        }"#;

        let plan: Plan = serde_json::from_str(doc).expect("plan should parse");
        assert_eq!(2, plan.resource_changes.len());
        assert!(plan.resource_changes[0].change.actions.destroy_before_create());
        assert!(plan.resource_changes[1].change.actions.no_op());
        assert_eq!(1, plan.variables.len());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let doc = r#"{"format_version": "1.2", "terraform_version": "1.7.0"}"#;
        let plan: Plan = serde_json::from_str(doc).expect("plan should parse");
        assert_eq!(Plan::default(), plan);
    }

    #[test]
    fn combined_actions_do_not_match_single_predicates() {
        let actions = Actions(vec![Action::Create, Action::Delete]);
        assert!(actions.create_before_destroy());
        assert!(actions.replace());
        assert!(!actions.create());
        assert!(!actions.delete());
    }

    #[test]
    fn clear_variables_empties_the_map() {
        let doc = r#"{"variables": {"region": {"value": "eu-west-1"}}}"#;
        let mut plan: Plan = serde_json::from_str(doc).expect("plan should parse");
        plan.clear_variables();
        assert!(plan.variables.is_empty());
    }
}
