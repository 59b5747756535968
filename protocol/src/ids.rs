//! Typed identifiers carried on a [`crate::PlanRecord`].
//!
//! Plain string newtypes with transparent serde so records stay
//! flat JSON, while keeping a branch from being passed where a
//! workspace belongs.

use serde::Deserialize;
use serde::Serialize;
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Version-control branch a plan was produced on.
    Branch
);
string_id!(
    /// Commit the working tree pointed at when the plan ran.
    CommitSha
);
string_id!(
    /// Repository the planned directory belongs to.
    Repo
);
string_id!(
    /// Planning-tool workspace (environment selector) of the run.
    Workspace
);
