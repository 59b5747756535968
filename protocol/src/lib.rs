//! Wire formats shared between the plan runner, the collector and the
//! aggregation reader.
//!
//! Two schemas live here:
//!
//! - [`Plan`]: the external planning tool's JSON output, consumed as an
//!   opaque document apart from the handful of fields the summary rollup
//!   depends on (`resource_changes` and `variables`).
//! - [`PlanRecord`]: the record one pipeline run produces, stored by the
//!   collector as a flat JSON file.

mod ids;
mod plan;
mod record;

pub use ids::Branch;
pub use ids::CommitSha;
pub use ids::Repo;
pub use ids::Workspace;
pub use plan::Action;
pub use plan::Actions;
pub use plan::Change;
pub use plan::Plan;
pub use plan::ResourceChange;
pub use record::PlanRecord;
