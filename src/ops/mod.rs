//! High-level operations.
//!
//! Classification, reverse-dependency filtering, and aggregation of the
//! result into a manifest or a combined build target.

pub mod aggregate;
pub mod classify;
pub mod query;
pub mod realize;
pub mod reverse_deps;

pub use aggregate::{combined_target_name, manifest, CombinedTarget};
pub use classify::Classifier;
pub use query::{query, QueryOptions, QueryOutput};
pub use realize::{BuildEngine, CommandEngine, Realization};
pub use reverse_deps::{
    evaluate_candidate, resolve_target, reverse_dependencies, Candidate, Exclusion, ResultSet,
};
