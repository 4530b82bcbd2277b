//! Test utilities for rdeps unit tests.
//!
//! Builders for small in-memory registries so tests can describe a package
//! graph in a few lines:
//!
//! ```rust,ignore
//! let zlib = usable("zlib", &[]);
//! let curl = broken("curl", &[&zlib]);
//! let registry = registry_of([zlib, curl]);
//! ```

pub mod fixtures;

pub use fixtures::*;

use crate::core::{MemoryRegistry, Metadata, PackageRecord, PackageUnit};
use crate::ops::classify::Classifier;
use crate::ops::reverse_deps::ResultSet;

/// Platform id every test classifier runs on.
pub const HOST: &str = "x86_64-linux";

/// Classifier for [`HOST`] with `allow_broken` off.
pub fn classifier() -> Classifier {
    Classifier::new(HOST)
}

/// Default metadata: not broken, every platform.
pub fn meta() -> Metadata {
    Metadata::default()
}

/// A usable package with the given build inputs.
pub fn usable(name: &str, inputs: &[&PackageRecord]) -> PackageRecord {
    package(name, inputs, meta())
}

/// A package marked broken, otherwise usable.
pub fn broken(name: &str, inputs: &[&PackageRecord]) -> PackageRecord {
    package(name, inputs, meta().broken(true))
}

/// A package with explicit metadata.
pub fn package(name: &str, inputs: &[&PackageRecord], metadata: Metadata) -> PackageRecord {
    PackageRecord::package(
        name,
        PackageUnit::new()
            .with_build_inputs(inputs.iter().map(|r| (*r).clone()).collect())
            .with_metadata(metadata),
    )
}

/// Collect records into a registry.
pub fn registry_of(records: impl IntoIterator<Item = PackageRecord>) -> MemoryRegistry {
    records.into_iter().collect()
}

/// Sorted names of a result set.
pub fn names(result: &ResultSet) -> Vec<String> {
    result.keys().map(|n| n.to_string()).collect()
}
