//! rdeps - find every usable package that build-depends on a given package
//!
//! This crate provides the library behind the `rdeps` CLI: usability
//! classification of registry records, the reverse-dependency filter, and
//! aggregation of the result into a manifest or one combined build target.

pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities for rdeps unit tests.
///
/// Only compiled for tests. Provides registry builders and index fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{Metadata, PackageRecord, PackageRegistry, QueryError, Usability};
pub use crate::ops::{Classifier, CombinedTarget, ResultSet};
pub use crate::sources::IndexRegistry;
pub use crate::util::GlobalContext;
