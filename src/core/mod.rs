//! Core data structures for rdeps.
//!
//! This module contains the foundational types used throughout rdeps:
//! - Package records and their optional capabilities
//! - Platform sets and the host platform id
//! - The registry abstraction
//! - Usability classification results

pub mod error;
pub mod platform;
pub mod record;
pub mod registry;
pub mod usability;

pub use error::QueryError;
pub use platform::{host_platform, PlatformSet};
pub use record::{EvalError, Metadata, PackageRecord, PackageUnit};
pub use registry::{MemoryRegistry, PackageRegistry};
pub use usability::Usability;
