//! Registry sources.
//!
//! The reverse-dependency query works against any [`PackageRegistry`]; this
//! module holds the implementations that read snapshots from disk.
//!
//! [`PackageRegistry`]: crate::core::PackageRegistry

pub mod index;

pub use index::IndexRegistry;
