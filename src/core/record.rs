//! Package records - immutable snapshots of registry entries.
//!
//! A record is what a registry hands out for a name. Evaluating it yields one
//! of three things: a package unit (something buildable), some other value
//! that happens to live in the registry (a nested set, a helper function), or
//! an evaluation failure. Package units expose their build inputs and their
//! metadata as optional capabilities.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::core::platform::PlatformSet;
use crate::util::InternedString;

/// Evaluating a record failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvalError {
    message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Usability metadata attached to a package unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Metadata {
    /// Explicit broken marker. Absent means not broken.
    pub broken: Option<bool>,

    /// Platforms the central build farm builds this package for.
    pub hydra_platforms: PlatformSet,

    /// Platforms the package can be built on at all.
    pub platforms: PlatformSet,

    /// Free-form description, shown by `rdeps classify`.
    pub description: Option<String>,
}

impl Metadata {
    /// Whether the package is explicitly marked broken.
    pub fn is_broken(&self) -> bool {
        self.broken.unwrap_or(false)
    }

    pub fn broken(mut self, broken: bool) -> Self {
        self.broken = Some(broken);
        self
    }

    pub fn with_platforms(mut self, platforms: PlatformSet) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_hydra_platforms(mut self, platforms: PlatformSet) -> Self {
        self.hydra_platforms = platforms;
        self
    }
}

/// A buildable package unit.
#[derive(Debug, Clone, Default)]
pub struct PackageUnit {
    build_inputs: Option<Vec<PackageRecord>>,
    metadata: Option<Metadata>,
}

impl PackageUnit {
    /// A unit with neither build inputs nor metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the declared build inputs.
    pub fn with_build_inputs(mut self, inputs: Vec<PackageRecord>) -> Self {
        self.build_inputs = Some(inputs);
        self
    }

    /// Attach usability metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Declared build inputs, or `None` if the unit doesn't expose them.
    pub fn build_inputs(&self) -> Option<&[PackageRecord]> {
        self.build_inputs.as_deref()
    }

    /// Usability metadata, or `None` if the unit doesn't carry any.
    pub fn try_metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }
}

#[derive(Debug)]
enum Value {
    Package(PackageUnit),
    Other { kind: String },
}

#[derive(Debug)]
struct RecordInner {
    name: InternedString,
    value: Result<Value, EvalError>,
}

/// One registry entry.
///
/// Records are Arc-wrapped so that build inputs can share them; cloning is a
/// reference count bump. Equality and hashing go by name.
#[derive(Clone)]
pub struct PackageRecord {
    inner: Arc<RecordInner>,
}

impl PackageRecord {
    /// A record that evaluates to a package unit.
    pub fn package(name: impl Into<InternedString>, unit: PackageUnit) -> Self {
        Self::from_value(name.into(), Ok(Value::Package(unit)))
    }

    /// A record that evaluates to something other than a package.
    pub fn other(name: impl Into<InternedString>, kind: impl Into<String>) -> Self {
        Self::from_value(name.into(), Ok(Value::Other { kind: kind.into() }))
    }

    /// A record whose evaluation fails with `error`.
    pub fn failed(name: impl Into<InternedString>, error: EvalError) -> Self {
        Self::from_value(name.into(), Err(error))
    }

    fn from_value(name: InternedString, value: Result<Value, EvalError>) -> Self {
        PackageRecord {
            inner: Arc::new(RecordInner { name, value }),
        }
    }

    /// Get the record name.
    pub fn name(&self) -> InternedString {
        self.inner.name
    }

    /// Evaluate the record.
    ///
    /// `Ok(None)` means the record evaluated to something that isn't a package.
    pub fn evaluate(&self) -> Result<Option<&PackageUnit>, EvalError> {
        match &self.inner.value {
            Ok(Value::Package(unit)) => Ok(Some(unit)),
            Ok(Value::Other { .. }) => Ok(None),
            Err(e) => Err(e.clone()),
        }
    }

    /// The package unit, if the record evaluates to one.
    pub fn as_package(&self) -> Option<&PackageUnit> {
        match &self.inner.value {
            Ok(Value::Package(unit)) => Some(unit),
            _ => None,
        }
    }

    /// Short description of what the record evaluates to.
    pub fn kind(&self) -> &str {
        match &self.inner.value {
            Ok(Value::Package(_)) => "package",
            Ok(Value::Other { kind }) => kind,
            Err(_) => "error",
        }
    }
}

impl fmt::Debug for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageRecord")
            .field("name", &self.inner.name.as_str())
            .field("kind", &self.kind())
            .finish()
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.name)
    }
}

impl PartialEq for PackageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl Eq for PackageRecord {}

impl std::hash::Hash for PackageRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

// Plans reference members by name; the engine resolves them itself.
impl Serialize for PackageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.name.serialize(serializer)
    }
}
