//! Turning a result set into an output artifact.
//!
//! Two shapes are produced: a manifest listing one package name per line,
//! and a single combined target whose dependencies are exactly the result
//! set's records. The combined target is all-or-nothing: the build engine
//! realizes it as one unit.

use serde::Serialize;

use crate::core::PackageRecord;
use crate::ops::reverse_deps::ResultSet;
use crate::util::hash::Fingerprint;
use crate::util::InternedString;

/// Render the manifest: each name on its own line, every line newline-terminated.
pub fn manifest(result: &ResultSet) -> String {
    let mut out = String::new();
    for name in result.keys() {
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// Name of the combined target for `target`.
pub fn combined_target_name(target: &str) -> String {
    format!("rdeps-of-{}", target)
}

/// A single buildable target depending on every reverse dependency.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedTarget {
    /// Deterministic name derived from the target package.
    name: String,

    /// The package whose dependents this target builds.
    target: InternedString,

    /// Short hash over the sorted member names.
    fingerprint: String,

    /// Exactly the records of the result set, sorted by name.
    dependencies: Vec<PackageRecord>,
}

impl CombinedTarget {
    /// Combine `result` into one target for `target`.
    pub fn new(target: impl Into<InternedString>, result: &ResultSet) -> Self {
        let target = target.into();

        let mut fp = Fingerprint::new();
        fp.update_str(&target);
        fp.update_strs(result.keys().map(|n| n.as_str()));

        CombinedTarget {
            name: combined_target_name(&target),
            target,
            fingerprint: fp.finish_short(),
            dependencies: result.values().cloned().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> InternedString {
        self.target
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn dependencies(&self) -> &[PackageRecord] {
        &self.dependencies
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Serialize as a JSON build plan.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
