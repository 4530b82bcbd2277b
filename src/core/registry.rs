//! Registry trait - the package source abstraction.
//!
//! A registry maps unique names to [`PackageRecord`]s. The reverse-dependency
//! query only ever reads from it, so implementations must be shareable across
//! threads for the duration of a scan.

use std::collections::BTreeMap;

use crate::core::PackageRecord;
use crate::util::InternedString;

/// A read-only source of package records.
pub trait PackageRegistry: Sync {
    /// Look up a record by name.
    fn lookup(&self, name: &str) -> Option<PackageRecord>;

    /// Iterate over every `(name, record)` pair. Order carries no meaning.
    fn iter(&self) -> Box<dyn Iterator<Item = (InternedString, &PackageRecord)> + '_>;

    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the source for display.
    fn source_name(&self) -> &str;
}

/// A registry held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    name: String,
    records: BTreeMap<InternedString, PackageRecord>,
}

impl MemoryRegistry {
    /// Create a new empty registry.
    pub fn new(name: impl Into<String>) -> Self {
        MemoryRegistry {
            name: name.into(),
            records: BTreeMap::new(),
        }
    }

    /// Add a record, replacing any record with the same name.
    pub fn insert(&mut self, record: PackageRecord) -> Option<PackageRecord> {
        self.records.insert(record.name(), record)
    }

    /// Builder-style [`MemoryRegistry::insert`].
    pub fn with(mut self, record: PackageRecord) -> Self {
        self.insert(record);
        self
    }

    /// Remove a record by name.
    pub fn remove(&mut self, name: &str) -> Option<PackageRecord> {
        self.records.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = InternedString> + '_ {
        self.records.keys().copied()
    }
}

impl FromIterator<PackageRecord> for MemoryRegistry {
    fn from_iter<T: IntoIterator<Item = PackageRecord>>(iter: T) -> Self {
        let mut registry = MemoryRegistry::new("memory");
        for record in iter {
            registry.insert(record);
        }
        registry
    }
}

impl PackageRegistry for MemoryRegistry {
    fn lookup(&self, name: &str) -> Option<PackageRecord> {
        self.records.get(name).cloned()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (InternedString, &PackageRecord)> + '_> {
        Box::new(self.records.iter().map(|(name, record)| (*name, record)))
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Registry names that look like `name`, closest first.
///
/// Used for "did you mean" hints when a lookup fails.
pub fn similar_names(registry: &dyn PackageRegistry, name: &str, limit: usize) -> Vec<String> {
    let wanted = name.to_lowercase();
    let threshold = (wanted.len() / 3).max(1);

    let mut scored: Vec<(usize, InternedString)> = registry
        .iter()
        .filter_map(|(candidate, _)| {
            let lower = candidate.to_lowercase();
            if lower.contains(&wanted) || wanted.contains(&lower) {
                return Some((0, candidate));
            }
            let distance = edit_distance(&wanted, &lower);
            (distance <= threshold).then_some((distance, candidate))
        })
        .collect();

    scored.sort();
    scored
        .into_iter()
        .take(limit)
        .map(|(_, n)| n.to_string())
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut cur = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }

    prev[b.len()]
}
