//! Reverse-dependency filtering.
//!
//! Scans the whole registry for usable packages that list the target among
//! their build inputs. Only direct inputs are looked at: a candidate is
//! dropped when one of its own inputs is unusable, but the inputs' inputs are
//! never inspected.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;

use crate::core::registry::similar_names;
use crate::core::{PackageRecord, PackageRegistry, QueryError, Usability};
use crate::ops::classify::Classifier;
use crate::util::InternedString;

/// Packages that passed the filter, keyed by registry name.
pub type ResultSet = BTreeMap<InternedString, PackageRecord>;

/// Why a registry entry is not part of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// The entry itself is unusable.
    Unusable(Usability),
    /// The entry doesn't expose build inputs.
    NoBuildInputs,
    /// None of its build inputs is the target.
    NotADependent,
    /// It depends on the target, but one of its direct inputs is unusable.
    UnusableInput {
        input: InternedString,
        status: Usability,
    },
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Unusable(status) => write!(f, "package is {}", status),
            Exclusion::NoBuildInputs => write!(f, "package exposes no build inputs"),
            Exclusion::NotADependent => write!(f, "target is not among its build inputs"),
            Exclusion::UnusableInput { input, status } => {
                write!(f, "build input `{}` is {}", input, status)
            }
        }
    }
}

/// The filter's decision for one registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    Included,
    Excluded(Exclusion),
}

/// Resolve the target name, failing with "did you mean" hints.
pub fn resolve_target(
    registry: &dyn PackageRegistry,
    target_name: &str,
) -> Result<PackageRecord, QueryError> {
    registry
        .lookup(target_name)
        .ok_or_else(|| QueryError::PackageNotFound {
            package: target_name.to_string(),
            suggestions: similar_names(registry, target_name, 3),
        })
}

/// Decide whether `record` is a usable reverse dependency of `target`.
///
/// Checks run in order and stop at the first failure.
pub fn evaluate_candidate(
    record: &PackageRecord,
    target: &PackageRecord,
    classifier: &Classifier,
) -> Candidate {
    let status = classifier.classify(record);
    if !status.is_usable() {
        return Candidate::Excluded(Exclusion::Unusable(status));
    }

    // A usable record is always a package unit.
    let Some(inputs) = record.as_package().and_then(|unit| unit.build_inputs()) else {
        return Candidate::Excluded(Exclusion::NoBuildInputs);
    };

    if !inputs.iter().any(|input| input.name() == target.name()) {
        return Candidate::Excluded(Exclusion::NotADependent);
    }

    for input in inputs {
        let status = classifier.classify(input);
        if !status.is_usable() {
            return Candidate::Excluded(Exclusion::UnusableInput {
                input: input.name(),
                status,
            });
        }
    }

    Candidate::Included
}

/// Find every usable package in `registry` that build-depends on `target_name`.
///
/// Entries are checked independently and in parallel. A record that fails to
/// evaluate is excluded without affecting the rest of the scan. The only
/// fatal error is a target name that doesn't resolve.
pub fn reverse_dependencies(
    registry: &dyn PackageRegistry,
    target_name: &str,
    classifier: &Classifier,
) -> Result<ResultSet, QueryError> {
    let target = resolve_target(registry, target_name)?;

    tracing::debug!(
        "scanning {} entries of {} for dependents of {} (host {}, allow_broken {})",
        registry.len(),
        registry.source_name(),
        target.name(),
        classifier.host(),
        classifier.allows_broken()
    );

    let entries: Vec<(InternedString, &PackageRecord)> = registry.iter().collect();

    let results: ResultSet = entries
        .par_iter()
        .filter_map(|&(name, record)| {
            match evaluate_candidate(record, &target, classifier) {
                Candidate::Included => Some((name, record.clone())),
                Candidate::Excluded(exclusion) => {
                    report_exclusion(name, record, &target, &exclusion);
                    None
                }
            }
        })
        .collect();

    tracing::info!(
        "found {} reverse dependencies of {}",
        results.len(),
        target.name()
    );

    Ok(results)
}

/// Emit a diagnostic for an excluded entry.
///
/// Only entries that actually list the target are worth telling the user
/// about; everything else would drown the output on a large registry.
fn report_exclusion(
    name: InternedString,
    record: &PackageRecord,
    target: &PackageRecord,
    exclusion: &Exclusion,
) {
    match exclusion {
        Exclusion::NotADependent => {}
        Exclusion::NoBuildInputs => {
            tracing::debug!("{} skipped: {}", name, exclusion);
        }
        Exclusion::UnusableInput { .. } => {
            tracing::info!("{} excluded: {}", name, exclusion);
        }
        Exclusion::Unusable(_) => {
            let lists_target = record
                .as_package()
                .and_then(|unit| unit.build_inputs())
                .is_some_and(|inputs| inputs.iter().any(|i| i.name() == target.name()));
            if lists_target {
                tracing::info!("{} excluded: {}", name, exclusion);
            }
        }
    }
}
