//! Usability classification.
//!
//! Decides whether a single record can be built, looking only at the record
//! itself. The checks form a fixed priority order and the first one that
//! matches decides the outcome:
//!
//! 1. the record fails to evaluate: [`Usability::EvaluationError`]
//! 2. it isn't a package: [`Usability::NotARecord`]
//! 3. it has no metadata: [`Usability::NoMetadata`]
//! 4. it is marked broken: [`Usability::MarkedBroken`] (skipped with `allow_broken`)
//! 5. hydra platforms are `none`: [`Usability::PlatformExcludedByHydra`]
//! 6. platforms are `none`: [`Usability::PlatformExcludedNatively`]
//! 7. the host isn't listed in platforms: [`Usability::PlatformUnsupported`]
//!
//! Anything else is [`Usability::Usable`].

use crate::core::{host_platform, EvalError, Metadata, PackageRecord, Usability};
use crate::util::InternedString;

/// A metadata check. `Some` decides the outcome, `None` defers to the next one.
type Guard = fn(&Classifier, &Metadata) -> Option<Usability>;

/// Metadata checks in priority order.
const GUARDS: &[Guard] = &[
    marked_broken,
    excluded_by_hydra,
    excluded_natively,
    unsupported_on_host,
];

fn marked_broken(classifier: &Classifier, meta: &Metadata) -> Option<Usability> {
    (!classifier.allow_broken && meta.is_broken()).then_some(Usability::MarkedBroken)
}

fn excluded_by_hydra(_: &Classifier, meta: &Metadata) -> Option<Usability> {
    meta.hydra_platforms
        .is_none()
        .then_some(Usability::PlatformExcludedByHydra)
}

fn excluded_natively(_: &Classifier, meta: &Metadata) -> Option<Usability> {
    meta.platforms
        .is_none()
        .then_some(Usability::PlatformExcludedNatively)
}

fn unsupported_on_host(classifier: &Classifier, meta: &Metadata) -> Option<Usability> {
    (!meta.platforms.contains(classifier.host)).then_some(Usability::PlatformUnsupported)
}

/// Classifies records for one host platform and broken-package policy.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    host: InternedString,
    allow_broken: bool,
}

impl Classifier {
    /// Create a classifier for the given platform id.
    pub fn new(host: impl Into<InternedString>) -> Self {
        Classifier {
            host: host.into(),
            allow_broken: false,
        }
    }

    /// Create a classifier for the machine we're running on.
    pub fn for_host() -> Self {
        Self::new(host_platform())
    }

    /// Treat packages marked broken as usable if their other checks pass.
    pub fn allow_broken(mut self, allow: bool) -> Self {
        self.allow_broken = allow;
        self
    }

    pub fn host(&self) -> InternedString {
        self.host
    }

    pub fn allows_broken(&self) -> bool {
        self.allow_broken
    }

    /// Classify `record`, surfacing evaluation failure as an error.
    pub fn try_classify(&self, record: &PackageRecord) -> Result<Usability, EvalError> {
        let Some(unit) = record.evaluate()? else {
            return Ok(Usability::NotARecord);
        };

        let Some(meta) = unit.try_metadata() else {
            return Ok(Usability::NoMetadata);
        };

        Ok(GUARDS
            .iter()
            .find_map(|guard| guard(self, meta))
            .unwrap_or(Usability::Usable))
    }

    /// Classify `record`. Never fails: evaluation failure becomes
    /// [`Usability::EvaluationError`].
    pub fn classify(&self, record: &PackageRecord) -> Usability {
        let status = self.try_classify(record).unwrap_or_else(|e| {
            tracing::debug!("{} failed to evaluate: {}", record.name(), e);
            Usability::EvaluationError
        });

        if !status.is_usable() {
            tracing::debug!(package = %record.name(), reason = %status, "unusable package");
        }

        status
    }

    pub fn is_usable(&self, record: &PackageRecord) -> bool {
        self.classify(record).is_usable()
    }
}
