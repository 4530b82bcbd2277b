//! Usability classification results.

use std::fmt;

use serde::Serialize;

/// Whether a record can be built at all, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Usability {
    Usable,
    NotARecord,
    NoMetadata,
    MarkedBroken,
    PlatformExcludedByHydra,
    PlatformExcludedNatively,
    PlatformUnsupported,
    EvaluationError,
}

impl Usability {
    pub fn is_usable(self) -> bool {
        self == Usability::Usable
    }

    /// Human-readable reason, used in diagnostics.
    pub fn reason(self) -> &'static str {
        match self {
            Usability::Usable => "usable",
            Usability::NotARecord => "not a package",
            Usability::NoMetadata => "has no metadata",
            Usability::MarkedBroken => "marked broken",
            Usability::PlatformExcludedByHydra => "excluded from hydra platforms",
            Usability::PlatformExcludedNatively => "supports no platforms",
            Usability::PlatformUnsupported => "not supported on this platform",
            Usability::EvaluationError => "fails to evaluate",
        }
    }
}

impl fmt::Display for Usability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_usable_is_usable() {
        let all = [
            Usability::Usable,
            Usability::NotARecord,
            Usability::NoMetadata,
            Usability::MarkedBroken,
            Usability::PlatformExcludedByHydra,
            Usability::PlatformExcludedNatively,
            Usability::PlatformUnsupported,
            Usability::EvaluationError,
        ];

        let usable: Vec<_> = all.iter().filter(|u| u.is_usable()).collect();
        assert_eq!(usable, [&Usability::Usable]);
    }

    #[test]
    fn test_serialized_form() {
        assert_eq!(
            serde_json::to_string(&Usability::PlatformExcludedByHydra).unwrap(),
            "\"platform-excluded-by-hydra\""
        );
        assert_eq!(Usability::MarkedBroken.to_string(), "marked broken");
    }
}
