//! Implementation of `rdeps query`.

use crate::core::{host_platform, PackageRegistry, QueryError};
use crate::ops::aggregate::{manifest, CombinedTarget};
use crate::ops::classify::Classifier;
use crate::ops::reverse_deps::reverse_dependencies;
use crate::util::InternedString;

/// Options for a reverse-dependency query.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Package whose reverse dependencies are wanted
    pub target: String,

    /// Produce a name manifest instead of a combined build target
    pub just_print_all_deps: bool,

    /// Treat packages marked broken as usable
    pub allow_broken: bool,

    /// Platform to classify against (None = host)
    pub system: Option<String>,
}

impl QueryOptions {
    pub fn new(target: impl Into<String>) -> Self {
        QueryOptions {
            target: target.into(),
            ..Default::default()
        }
    }

    /// The classifier these options describe.
    pub fn classifier(&self) -> Classifier {
        let host = self
            .system
            .as_deref()
            .map(InternedString::new)
            .unwrap_or_else(host_platform);
        Classifier::new(host).allow_broken(self.allow_broken)
    }
}

/// The artifact a query produces.
#[derive(Debug, Clone)]
pub enum QueryOutput {
    /// One package name per line.
    Manifest(String),
    /// One target depending on every reverse dependency.
    Build(CombinedTarget),
}

/// Run a reverse-dependency query and aggregate the result.
pub fn query(registry: &dyn PackageRegistry, opts: &QueryOptions) -> Result<QueryOutput, QueryError> {
    let result = reverse_dependencies(registry, &opts.target, &opts.classifier())?;

    Ok(if opts.just_print_all_deps {
        QueryOutput::Manifest(manifest(&result))
    } else {
        QueryOutput::Build(CombinedTarget::new(opts.target.as_str(), &result))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use std::collections::BTreeSet;

    fn registry() -> crate::core::MemoryRegistry {
        let target = usable("target", &[]);
        let pkg1 = usable("pkg1", &[&target]);
        let pkg2 = usable("pkg2", &[&target]);
        let unrelated = usable("unrelated", &[]);
        registry_of([target, pkg1, pkg2, unrelated])
    }

    fn opts(just_print_all_deps: bool) -> QueryOptions {
        QueryOptions {
            just_print_all_deps,
            system: Some(HOST.to_string()),
            ..QueryOptions::new("target")
        }
    }

    #[test]
    fn test_manifest_mode() {
        let QueryOutput::Manifest(text) = query(&registry(), &opts(true)).unwrap() else {
            panic!("expected a manifest");
        };

        let lines: BTreeSet<&str> = text.lines().collect();
        assert_eq!(lines, BTreeSet::from(["pkg1", "pkg2"]));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_build_mode() {
        let QueryOutput::Build(target) = query(&registry(), &opts(false)).unwrap() else {
            panic!("expected a combined target");
        };

        assert_eq!(target.name(), "rdeps-of-target");
        let deps: Vec<String> = target.dependencies().iter().map(|d| d.to_string()).collect();
        assert_eq!(deps, ["pkg1", "pkg2"]);
    }

    #[test]
    fn test_system_override() {
        let mut options = opts(true);
        options.system = Some("aarch64-darwin".to_string());
        assert_eq!(options.classifier().host(), "aarch64-darwin");

        options.system = None;
        assert_eq!(options.classifier().host(), host_platform());
    }

    #[test]
    fn test_unknown_target() {
        let mut options = opts(true);
        options.target = "missing".to_string();

        assert!(matches!(
            query(&registry(), &options),
            Err(QueryError::PackageNotFound { .. })
        ));
    }
}
