//! File-backed registry snapshots.
//!
//! An index is a TOML file with one table per registry entry:
//!
//! ```toml
//! [packages.curl]
//! build-inputs = ["zlib", "openssl"]
//! meta = { broken = false, platforms = ["x86_64-linux"], hydra-platforms = "all" }
//!
//! [packages.pythonPackages]
//! kind = "attribute set"          # evaluates, but isn't a package
//!
//! [packages.bad]
//! error = "attribute 'src' missing"
//! ```
//!
//! Leaving out `meta` or `build-inputs` means the package doesn't expose that
//! capability. Build inputs naming something that isn't in the index become
//! records that fail to evaluate.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Result;
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Deserialize;

use crate::core::{
    EvalError, MemoryRegistry, Metadata, PackageRecord, PackageRegistry, PackageUnit, QueryError,
};
use crate::util::fs::read_to_string;
use crate::util::InternedString;

const PACKAGE_KIND: &str = "package";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexFile {
    #[serde(default)]
    packages: BTreeMap<String, IndexEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct IndexEntry {
    /// What the entry evaluates to. Defaults to a package.
    kind: Option<String>,

    /// Evaluation failure message. Takes precedence over everything else.
    error: Option<String>,

    build_inputs: Option<Vec<String>>,

    meta: Option<Metadata>,
}

impl IndexEntry {
    fn is_package(&self) -> bool {
        self.error.is_none() && self.kind.as_deref().unwrap_or(PACKAGE_KIND) == PACKAGE_KIND
    }
}

/// A registry loaded from an index file.
#[derive(Debug, Clone)]
pub struct IndexRegistry {
    path: PathBuf,
    source_name: String,
    records: MemoryRegistry,
}

impl IndexRegistry {
    /// Load an index file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        let registry = Self::parse(&contents, path)?;

        tracing::debug!(
            "loaded {} entries from {}",
            registry.records.len(),
            path.display()
        );

        Ok(registry)
    }

    /// Parse index contents. `path` is used for naming and error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, QueryError> {
        let file: IndexFile = toml::from_str(contents).map_err(|source| QueryError::IndexParse {
            path: path.to_path_buf(),
            source,
        })?;

        let records = build_records(file.packages)?;

        Ok(IndexRegistry {
            path: path.to_path_buf(),
            source_name: path.display().to_string(),
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PackageRegistry for IndexRegistry {
    fn lookup(&self, name: &str) -> Option<PackageRecord> {
        self.records.lookup(name)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (InternedString, &PackageRecord)> + '_> {
        self.records.iter()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }
}

/// Build records so that every input exists before its dependents.
fn build_records(entries: BTreeMap<String, IndexEntry>) -> Result<MemoryRegistry, QueryError> {
    let mut graph: DiGraph<InternedString, ()> = DiGraph::new();
    let mut nodes: HashMap<InternedString, NodeIndex> = HashMap::new();

    for name in entries.keys() {
        let name = InternedString::new(name);
        nodes.insert(name, graph.add_node(name));
    }

    // Edges point from an input to the entry that needs it.
    for (name, entry) in &entries {
        if !entry.is_package() {
            continue;
        }
        let dependent = nodes[name.as_str()];
        for input in entry.build_inputs.iter().flatten() {
            if let Some(&input_node) = nodes.get(input.as_str()) {
                graph.add_edge(input_node, dependent, ());
            }
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| QueryError::IndexCycle {
        packages: describe_cycle(&graph, cycle.node_id()),
    })?;

    let mut built: HashMap<InternedString, PackageRecord> = HashMap::new();
    let mut undefined: HashMap<String, PackageRecord> = HashMap::new();
    let mut registry = MemoryRegistry::new("index");

    for node in order {
        let name = graph[node];
        let entry = &entries[name.as_str()];

        let record = if let Some(ref message) = entry.error {
            PackageRecord::failed(name, EvalError::new(message.clone()))
        } else if !entry.is_package() {
            PackageRecord::other(name, entry.kind.clone().unwrap_or_default())
        } else {
            let mut unit = PackageUnit::new();
            if let Some(ref inputs) = entry.build_inputs {
                let inputs = inputs
                    .iter()
                    .map(|input| match built.get(input.as_str()) {
                        Some(record) => record.clone(),
                        None => undefined
                            .entry(input.clone())
                            .or_insert_with(|| {
                                tracing::debug!("{} needs undefined input {}", name, input);
                                PackageRecord::failed(
                                    input.as_str(),
                                    EvalError::new(format!("undefined package `{}`", input)),
                                )
                            })
                            .clone(),
                    })
                    .collect();
                unit = unit.with_build_inputs(inputs);
            }
            if let Some(ref meta) = entry.meta {
                unit = unit.with_metadata(meta.clone());
            }
            PackageRecord::package(name, unit)
        };

        built.insert(name, record.clone());
        registry.insert(record);
    }

    Ok(registry)
}

/// Names on a cycle, closed by repeating the first one.
///
/// `toposort` only reports where it noticed the cycle, which can be a node
/// downstream of it, so the cycle itself comes from the strongly connected
/// components.
fn describe_cycle(graph: &DiGraph<InternedString, ()>, noticed_at: NodeIndex) -> Vec<String> {
    let is_cycle =
        |scc: &Vec<NodeIndex>| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]);

    let mut cycles: Vec<Vec<String>> = kosaraju_scc(graph)
        .into_iter()
        .filter(is_cycle)
        .map(|scc| {
            let mut names: Vec<String> = scc.iter().map(|n| graph[*n].to_string()).collect();
            names.sort();
            names
        })
        .collect();
    cycles.sort();

    let mut names = cycles
        .into_iter()
        .next()
        .unwrap_or_else(|| vec![graph[noticed_at].to_string()]);
    if let Some(first) = names.first().cloned() {
        names.push(first);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlatformSet, Usability};
    use crate::ops::reverse_deps::reverse_dependencies;
    use crate::test_support::*;
    use tempfile::TempDir;

    fn parse(contents: &str) -> IndexRegistry {
        IndexRegistry::parse(contents, Path::new("registry.toml")).unwrap()
    }

    #[test]
    fn test_load_sample_index() {
        let tmp = TempDir::new().unwrap();
        let path = write_index(tmp.path(), SAMPLE_INDEX);

        let registry = IndexRegistry::load(&path).unwrap();

        assert_eq!(registry.len(), 13);
        assert_eq!(registry.path(), path);
        assert!(registry.source_name().ends_with("registry.toml"));
    }

    #[test]
    fn test_sample_classifications() {
        let registry = parse(SAMPLE_INDEX);
        let classifier = classifier();
        let status = |name: &str| classifier.classify(&registry.lookup(name).unwrap());

        assert_eq!(status("zlib"), Usability::Usable);
        assert_eq!(status("curl"), Usability::Usable);
        assert_eq!(status("old-zip"), Usability::MarkedBroken);
        assert_eq!(status("darwin-tool"), Usability::PlatformUnsupported);
        assert_eq!(status("hydra-skip"), Usability::PlatformExcludedByHydra);
        assert_eq!(status("nowhere"), Usability::PlatformExcludedNatively);
        assert_eq!(status("undocumented"), Usability::NoMetadata);
        assert_eq!(status("pythonPackages"), Usability::NotARecord);
        assert_eq!(status("bad"), Usability::EvaluationError);
    }

    #[test]
    fn test_sample_reverse_dependencies() {
        let registry = parse(SAMPLE_INDEX);

        let strict = reverse_dependencies(&registry, "zlib", &classifier()).unwrap();
        assert_eq!(names(&strict), ["curl", "libpng", "openssl"]);

        let relaxed =
            reverse_dependencies(&registry, "zlib", &classifier().allow_broken(true)).unwrap();
        assert_eq!(
            names(&relaxed),
            ["curl", "libpng", "needs-broken", "old-zip", "openssl"]
        );
    }

    #[test]
    fn test_inputs_share_records() {
        let registry = parse(SAMPLE_INDEX);
        let curl = registry.lookup("curl").unwrap();
        let inputs = curl.as_package().unwrap().build_inputs().unwrap();

        let names: Vec<&str> = inputs.iter().map(|i| i.name().as_str()).collect();
        assert_eq!(names, ["zlib", "openssl"]);
        assert_eq!(
            inputs[0].as_package().unwrap().try_metadata().unwrap().description.as_deref(),
            Some("compression library")
        );
    }

    #[test]
    fn test_platform_sets_parsed() {
        let registry = parse(
            r#"
[packages.a]
meta = { platforms = ["x86_64-linux"], hydra-platforms = "none" }
"#,
        );
        let a = registry.lookup("a").unwrap();
        let meta = a.as_package().unwrap().try_metadata().unwrap().clone();

        assert_eq!(meta.platforms, PlatformSet::specific(["x86_64-linux"]));
        assert_eq!(meta.hydra_platforms, PlatformSet::None);
    }

    #[test]
    fn test_undefined_input_fails_to_evaluate() {
        let registry = parse(
            r#"
[packages.target]
meta = {}

[packages.app]
build-inputs = ["target", "ghost"]
meta = {}
"#,
        );

        assert!(registry.lookup("ghost").is_none());
        let app = registry.lookup("app").unwrap();
        let ghost = &app.as_package().unwrap().build_inputs().unwrap()[1];
        assert_eq!(classifier().classify(ghost), Usability::EvaluationError);

        let result = reverse_dependencies(&registry, "target", &classifier()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let err = IndexRegistry::parse(
            r#"
[packages.a]
build-inputs = ["b"]

[packages.b]
build-inputs = ["a"]

[packages.c]
build-inputs = ["a"]
"#,
            Path::new("registry.toml"),
        )
        .unwrap_err();

        match err {
            QueryError::IndexCycle { packages } => assert_eq!(packages, ["a", "b", "a"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = IndexRegistry::parse(
            "[packages.a]\nunknown-field = 1\n",
            Path::new("broken.toml"),
        )
        .unwrap_err();

        assert!(matches!(err, QueryError::IndexParse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = IndexRegistry::load(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }
}
