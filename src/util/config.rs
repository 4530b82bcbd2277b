//! Configuration file support for rdeps.
//!
//! rdeps reads two configuration file locations:
//! - Global: `~/.rdeps/config.toml` - User-wide defaults
//! - Project: `.rdeps/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.
//!
//! ```toml
//! [registry]
//! index = "registry.toml"
//!
//! [query]
//! allow_broken = false
//! system = "x86_64-linux"
//!
//! [build]
//! command = ["nix-build", "<nixpkgs>"]
//! attr_flag = "-A"              # "" passes member names bare
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// rdeps configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry settings
    pub registry: RegistryConfig,

    /// Query settings
    pub query: QueryConfig,

    /// Build engine settings
    pub build: BuildConfig,
}

/// Where the package registry snapshot lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path to the registry index file. Relative paths are resolved against
    /// the directory that holds the config file's `.rdeps` directory.
    pub index: Option<PathBuf>,
}

/// Defaults for reverse-dependency queries.
///
/// Unset keys stay `None` so that a later file can override an earlier one
/// with any value, including the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Treat packages marked broken as usable (default false)
    pub allow_broken: Option<bool>,

    /// Platform identifier to classify against (defaults to the host)
    pub system: Option<String>,
}

impl QueryConfig {
    pub fn allow_broken(&self) -> bool {
        self.allow_broken.unwrap_or(false)
    }
}

const DEFAULT_BUILD_COMMAND: &[&str] = &["nix-build", "<nixpkgs>"];
const DEFAULT_ATTR_FLAG: &str = "-A";

/// How to invoke the external build engine in build mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Program and leading arguments, e.g. `["nix-build", "<nixpkgs>"]`
    pub command: Option<Vec<String>>,

    /// Flag placed before each member name, e.g. `-A`. An empty string
    /// passes names bare.
    pub attr_flag: Option<String>,
}

impl BuildConfig {
    /// The configured command, or `nix-build <nixpkgs>`.
    pub fn command(&self) -> Vec<String> {
        match self.command {
            Some(ref command) => command.clone(),
            None => DEFAULT_BUILD_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The flag placed before each member, or `None` for bare names.
    pub fn attr_flag(&self) -> Option<String> {
        match self.attr_flag.as_deref() {
            None => Some(DEFAULT_ATTR_FLAG.to_string()),
            Some("") => None,
            Some(flag) => Some(flag.to_string()),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let Some(base) = config_base_dir(path) {
            config.resolve_paths(&base);
        }

        Ok(config)
    }

    /// Load configuration with fallback to defaults if the file doesn't exist
    /// or can't be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.registry.index.is_some() {
            self.registry.index = other.registry.index;
        }

        if other.query.allow_broken.is_some() {
            self.query.allow_broken = other.query.allow_broken;
        }
        if other.query.system.is_some() {
            self.query.system = other.query.system;
        }

        if other.build.command.is_some() {
            self.build.command = other.build.command;
        }
        if other.build.attr_flag.is_some() {
            self.build.attr_flag = other.build.attr_flag;
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let Some(index) = self.registry.index.as_mut() {
            if index.is_relative() {
                *index = base.join(&*index);
            }
        }
    }
}

/// `<root>/.rdeps/config.toml` resolves relative paths against `<root>`.
fn config_base_dir(path: &Path) -> Option<PathBuf> {
    let dir = path.parent()?;
    if dir.file_name().is_some_and(|n| n == ".rdeps") {
        dir.parent().map(Path::to_path_buf)
    } else {
        Some(dir.to_path_buf())
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.rdeps/config.toml)
/// 2. Global config (~/.rdeps/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global rdeps config directory (~/.rdeps).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".rdeps"))
}

/// Get the global config path (~/.rdeps/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.rdeps/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".rdeps").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.registry.index.is_none());
        assert!(!config.query.allow_broken());
        assert!(config.query.system.is_none());
        assert_eq!(config.build.command(), vec!["nix-build", "<nixpkgs>"]);
        assert_eq!(config.build.attr_flag().as_deref(), Some("-A"));
    }

    #[test]
    fn test_config_load_resolves_index_against_project_root() {
        let tmp = TempDir::new().unwrap();
        let config_path = project_config_path(tmp.path());
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(
            &config_path,
            r#"
[registry]
index = "snapshots/registry.toml"

[query]
allow_broken = true
system = "aarch64-darwin"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(
            config.registry.index,
            Some(tmp.path().join("snapshots/registry.toml"))
        );
        assert!(config.query.allow_broken());
        assert_eq!(config.query.system.as_deref(), Some("aarch64-darwin"));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.query.system = Some("x86_64-linux".to_string());
        base.registry.index = Some(PathBuf::from("/global/registry.toml"));

        let mut project = Config::default();
        project.build.command = Some(vec!["make-world".to_string()]);
        project.build.attr_flag = Some(String::new());

        base.merge(project);

        assert_eq!(base.query.system.as_deref(), Some("x86_64-linux"));
        assert_eq!(base.registry.index, Some(PathBuf::from("/global/registry.toml")));
        assert_eq!(base.build.command(), vec!["make-world"]);
        assert!(base.build.attr_flag().is_none());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        std::fs::write(&global, "[query]\nsystem = \"x86_64-linux\"\n").unwrap();

        let project_root = tmp.path().join("project");
        let project = project_config_path(&project_root);
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[query]\nsystem = \"riscv64-linux\"\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.query.system.as_deref(), Some("riscv64-linux"));
    }

    #[test]
    fn test_project_can_restore_defaults() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        std::fs::write(
            &global,
            r#"
[query]
allow_broken = true

[build]
command = ["make"]
attr_flag = "-t"
"#,
        )
        .unwrap();

        let project = project_config_path(&tmp.path().join("project"));
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(
            &project,
            r#"
[query]
allow_broken = false

[build]
command = ["nix-build", "<nixpkgs>"]
attr_flag = "-A"
"#,
        )
        .unwrap();

        let config = load_config(Some(&global), &project);
        assert!(!config.query.allow_broken());
        assert_eq!(config.build.command(), vec!["nix-build", "<nixpkgs>"]);
        assert_eq!(config.build.attr_flag().as_deref(), Some("-A"));
    }

    #[test]
    fn test_unset_keys_keep_global_values() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        std::fs::write(&global, "[query]\nallow_broken = true\n").unwrap();

        let project = project_config_path(&tmp.path().join("project"));
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[query]\nsystem = \"riscv64-linux\"\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert!(config.query.allow_broken());
        assert_eq!(config.query.system.as_deref(), Some("riscv64-linux"));
    }

    #[test]
    fn test_empty_attr_flag_passes_names_bare() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build]\ncommand = [\"make\"]\nattr_flag = \"\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.build.command(), vec!["make"]);
        assert!(config.build.attr_flag().is_none());
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "this is not toml [").unwrap();

        let config = Config::load_or_default(&path);
        assert!(config.query.system.is_none());
    }
}
