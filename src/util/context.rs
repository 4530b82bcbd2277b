//! Global context for rdeps operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{self, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global rdeps data (~/.rdeps/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    ///
    /// Loads `~/.rdeps/config.toml` and `<cwd>/.rdeps/config.toml`.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(".rdeps"));
        let global = config::global_config_path();
        let config = config::load_config(global.as_deref(), &config::project_config_path(&cwd));

        GlobalContext {
            cwd,
            home,
            verbose: false,
            color: true,
            config,
        }
    }

    /// Replace the loaded configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the rdeps home directory (~/.rdeps/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Resolve the registry index to load.
    ///
    /// An explicit path (from the command line) wins over the configured one.
    /// Relative explicit paths are taken relative to the working directory.
    pub fn index_path(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) if path.is_relative() => Some(self.cwd.join(path)),
            Some(path) => Some(path.to_path_buf()),
            None => self.config.registry.index.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_config_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let config_path = config::project_config_path(tmp.path());
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, "[registry]\nindex = \"registry.toml\"\n").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());

        assert_eq!(ctx.index_path(None), Some(tmp.path().join("registry.toml")));
    }

    #[test]
    fn test_explicit_index_wins() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.registry.index = Some(PathBuf::from("/configured.toml"));
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).with_config(config);

        assert_eq!(
            ctx.index_path(Some(Path::new("local.toml"))),
            Some(tmp.path().join("local.toml"))
        );
        assert_eq!(ctx.index_path(None), Some(PathBuf::from("/configured.toml")));
    }
}
