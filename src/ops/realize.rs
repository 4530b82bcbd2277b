//! Handing the combined target to a build engine.
//!
//! The engine owns scheduling, parallelism, and caching. rdeps hands it one
//! target and reports success only if the whole target was realized.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};

use crate::ops::aggregate::CombinedTarget;
use crate::util::config::BuildConfig;
use crate::util::diagnostic::suggestions;
use crate::util::process::{find_executable, ProcessBuilder};

/// Outcome of a successful realization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Realization {
    /// Name of the realized target
    pub target: String,
    /// Number of member packages built
    pub members: usize,
}

/// Something that can build a combined target.
pub trait BuildEngine {
    /// Realize every member of `target`, failing if any member fails.
    fn realize(&self, target: &CombinedTarget) -> Result<Realization>;
}

/// Build engine that shells out to an external command once per target.
///
/// The command line is the configured program and leading arguments,
/// followed by `<attr_flag> <member>` for every member.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    leading_args: Vec<String>,
    attr_flag: Option<String>,
    cwd: Option<PathBuf>,
}

impl CommandEngine {
    /// Create an engine from a command line (program first).
    pub fn new(command: &[String], attr_flag: Option<String>) -> Result<Self> {
        let Some((program, leading_args)) = command.split_first() else {
            bail!("build command is empty\nhelp: set `build.command` in .rdeps/config.toml");
        };

        Ok(CommandEngine {
            program: program.clone(),
            leading_args: leading_args.to_vec(),
            attr_flag,
            cwd: None,
        })
    }

    /// Create an engine from the `[build]` config section.
    pub fn from_config(config: &BuildConfig) -> Result<Self> {
        Self::new(&config.command(), config.attr_flag())
    }

    /// Run the engine in `cwd`.
    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// The process that would realize `target`.
    pub fn command_for(&self, program: &Path, target: &CombinedTarget) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(program).args(&self.leading_args);

        for member in target.dependencies() {
            if let Some(ref flag) = self.attr_flag {
                cmd = cmd.arg(flag);
            }
            cmd = cmd.arg(member.name().as_str());
        }

        if let Some(ref cwd) = self.cwd {
            cmd = cmd.cwd(cwd);
        }

        cmd
    }

    fn locate_program(&self) -> Result<PathBuf> {
        let path = Path::new(&self.program);
        if path.components().count() > 1 {
            return Ok(path.to_path_buf());
        }

        find_executable(&self.program)
            .ok_or_else(|| anyhow!("build engine `{}` not found in PATH", self.program))
    }
}

impl BuildEngine for CommandEngine {
    fn realize(&self, target: &CombinedTarget) -> Result<Realization> {
        // Most engines treat "no attributes" as "build everything".
        if target.is_empty() {
            tracing::info!("{} has no members, nothing to build", target.name());
            return Ok(Realization {
                target: target.name().to_string(),
                members: 0,
            });
        }

        let program = self.locate_program()?;
        let cmd = self.command_for(&program, target);

        tracing::info!(
            "building {} ({} packages, fingerprint {})",
            target.name(),
            target.dependencies().len(),
            target.fingerprint()
        );
        tracing::debug!("running `{}`", cmd.display_command());

        let status = cmd.status()?;
        if !status.success() {
            bail!(
                "failed to build {}: `{}` exited with {}\n{}",
                target.name(),
                self.program,
                status
                    .code()
                    .map_or_else(|| "a signal".to_string(), |c| format!("code {}", c)),
                suggestions::BUILD_FAILED
            );
        }

        Ok(Realization {
            target: target.name().to_string(),
            members: target.dependencies().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::reverse_deps::ResultSet;
    use crate::test_support::*;
    use crate::util::InternedString;

    fn target_of(names: &[&str]) -> CombinedTarget {
        let result: ResultSet = names
            .iter()
            .map(|n| (InternedString::new(n), usable(n, &[])))
            .collect();
        CombinedTarget::new("zlib", &result)
    }

    fn engine(command: &[&str], attr_flag: Option<&str>) -> CommandEngine {
        let command: Vec<String> = command.iter().map(|s| s.to_string()).collect();
        CommandEngine::new(&command, attr_flag.map(String::from)).unwrap()
    }

    #[test]
    fn test_command_line() {
        let engine = engine(&["nix-build", "<nixpkgs>"], Some("-A"));
        let cmd = engine.command_for(Path::new("/bin/nix-build"), &target_of(&["curl", "libpng"]));

        assert_eq!(
            cmd.display_command(),
            "/bin/nix-build <nixpkgs> -A curl -A libpng"
        );
    }

    #[test]
    fn test_command_line_without_flag() {
        let engine = engine(&["make"], None);
        let cmd = engine.command_for(Path::new("make"), &target_of(&["curl"]));
        assert_eq!(cmd.get_args(), ["curl"]);
    }

    #[test]
    fn test_from_config_defaults_and_bare_names() {
        let default = CommandEngine::from_config(&BuildConfig::default()).unwrap();
        let cmd = default.command_for(Path::new("nix-build"), &target_of(&["curl"]));
        assert_eq!(cmd.get_args(), ["<nixpkgs>", "-A", "curl"]);

        let bare = BuildConfig {
            command: Some(vec!["make".to_string()]),
            attr_flag: Some(String::new()),
        };
        let engine = CommandEngine::from_config(&bare).unwrap();
        let cmd = engine.command_for(Path::new("make"), &target_of(&["curl", "libpng"]));
        assert_eq!(cmd.get_args(), ["curl", "libpng"]);
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(CommandEngine::new(&[], None).is_err());
    }

    #[test]
    fn test_empty_target_skips_engine() {
        let engine = engine(&["definitely-not-a-real-program-rdeps"], Some("-A"));
        let realization = engine.realize(&target_of(&[])).unwrap();
        assert_eq!(realization.members, 0);
    }

    #[test]
    fn test_missing_engine() {
        let engine = engine(&["definitely-not-a-real-program-rdeps"], Some("-A"));
        let err = engine.realize(&target_of(&["curl"])).unwrap_err();
        assert!(err.to_string().contains("not found in PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn test_success_and_failure_are_whole_target() {
        // $# counts the appended `-A <member>` pairs.
        let ok = engine(&["sh", "-c", "test \"$#\" -eq 4", "sh"], Some("-A"));
        let realization = ok.realize(&target_of(&["curl", "libpng"])).unwrap();
        assert_eq!(realization.members, 2);
        assert_eq!(realization.target, "rdeps-of-zlib");

        let failing = engine(&["sh", "-c", "exit 1", "sh"], Some("-A"));
        let err = failing.realize(&target_of(&["curl", "libpng"])).unwrap_err();
        assert!(err.to_string().contains("failed to build rdeps-of-zlib"));
    }
}
