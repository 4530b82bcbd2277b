//! Subprocess execution for the build engine.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};

/// Builder for a subprocess invocation.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Run with inherited stdio and wait for completion.
    ///
    /// The build engine streams its own progress, so output is not captured.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd.status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
