//! User-facing diagnostic messages.
//!
//! Every fatal error printed by the CLI names the root cause, any relevant
//! context, and what the user can do about it.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages.
pub mod suggestions {
    /// No registry index was given or configured.
    pub const NO_INDEX: &str =
        "help: Pass `--index <path>` or set `registry.index` in .rdeps/config.toml";

    /// The build engine exited unsuccessfully.
    pub const BUILD_FAILED: &str =
        "help: Run `rdeps query <target> --just-print-all-deps` to list the members";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related file, usually the registry index
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn with_severity(message: impl Into<String>, severity: Severity) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Error)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Warning)
    }

    /// Create a new note.
    pub fn note(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Note)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  → {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("could not find package `zlb`")
            .with_context("did you mean: zlib?")
            .with_location("registry.toml")
            .with_suggestion("Check that the package name is spelled correctly");

        let output = diag.format(false);
        assert!(output.starts_with("error: could not find package `zlb`"));
        assert!(output.contains("--> registry.toml"));
        assert!(output.contains("did you mean: zlib?"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Check that the package name"));
    }

    #[test]
    fn test_colored_severity() {
        let output = Diagnostic::warning("stale index").format(true);
        assert!(output.contains("\x1b[1;33mwarning\x1b[0m"));
    }
}
