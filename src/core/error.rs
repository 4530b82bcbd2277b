//! Query and index error types.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Fatal errors raised while loading a registry or running a query.
///
/// Per-record problems never show up here; they are classified and reported
/// through diagnostics instead.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum QueryError {
    #[error("could not find `{package}` in the registry")]
    #[diagnostic(code(rdeps::query::not_found))]
    PackageNotFound {
        package: String,
        suggestions: Vec<String>,
    },

    #[error("build inputs form a cycle: {}", .packages.join(" -> "))]
    #[diagnostic(
        code(rdeps::index::cycle),
        help("records are immutable snapshots, so an input cycle can't be represented")
    )]
    IndexCycle { packages: Vec<String> },

    #[error("failed to parse registry index {}", .path.display())]
    #[diagnostic(code(rdeps::index::parse))]
    IndexParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl QueryError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            QueryError::PackageNotFound {
                package,
                suggestions: similar,
            } => {
                let mut diag = Diagnostic::error(format!("could not find package `{}`", package));

                if !similar.is_empty() {
                    diag = diag.with_context(format!("did you mean: {}?", similar.join(", ")));
                }

                diag.with_suggestion("Check that the package name is spelled correctly")
                    .with_suggestion("Run `rdeps classify <name>` to see how a package is classified")
            }

            QueryError::IndexCycle { packages } => {
                Diagnostic::error("cycle detected between build inputs")
                    .with_context(format!("cycle: {}", packages.join(" -> ")))
                    .with_suggestion("Remove one of the build inputs on the cycle")
            }

            QueryError::IndexParse { path, source } => {
                Diagnostic::error("failed to parse registry index")
                    .with_location(path)
                    .with_context(source.message().to_string())
                    .with_suggestion("Check the index against the documented format")
            }
        }
    }
}
