//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// rdeps - find, and optionally rebuild, everything that build-depends on a package
#[derive(Parser)]
#[command(name = "rdeps")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Registry index to read (defaults to `registry.index` from config)
    #[arg(long, global = true, env = "RDEPS_INDEX")]
    pub index: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the usable reverse dependencies of a package
    Query(QueryArgs),

    /// Show how packages are classified
    Classify(ClassifyArgs),

    /// Explain why a package is or isn't a reverse dependency of a target
    Explain(ExplainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Classification settings shared by every query-like command.
#[derive(Args)]
pub struct ClassifierArgs {
    /// Treat packages marked broken as usable
    #[arg(long, env = "RDEPS_ALLOW_BROKEN", overrides_with = "no_allow_broken")]
    pub allow_broken: bool,

    /// Exclude packages marked broken, even if config allows them
    #[arg(long, overrides_with = "allow_broken")]
    pub no_allow_broken: bool,

    /// Platform id to classify against (e.g. x86_64-linux)
    #[arg(long)]
    pub system: Option<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Package whose reverse dependencies are wanted
    pub target: String,

    /// Print the names instead of building them
    #[arg(long)]
    pub just_print_all_deps: bool,

    #[command(flatten)]
    pub classifier: ClassifierArgs,

    /// Write the manifest or plan to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Emit the combined build target as JSON (no build)
    #[arg(long, conflicts_with = "just_print_all_deps")]
    pub plan: bool,
}

#[derive(Args)]
pub struct ClassifyArgs {
    /// Packages to classify
    #[arg(required = true)]
    pub packages: Vec<String>,

    #[command(flatten)]
    pub classifier: ClassifierArgs,

    /// Print the results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Package whose reverse dependencies are considered
    pub target: String,

    /// Package to explain
    pub package: String,

    #[command(flatten)]
    pub classifier: ClassifierArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
