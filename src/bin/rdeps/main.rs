//! rdeps CLI - reverse build-dependency finder

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use rdeps::util::diagnostic::emit;
use rdeps::{GlobalContext, QueryError};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<QueryError>() {
            Some(query_err) => emit(&query_err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // stdout carries the manifest, so all logging goes to stderr.
    let filter = if cli.verbose {
        EnvFilter::new("rdeps=debug")
    } else {
        EnvFilter::new("rdeps=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);

    let index = cli.index.as_deref();

    match cli.command {
        Commands::Query(args) => commands::query::execute(args, &ctx, index),
        Commands::Classify(args) => commands::classify::execute(args, &ctx, index),
        Commands::Explain(args) => commands::explain::execute(args, &ctx, index),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
