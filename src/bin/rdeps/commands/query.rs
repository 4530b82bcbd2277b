//! `rdeps query` command

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::QueryArgs;
use crate::commands::{effective_allow_broken, effective_system, load_registry};
use rdeps::ops::{query, BuildEngine, CommandEngine, QueryOptions, QueryOutput};
use rdeps::util::fs::write_string;
use rdeps::GlobalContext;

pub fn execute(args: QueryArgs, ctx: &GlobalContext, index: Option<&Path>) -> Result<()> {
    let registry = load_registry(ctx, index)?;

    let opts = QueryOptions {
        target: args.target.clone(),
        just_print_all_deps: args.just_print_all_deps,
        allow_broken: effective_allow_broken(ctx, &args.classifier),
        system: effective_system(ctx, &args.classifier),
    };

    match query(&registry, &opts)? {
        QueryOutput::Manifest(text) => write_output(ctx, args.out.as_deref(), &text),

        QueryOutput::Build(target) if args.plan => {
            let mut json = target
                .to_json()
                .context("failed to serialize build plan")?;
            json.push('\n');
            write_output(ctx, args.out.as_deref(), &json)
        }

        QueryOutput::Build(target) => {
            if args.out.is_some() {
                tracing::warn!("--out only applies with --just-print-all-deps or --plan");
            }

            let engine = CommandEngine::from_config(&ctx.config().build)?.with_cwd(ctx.cwd());
            let realization = engine.realize(&target)?;

            eprintln!(
                "    Finished {} ({} package(s))",
                realization.target, realization.members
            );
            Ok(())
        }
    }
}

fn write_output(ctx: &GlobalContext, out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(path) => write_string(&ctx.cwd().join(path), contents),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to write to stdout")
        }
    }
}
