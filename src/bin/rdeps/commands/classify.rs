//! `rdeps classify` command

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::ClassifyArgs;
use crate::commands::{classifier, load_registry};
use rdeps::ops::resolve_target;
use rdeps::{GlobalContext, Usability};

/// One line of `rdeps classify --json` output.
#[derive(Debug, Serialize)]
struct Classification {
    name: String,
    status: Usability,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

pub fn execute(args: ClassifyArgs, ctx: &GlobalContext, index: Option<&Path>) -> Result<()> {
    let registry = load_registry(ctx, index)?;
    let classifier = classifier(ctx, &args.classifier);

    let mut results = Vec::with_capacity(args.packages.len());
    for name in &args.packages {
        let record = resolve_target(&registry, name)?;

        let (status, error) = match classifier.try_classify(&record) {
            Ok(status) => (status, None),
            Err(e) => (Usability::EvaluationError, Some(e.message().to_string())),
        };
        let description = record
            .as_package()
            .and_then(|unit| unit.try_metadata())
            .and_then(|meta| meta.description.clone());

        results.push(Classification {
            name: name.clone(),
            status,
            error,
            description,
        });
    }

    if args.json {
        let json = serde_json::to_string_pretty(&results)
            .context("failed to serialize classification")?;
        println!("{}", json);
        return Ok(());
    }

    for result in &results {
        match result.error {
            Some(ref e) => println!("{}: {} ({})", result.name, result.status, e),
            None => println!("{}: {}", result.name, result.status),
        }

        if ctx.is_verbose() {
            if let Some(ref description) = result.description {
                println!("  {}", description);
            }
        }
    }

    Ok(())
}
