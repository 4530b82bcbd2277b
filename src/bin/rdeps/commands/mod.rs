//! Command implementations

pub mod classify;
pub mod completions;
pub mod explain;
pub mod query;

use std::path::Path;

use anyhow::{anyhow, Result};

use crate::cli::ClassifierArgs;
use rdeps::ops::Classifier;
use rdeps::util::diagnostic::suggestions;
use rdeps::util::InternedString;
use rdeps::{GlobalContext, IndexRegistry};

/// Load the registry named on the command line or in config.
pub fn load_registry(ctx: &GlobalContext, index: Option<&Path>) -> Result<IndexRegistry> {
    let path = ctx
        .index_path(index)
        .ok_or_else(|| anyhow!("no registry index given\n{}", suggestions::NO_INDEX))?;

    IndexRegistry::load(&path)
}

/// Command-line flags win over the `[query]` config section.
pub fn effective_allow_broken(ctx: &GlobalContext, args: &ClassifierArgs) -> bool {
    if args.allow_broken {
        true
    } else if args.no_allow_broken {
        false
    } else {
        ctx.config().query.allow_broken()
    }
}

pub fn effective_system(ctx: &GlobalContext, args: &ClassifierArgs) -> Option<String> {
    args.system
        .clone()
        .or_else(|| ctx.config().query.system.clone())
}

/// Build the classifier for these flags.
pub fn classifier(ctx: &GlobalContext, args: &ClassifierArgs) -> Classifier {
    let classifier = match effective_system(ctx, args) {
        Some(system) => Classifier::new(InternedString::new(system)),
        None => Classifier::for_host(),
    };
    classifier.allow_broken(effective_allow_broken(ctx, args))
}
