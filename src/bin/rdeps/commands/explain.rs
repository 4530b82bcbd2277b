//! `rdeps explain` command

use std::path::Path;

use anyhow::Result;

use crate::cli::ExplainArgs;
use crate::commands::{classifier, load_registry};
use rdeps::ops::{evaluate_candidate, resolve_target, Candidate, Exclusion};
use rdeps::util::diagnostic::{emit, Diagnostic};
use rdeps::{GlobalContext, Usability};

pub fn execute(args: ExplainArgs, ctx: &GlobalContext, index: Option<&Path>) -> Result<()> {
    let registry = load_registry(ctx, index)?;
    let classifier = classifier(ctx, &args.classifier);

    let target = resolve_target(&registry, &args.target)?;
    let record = resolve_target(&registry, &args.package)?;

    match evaluate_candidate(&record, &target, &classifier) {
        Candidate::Included => {
            println!(
                "{} is a reverse dependency of {}",
                record.name(),
                target.name()
            );
            emit(
                &Diagnostic::note("only direct build inputs were checked for usability"),
                ctx.color(),
            );
        }
        Candidate::Excluded(exclusion) => {
            println!(
                "{} is not a reverse dependency of {}: {}",
                record.name(),
                target.name(),
                exclusion
            );

            let status = match exclusion {
                Exclusion::Unusable(status) | Exclusion::UnusableInput { status, .. } => {
                    Some(status)
                }
                Exclusion::NoBuildInputs | Exclusion::NotADependent => None,
            };
            let hint = match status {
                Some(Usability::MarkedBroken) => {
                    Some("pass `--allow-broken` to include packages marked broken")
                }
                Some(Usability::PlatformUnsupported) => {
                    Some("pass `--system <platform>` to classify for another platform")
                }
                _ => None,
            };
            if let Some(hint) = hint {
                emit(&Diagnostic::note(hint), ctx.color());
            }
        }
    }

    Ok(())
}
