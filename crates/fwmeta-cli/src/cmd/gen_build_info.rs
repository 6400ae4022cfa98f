//! `gen_build_info` command

use anyhow::{Context, Result};
use chrono::Utc;
use fwmeta_core::build_info::{self, FieldOverride, GenerateOptions};
use fwmeta_core::output;
use fwmeta_core::{GitRepo, Vcs};

use crate::GenBuildInfoArgs;

/// Generate build info and write it to the requested outputs.
///
/// The git repository is only located when a field has to be derived from
/// it, so fully explicit invocations work outside a checkout.
pub fn gen_build_info(args: GenBuildInfoArgs) -> Result<()> {
    let opts = GenerateOptions {
        timestamp: FieldOverride::from(args.timestamp),
        version: FieldOverride::from(args.version),
        id: FieldOverride::from(args.id),
        dirty: args.dirty.into(),
        tag_as_version: args.tag_as_version,
    };

    let repo = if opts.needs_repo() {
        let start = match args.repo {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let repo = GitRepo::discover(&start)?;
        tracing::debug!("Deriving build info from {}", repo.root().display());
        Some(repo)
    } else {
        None
    };

    let now = Utc::now();
    let bi = build_info::generate(&opts, now, repo.as_ref().map(|r| r as &dyn Vcs))?;

    let (json, c) = (args.output.json_output, args.output.c_output);
    if json.is_none() && c.is_none() {
        tracing::warn!("No output requested; pass --json_output and/or --c_output");
    }
    output::write_build_info(&bi, json.as_ref(), c.as_ref())?;
    Ok(())
}
