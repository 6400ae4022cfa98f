//! `create_manifest` command

use anyhow::Result;
use fwmeta_core::manifest::{self, ManifestBuilder};
use fwmeta_core::output::{self, Sink};
use fwmeta_schema::ChecksumAlgo;

use crate::CreateManifestArgs;

/// Assemble a manifest and write it to `--output` or stdout.
pub fn create_manifest(args: CreateManifestArgs) -> Result<()> {
    let checksums = ChecksumAlgo::parse_list(&args.checksums)
        .map_err(fwmeta_core::Error::from)?;
    let build_info = manifest::load_build_info(&args.build_info)?;

    let manifest = ManifestBuilder::new(args.name, args.platform)
        .description(args.description)
        .checksums(checksums)
        .src_dir(args.src_dir)
        .build(&build_info, &args.parts)?;

    tracing::info!(
        "Manifest {} with {} part(s)",
        manifest.archive_dir(),
        manifest.parts.len()
    );

    let sink = args.output.unwrap_or(Sink::Stdout);
    sink.write(&output::to_sorted_json(&manifest)?)?;
    Ok(())
}
