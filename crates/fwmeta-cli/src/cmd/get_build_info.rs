//! `get_build_info` command

use std::path::Path;

use anyhow::Result;
use fwmeta_core::build_info;
use fwmeta_core::output::{self, Sink};

/// Re-emit the build info recorded in a manifest.
pub fn get_build_info(
    manifest: &Path,
    json_output: Option<&Sink>,
    c_output: Option<&Sink>,
) -> Result<()> {
    let bi = build_info::extract_from_manifest(manifest)?;
    tracing::debug!(?bi, "Build info from {}", manifest.display());
    output::write_build_info(&bi, json_output, c_output)?;
    Ok(())
}
