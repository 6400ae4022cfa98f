//! `create_fw` command

use std::path::Path;

use anyhow::Result;
use fwmeta_core::package;

/// Package a manifest and its part files into a firmware archive.
pub fn create_fw(manifest: &Path, output: &Path, src_dir: Option<&Path>) -> Result<()> {
    let packaged = package::create_firmware(manifest, output, src_dir)?;

    // NOTE: the archive's parts now live under their base names, but the
    // manifest file on disk (and the copy inside the archive) keep the
    // original `src` paths.
    for (name, part) in packaged.file_parts() {
        tracing::debug!("  {name}: src={}", part.src.as_deref().unwrap_or_default());
    }

    tracing::info!("Wrote {}", output.display());
    Ok(())
}
