//! Firmware archive assembly.
//!
//! Layout: `<name>-<version>/` holding `manifest.json` and one entry per
//! file-backed part, named by the source's base name. All entries are stored
//! uncompressed.

use std::collections::HashMap;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use fwmeta_schema::{MANIFEST_FILE_NAME, Manifest};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::manifest::{read_manifest_value, read_source, resolve_source};
use crate::output::{parent_dir, to_sorted_json};

/// A file-backed part scheduled for the archive.
#[derive(Debug)]
struct ArchiveEntry {
    part: String,
    source: PathBuf,
    file_name: String,
}

/// Build a firmware archive from a manifest file.
///
/// The archived `manifest.json` is the manifest as loaded, with the
/// original `src` paths. The returned manifest has each `src` rewritten to
/// the base name it was archived under; the manifest file on disk is left
/// alone.
///
/// Sources are checked before the archive is opened, and the archive is
/// written to a temporary file that only replaces `output` on success.
///
/// # Errors
///
/// Returns [`Error::ManifestNotFound`] or [`Error::MalformedManifest`] for a
/// bad manifest, [`Error::SourceFileNotFound`] for a missing part source and
/// [`Error::DuplicateArchiveEntry`] if two sources share a base name.
pub fn create_firmware(
    manifest_path: &Path,
    output: &Path,
    src_dir: Option<&Path>,
) -> Result<Manifest> {
    let document = read_manifest_value(manifest_path)?;
    let mut manifest: Manifest =
        serde_json::from_value(document.clone()).map_err(|e| Error::MalformedManifest {
            path: manifest_path.to_path_buf(),
            message: e.to_string(),
        })?;

    let entries = plan_entries(&manifest, src_dir)?;
    let archive_dir = manifest.archive_dir();
    tracing::debug!(
        "Packaging {} part(s) under {archive_dir}/ into {}",
        entries.len(),
        output.display()
    );

    let tmp = tempfile::NamedTempFile::new_in(parent_dir(output))?;
    let file = write_archive(tmp.as_file(), &archive_dir, &document, &entries)?;
    file.sync_all()?;
    tmp.persist(output).map_err(|e| e.error)?;

    for entry in entries {
        if let Some(part) = manifest.parts.get_mut(&entry.part) {
            part.src = Some(entry.file_name);
        }
    }

    Ok(manifest)
}

/// Resolve every part source and its in-archive name.
fn plan_entries(manifest: &Manifest, src_dir: Option<&Path>) -> Result<Vec<ArchiveEntry>> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut entries = Vec::new();

    for (name, part) in manifest.file_parts() {
        let Some(src) = part.src.as_deref() else {
            continue;
        };
        let source = resolve_source(src_dir, src);
        if !source.is_file() {
            return Err(Error::SourceFileNotFound { path: source });
        }

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::SourceFileNotFound {
                path: source.clone(),
            })?;

        if let Some(first) = seen.insert(file_name.clone(), name.clone()) {
            return Err(Error::DuplicateArchiveEntry {
                entry: file_name,
                first,
                second: name.clone(),
            });
        }

        entries.push(ArchiveEntry {
            part: name.clone(),
            source,
            file_name,
        });
    }

    Ok(entries)
}

fn write_archive<W: Write + Seek>(
    writer: W,
    archive_dir: &str,
    document: &serde_json::Value,
    entries: &[ArchiveEntry],
) -> Result<W> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = ZipWriter::new(writer);

    zip.add_directory(format!("{archive_dir}/"), options)?;

    zip.start_file(format!("{archive_dir}/{MANIFEST_FILE_NAME}"), options)?;
    zip.write_all(to_sorted_json(document)?.as_bytes())?;

    for entry in entries {
        let data = read_source(&entry.source)?;
        tracing::trace!("Adding {} as {}", entry.source.display(), entry.file_name);
        zip.start_file(format!("{archive_dir}/{}", entry.file_name), options)?;
        zip.write_all(&data)?;
    }

    Ok(zip.finish()?)
}
