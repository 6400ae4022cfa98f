//! Build info generation and extraction.

use std::path::Path;

use chrono::{DateTime, Utc};
use fwmeta_schema::BuildInfo;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::manifest::read_manifest_value;
use crate::vcs::Vcs;

/// Timestamp format: ISO-8601 with microseconds, UTC, no zone suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Version used when no explicit or tag-derived version is available.
pub const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";

/// Date prefix of a derived build id.
pub const BUILD_ID_PREFIX_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Stands in for the branch-or-tag component on an untagged detached head.
const UNKNOWN_REF: &str = "?";

/// How a single build info field is produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldOverride {
    /// Derive the value (clock or repository).
    #[default]
    Derive,
    /// Leave the field out of the record.
    Omit,
    /// Use this value as-is.
    Literal(String),
}

impl From<Option<String>> for FieldOverride {
    /// `None` derives, an empty string omits, anything else is literal.
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::Derive,
            Some(s) if s.is_empty() => Self::Omit,
            Some(s) => Self::Literal(s),
        }
    }
}

/// Whether the build id carries the `+` dirty marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirtyPolicy {
    /// Ask the repository.
    #[default]
    Auto,
    /// Always mark dirty.
    Dirty,
    /// Never mark dirty.
    Clean,
}

/// Inputs to [`generate`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub timestamp: FieldOverride,
    pub version: FieldOverride,
    pub id: FieldOverride,
    pub dirty: DirtyPolicy,
    /// Prefer a tag on the current commit as the derived version.
    pub tag_as_version: bool,
}

impl GenerateOptions {
    /// True if generating with these options will query the repository.
    pub fn needs_repo(&self) -> bool {
        self.id == FieldOverride::Derive
            || (self.version == FieldOverride::Derive && self.tag_as_version)
    }
}

/// Produce a fresh build info record.
///
/// `now` is read once by the caller so the timestamp, fallback version and
/// build id prefix agree. `repo` is only consulted when
/// [`GenerateOptions::needs_repo`] says so.
///
/// # Errors
///
/// Returns [`Error::RepoRequired`] if the repository is needed but `repo` is
/// `None`, or any error raised while querying it.
pub fn generate(
    opts: &GenerateOptions,
    now: DateTime<Utc>,
    repo: Option<&dyn Vcs>,
) -> Result<BuildInfo> {
    let require_repo = || repo.ok_or(Error::RepoRequired);

    let build_timestamp = match &opts.timestamp {
        FieldOverride::Derive => Some(now.format(TIMESTAMP_FORMAT).to_string()),
        FieldOverride::Omit => None,
        FieldOverride::Literal(ts) => Some(ts.clone()),
    };

    let build_version = match &opts.version {
        FieldOverride::Derive => {
            let tag = if opts.tag_as_version {
                require_repo()?.tag_at_head()?
            } else {
                None
            };
            Some(tag.unwrap_or_else(|| now.format(VERSION_FORMAT).to_string()))
        }
        FieldOverride::Omit => None,
        FieldOverride::Literal(v) => Some(v.clone()),
    };

    let build_id = match &opts.id {
        FieldOverride::Derive => Some(derive_build_id(require_repo()?, opts.dirty, now)?),
        FieldOverride::Omit => None,
        FieldOverride::Literal(id) => Some(id.clone()),
    };

    let bi = BuildInfo {
        build_id,
        build_timestamp,
        build_version,
    };
    tracing::debug!(?bi, "Generated build info");
    Ok(bi)
}

/// `<YYYYMMDD-HHMMSS>/<branch-or-tag>@<commit[..8]>[+]`
fn derive_build_id(repo: &dyn Vcs, dirty: DirtyPolicy, now: DateTime<Utc>) -> Result<String> {
    let branch_or_tag = match repo.current_branch()? {
        Some(branch) => branch,
        None => repo
            .tag_at_head()?
            .unwrap_or_else(|| UNKNOWN_REF.to_string()),
    };

    let commit = repo.head_commit()?;
    let short = commit.get(..8).unwrap_or(&commit);

    let dirty = match dirty {
        DirtyPolicy::Auto => repo.is_dirty()?,
        DirtyPolicy::Dirty => true,
        DirtyPolicy::Clean => false,
    };

    Ok(format!(
        "{}/{branch_or_tag}@{short}{}",
        now.format(BUILD_ID_PREFIX_FORMAT),
        if dirty { "+" } else { "" }
    ))
}

/// The subset of a manifest that carries build identity.
#[derive(Debug, Deserialize)]
struct ManifestIdentity {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    build_id: Option<String>,
    #[serde(default)]
    build_timestamp: Option<String>,
}

/// Read the build info recorded in an existing manifest.
///
/// The manifest's `version` becomes `build_version`. Values are passed
/// through untouched and any of them may be absent.
///
/// # Errors
///
/// Returns [`Error::ManifestNotFound`] if the file cannot be read and
/// [`Error::MalformedManifest`] if it is not JSON or a field is not a string.
pub fn extract_from_manifest(path: &Path) -> Result<BuildInfo> {
    let value = read_manifest_value(path)?;
    let identity: ManifestIdentity =
        serde_json::from_value(value).map_err(|e| Error::MalformedManifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(BuildInfo {
        build_id: identity.build_id,
        build_timestamp: identity.build_timestamp,
        build_version: identity.version,
    })
}
