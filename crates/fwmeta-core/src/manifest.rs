//! Manifest assembly from build info and part specs.
//!
//! A part spec looks like `boot:src=out/boot.bin,addr=0`: the part name, a
//! colon, then comma-separated `key=value` attributes.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use fwmeta_schema::{BuildInfo, ChecksumAlgo, Manifest, Part};

use crate::error::{Error, Result};

/// Read and parse a manifest file as untyped JSON.
pub(crate) fn read_manifest_value(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ManifestNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| Error::MalformedManifest {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Resolve a part's `src` against an optional base directory.
///
/// An absolute `src` wins over `src_dir`, as with [`Path::join`].
pub fn resolve_source(src_dir: Option<&Path>, src: &str) -> PathBuf {
    match src_dir {
        Some(dir) => dir.join(src),
        None => PathBuf::from(src),
    }
}

/// Read a part's source file.
pub(crate) fn read_source(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::SourceFileNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })
}

/// A parsed `name:key=value,...` part spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSpec {
    pub name: String,
    pub part: Part,
}

impl FromStr for PartSpec {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidPartSpec {
            spec: spec.to_string(),
            message: message.to_string(),
        };

        let (name, attrs) = spec
            .split_once(':')
            .ok_or_else(|| invalid("expected 'name:key=value,...'"))?;
        if name.is_empty() {
            return Err(invalid("part name is empty"));
        }

        let mut part = Part::default();
        for kv in attrs.split(',') {
            let (key, value) = kv
                .split_once('=')
                .ok_or_else(|| invalid(&format!("attribute '{kv}' is not key=value")))?;
            if key.is_empty() {
                return Err(invalid(&format!("attribute '{kv}' has an empty key")));
            }
            part.set(key, value);
        }

        Ok(Self {
            name: name.to_string(),
            part,
        })
    }
}

/// Load build info from a JSON file or, failing that, an inline JSON string.
///
/// The argument is treated as a path when a file by that name exists.
/// `build_version` must be present.
///
/// # Errors
///
/// Returns [`Error::InvalidBuildInfo`] if an existing path cannot be read,
/// or the content is not a JSON object of string fields or lacks
/// `build_version`.
pub fn load_build_info(source: &str) -> Result<BuildInfo> {
    let path = Path::new(source);
    let content = if path.exists() {
        tracing::debug!("Reading build info from {}", path.display());
        std::fs::read_to_string(path).map_err(|e| Error::InvalidBuildInfo {
            input: source.to_string(),
            message: e.to_string(),
        })?
    } else {
        source.to_string()
    };

    let bi: BuildInfo = serde_json::from_str(&content).map_err(|e| Error::InvalidBuildInfo {
        input: source.to_string(),
        message: e.to_string(),
    })?;

    if bi.build_version.is_none() {
        return Err(Error::InvalidBuildInfo {
            input: source.to_string(),
            message: "missing required key 'build_version'".to_string(),
        });
    }
    Ok(bi)
}

/// Assembles a [`Manifest`] from build info and part specs.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    name: String,
    platform: String,
    description: Option<String>,
    checksums: Vec<ChecksumAlgo>,
    src_dir: Option<PathBuf>,
}

impl ManifestBuilder {
    /// Start a manifest for `name` on `platform`, with `sha1` checksums.
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            description: None,
            checksums: vec![ChecksumAlgo::Sha1],
            src_dir: None,
        }
    }

    /// Set the description. An empty string leaves it unset.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }

    /// Digests to record for file-backed parts. Empty disables checksums.
    pub fn checksums(mut self, checksums: Vec<ChecksumAlgo>) -> Self {
        self.checksums = checksums;
        self
    }

    /// Base directory for resolving part `src` paths.
    pub fn src_dir(mut self, src_dir: Option<PathBuf>) -> Self {
        self.src_dir = src_dir;
        self
    }

    /// Build the manifest.
    ///
    /// Every spec is parsed before any source file is read, so a malformed
    /// spec fails without touching the filesystem. A later spec with the same
    /// part name replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBuildInfo`] if `build_info` has no version,
    /// [`Error::InvalidPartSpec`] for a malformed spec and
    /// [`Error::SourceFileNotFound`] if a checksummed source is missing.
    pub fn build(&self, build_info: &BuildInfo, part_specs: &[String]) -> Result<Manifest> {
        let version = build_info
            .build_version
            .clone()
            .ok_or_else(|| Error::InvalidBuildInfo {
                input: format!("{build_info:?}"),
                message: "missing required key 'build_version'".to_string(),
            })?;

        let specs = part_specs
            .iter()
            .map(|s| s.parse::<PartSpec>())
            .collect::<Result<Vec<_>>>()?;

        let mut manifest = Manifest {
            name: self.name.clone(),
            platform: self.platform.clone(),
            version,
            build_id: build_info.build_id.clone(),
            build_timestamp: build_info.build_timestamp.clone(),
            description: self.description.clone(),
            parts: std::collections::BTreeMap::new(),
        };

        for PartSpec { name, mut part } in specs {
            self.add_checksums(&mut part)?;
            if manifest.parts.insert(name.clone(), part).is_some() {
                tracing::debug!("Part '{name}' redefined; keeping the later spec");
            }
        }

        Ok(manifest)
    }

    fn add_checksums(&self, part: &mut Part) -> Result<()> {
        if self.checksums.is_empty() {
            return Ok(());
        }
        let Some(src) = part.src.as_deref() else {
            return Ok(());
        };

        let path = resolve_source(self.src_dir.as_deref(), src);
        let data = read_source(&path)?;
        tracing::debug!("Hashing {} ({} bytes)", path.display(), data.len());

        for &algo in &self.checksums {
            part.set_checksum(algo, algo.digest_hex(&data));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn build_info() -> BuildInfo {
        BuildInfo {
            build_id: Some("20240102-030405/main@1a2b3c4d".into()),
            build_timestamp: Some("2024-01-02T03:04:05.000000".into()),
            build_version: Some("1.0".into()),
        }
    }

    fn specs(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parse_part_spec() {
        let spec: PartSpec = "boot:src=out/boot.bin,addr=0,type=boot".parse().unwrap();
        assert_eq!(spec.name, "boot");
        assert_eq!(spec.part.src.as_deref(), Some("out/boot.bin"));
        assert_eq!(spec.part.attributes["addr"], "0");
        assert_eq!(spec.part.attributes["type"], "boot");
    }

    #[test]
    fn part_spec_values_may_contain_separators() {
        let spec: PartSpec = "cfg:url=http://host/a=b".parse().unwrap();
        assert_eq!(spec.part.attributes["url"], "http://host/a=b");
    }

    #[test]
    fn malformed_part_specs() {
        for bad in ["boot", "boot:", "boot:src", ":src=a", "boot:=a", "boot:a=1,"] {
            let err = bad.parse::<PartSpec>().unwrap_err();
            assert!(
                matches!(err, Error::InvalidPartSpec { ref spec, .. } if spec == bad),
                "{bad} should be rejected, got {err}"
            );
        }
    }

    #[test]
    fn build_info_inline_and_file() {
        let bi = load_build_info(r#"{"build_version":"2.0","build_id":"x"}"#).unwrap();
        assert_eq!(bi.build_version.as_deref(), Some("2.0"));

        let tmp = tempdir().unwrap();
        let path = tmp.path().join("bi.json");
        std::fs::write(&path, r#"{"build_version":"3.0"}"#).unwrap();
        let bi = load_build_info(path.to_str().unwrap()).unwrap();
        assert_eq!(bi.build_version.as_deref(), Some("3.0"));
    }

    #[test]
    fn build_info_requires_version() {
        let err = load_build_info(r#"{"build_id":"x"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidBuildInfo { .. }));

        let err = load_build_info("no/such/file.json").unwrap_err();
        assert!(matches!(err, Error::InvalidBuildInfo { .. }));
    }

    #[test]
    fn unreadable_build_info_path() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();
        let err = load_build_info(dir).unwrap_err();
        assert!(
            matches!(err, Error::InvalidBuildInfo { ref input, .. } if input == dir),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn manifest_copies_build_info() {
        let m = ManifestBuilder::new("demo", "esp8266")
            .description(Some("Demo firmware".into()))
            .checksums(vec![])
            .build(&build_info(), &specs(&["boot:src=boot.bin"]))
            .unwrap();

        assert_eq!(m.version, "1.0");
        assert_eq!(m.build_id.as_deref(), Some("20240102-030405/main@1a2b3c4d"));
        assert_eq!(m.description.as_deref(), Some("Demo firmware"));
        assert!(m.parts["boot"].attributes.is_empty());
    }

    #[test]
    fn empty_description_is_dropped() {
        let m = ManifestBuilder::new("demo", "esp8266")
            .description(Some(String::new()))
            .build(&build_info(), &specs(&["fs:size=4096"]))
            .unwrap();
        assert!(m.description.is_none());
    }

    #[test]
    fn checksums_match_file_content() {
        let tmp = tempdir().unwrap();
        let data = b"\x00\x01firmware\xffbytes";
        std::fs::write(tmp.path().join("file.bin"), data).unwrap();

        let m = ManifestBuilder::new("demo", "cc3200")
            .checksums(vec![ChecksumAlgo::Sha1, ChecksumAlgo::Sha256])
            .src_dir(Some(tmp.path().to_path_buf()))
            .build(&build_info(), &specs(&["app:src=file.bin"]))
            .unwrap();

        let app = &m.parts["app"];
        assert_eq!(app.src.as_deref(), Some("file.bin"));
        assert_eq!(
            app.checksum(ChecksumAlgo::Sha1),
            Some("cf89fcc9a39761aedfc3700de77ab9119ee76db9")
        );
        assert_eq!(
            app.checksum(ChecksumAlgo::Sha256),
            Some("0cdf50e86c891776152164c5e4719957683216572a6efec664aec4f197e5e3ce")
        );
    }

    #[test]
    fn parts_without_src_are_not_hashed() {
        let m = ManifestBuilder::new("demo", "cc3200")
            .build(&build_info(), &specs(&["nvs:size=4096"]))
            .unwrap();
        assert_eq!(m.parts["nvs"].checksum(ChecksumAlgo::Sha1), None);
    }

    #[test]
    fn missing_source_file() {
        let tmp = tempdir().unwrap();
        let err = ManifestBuilder::new("demo", "cc3200")
            .src_dir(Some(tmp.path().to_path_buf()))
            .build(&build_info(), &specs(&["app:src=missing.bin"]))
            .unwrap_err();
        match err {
            Error::SourceFileNotFound { path } => assert!(path.ends_with("missing.bin")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_part_names_keep_later_spec() {
        let m = ManifestBuilder::new("demo", "cc3200")
            .checksums(vec![])
            .build(
                &build_info(),
                &specs(&["fs:src=a.bin,size=1", "fs:src=b.bin,type=spiffs"]),
            )
            .unwrap();

        assert_eq!(m.parts.len(), 1);
        let fs = &m.parts["fs"];
        assert_eq!(fs.src.as_deref(), Some("b.bin"));
        assert_eq!(fs.attributes["type"], "spiffs");
        assert!(!fs.attributes.contains_key("size"));
    }

    #[test]
    fn malformed_spec_fails_before_hashing() {
        // The first spec points at a missing file; the second is malformed.
        // Parsing happens first, so the spec error wins.
        let err = ManifestBuilder::new("demo", "cc3200")
            .build(&build_info(), &specs(&["app:src=missing.bin", "bad:attr"]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPartSpec { .. }));
    }

    #[test]
    fn missing_version_in_build_info() {
        let bi = BuildInfo {
            build_version: None,
            ..build_info()
        };
        let err = ManifestBuilder::new("demo", "cc3200")
            .build(&bi, &specs(&["fs:size=1"]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBuildInfo { .. }));
    }
}
