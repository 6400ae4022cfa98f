//! Firmware package manifest.
//!
//! A manifest names a firmware build, pins its version and build identity,
//! and lists the parts that make up the package. On disk it is a JSON
//! object; each part is a flat object of string attributes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::checksum::ChecksumAlgo;

/// File name of the manifest inside a firmware archive.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Attribute naming a part's source file.
pub const SRC_ATTR: &str = "src";

/// A named component of a firmware package.
///
/// `src` is the only attribute with meaning to the tooling. Everything else,
/// checksums included, lives in `attributes` and is flattened next to it
/// when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Path of the file backing this part, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Free-form attributes (`type`, `addr`, `cs_sha1`, ...).
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl Part {
    /// Set an attribute, routing `src` to its dedicated field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key == SRC_ATTR {
            self.src = Some(value.into());
        } else {
            self.attributes.insert(key, value.into());
        }
    }

    /// Recorded digest for `algo`, if one was computed.
    pub fn checksum(&self, algo: ChecksumAlgo) -> Option<&str> {
        self.attributes.get(&algo.attr_key()).map(String::as_str)
    }

    /// Record a digest under `cs_<algo>`.
    pub fn set_checksum(&mut self, algo: ChecksumAlgo, hex_digest: String) {
        self.attributes.insert(algo.attr_key(), hex_digest);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Part {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut part = Part::default();
        for (k, v) in iter {
            part.set(k, v);
        }
        part
    }
}

/// Structured description of a firmware package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Firmware name.
    pub name: String,
    /// Target platform.
    pub platform: String,
    /// Release version, copied from the build info.
    pub version: String,
    /// Build identifier, if the build info carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    /// Build timestamp, if the build info carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_timestamp: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parts keyed by name.
    #[serde(default)]
    pub parts: BTreeMap<String, Part>,
}

impl Manifest {
    /// Top-level directory name inside the firmware archive: `<name>-<version>`.
    pub fn archive_dir(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Parts that reference a source file, in name order.
    pub fn file_parts(&self) -> impl Iterator<Item = (&String, &Part)> {
        self.parts.iter().filter(|(_, part)| part.src.is_some())
    }
}
