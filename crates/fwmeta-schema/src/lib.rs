//! Shared types for firmware build metadata: build info, manifests, parts
//! and checksum algorithms.

pub mod build_info;
pub mod checksum;
pub mod manifest;

// Re-exports
pub use build_info::BuildInfo;
pub use checksum::{CHECKSUM_ATTR_PREFIX, ChecksumAlgo, UnknownChecksumAlgo};
pub use manifest::{MANIFEST_FILE_NAME, Manifest, Part, SRC_ATTR};
