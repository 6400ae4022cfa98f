//! fw-meta core: build info, manifests and firmware archives.
//!
//! Every operation is a single synchronous pass: read inputs, build the
//! record in memory, write at most one output. Output files are replaced
//! atomically, so a failed command leaves nothing half-written.
//!
//! # Pipeline
//!
//! ```text
//! gen_build_info ──► build info JSON ──► create_manifest ──► manifest.json ──► create_fw ──► fw.zip
//!                                                                │
//!                                                                └──► get_build_info
//! ```
#![allow(missing_docs)]

pub mod build_info;
pub mod error;
pub mod json_path;
pub mod manifest;
pub mod output;
pub mod package;
pub mod vcs;

pub use error::{Error, Result};
pub use fwmeta_schema as schema;
pub use vcs::{GitRepo, Vcs};
