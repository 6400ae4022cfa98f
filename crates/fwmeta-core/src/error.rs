//! Error type shared by every fw-meta operation

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{} doesn't look like a git repository", path.display())]
    NotAVcsRepo { path: PathBuf },

    #[error("a git repository is required to derive the build id or tag version")]
    RepoRequired,

    #[error("git {command} failed: {message}")]
    Vcs { command: String, message: String },

    #[error("manifest not found: {}: {source}", path.display())]
    ManifestNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest {}: {message}", path.display())]
    MalformedManifest { path: PathBuf, message: String },

    #[error("invalid build info '{input}': {message}")]
    InvalidBuildInfo { input: String, message: String },

    #[error("invalid part spec '{spec}': {message}")]
    InvalidPartSpec { spec: String, message: String },

    #[error("unsupported checksum algorithm '{0}'")]
    UnsupportedChecksumAlgorithm(String),

    #[error("source file not found: {}", path.display())]
    SourceFileNotFound { path: PathBuf },

    #[error("duplicate archive entry '{entry}' (parts '{first}' and '{second}')")]
    DuplicateArchiveEntry {
        entry: String,
        first: String,
        second: String,
    },

    #[error("JSON file not found: {}: {source}", path.display())]
    JsonFileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn vcs(command: &str, message: impl std::fmt::Display) -> Self {
        Self::Vcs {
            command: command.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<fwmeta_schema::UnknownChecksumAlgo> for Error {
    fn from(err: fwmeta_schema::UnknownChecksumAlgo) -> Self {
        Self::UnsupportedChecksumAlgorithm(err.0)
    }
}
