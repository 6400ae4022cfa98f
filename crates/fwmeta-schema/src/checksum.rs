//! Checksum algorithms recorded against manifest parts.
//!
//! Names follow the spelling build scripts already pass on the command line
//! (`sha1`, `sha3_256`, `blake2b`), matched case-insensitively.

use std::fmt;
use std::str::FromStr;

use sha2::Digest;
use thiserror::Error;

/// Prefix of the part attribute holding a digest, e.g. `cs_sha1`.
pub const CHECKSUM_ATTR_PREFIX: &str = "cs_";

/// Returned when a checksum algorithm name is not recognized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported checksum algorithm '{0}'")]
pub struct UnknownChecksumAlgo(pub String);

/// Digest algorithms that can be recorded against a manifest part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChecksumAlgo {
    /// MD5 (legacy tooling only).
    Md5,
    /// SHA-1, the default for firmware manifests.
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
    /// SHA3-224
    Sha3_224,
    /// SHA3-256
    Sha3_256,
    /// SHA3-384
    Sha3_384,
    /// SHA3-512
    Sha3_512,
    /// BLAKE2b with a 512-bit digest.
    Blake2b,
    /// BLAKE2s with a 256-bit digest.
    Blake2s,
    /// BLAKE3
    Blake3,
}

impl ChecksumAlgo {
    /// Every supported algorithm, in declaration order.
    pub const ALL: [ChecksumAlgo; 13] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha3_224,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
        Self::Blake2b,
        Self::Blake2s,
        Self::Blake3,
    ];

    /// Canonical lowercase name, as used in `--checksums` and attribute keys.
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha3_224 => "sha3_224",
            Self::Sha3_256 => "sha3_256",
            Self::Sha3_384 => "sha3_384",
            Self::Sha3_512 => "sha3_512",
            Self::Blake2b => "blake2b",
            Self::Blake2s => "blake2s",
            Self::Blake3 => "blake3",
        }
    }

    /// Part attribute key under which this digest is stored (`cs_<name>`).
    pub fn attr_key(self) -> String {
        format!("{CHECKSUM_ATTR_PREFIX}{}", self.name())
    }

    /// Compute the lowercase hex digest of `data`.
    pub fn digest_hex(self, data: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode(md5::Md5::digest(data)),
            Self::Sha1 => hex::encode(sha1::Sha1::digest(data)),
            Self::Sha224 => hex::encode(sha2::Sha224::digest(data)),
            Self::Sha256 => hex::encode(sha2::Sha256::digest(data)),
            Self::Sha384 => hex::encode(sha2::Sha384::digest(data)),
            Self::Sha512 => hex::encode(sha2::Sha512::digest(data)),
            Self::Sha3_224 => hex::encode(sha3::Sha3_224::digest(data)),
            Self::Sha3_256 => hex::encode(sha3::Sha3_256::digest(data)),
            Self::Sha3_384 => hex::encode(sha3::Sha3_384::digest(data)),
            Self::Sha3_512 => hex::encode(sha3::Sha3_512::digest(data)),
            Self::Blake2b => hex::encode(blake2::Blake2b512::digest(data)),
            Self::Blake2s => hex::encode(blake2::Blake2s256::digest(data)),
            Self::Blake3 => blake3::hash(data).to_hex().to_string(),
        }
    }

    /// Parse a comma-separated algorithm list such as `sha1,sha256`.
    ///
    /// Blank entries are skipped, so an empty string yields no algorithms.
    /// Repeated names are kept once, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownChecksumAlgo`] naming the first unrecognized entry.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, UnknownChecksumAlgo> {
        let mut algos = Vec::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let algo: Self = name.parse()?;
            if !algos.contains(&algo) {
                algos.push(algo);
            }
        }
        Ok(algos)
    }
}

impl FromStr for ChecksumAlgo {
    type Err = UnknownChecksumAlgo;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|algo| algo.name() == wanted)
            .ok_or_else(|| UnknownChecksumAlgo(s.to_string()))
    }
}

impl fmt::Display for ChecksumAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
