//! Checksum codec: `algorithm:hexdigest` strings and streaming file hashing.
//!
//! The canonical checksum string form is `"<algorithm>:<digest>"` with a
//! lowercase hex digest, e.g. `"sha256:49ae93..."`. Only the four algorithms
//! named in [`ChecksumAlgorithm`] are recognized.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

/// Read size for streaming checksum computation (1 MiB).
const CHUNK_SIZE: usize = 1024 * 1024;

/// Errors from checksum parsing and computation.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("Unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid checksum format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Hash algorithms accepted in checksum strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Sha256,
    Sha512,
    Sha1,
    Md5,
}

impl ChecksumAlgorithm {
    /// Lowercase name as used in checksum strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Sha512 => "sha512",
            ChecksumAlgorithm::Sha1 => "sha1",
            ChecksumAlgorithm::Md5 => "md5",
        }
    }

    /// Length of this algorithm's digest in hex characters.
    pub fn hex_len(&self) -> usize {
        match self {
            ChecksumAlgorithm::Sha256 => 64,
            ChecksumAlgorithm::Sha512 => 128,
            ChecksumAlgorithm::Sha1 => 40,
            ChecksumAlgorithm::Md5 => 32,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            "sha512" => Ok(ChecksumAlgorithm::Sha512),
            "sha1" => Ok(ChecksumAlgorithm::Sha1),
            "md5" => Ok(ChecksumAlgorithm::Md5),
            other => Err(ChecksumError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// A parsed checksum: algorithm plus lowercase hex digest.
///
/// Values are only constructed through parsing or computation, so a
/// `Checksum` in hand always satisfies the grammar
/// `^(sha256|sha512|sha1|md5):[a-f0-9]+$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum {
    algorithm: ChecksumAlgorithm,
    digest: String,
}

/// Compiled grammar for checksum strings. Case-sensitive, no whitespace.
fn checksum_re() -> Regex {
    Regex::new(r"^(sha256|sha512|sha1|md5):([a-f0-9]+)$").unwrap()
}

impl Checksum {
    /// Hash algorithm component.
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Lowercase hex digest component.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// The all-zero sha256 placeholder used for scaffolding locations whose
    /// content does not exist yet. Verification against it is expected to
    /// fail until the location is finalized.
    pub fn zero_sha256() -> Self {
        Checksum {
            algorithm: ChecksumAlgorithm::Sha256,
            digest: "0".repeat(64),
        }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

impl FromStr for Checksum {
    type Err = ChecksumError;

    /// Parse a checksum string against the exact grammar. Surrounding
    /// whitespace, uppercase hex, and unknown algorithms are all rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re = checksum_re();
        let caps = re
            .captures(s)
            .ok_or_else(|| ChecksumError::InvalidFormat(s.to_string()))?;
        let algorithm: ChecksumAlgorithm = caps[1].parse()?;
        Ok(Checksum {
            algorithm,
            digest: caps[2].to_string(),
        })
    }
}

impl TryFrom<String> for Checksum {
    type Error = ChecksumError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Checksum> for String {
    fn from(c: Checksum) -> String {
        c.to_string()
    }
}

/// Stream a reader through a hash function in bounded chunks.
fn hash_reader<D: Digest>(reader: &mut impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the checksum of a file by streaming its contents.
///
/// The file is read in 1 MiB blocks; it is never loaded into memory whole.
pub fn compute_checksum(
    path: &Path,
    algorithm: ChecksumAlgorithm,
) -> Result<Checksum, ChecksumError> {
    let mut file = File::open(path)?;
    let digest = match algorithm {
        ChecksumAlgorithm::Sha256 => hash_reader::<Sha256>(&mut file)?,
        ChecksumAlgorithm::Sha512 => hash_reader::<Sha512>(&mut file)?,
        ChecksumAlgorithm::Sha1 => hash_reader::<Sha1>(&mut file)?,
        ChecksumAlgorithm::Md5 => hash_reader::<Md5>(&mut file)?,
    };
    Ok(Checksum { algorithm, digest })
}
