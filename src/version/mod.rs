//! Schema versions and compatibility predicates.
//!
//! Two schema generations coexist:
//!
//! - **v1.x** (1.0, 1.1, 1.2): legacy local-path format with flat
//!   `path`/`size`/`checksum` fields.
//! - **v2.0**: distributed format where artifacts are addressed through
//!   Location objects.
//!
//! Containers decide field layout by querying the predicates here, never by
//! comparing raw major versions.

pub mod detect;

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors from version parsing and detection.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    #[error("Cannot determine metadata version from document structure")]
    IndeterminateVersion,

    #[error("Unsupported metadata version: {version}. Supported versions: {}",
        .supported.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "))]
    Unsupported {
        version: SchemaVersion,
        supported: Vec<SchemaVersion>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A `(major, minor)` schema version, ordered lexicographically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

/// Original legacy format, assumed for documents predating explicit
/// versioning.
pub const V1_0: SchemaVersion = SchemaVersion { major: 1, minor: 0 };
pub const V1_1: SchemaVersion = SchemaVersion { major: 1, minor: 1 };
/// Newest legacy version with flat path/size/checksum fields.
pub const V1_2: SchemaVersion = SchemaVersion { major: 1, minor: 2 };
/// First distributed version; artifacts addressed through Location objects.
pub const V2_0: SchemaVersion = SchemaVersion { major: 2, minor: 0 };

/// Default version for writing new documents. Consulted explicitly by
/// callers; never ambient mutable state.
pub const CURRENT_VERSION: SchemaVersion = V1_2;

/// Minimum version whose documents use Location objects.
pub const MIN_LOCATION_VERSION: SchemaVersion = V2_0;

/// All versions this library reads and writes.
pub const SUPPORTED_VERSIONS: [SchemaVersion; 4] = [V1_0, V1_1, V1_2, V2_0];

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        SchemaVersion { major, minor }
    }

    /// True for the legacy v1.x family.
    pub fn is_v1(&self) -> bool {
        self.major == 1
    }

    /// True for the current v2+ family.
    pub fn is_v2(&self) -> bool {
        self.major >= 2
    }

    /// True if this generation models artifacts as distributed and
    /// remote-addressable.
    ///
    /// Currently equivalent to [`supports_locations`](Self::supports_locations);
    /// kept as a separate predicate because the two answer distinct
    /// questions and may diverge in future schema evolution. Use the
    /// predicate matching your actual question.
    pub fn is_distributed(&self) -> bool {
        self.is_v2()
    }

    /// True if documents of this version use the Location field layout.
    pub fn supports_locations(&self) -> bool {
        *self >= MIN_LOCATION_VERSION
    }

    /// True if this library can read and write this version.
    pub fn is_supported(&self) -> bool {
        SUPPORTED_VERSIONS.contains(self)
    }

    /// Fail with [`VersionError::Unsupported`] for versions outside the
    /// supported set.
    pub fn ensure_supported(&self) -> Result<(), VersionError> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(VersionError::Unsupported {
                version: *self,
                supported: SUPPORTED_VERSIONS.to_vec(),
            })
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionError;

    /// Parse a two-component dotted version string like `"2.0"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| VersionError::InvalidVersion(s.to_string()))?;
        let minor = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| VersionError::InvalidVersion(s.to_string()))?;
        Ok(SchemaVersion { major, minor })
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SchemaVersion> for String {
    fn from(v: SchemaVersion) -> String {
        v.to_string()
    }
}

/// The `header` block shared by all compose documents:
/// `{"version": "<major>.<minor>", "type": "<document-kind>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub version: SchemaVersion,
    #[serde(rename = "type")]
    pub doc_type: String,
}

impl Header {
    pub fn new(version: SchemaVersion, doc_type: impl Into<String>) -> Self {
        Header {
            version,
            doc_type: doc_type.into(),
        }
    }
}
