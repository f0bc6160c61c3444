//! File entries for multi-file OCI artifacts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checksum::Checksum;
use crate::location::LocationError;

/// One file inside a multi-file artifact, e.g. a kernel or initrd bundled
/// into a boot image as an OCI layer.
///
/// Construction does not validate; call [`FileEntry::validate`] before
/// serializing or trusting an entry. Entries are plain values, safe to
/// compare and hash over all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    /// Relative path of the file within the image.
    pub file: String,

    /// File size in bytes.
    pub size: u64,

    /// Checksum of the file contents.
    pub checksum: Checksum,

    /// Digest of the OCI layer this file was extracted from (`sha256:...`).
    pub layer_digest: String,
}

impl FileEntry {
    /// Check all invariants, failing on the first violation.
    pub fn validate(&self) -> Result<(), LocationError> {
        if self.file.is_empty() {
            return Err(LocationError::BlankField("file"));
        }
        if self.file.starts_with('/') {
            return Err(LocationError::EntryAbsolutePath(self.file.clone()));
        }
        if self.layer_digest.is_empty() {
            return Err(LocationError::BlankField("layer_digest"));
        }
        if !self.layer_digest.starts_with("sha256:") {
            return Err(LocationError::BadLayerDigest(self.layer_digest.clone()));
        }
        Ok(())
    }

    /// Validate and serialize to a JSON value.
    pub fn to_value(&self) -> Result<Value, LocationError> {
        self.validate()?;
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from a JSON value and validate.
    pub fn from_value(value: &Value) -> Result<Self, LocationError> {
        let entry: FileEntry = serde_json::from_value(value.clone())?;
        entry.validate()?;
        Ok(entry)
    }
}
