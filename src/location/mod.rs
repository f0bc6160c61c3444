//! Artifact locations with integrity metadata.
//!
//! A [`Location`] describes where an artifact lives and how to verify it:
//! a scheme-discriminated reference (`https://`, `http://`, `oci://`, or a
//! local relative path), the artifact's size and checksum, and a relative
//! `local_path` preserved for the legacy on-disk layout. OCI locations may
//! additionally carry [`FileEntry`] contents when the image bundles several
//! files as layers.

mod entry;
mod verify;

pub use entry::FileEntry;

use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checksum::{compute_checksum, Checksum, ChecksumAlgorithm, ChecksumError};
use crate::reference::{OciReference, Scheme};

/// Errors from location validation, serialization, and verification.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Field '{0}' must not be empty")]
    BlankField(&'static str),

    #[error("Location: 'url' must not be an absolute path: {0}")]
    AbsoluteUrl(String),

    #[error("Location: 'local_path' must be a relative path: {0}")]
    AbsoluteLocalPath(String),

    #[error("Location: OCI references must include an @sha256: digest for immutability: {0}")]
    OciMissingDigest(String),

    #[error("Location: 'contents' can only be used with OCI references: {0}")]
    ContentsWithoutOci(String),

    #[error("FileEntry: 'file' must be a relative path: {0}")]
    EntryAbsolutePath(String),

    #[error("FileEntry: 'layer_digest' must start with 'sha256:': {0}")]
    BadLayerDigest(String),

    #[error("Size mismatch for {path}: expected {expected}, got {actual}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: Checksum,
        actual: Checksum,
    },

    #[error("Location has OCI contents with no legacy representation: {0}")]
    LossyFlatten(String),

    #[error(transparent)]
    Checksum(#[from] ChecksumError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The legacy flat field set for one artifact: `path`/`size`/`checksum`.
///
/// This is the per-artifact shape of the v1.x generation; containers that
/// target a legacy output flatten each [`Location`] into one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFields {
    pub path: String,
    pub size: u64,
    pub checksum: Checksum,
}

/// Where an artifact lives and how to verify its integrity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// HTTPS/HTTP URL, OCI reference, or local relative path.
    pub url: String,

    /// Size in bytes. For an OCI image with contents this is the total image
    /// size, independent of the per-file sizes.
    pub size: u64,

    /// Checksum over the referenced artifact as a whole.
    pub checksum: Checksum,

    /// Relative path for the legacy filesystem layout, present even when
    /// `url` is remote.
    pub local_path: String,

    /// Files bundled in the image as layers. Only valid for OCI references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<FileEntry>,
}

impl Hash for Location {
    // Hash covers (url, size, checksum, local_path); contents do not
    // contribute.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
        self.size.hash(state);
        self.checksum.hash(state);
        self.local_path.hash(state);
    }
}

impl Location {
    /// Construct a location with no contents.
    pub fn new(url: impl Into<String>, size: u64, checksum: Checksum, local_path: impl Into<String>) -> Self {
        Location {
            url: url.into(),
            size,
            checksum,
            local_path: local_path.into(),
            contents: Vec::new(),
        }
    }

    // Scheme classification. Read-only; never mutates or caches.

    /// Addressing scheme of `url`.
    pub fn scheme(&self) -> Scheme {
        Scheme::classify(&self.url)
    }

    /// True if `url` has a recognized remote prefix.
    pub fn is_remote(&self) -> bool {
        self.scheme().is_remote()
    }

    /// True if `url` is a local relative path.
    pub fn is_local(&self) -> bool {
        !self.is_remote()
    }

    /// True if `url` is an HTTPS URL.
    pub fn is_https(&self) -> bool {
        self.scheme() == Scheme::Https
    }

    /// True if `url` is an HTTP URL.
    pub fn is_http(&self) -> bool {
        self.scheme() == Scheme::Http
    }

    /// True if `url` is an OCI registry reference.
    pub fn is_oci(&self) -> bool {
        self.scheme() == Scheme::Oci
    }

    /// True if this location bundles multiple files as layers.
    pub fn has_contents(&self) -> bool {
        !self.contents.is_empty()
    }

    /// Checksum algorithm component.
    pub fn checksum_algorithm(&self) -> ChecksumAlgorithm {
        self.checksum.algorithm()
    }

    /// Checksum hex digest component.
    pub fn checksum_digest(&self) -> &str {
        self.checksum.digest()
    }

    // OCI components, extracted lazily from the reference string. Each is
    // `None` for non-OCI locations and for malformed OCI references; the
    // digest-presence invariant in `validate` still rejects the latter.

    /// Decomposed OCI reference, if `url` is a well-formed one.
    pub fn oci_reference(&self) -> Option<OciReference> {
        if !self.is_oci() {
            return None;
        }
        OciReference::parse(&self.url)
    }

    /// OCI registry hostname.
    pub fn oci_registry(&self) -> Option<String> {
        self.oci_reference().map(|r| r.registry)
    }

    /// OCI repository path.
    pub fn oci_repository(&self) -> Option<String> {
        self.oci_reference().map(|r| r.repository)
    }

    /// OCI tag, when the reference carries one.
    pub fn oci_tag(&self) -> Option<String> {
        self.oci_reference().and_then(|r| r.tag)
    }

    /// OCI content digest (`sha256:...`).
    pub fn oci_digest(&self) -> Option<String> {
        self.oci_reference().map(|r| r.digest)
    }

    /// Check all invariants, failing on the first violation.
    ///
    /// Partially built locations may exist before this is called; callers
    /// must validate before serializing or trusting a value.
    pub fn validate(&self) -> Result<(), LocationError> {
        if self.url.is_empty() {
            return Err(LocationError::BlankField("url"));
        }
        if self.url.starts_with('/') {
            return Err(LocationError::AbsoluteUrl(self.url.clone()));
        }
        if self.is_oci() && !self.url.contains("@sha256:") {
            return Err(LocationError::OciMissingDigest(self.url.clone()));
        }
        if self.local_path.is_empty() {
            return Err(LocationError::BlankField("local_path"));
        }
        if self.local_path.starts_with('/') {
            return Err(LocationError::AbsoluteLocalPath(self.local_path.clone()));
        }
        if self.has_contents() && !self.is_oci() {
            return Err(LocationError::ContentsWithoutOci(self.url.clone()));
        }
        for entry in &self.contents {
            entry.validate()?;
        }
        Ok(())
    }

    /// Validate and serialize to a JSON value.
    ///
    /// The `contents` key is present only when non-empty.
    pub fn to_value(&self) -> Result<Value, LocationError> {
        self.validate()?;
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from a JSON value and validate.
    pub fn from_value(value: &Value) -> Result<Self, LocationError> {
        let location: Location = serde_json::from_value(value.clone())?;
        location.validate()?;
        Ok(location)
    }

    /// Build a location for a file in a local compose tree, with `url` and
    /// `local_path` both set to `path`.
    ///
    /// With `compute_integrity`, size and checksum are derived by reading
    /// `base_dir/path`. Without it a zero-size, all-zero-digest placeholder
    /// is produced for scaffolding; verification against the placeholder
    /// fails until the location is finalized.
    pub fn from_local_file(
        path: &str,
        base_dir: &Path,
        compute_integrity: bool,
    ) -> Result<Self, LocationError> {
        let (size, checksum) = if compute_integrity {
            let full_path = base_dir.join(path);
            let size = fs::metadata(&full_path)?.len();
            let checksum = compute_checksum(&full_path, ChecksumAlgorithm::Sha256)?;
            (size, checksum)
        } else {
            (0, Checksum::zero_sha256())
        };
        Ok(Location::new(path, size, checksum, path))
    }

    /// Build a location from legacy flat fields, with `url` and `local_path`
    /// both set to the legacy path. Used when migrating a v1.x record to the
    /// current generation.
    pub fn from_flat_fields(fields: FlatFields) -> Self {
        Location::new(fields.path.clone(), fields.size, fields.checksum, fields.path)
    }

    /// Flatten back to legacy flat fields.
    ///
    /// Fails with [`LocationError::LossyFlatten`] when contents are present:
    /// a multi-file OCI artifact has no legacy representation, and the loss
    /// must be flagged rather than silently dropped. A container that
    /// accepts the loss clears `contents` first.
    pub fn to_flat_fields(&self) -> Result<FlatFields, LocationError> {
        if self.has_contents() {
            return Err(LocationError::LossyFlatten(self.url.clone()));
        }
        Ok(FlatFields {
            path: self.local_path.clone(),
            size: self.size,
            checksum: self.checksum.clone(),
        })
    }

    /// Derive a new location whose `url` is `base_url` joined to
    /// `local_path`, all other fields copied. Used when publishing a local
    /// compose to a CDN.
    pub fn with_remote_url(&self, base_url: &str) -> Location {
        let base = base_url.trim_end_matches('/');
        Location {
            url: format!("{}/{}", base, self.local_path),
            size: self.size,
            checksum: self.checksum.clone(),
            local_path: self.local_path.clone(),
            contents: self.contents.clone(),
        }
    }

    /// The canonical on-disk place for a localized copy of this artifact:
    /// `output_dir/compose/<local_path>`.
    pub fn get_localized_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join("compose").join(&self.local_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn digest64(c: char) -> String {
        std::iter::repeat(c).take(64).collect()
    }

    fn https_location() -> Location {
        Location::new(
            "https://cdn.example.com/compose/Server/x86_64/os/Packages/b/bash.rpm",
            1234567,
            format!("sha256:{}", digest64('a')).parse().unwrap(),
            "Server/x86_64/os/Packages/b/bash.rpm",
        )
    }

    fn oci_location() -> Location {
        let mut loc = Location::new(
            format!("oci://quay.io/fedora/boot:f41@sha256:{}", digest64('c')),
            98765432,
            format!("sha256:{}", digest64('d')).parse().unwrap(),
            "Server/x86_64/os/images/boot.iso",
        );
        loc.contents = vec![
            FileEntry {
                file: "images/pxeboot/vmlinuz".to_string(),
                size: 13161056,
                checksum: format!("sha256:{}", digest64('1')).parse().unwrap(),
                layer_digest: format!("sha256:{}", digest64('2')),
            },
            FileEntry {
                file: "images/pxeboot/initrd.img".to_string(),
                size: 65234120,
                checksum: format!("sha256:{}", digest64('3')).parse().unwrap(),
                layer_digest: format!("sha256:{}", digest64('2')),
            },
        ];
        loc
    }

    #[test]
    fn test_scheme_classification() {
        let loc = https_location();
        assert!(loc.is_https());
        assert!(loc.is_remote());
        assert!(!loc.is_local());
        assert!(!loc.is_oci());

        let local = Location::new(
            "Server/x86_64/os/Packages/b/bash.rpm",
            1,
            "sha256:ab".parse().unwrap(),
            "Server/x86_64/os/Packages/b/bash.rpm",
        );
        assert!(local.is_local());
        assert!(!local.is_remote());
    }

    #[test]
    fn test_oci_components() {
        let url = format!("oci://quay.io/fedora/rpms:bash@sha256:{}", digest64('a'));
        let loc = Location::new(url.as_str(), 1, "sha256:ab".parse().unwrap(), "x/y.rpm");
        assert!(loc.is_oci());
        assert_eq!(loc.oci_registry().as_deref(), Some("quay.io"));
        assert_eq!(loc.oci_repository().as_deref(), Some("fedora/rpms"));
        assert_eq!(loc.oci_tag().as_deref(), Some("bash"));
        assert_eq!(loc.oci_digest(), Some(format!("sha256:{}", digest64('a'))));
    }

    #[test]
    fn test_oci_components_absent_for_non_oci() {
        let loc = https_location();
        assert_eq!(loc.oci_registry(), None);
        assert_eq!(loc.oci_repository(), None);
        assert_eq!(loc.oci_tag(), None);
        assert_eq!(loc.oci_digest(), None);
    }

    #[test]
    fn test_oci_components_absent_for_malformed() {
        // Bad digest length: queries return None, validation still passes
        // the digest-presence check only when @sha256: is present at all.
        let loc = Location::new(
            "oci://quay.io/fedora/rpms@sha256:abc",
            1,
            "sha256:ab".parse().unwrap(),
            "x/y.rpm",
        );
        assert!(loc.is_oci());
        assert_eq!(loc.oci_registry(), None);
        assert_eq!(loc.oci_digest(), None);
    }

    #[test]
    fn test_validate_rejects_absolute_url() {
        let mut loc = https_location();
        loc.url = "/abs/path".to_string();
        assert!(matches!(loc.validate(), Err(LocationError::AbsoluteUrl(_))));
    }

    #[test]
    fn test_validate_rejects_absolute_local_path() {
        let mut loc = https_location();
        loc.local_path = "/abs/path".to_string();
        assert!(matches!(
            loc.validate(),
            Err(LocationError::AbsoluteLocalPath(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oci_without_digest() {
        let mut loc = oci_location();
        loc.url = "oci://quay.io/fedora/boot:f41".to_string();
        assert!(matches!(
            loc.validate(),
            Err(LocationError::OciMissingDigest(_))
        ));
    }

    #[test]
    fn test_validate_rejects_contents_without_oci() {
        let mut loc = oci_location();
        loc.url = "https://cdn.example.com/boot.iso".to_string();
        assert!(matches!(
            loc.validate(),
            Err(LocationError::ContentsWithoutOci(_))
        ));
    }

    #[test]
    fn test_validate_rejects_invalid_entry() {
        let mut loc = oci_location();
        loc.contents[1].file = "/abs/initrd.img".to_string();
        assert!(matches!(
            loc.validate(),
            Err(LocationError::EntryAbsolutePath(_))
        ));
    }

    #[test]
    fn test_validate_accepts_valid() {
        https_location().validate().unwrap();
        oci_location().validate().unwrap();
    }

    #[test]
    fn test_value_roundtrip_simple() {
        let loc = https_location();
        let value = loc.to_value().unwrap();
        assert!(value.get("contents").is_none());
        let back = Location::from_value(&value).unwrap();
        assert_eq!(back, loc);
    }

    #[test]
    fn test_value_roundtrip_with_contents() {
        let loc = oci_location();
        let value = loc.to_value().unwrap();
        assert_eq!(value["contents"].as_array().unwrap().len(), 2);
        let back = Location::from_value(&value).unwrap();
        assert_eq!(back, loc);
        assert_eq!(back.contents, loc.contents);
    }

    #[test]
    fn test_to_value_validates_first() {
        let mut loc = https_location();
        loc.url = "/abs".to_string();
        assert!(loc.to_value().is_err());
    }

    #[test]
    fn test_from_value_missing_field() {
        let value = json!({"url": "x/y", "size": 1});
        assert!(matches!(
            Location::from_value(&value),
            Err(LocationError::Json(_))
        ));
    }

    #[test]
    fn test_with_remote_url() {
        let local = Location::new(
            "Server/x86_64/os/Packages/b/bash.rpm",
            1234567,
            format!("sha256:{}", digest64('a')).parse().unwrap(),
            "Server/x86_64/os/Packages/b/bash.rpm",
        );
        let remote = local.with_remote_url("https://cdn.example.com/compose");
        assert_eq!(
            remote.url,
            "https://cdn.example.com/compose/Server/x86_64/os/Packages/b/bash.rpm"
        );
        assert_eq!(remote.size, local.size);
        assert_eq!(remote.checksum, local.checksum);
        assert_eq!(remote.local_path, local.local_path);
        // The source is untouched.
        assert_eq!(local.url, "Server/x86_64/os/Packages/b/bash.rpm");
    }

    #[test]
    fn test_with_remote_url_strips_trailing_slash() {
        let remote = https_location().with_remote_url("https://mirror.test/pub/");
        assert_eq!(
            remote.url,
            "https://mirror.test/pub/Server/x86_64/os/Packages/b/bash.rpm"
        );
    }

    #[test]
    fn test_with_remote_url_copies_contents() {
        let loc = oci_location();
        let remote = loc.with_remote_url("https://cdn.example.com");
        assert_eq!(remote.contents, loc.contents);
        // contents must not diverge when the copy is extended
        let mut remote = remote;
        remote.contents.pop();
        assert_eq!(loc.contents.len(), 2);
    }

    #[test]
    fn test_get_localized_path() {
        let loc = https_location();
        let path = loc.get_localized_path(Path::new("/mnt/koji"));
        assert_eq!(
            path,
            Path::new("/mnt/koji/compose/Server/x86_64/os/Packages/b/bash.rpm")
        );
    }

    #[test]
    fn test_flat_fields_roundtrip() {
        let fields = FlatFields {
            path: "Server/x86_64/os/Packages/b/bash.rpm".to_string(),
            size: 1234567,
            checksum: format!("sha256:{}", digest64('a')).parse().unwrap(),
        };
        let loc = Location::from_flat_fields(fields.clone());
        assert_eq!(loc.url, fields.path);
        assert_eq!(loc.local_path, fields.path);
        loc.validate().unwrap();
        assert_eq!(loc.to_flat_fields().unwrap(), fields);
    }

    #[test]
    fn test_flatten_with_contents_is_flagged() {
        let loc = oci_location();
        assert!(matches!(
            loc.to_flat_fields(),
            Err(LocationError::LossyFlatten(_))
        ));

        // Dropping contents explicitly makes the flatten lossless again.
        let mut stripped = loc.clone();
        stripped.contents.clear();
        let fields = stripped.to_flat_fields().unwrap();
        assert_eq!(fields.path, loc.local_path);
    }

    #[test]
    fn test_equality_includes_contents() {
        let a = oci_location();
        let mut b = oci_location();
        assert_eq!(a, b);
        b.contents.pop();
        assert_ne!(a, b);
    }
}
