//! composemd - compose metadata interchange.
//!
//! This crate models where build artifacts live and which schema generation
//! a metadata document belongs to. Two generations coexist: the legacy v1.x
//! local-path format with flat `path`/`size`/`checksum` fields, and the
//! distributed v2.0 format that addresses artifacts through verifiable
//! [`Location`] objects (HTTPS/HTTP URLs, digest-pinned OCI references, or
//! local relative paths).
//!
//! Pipeline tooling (composers, mirrors, publishers) uses it to read either
//! generation, verify artifacts against the filesystem, and migrate records
//! between generations without loss.

pub mod checksum;
pub mod location;
pub mod reference;
pub mod version;
pub mod versioned;

pub use checksum::{compute_checksum, Checksum, ChecksumAlgorithm, ChecksumError};
pub use location::{FileEntry, FlatFields, Location, LocationError};
pub use reference::{OciReference, Scheme};
pub use version::detect::{detect_version, detect_version_from_value, has_location_objects};
pub use version::{Header, SchemaVersion, VersionError};
pub use versioned::VersionedMetadata;
