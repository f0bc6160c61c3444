//! The versioned-serialization contract implemented by entity containers.

use serde_json::Value;

use crate::version::{SchemaVersion, VersionError};

/// Version-aware serialization for metadata containers.
///
/// Containers (compose descriptor, rpm tree, image list, ...) implement this
/// to switch between the legacy flat field layout and the Location-object
/// layout. The target generation is always an explicit parameter at the
/// serialization boundary; nothing here infers an output generation from
/// ambient state.
pub trait VersionedMetadata {
    /// The generation this container will write when not told otherwise.
    /// Threaded in at construction, typically starting from
    /// [`CURRENT_VERSION`](crate::version::CURRENT_VERSION).
    fn output_version(&self) -> SchemaVersion;

    /// Serialize under an explicit target generation.
    fn serialize_versioned(&self, target: SchemaVersion) -> Result<Value, VersionError>;

    /// Populate from a parsed document, choosing the field layout from the
    /// detected version of `data`.
    fn deserialize_versioned(&mut self, data: &Value) -> Result<(), VersionError>;

    /// Whether the active output generation uses Location objects.
    fn uses_locations(&self) -> bool {
        self.output_version().supports_locations()
    }
}
