//! Schema version detection for parsed compose documents.
//!
//! Detection runs a fixed, ordered list of shape matchers:
//!
//! 1. An explicit `header.version` tag, which is authoritative and
//!    short-circuits all heuristics. A tag that disagrees with the document
//!    structure is a data-quality problem for the caller; it is not resolved
//!    here.
//! 2. Location markers anywhere in the known container shapes (rpm tree,
//!    image list, extra-files list, variant path table) classify the
//!    document as v2.0.
//! 3. Recognizable legacy container keys with no tag and no location
//!    markers default to v1.0: documents predating explicit versioning are
//!    assumed to be the original format. An untagged 1.1/1.2 document is
//!    indistinguishable from a 1.0 one; the default is a known ambiguity
//!    preserved for compatibility.
//! 4. Anything else fails with [`VersionError::IndeterminateVersion`];
//!    unrecognized data is never silently assigned a version.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use crate::version::{SchemaVersion, VersionError, V1_0, V2_0};

/// A named structural matcher probing the payload for one container shape.
type PayloadMatcher = fn(&Value) -> bool;

/// Shapes whose presence marks a document as v2.0, tried in order.
const LOCATION_MATCHERS: &[(&str, PayloadMatcher)] = &[
    ("rpm-tree-location", rpm_tree_has_location),
    ("image-list-location", image_list_has_location),
    ("extra-files-location", extra_files_has_location),
    ("variant-paths-url", variant_paths_have_url),
];

/// Payload keys that identify a recognizable legacy document.
const LEGACY_CONTAINER_KEYS: &[&str] = &["rpms", "images", "compose"];

/// Detect the schema version of a metadata file on disk.
pub fn detect_version(path: &Path) -> Result<SchemaVersion, VersionError> {
    let file = File::open(path)?;
    let data: Value = serde_json::from_reader(BufReader::new(file))?;
    detect_version_from_value(&data)
}

/// Detect the schema version of a parsed document.
pub fn detect_version_from_value(data: &Value) -> Result<SchemaVersion, VersionError> {
    // Step 1: explicit tag wins over all structural evidence.
    if let Some(tag) = header_version_tag(data) {
        return tag.parse();
    }

    if let Some(payload) = data.get("payload") {
        // Step 2: any location marker means the current generation.
        for (_name, matcher) in LOCATION_MATCHERS {
            if matcher(payload) {
                return Ok(V2_0);
            }
        }

        // Step 3: recognizable legacy containers default to the oldest
        // legacy version.
        if payload.as_object().is_some_and(|map| {
            LEGACY_CONTAINER_KEYS.iter().any(|key| map.contains_key(*key))
        }) {
            return Ok(V1_0);
        }
    }

    Err(VersionError::IndeterminateVersion)
}

/// Check whether a parsed document carries Location objects anywhere in its
/// payload. Useful for spotting v2.0 structure even when the header has not
/// been updated.
pub fn has_location_objects(data: &Value) -> bool {
    match data.get("payload") {
        Some(payload) => LOCATION_MATCHERS.iter().any(|(_, matcher)| matcher(payload)),
        None => false,
    }
}

/// The explicit `header.version` string, when present.
fn header_version_tag(data: &Value) -> Option<&str> {
    data.get("header")?.get("version")?.as_str()
}

/// RPM tree: `rpms.<variant>.<arch>.<srpm>.<rpm>` where a leaf record has a
/// `location` key.
fn rpm_tree_has_location(payload: &Value) -> bool {
    let Some(variants) = payload.get("rpms").and_then(Value::as_object) else {
        return false;
    };
    variants
        .values()
        .filter_map(Value::as_object)
        .flat_map(|arches| arches.values())
        .filter_map(Value::as_object)
        .flat_map(|srpms| srpms.values())
        .filter_map(Value::as_object)
        .flat_map(|rpms| rpms.values())
        .any(|rpm| rpm.get("location").is_some())
}

/// Image list: `images.<variant>.<arch>` is a list of image records; any
/// record with a `location` key.
fn image_list_has_location(payload: &Value) -> bool {
    arch_list_has_key(payload.get("images"), "location")
}

/// Extra files: same shape as the image list, under `extra_files`.
fn extra_files_has_location(payload: &Value) -> bool {
    arch_list_has_key(payload.get("extra_files"), "location")
}

/// Variant path table: `variants.<variant>.paths.<path-type>.<arch>` where a
/// path descriptor has a `url` key.
fn variant_paths_have_url(payload: &Value) -> bool {
    let Some(variants) = payload.get("variants").and_then(Value::as_object) else {
        return false;
    };
    variants
        .values()
        .filter_map(|variant| variant.get("paths"))
        .filter_map(Value::as_object)
        .flat_map(|paths| paths.values())
        .filter_map(Value::as_object)
        .flat_map(|arches| arches.values())
        .any(|descriptor| descriptor.get("url").is_some())
}

/// Shared walk for `<container>.<variant>.<arch>[]` list shapes.
fn arch_list_has_key(container: Option<&Value>, key: &str) -> bool {
    let Some(variants) = container.and_then(Value::as_object) else {
        return false;
    };
    variants
        .values()
        .filter_map(Value::as_object)
        .flat_map(|arches| arches.values())
        .filter_map(Value::as_array)
        .flatten()
        .any(|record| record.get(key).is_some())
}
