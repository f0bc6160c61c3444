//! Reference classifier: URL scheme detection and OCI reference decomposition.
//!
//! Classification is purely syntactic. No network or filesystem access
//! happens here; an HTTPS URL is not checked for reachability and an OCI
//! repository is not checked for existence.

use std::fmt;

use regex_lite::Regex;

/// Addressing scheme of a location reference string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `https://` direct URL (CDN distribution).
    Https,
    /// `http://` direct URL (testing only).
    Http,
    /// `oci://` registry reference.
    Oci,
    /// No recognized remote prefix; a local relative path.
    Local,
}

impl Scheme {
    /// Classify a reference string by literal prefix match.
    pub fn classify(url: &str) -> Scheme {
        if url.starts_with("https://") {
            Scheme::Https
        } else if url.starts_with("http://") {
            Scheme::Http
        } else if url.starts_with("oci://") {
            Scheme::Oci
        } else {
            Scheme::Local
        }
    }

    /// True for any scheme other than a local relative path.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Scheme::Local)
    }
}

/// Grammar for well-formed OCI references. The digest suffix is mandatory:
/// `oci://<registry>/<repository>(:<tag>)?@sha256:<64-hex>`.
fn oci_reference_re() -> Regex {
    Regex::new(r"^oci://([^/]+)/([^:@]+)(?::([^@]+))?@(sha256:[a-f0-9]{64})$").unwrap()
}

/// A decomposed OCI registry reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciReference {
    /// Registry hostname (e.g. "quay.io").
    pub registry: String,
    /// Repository path (e.g. "fedora/rpms").
    pub repository: String,
    /// Optional tag (e.g. "bash").
    pub tag: Option<String>,
    /// Content digest, always `sha256:<64-hex>`.
    pub digest: String,
}

impl OciReference {
    /// Parse an `oci://` reference string.
    ///
    /// Returns `None` for strings that do not match the grammar, including
    /// references missing the mandatory digest. Callers that need to reject
    /// malformed references do so through `Location::validate`, which
    /// enforces digest presence; component queries never raise.
    pub fn parse(url: &str) -> Option<OciReference> {
        let caps = oci_reference_re().captures(url)?;
        Some(OciReference {
            registry: caps[1].to_string(),
            repository: caps[2].to_string(),
            tag: caps.get(3).map(|m| m.as_str().to_string()),
            digest: caps[4].to_string(),
        })
    }
}

impl fmt::Display for OciReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oci://{}/{}", self.registry, self.repository)?;
        if let Some(ref tag) = self.tag {
            write!(f, ":{}", tag)?;
        }
        write!(f, "@{}", self.digest)
    }
}
