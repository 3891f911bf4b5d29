//! OCI image data structures.
//!
//! Only the parts of manifests and image configs that the dashboard reads are
//! modelled here. Registries in the wild disagree on `mediaType` values (or
//! omit them entirely), so the shape of a manifest is decided structurally:
//! a document with a non-empty `manifests` array is an index, anything else
//! is a single-platform manifest.

use crate::digest::Digest;
use crate::error::{Result, SuiteError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::str::FromStr;


/// Docker image manifest, schema 2.
pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
/// OCI image manifest.
pub const OCI_MANIFEST_V1: &str = "application/vnd.oci.image.manifest.v1+json";
/// OCI image index.
pub const OCI_INDEX_V1: &str = "application/vnd.oci.image.index.v1+json";
/// Docker manifest list.
pub const DOCKER_MANIFEST_LIST_V2: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";

/// Media types sent in the `Accept` header of manifest requests, in
/// preference order.
pub const MANIFEST_ACCEPT: [&str; 4] = [
    DOCKER_MANIFEST_V2,
    OCI_MANIFEST_V1,
    OCI_INDEX_V1,
    DOCKER_MANIFEST_LIST_V2,
];

/// Returns the comma-separated `Accept` header value for manifest requests.
pub fn manifest_accept_header() -> String {
    MANIFEST_ACCEPT.join(", ")
}

/// A manifest as returned by `GET /v2/<name>/manifests/<reference>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    /// A single-platform image manifest.
    Single {
        /// Digest of the image config blob, if the manifest carries one.
        config_digest: Option<Digest>,
        /// The `mediaType` the registry reported, if any.
        media_type: Option<String>,
    },
    /// A multi-platform index / manifest list.
    Index {
        /// Child manifest digests in listed order. The first entry is always
        /// present; later entries without a usable digest are dropped.
        children: Vec<Digest>,
        /// The `mediaType` the registry reported, if any.
        media_type: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    config: Option<RawDescriptor>,
    #[serde(default)]
    manifests: Option<Vec<RawDescriptor>>,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    digest: Option<String>,
}

impl Manifest {
    /// Parses manifest bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use libsuite::oci::Manifest;
    ///
    /// let index = br#"{"manifests":[{"digest":"sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"}]}"#;
    /// assert!(Manifest::from_bytes(index).unwrap().is_index());
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: RawManifest = serde_json::from_slice(bytes)
            .map_err(|e| SuiteError::validation_with_source("Failed to parse manifest JSON", e))?;

        match raw.manifests {
            Some(entries) if !entries.is_empty() => {
                let mut entries = entries.into_iter();
                let first = entries
                    .next()
                    .and_then(|d| d.digest)
                    .ok_or_else(|| SuiteError::validation("Index entry is missing its digest"))?;

                // Only the first entry is ever followed
                let mut children = vec![Digest::from_str(&first)?];
                children.extend(
                    entries
                        .filter_map(|d| d.digest)
                        .filter_map(|d| Digest::from_str(&d).ok()),
                );
                Ok(Manifest::Index {
                    children,
                    media_type: raw.media_type,
                })
            }
            _ => {
                let config_digest = match raw.config.and_then(|c| c.digest) {
                    Some(d) if !d.is_empty() => Some(Digest::from_str(&d)?),
                    _ => None,
                };
                Ok(Manifest::Single {
                    config_digest,
                    media_type: raw.media_type,
                })
            }
        }
    }

    /// Returns true if this is a multi-platform index.
    pub fn is_index(&self) -> bool {
        matches!(self, Manifest::Index { .. })
    }

    /// Returns the config digest of a single-platform manifest.
    pub fn config_digest(&self) -> Option<&Digest> {
        match self {
            Manifest::Single { config_digest, .. } => config_digest.as_ref(),
            Manifest::Index { .. } => None,
        }
    }

    /// Returns the first child of an index. The first listed platform stands
    /// in for the whole image when reading metadata.
    pub fn first_child(&self) -> Option<&Digest> {
        match self {
            Manifest::Single { .. } => None,
            Manifest::Index { children, .. } => children.first(),
        }
    }

    /// Returns the `mediaType` reported by the registry.
    pub fn media_type(&self) -> Option<&str> {
        match self {
            Manifest::Single { media_type, .. } | Manifest::Index { media_type, .. } => {
                media_type.as_deref()
            }
        }
    }
}

/// The subset of an image config blob used for timestamps.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ConfigBlob {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<HistoryEntry>,
}

/// One entry of an image config's build history, oldest first.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    #[serde(default)]
    pub created: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<HistoryEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<HistoryEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ConfigBlob {
    /// Parses config blob bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| SuiteError::validation_with_source("Failed to parse image config", e))
    }

    /// Returns when the image was built.
    ///
    /// The top-level `created` wins. Otherwise the first history entry that
    /// carries a timestamp is used. Empty or unparseable values count as
    /// missing. Returns `None` when nothing usable is found.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        if let Some(ts) = self.created.as_deref().and_then(parse_timestamp) {
            return Some(ts);
        }
        self.history
            .iter()
            .find_map(|h| h.created.as_deref().and_then(parse_timestamp))
    }
}

/// Parses an RFC 3339 timestamp, ignoring empty strings.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
