//! Tag resolution.
//!
//! Turns a tag name into a [`Tag`] carrying the image creation time. The
//! chain is manifest → (first index child) → config blob → `created`. Every
//! failure along the chain is contained here: listing failures become an
//! empty tag list, and per-tag failures become the epoch sentinel.

use crate::client::RegistryApi;
use crate::digest::Digest;
use crate::error::{Result, SuiteError};
use crate::oci::{ConfigBlob, Manifest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};


/// A tag with its resolved creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    /// UTC creation time; [`epoch`] when it could not be determined.
    pub created: DateTime<Utc>,
}

impl Tag {
    pub fn new<S: Into<String>>(name: S, created: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created,
        }
    }

    /// A tag whose creation time is unknown.
    pub fn unknown<S: Into<String>>(name: S) -> Self {
        Self::new(name, epoch())
    }

    /// Returns true if the creation time is the epoch sentinel.
    pub fn is_unknown(&self) -> bool {
        self.created == epoch()
    }
}

/// `1970-01-01T00:00:00Z`, the "creation time unknown" sentinel.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Formats `repository` and `reference` the way image references are
/// written: `repo@sha256:...` for digests, `repo:tag` otherwise.
///
/// # Examples
///
/// ```
/// use libsuite::resolver::reference_string;
///
/// assert_eq!(reference_string("demo/app", "v1"), "demo/app:v1");
/// assert_eq!(
///     reference_string("demo/app", "sha256:abcd"),
///     "demo/app@sha256:abcd"
/// );
/// ```
pub fn reference_string(repository: &str, reference: &str) -> String {
    if reference.contains(':') {
        format!("{}@{}", repository, reference)
    } else {
        format!("{}:{}", repository, reference)
    }
}

/// Resolves tags of one registry through a [`RegistryApi`].
pub struct TagResolver<'a> {
    api: &'a dyn RegistryApi,
}

impl<'a> TagResolver<'a> {
    pub fn new(api: &'a dyn RegistryApi) -> Self {
        Self { api }
    }

    /// Lists the tags of `repository`.
    ///
    /// Never fails: any error is logged and yields an empty list.
    pub async fn list_tags(&self, repository: &str) -> Vec<String> {
        match self.api.fetch_tags(repository).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!(repository, error = %e, "failed to list tags");
                Vec::new()
            }
        }
    }

    /// Fetches and parses the manifest for `reference`.
    pub async fn resolve_manifest(&self, repository: &str, reference: &str) -> Result<Manifest> {
        let reference_name = reference_string(repository, reference);

        let bytes = self
            .api
            .fetch_manifest(repository, reference)
            .await
            .map_err(|e| SuiteError::manifest_fetch(&reference_name, e))?;

        let manifest = Manifest::from_bytes(&bytes)
            .map_err(|e| SuiteError::manifest_fetch(&reference_name, e))?;
        debug!(
            reference = %reference_name,
            media_type = manifest.media_type().unwrap_or("unspecified"),
            index = manifest.is_index(),
            "parsed manifest"
        );
        Ok(manifest)
    }

    /// Returns the config digest that describes `manifest`.
    ///
    /// For an index only the first child is consulted. `None` means the
    /// image has no config to read, which is not an error.
    pub async fn resolve_config_digest(
        &self,
        repository: &str,
        manifest: &Manifest,
    ) -> Result<Option<Digest>> {
        if !manifest.is_index() {
            return Ok(manifest.config_digest().cloned());
        }
        let Some(child) = manifest.first_child() else {
            return Ok(None);
        };
        debug!(
            reference = %reference_string(repository, &child.to_string()),
            "following first index entry"
        );

        let child_manifest = self.resolve_manifest(repository, &child.to_string()).await?;
        if child_manifest.is_index() {
            debug!(
                reference = %reference_string(repository, &child.to_string()),
                "nested index not followed"
            );
        }
        Ok(child_manifest.config_digest().cloned())
    }

    /// Fetches and parses the config blob addressed by `digest`.
    pub async fn fetch_config_blob(&self, repository: &str, digest: &Digest) -> Result<ConfigBlob> {
        let bytes = self
            .api
            .fetch_blob(repository, digest)
            .await
            .map_err(|e| SuiteError::blob_fetch(digest.to_string(), e))?;

        ConfigBlob::from_bytes(&bytes).map_err(|e| SuiteError::blob_fetch(digest.to_string(), e))
    }

    /// Creation time recorded in `config`, or the epoch sentinel.
    pub fn extract_created(config: &ConfigBlob) -> DateTime<Utc> {
        config.created().unwrap_or_else(epoch)
    }

    /// Resolves one tag. Failures are logged and produce [`Tag::unknown`].
    pub async fn resolve_tag(&self, repository: &str, tag: &str) -> Tag {
        match self.resolve_created(repository, tag).await {
            Ok(created) => Tag::new(tag, created),
            Err(e) => {
                warn!(
                    reference = %reference_string(repository, tag),
                    error = %e,
                    "failed to resolve tag creation time"
                );
                Tag::unknown(tag)
            }
        }
    }

    async fn resolve_created(&self, repository: &str, tag: &str) -> Result<DateTime<Utc>> {
        let manifest = self.resolve_manifest(repository, tag).await?;

        let Some(digest) = self.resolve_config_digest(repository, &manifest).await? else {
            debug!(
                reference = %reference_string(repository, tag),
                "no config blob available"
            );
            return Ok(epoch());
        };

        let config = self.fetch_config_blob(repository, &digest).await?;
        Ok(Self::extract_created(&config))
    }
}
