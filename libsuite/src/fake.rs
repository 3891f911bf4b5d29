//! In-memory [`RegistryApi`] for unit tests.
//!
//! Records how many manifest chains are in flight at once so batching can be
//! asserted without a real registry.

use crate::client::{RegistryApi, RegistryVersion};
use crate::digest::Digest;
use crate::error::{Result, SuiteError};
use crate::oci::OCI_MANIFEST_V1;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const BASE_URL: &str = "http://fake.registry:5000";

/// How a faked endpoint fails.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Failure {
    Refused,
    Status(u16),
}

impl Failure {
    fn to_error(self, path: &str) -> SuiteError {
        match self {
            Failure::Refused => SuiteError::connection(
                format!("Connection refused by registry at {}", BASE_URL),
                true,
            ),
            Failure::Status(status) => {
                let reason = reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("");
                SuiteError::http(status, reason, format!("{}{}", BASE_URL, path))
            }
        }
    }
}

/// Builds an image manifest pointing at `config`, returning the manifest
/// bytes and the config digest.
pub(crate) fn image_manifest(config: &str) -> (Vec<u8>, Digest) {
    let digest = Digest::sha256_of(config.as_bytes()).unwrap();
    let manifest = format!(
        r#"{{"schemaVersion":2,"mediaType":"{}","config":{{"digest":"{}","size":{}}},"layers":[]}}"#,
        OCI_MANIFEST_V1,
        digest,
        config.len()
    );
    (manifest.into_bytes(), digest)
}

/// Builds an index whose children are the given manifests, in order.
pub(crate) fn index_manifest(children: &[&[u8]]) -> (Vec<u8>, Vec<Digest>) {
    let digests: Vec<Digest> = children
        .iter()
        .map(|c| Digest::sha256_of(c).unwrap())
        .collect();
    let entries: Vec<String> = digests
        .iter()
        .map(|d| format!(r#"{{"digest":"{}","platform":{{"os":"linux"}}}}"#, d))
        .collect();
    let index = format!(
        r#"{{"schemaVersion":2,"manifests":[{}]}}"#,
        entries.join(",")
    );
    (index.into_bytes(), digests)
}

#[derive(Default)]
pub(crate) struct FakeRegistry {
    version_failure: Option<Failure>,
    catalog: Option<std::result::Result<Vec<String>, Failure>>,
    tags: HashMap<String, std::result::Result<Vec<String>, Failure>>,
    manifests: HashMap<(String, String), Vec<u8>>,
    blobs: HashMap<String, Vec<u8>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    manifest_calls: AtomicUsize,
    blob_calls: AtomicUsize,
    catalog_calls: AtomicUsize,
}

impl FakeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_version_failure(mut self, failure: Failure) -> Self {
        self.version_failure = Some(failure);
        self
    }

    pub(crate) fn with_catalog(mut self, repositories: &[&str]) -> Self {
        self.catalog = Some(Ok(repositories.iter().map(|r| r.to_string()).collect()));
        self
    }

    pub(crate) fn with_catalog_failure(mut self, failure: Failure) -> Self {
        self.catalog = Some(Err(failure));
        self
    }

    pub(crate) fn with_tags(mut self, repository: &str, tags: &[&str]) -> Self {
        self.tags.insert(
            repository.to_string(),
            Ok(tags.iter().map(|t| t.to_string()).collect()),
        );
        self
    }

    pub(crate) fn with_tags_failure(mut self, repository: &str, failure: Failure) -> Self {
        self.tags.insert(repository.to_string(), Err(failure));
        self
    }

    pub(crate) fn with_manifest(
        mut self,
        repository: &str,
        reference: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.manifests
            .insert((repository.to_string(), reference.to_string()), bytes.into());
        self
    }

    pub(crate) fn with_blob(mut self, digest: &Digest, bytes: impl Into<Vec<u8>>) -> Self {
        self.blobs.insert(digest.to_string(), bytes.into());
        self
    }

    /// Registers `repository:tag` as a single-platform image with `config`
    /// as its config blob.
    pub(crate) fn with_image(self, repository: &str, tag: &str, config: &str) -> Self {
        let (manifest, digest) = image_manifest(config);
        self.with_manifest(repository, tag, manifest)
            .with_blob(&digest, config)
    }

    /// Holds every manifest fetch open for `delay`.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn manifest_calls(&self) -> usize {
        self.manifest_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn blob_calls(&self) -> usize {
        self.blob_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryApi for FakeRegistry {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn check_version(&self) -> Result<RegistryVersion> {
        match self.version_failure {
            Some(failure) => Err(failure.to_error("/v2/")),
            None => Ok(RegistryVersion {
                api_version: Some("registry/2.0".to_string()),
                auth_required: false,
            }),
        }
    }

    async fn fetch_catalog(&self) -> Result<Vec<String>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        match &self.catalog {
            Some(Ok(repositories)) => Ok(repositories.clone()),
            Some(Err(failure)) => Err(failure.to_error("/v2/_catalog")),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>> {
        let path = format!("/v2/{}/tags/list", repository);
        match self.tags.get(repository) {
            Some(Ok(tags)) => Ok(tags.clone()),
            Some(Err(failure)) => Err(failure.to_error(&path)),
            None => Err(Failure::Status(404).to_error(&path)),
        }
    }

    async fn fetch_manifest(&self, repository: &str, reference: &str) -> Result<Vec<u8>> {
        self.manifest_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let path = format!("/v2/{}/manifests/{}", repository, reference);
        self.manifests
            .get(&(repository.to_string(), reference.to_string()))
            .cloned()
            .ok_or_else(|| Failure::Status(404).to_error(&path))
    }

    async fn fetch_blob(&self, repository: &str, digest: &Digest) -> Result<Vec<u8>> {
        self.blob_calls.fetch_add(1, Ordering::SeqCst);
        let path = format!("/v2/{}/blobs/{}", repository, digest);
        self.blobs
            .get(&digest.to_string())
            .cloned()
            .ok_or_else(|| Failure::Status(404).to_error(&path))
    }
}
