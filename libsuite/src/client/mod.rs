//! HTTP client for OCI registry communication.
//!
//! This module provides a thin HTTP client built on reqwest for talking to
//! OCI Distribution v2 registries. A [`Client`] is built from one
//! [`RegistryConfig`] snapshot and owns its own connection pool, so its
//! credentials and TLS verification policy apply to its requests only.

use crate::auth::Credentials;
use crate::config::{Network, RegistryConfig};
use crate::digest::Digest;
use crate::error::{Result, SuiteError};
use crate::oci::manifest_accept_header;
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::{debug, warn};


/// Upper bound on pages followed for one listing.
const MAX_PAGES: usize = 1000;

/// Response from the catalog API endpoint.
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    /// List of repository names
    #[serde(default)]
    repositories: Option<Vec<String>>,
}

/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    /// List of tag names; registries send `null` for repositories without tags
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Version information returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryVersion {
    /// The Docker-Distribution-API-Version header value, if present.
    /// Typically "registry/2.0" for OCI Distribution Spec v2.
    pub api_version: Option<String>,
    /// True when the registry answered 401, i.e. it speaks V2 but wants
    /// credentials.
    pub auth_required: bool,
}

/// The registry operations the resolver, pipeline and catalog lister need.
///
/// [`Client`] is the production implementation.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Base URL of the registry, used in operator-facing messages.
    fn base_url(&self) -> &str;

    /// Probes `GET /v2/`.
    async fn check_version(&self) -> Result<RegistryVersion>;

    /// Lists repository names from `GET /v2/_catalog`.
    async fn fetch_catalog(&self) -> Result<Vec<String>>;

    /// Lists tag names from `GET /v2/<name>/tags/list`.
    async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>>;

    /// Fetches raw manifest bytes for a tag or digest.
    async fn fetch_manifest(&self, repository: &str, reference: &str) -> Result<Vec<u8>>;

    /// Fetches a blob and verifies it against its digest.
    async fn fetch_blob(&self, repository: &str, digest: &Digest) -> Result<Vec<u8>>;
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libsuite::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_max_idle_per_host(20);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30). 0 disables the timeout.
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }
}

impl From<&Network> for ClientConfig {
    fn from(network: &Network) -> Self {
        Self {
            timeout_seconds: network.timeout,
            max_idle_per_host: network.max_idle_per_host,
        }
    }
}

/// HTTP client for one registry configuration.
#[derive(Debug, Clone)]
pub struct Client {
    /// The underlying HTTP client
    http_client: ReqwestClient,
    /// Base registry URL (e.g., "https://registry.example.com")
    base_url: String,
    /// Credentials sent with every request
    credentials: Credentials,
    /// Whether certificate validation is disabled for this client
    accept_invalid_certs: bool,
    /// Per-request timeout, kept for error messages
    timeout_seconds: u64,
}

impl Client {
    /// Creates a client for `registry` with the default [`ClientConfig`].
    ///
    /// # Examples
    ///
    /// ```
    /// use libsuite::client::Client;
    /// use libsuite::config::RegistryConfig;
    ///
    /// let registry = RegistryConfig {
    ///     endpoint: "localhost:5000".to_string(),
    ///     ..Default::default()
    /// };
    /// let client = Client::new(&registry).unwrap();
    /// assert_eq!(client.base_url(), "http://localhost:5000");
    /// ```
    pub fn new(registry: &RegistryConfig) -> Result<Self> {
        Self::with_config(registry, ClientConfig::default())
    }

    /// Creates a client for `registry` with a custom configuration.
    pub fn with_config(registry: &RegistryConfig, config: ClientConfig) -> Result<Self> {
        let base_url = registry.base_url()?;
        let accept_invalid_certs = !registry.secure;

        let mut builder = ReqwestClient::builder()
            .pool_max_idle_per_host(config.max_idle_per_host)
            .danger_accept_invalid_certs(accept_invalid_certs);
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }

        let http_client = builder
            .build()
            .map_err(|e| {
                SuiteError::connection_with_source("Failed to create HTTP client", false, e)
            })?;

        Ok(Self {
            http_client,
            base_url,
            credentials: Credentials::from_pair(&registry.username, &registry.password),
            accept_invalid_certs,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Returns the base registry URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the credentials attached to every request.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns true if this client skips certificate validation.
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// Sends an authenticated GET to `url`.
    ///
    /// Returns the response as-is; callers check the status.
    async fn send(&self, url: &str, accept: Option<&str>) -> Result<Response> {
        debug!(url = %url, "registry request");

        let mut request = self.http_client.get(url);
        if let Some(accept) = accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }
        if let Some(auth_header) = self.credentials.to_header_value() {
            request = request.header(reqwest::header::AUTHORIZATION, auth_header);
        }

        request
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))
    }

    /// GETs `path` (relative to the base URL) and fails on non-2xx.
    async fn get(&self, path: &str, accept: Option<&str>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.send(&url, accept).await?;
        Self::check_response_status(response)
    }

    /// Checks if the registry speaks the OCI Distribution Specification v2 API.
    ///
    /// Both 200 and 401 count as V2-compliant.
    pub async fn check_version(&self) -> Result<RegistryVersion> {
        let url = format!("{}/v2/", self.base_url);
        let response = self.send(&url, None).await?;

        let api_version = response
            .headers()
            .get("Docker-Distribution-API-Version")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(RegistryVersion {
                api_version,
                auth_required: true,
            });
        }

        Self::check_response_status(response)?;
        Ok(RegistryVersion {
            api_version,
            auth_required: false,
        })
    }

    /// Fetches the catalog of repositories, following pagination links.
    pub async fn fetch_catalog(&self) -> Result<Vec<String>> {
        let mut all_repositories = Vec::new();
        let mut path = "/v2/_catalog".to_string();
        let mut visited = HashSet::from([path.clone()]);

        loop {
            let response = self.get(&path, None).await?;
            let next_path = Self::extract_next_link(response.headers());

            let catalog: CatalogResponse = response.json().await.map_err(|e| {
                SuiteError::validation_with_source("Failed to parse catalog response", e)
            })?;
            all_repositories.extend(catalog.repositories.unwrap_or_default());

            match self.next_page(next_path, &mut visited) {
                Some(next) => path = next,
                None => break,
            }
        }

        Ok(all_repositories)
    }

    /// Fetches the tag names of a repository, following pagination links.
    pub async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>> {
        let mut all_tags = Vec::new();
        let mut path = format!("/v2/{}/tags/list", repository);
        let mut visited = HashSet::from([path.clone()]);

        loop {
            let response = self.get(&path, None).await?;
            let next_path = Self::extract_next_link(response.headers());

            let tags: TagsResponse = response.json().await.map_err(|e| {
                SuiteError::validation_with_source("Failed to parse tags response", e)
            })?;
            all_tags.extend(tags.tags.unwrap_or_default());

            match self.next_page(next_path, &mut visited) {
                Some(next) => path = next,
                None => break,
            }
        }

        Ok(all_tags)
    }

    /// Fetches the raw manifest for a tag or digest reference.
    pub async fn fetch_manifest(&self, repository: &str, reference: &str) -> Result<Vec<u8>> {
        let path = format!("/v2/{}/manifests/{}", repository, reference);
        let response = self.get(&path, Some(&manifest_accept_header())).await?;

        let bytes = response.bytes().await.map_err(|e| {
            SuiteError::connection_with_source("Failed to read manifest response", false, e)
        })?;
        Ok(bytes.to_vec())
    }

    /// Fetches a blob and checks it hashes to `digest`.
    ///
    /// Only sha256 digests are checked; other algorithms are trusted.
    ///
    /// Redirects (e.g. to object storage) are followed by reqwest.
    pub async fn fetch_blob(&self, repository: &str, digest: &Digest) -> Result<Vec<u8>> {
        let path = format!("/v2/{}/blobs/{}", repository, digest);
        let response = self.get(&path, None).await?;

        let bytes = response.bytes().await.map_err(|e| {
            SuiteError::connection_with_source("Failed to read blob response", false, e)
        })?;
        if !digest.is_verifiable() {
            debug!(digest = %digest, "digest algorithm not checked locally");
        }
        digest.verify(&bytes)?;
        Ok(bytes.to_vec())
    }

    /// Returns the next page to fetch, or `None` when the listing is done.
    ///
    /// A link to a page already fetched ends the listing, as does reaching
    /// [`MAX_PAGES`].
    fn next_page(&self, link: Option<String>, visited: &mut HashSet<String>) -> Option<String> {
        let next = self.relative_path(&link?);
        if visited.len() >= MAX_PAGES {
            warn!(registry = %self.base_url, pages = visited.len(), "pagination limit reached");
            return None;
        }
        if !visited.insert(next.clone()) {
            warn!(registry = %self.base_url, path = %next, "pagination link repeats a fetched page");
            return None;
        }
        Some(next)
    }

    /// Turns a pagination link into a path relative to the base URL.
    fn relative_path(&self, link: &str) -> String {
        link.strip_prefix(&self.base_url).unwrap_or(link).to_string()
    }

    /// Extracts the next page URL from the Link header.
    ///
    /// Format: `</v2/_catalog?n=100&last=repo99>; rel="next"`
    fn extract_next_link(headers: &reqwest::header::HeaderMap) -> Option<String> {
        let link_header = headers.get(reqwest::header::LINK)?;
        let link_str = link_header.to_str().ok()?;

        for link_part in link_str.split(',') {
            let link_part = link_part.trim();

            if (link_part.contains("rel=\"next\"") || link_part.contains("rel='next'"))
                && let Some(start) = link_part.find('<')
                && let Some(end) = link_part.find('>')
            {
                return Some(link_part[start + 1..end].to_string());
            }
        }

        None
    }

    /// Translates a reqwest error into a SuiteError.
    fn translate_reqwest_error(&self, error: reqwest::Error) -> SuiteError {
        if error.is_timeout() {
            SuiteError::connection(
                format!(
                    "Request to {} timed out after {} seconds",
                    self.base_url, self.timeout_seconds
                ),
                false,
            )
        } else if error.is_connect() {
            let refused = is_connection_refused(&error);
            let message = if refused {
                format!("Connection refused by registry at {}", self.base_url)
            } else {
                format!("Failed to connect to registry at {}", self.base_url)
            };
            SuiteError::connection_with_source(message, refused, error)
        } else {
            SuiteError::connection_with_source(
                format!("Network error communicating with {}", self.base_url),
                false,
                error,
            )
        }
    }

    /// Maps non-2xx responses to [`SuiteError::Http`].
    fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(SuiteError::http(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            response.url().as_str(),
        ))
    }
}

/// Walks the error chain looking for an OS-level "connection refused".
fn is_connection_refused(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>()
            && io_err.kind() == std::io::ErrorKind::ConnectionRefused
        {
            return true;
        }
        source = err.source();
    }

    // hyper does not always expose the io::Error as a source
    let rendered = format!("{:?}", error);
    rendered.contains("ConnectionRefused") || rendered.contains("Connection refused")
}

#[async_trait]
impl RegistryApi for Client {
    fn base_url(&self) -> &str {
        Client::base_url(self)
    }

    async fn check_version(&self) -> Result<RegistryVersion> {
        Client::check_version(self).await
    }

    async fn fetch_catalog(&self) -> Result<Vec<String>> {
        Client::fetch_catalog(self).await
    }

    async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>> {
        Client::fetch_tags(self, repository).await
    }

    async fn fetch_manifest(&self, repository: &str, reference: &str) -> Result<Vec<u8>> {
        Client::fetch_manifest(self, repository, reference).await
    }

    async fn fetch_blob(&self, repository: &str, digest: &Digest) -> Result<Vec<u8>> {
        Client::fetch_blob(self, repository, digest).await
    }
}
