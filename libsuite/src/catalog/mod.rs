//! Repository catalog listing with operator-facing error classification.

use crate::client::RegistryApi;
use crate::error::SuiteError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};


/// Why the catalog could not be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogErrorKind {
    /// Nothing is listening at the registry address.
    ConnectionRefused,
    /// The registry is up but `/v2/_catalog` answers 404.
    CatalogDisabled,
    /// Any other failure.
    FetchError,
}

/// A classified catalog failure.
///
/// Serializes as `{"type": "...", "message": "..."}`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct CatalogError {
    #[serde(rename = "type")]
    pub kind: CatalogErrorKind,
    pub message: String,
}

impl CatalogError {
    pub fn new<S: Into<String>>(kind: CatalogErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn connection_refused(base_url: &str) -> Self {
        Self::new(
            CatalogErrorKind::ConnectionRefused,
            format!("Could not connect to registry at {}. Is it running?", base_url),
        )
    }

    /// Classifies a catalog fetch failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use libsuite::catalog::{CatalogError, CatalogErrorKind};
    /// use libsuite::error::SuiteError;
    ///
    /// let err = SuiteError::http(404, "Not Found", "http://localhost:5000/v2/_catalog");
    /// let classified = CatalogError::classify("http://localhost:5000", &err);
    /// assert_eq!(classified.kind, CatalogErrorKind::CatalogDisabled);
    /// ```
    pub fn classify(base_url: &str, error: &SuiteError) -> Self {
        if error.is_connection_refused() {
            return Self::connection_refused(base_url);
        }
        if error.status() == Some(404) {
            return Self::new(
                CatalogErrorKind::CatalogDisabled,
                "Registry Connected. Repository listing is disabled/unsupported on this registry.",
            );
        }
        Self::new(
            CatalogErrorKind::FetchError,
            format!("Failed to fetch: {}", error),
        )
    }
}

/// Lists the registry's repositories.
///
/// Probes `/v2/` first; only a refused connection stops there. Any other
/// probe failure (401, 404, ...) falls through to the catalog request.
pub async fn list_repositories(api: &dyn RegistryApi) -> Result<Vec<String>, CatalogError> {
    if let Err(e) = api.check_version().await {
        if e.is_connection_refused() {
            warn!(registry = api.base_url(), error = %e, "registry refused connection");
            return Err(CatalogError::connection_refused(api.base_url()));
        }
        debug!(error = %e, "version probe failed, trying catalog anyway");
    }

    match api.fetch_catalog().await {
        Ok(repositories) => Ok(repositories),
        Err(e) => {
            let classified = CatalogError::classify(api.base_url(), &e);
            warn!(kind = ?classified.kind, error = %e, "failed to list repositories");
            Err(classified)
        }
    }
}
