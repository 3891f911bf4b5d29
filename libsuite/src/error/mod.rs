//! Error types for the suite library.
//!
//! Every fallible operation in `libsuite` returns [`SuiteError`]. The variants
//! mirror the failure taxonomy the dashboard surfaces to operators: transport
//! failures, non-success HTTP statuses, and the per-tag manifest/blob failures
//! that the aggregation pipeline degrades instead of propagating.

use thiserror::Error;


/// Main error type for suite operations
#[derive(Error, Debug)]
pub enum SuiteError {
    /// Connection-level failure (refused, DNS, TLS handshake, timeout)
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        /// True when the peer actively refused the connection.
        refused: bool,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The registry answered with a non-2xx status
    #[error("Registry request failed: {status} {status_text} ({url})")]
    Http {
        status: u16,
        status_text: String,
        url: String,
    },

    /// A manifest could not be fetched or parsed
    #[error("Failed to fetch manifest {reference}: {source}")]
    ManifestFetch {
        reference: String,
        #[source]
        source: Box<SuiteError>,
    },

    /// A blob could not be fetched, verified, or parsed
    #[error("Failed to fetch blob {digest}: {source}")]
    BlobFetch {
        digest: String,
        #[source]
        source: Box<SuiteError>,
    },

    /// Validation errors (invalid manifest, digest mismatch, etc.)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, missing settings)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An external command could not be run
    #[error("Process error: {message}")]
    Process {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for suite operations
pub type Result<T> = std::result::Result<T, SuiteError>;

impl SuiteError {
    /// Creates a new connection error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libsuite::error::SuiteError;
    ///
    /// let err = SuiteError::connection("connection reset", false);
    /// assert!(matches!(err, SuiteError::Connection { .. }));
    /// ```
    pub fn connection<S: Into<String>>(message: S, refused: bool) -> Self {
        Self::Connection {
            message: message.into(),
            refused,
            source: None,
        }
    }

    /// Creates a new connection error with a source error.
    pub fn connection_with_source<S, E>(message: S, refused: bool, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            message: message.into(),
            refused,
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new HTTP status error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libsuite::error::SuiteError;
    ///
    /// let err = SuiteError::http(404, "Not Found", "http://localhost:5000/v2/_catalog");
    /// assert_eq!(err.status(), Some(404));
    /// ```
    pub fn http<S: Into<String>, U: Into<String>>(status: u16, status_text: S, url: U) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
            url: url.into(),
        }
    }

    /// Wraps a failure that happened while resolving a manifest.
    pub fn manifest_fetch<S: Into<String>>(reference: S, source: SuiteError) -> Self {
        Self::ManifestFetch {
            reference: reference.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a failure that happened while fetching a blob.
    pub fn blob_fetch<S: Into<String>>(digest: S, source: SuiteError) -> Self {
        Self::BlobFetch {
            digest: digest.into(),
            source: Box::new(source),
        }
    }

    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libsuite::error::SuiteError;
    ///
    /// let err = SuiteError::validation("invalid manifest format");
    /// assert!(matches!(err, SuiteError::Validation { .. }));
    /// ```
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new process error.
    pub fn process<S: Into<String>>(message: S) -> Self {
        Self::Process {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new process error with a source error.
    pub fn process_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Process {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the HTTP status of this error, looking through manifest and
    /// blob wrappers.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::ManifestFetch { source, .. } | Self::BlobFetch { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns true if the registry refused the connection.
    pub fn is_connection_refused(&self) -> bool {
        match self {
            Self::Connection { refused, .. } => *refused,
            Self::ManifestFetch { source, .. } | Self::BlobFetch { source, .. } => {
                source.is_connection_refused()
            }
            _ => false,
        }
    }
}

impl From<config::ConfigError> for SuiteError {
    fn from(err: config::ConfigError) -> Self {
        SuiteError::config_with_source("Configuration processing error", None, err)
    }
}
