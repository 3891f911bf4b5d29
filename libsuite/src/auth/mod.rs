//! Authentication handling for registries.
//!
//! The dashboard only speaks HTTP Basic authentication. Credentials are built
//! from the operator-supplied username/password pair and rendered into an
//! `Authorization` header for every registry request.


/// Credentials for registry authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication required (anonymous access)
    Anonymous,

    /// HTTP Basic authentication with username and password
    Basic {
        /// Username for authentication
        username: String,
        /// Password for authentication
        password: String,
    },
}

impl Credentials {
    /// Creates Basic authentication credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libsuite::auth::Credentials;
    ///
    /// let creds = Credentials::basic("username", "password");
    /// ```
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds credentials from an optional username/password pair.
    ///
    /// Basic credentials are only produced when both halves are non-empty;
    /// anything else is anonymous access.
    ///
    /// # Examples
    ///
    /// ```
    /// use libsuite::auth::Credentials;
    ///
    /// assert_eq!(Credentials::from_pair("", "secret"), Credentials::Anonymous);
    /// assert!(matches!(
    ///     Credentials::from_pair("admin", "secret"),
    ///     Credentials::Basic { .. }
    /// ));
    /// ```
    pub fn from_pair(username: &str, password: &str) -> Self {
        if username.is_empty() || password.is_empty() {
            Self::Anonymous
        } else {
            Self::basic(username, password)
        }
    }

    /// Returns the Authorization header value for these credentials.
    pub fn to_header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, password } => {
                use base64::{Engine as _, engine::general_purpose};
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials);
                Some(format!("Basic {}", encoded))
            }
        }
    }
}
