//! Application configuration.
//!
//! Two kinds of configuration live here:
//!
//! - [`Config`], the process settings (listen address, timeouts, pipeline
//!   width). Loaded once at startup from defaults, an optional YAML file and
//!   `SUITE_*` environment variables.
//! - [`RegistryConfig`], the registry the dashboard currently browses. It is
//!   held in memory only and replaced wholesale by the operator at runtime.

use crate::error::{Result, SuiteError};
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use config::Environment;


/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub pipeline: Pipeline,
    #[serde(default)]
    pub minikube: Minikube,
    /// Registry to browse before the operator configures one.
    #[serde(default)]
    pub registry: Option<RegistryConfig>,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// This function is primarily used for testing.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(ConfigRs::try_from(&Config::default())?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder)
    }

    /// Loads a `Config` from an optional file path, then applies `SUITE_*`
    /// environment overrides (e.g. `SUITE_PIPELINE__BATCH_SIZE=8`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Self::environment())
    }

    /// Same as [`Config::load`] with an explicit environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = ConfigRs::builder().add_source(ConfigRs::try_from(&Config::default())?);

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).required(true));
        }

        Self::from_builder(builder.add_source(env))
    }

    /// The environment source used by [`Config::load`].
    pub fn environment() -> Environment {
        Environment::with_prefix("SUITE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Creates a `Config` from a `config::ConfigBuilder`.
    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                SuiteError::config_with_source(
                    "Failed to deserialize configuration",
                    None::<&str>,
                    e,
                )
            })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    #[serde(default = "default_server_bind")]
    pub bind: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Directory holding the dashboard's static assets.
    #[serde(default = "default_server_static_dir")]
    pub static_dir: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: default_server_bind(),
            port: default_server_port(),
            static_dir: default_server_static_dir(),
        }
    }
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3001
}

fn default_server_static_dir() -> String {
    "public".to_string()
}

/// Network settings for upstream registry calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Per-request timeout in seconds; 0 means no timeout.
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    #[serde(default = "default_network_max_idle_per_host")]
    pub max_idle_per_host: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            max_idle_per_host: default_network_max_idle_per_host(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

fn default_network_max_idle_per_host() -> usize {
    10
}

/// Tag aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pipeline {
    /// Number of tags resolved concurrently per batch.
    #[serde(default = "default_pipeline_batch_size")]
    pub batch_size: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            batch_size: default_pipeline_batch_size(),
        }
    }
}

fn default_pipeline_batch_size() -> usize {
    crate::pipeline::DEFAULT_BATCH_SIZE
}

/// Local cluster control settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Minikube {
    /// Program invoked for `status`, `start` and `stop`.
    #[serde(default = "default_minikube_binary")]
    pub binary: String,
}

impl Default for Minikube {
    fn default() -> Self {
        Self {
            binary: default_minikube_binary(),
        }
    }
}

fn default_minikube_binary() -> String {
    "minikube".to_string()
}

/// The registry the dashboard is pointed at.
///
/// Serialized with the field names the dashboard front-end uses
/// (`url`, `isSecure`, `type`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// `host[:port]` of the registry.
    #[serde(rename = "url")]
    pub endpoint: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Use https and verify certificates.
    #[serde(rename = "isSecure", alias = "secure", alias = "issecure", default)]
    pub secure: bool,

    /// Display-only timezone for the front-end.
    #[serde(default = "default_registry_timezone")]
    pub timezone: String,

    /// Display-only registry flavour (`generic`, `harbor`).
    #[serde(rename = "type", alias = "kind", default = "default_registry_kind")]
    pub kind: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: String::new(),
            password: String::new(),
            secure: false,
            timezone: default_registry_timezone(),
            kind: default_registry_kind(),
        }
    }
}

fn default_registry_timezone() -> String {
    "UTC".to_string()
}

fn default_registry_kind() -> String {
    "generic".to_string()
}

/// Body of a registry configuration update.
///
/// Every field is optional on the wire; [`RegistryConfig::from_update`]
/// decides what is required.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RegistryUpdate {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(rename = "isSecure", default)]
    pub is_secure: Option<bool>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl RegistryConfig {
    /// Builds the replacement config from an update.
    ///
    /// This is a full replace: fields absent from the update take their
    /// defaults, never the previous values. Fails when `url` is missing or
    /// blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use libsuite::config::{RegistryConfig, RegistryUpdate};
    ///
    /// let update = RegistryUpdate {
    ///     url: Some("localhost:5000".to_string()),
    ///     ..Default::default()
    /// };
    /// let config = RegistryConfig::from_update(update).unwrap();
    /// assert_eq!(config.timezone, "UTC");
    /// assert!(!config.secure);
    /// ```
    pub fn from_update(update: RegistryUpdate) -> Result<Self> {
        let endpoint = update
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| SuiteError::validation("URL is required"))?;

        Ok(Self {
            endpoint,
            username: update.username.unwrap_or_default(),
            password: update.password.unwrap_or_default(),
            secure: update.is_secure.unwrap_or(false),
            timezone: non_empty_or(update.timezone, default_registry_timezone),
            kind: non_empty_or(update.kind, default_registry_kind),
        })
    }

    /// Returns true once an endpoint has been set.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }

    /// URL scheme implied by `secure`.
    pub fn scheme(&self) -> &'static str {
        if self.secure { "https" } else { "http" }
    }

    /// Base URL of the registry, e.g. `http://localhost:5000`.
    ///
    /// A scheme typed into the endpoint is dropped; `secure` decides.
    pub fn base_url(&self) -> Result<String> {
        let endpoint = self.endpoint.trim();
        let endpoint = endpoint
            .strip_prefix("https://")
            .or_else(|| endpoint.strip_prefix("http://"))
            .unwrap_or(endpoint)
            .trim_end_matches('/');

        if endpoint.is_empty() {
            return Err(SuiteError::validation("Registry URL cannot be empty"));
        }
        Ok(format!("{}://{}", self.scheme(), endpoint))
    }
}

fn non_empty_or(value: Option<String>, default: fn() -> String) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or_else(default)
}
