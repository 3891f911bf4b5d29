//! libsuite - Registry metadata aggregation for the k3s-suite dashboard
//!
//! libsuite talks to OCI Distribution v2 registries and turns their raw
//! catalog, tag, manifest and config-blob endpoints into the views the
//! dashboard shows: a list of repositories, and per repository a list of
//! tags ordered by image creation time.
//!
//! # Quick Start
//!
//! ```no_run
//! use libsuite::{Client, RegistryConfig};
//! use libsuite::catalog::list_repositories;
//! use libsuite::pipeline::{get_repo_with_tags, DEFAULT_BATCH_SIZE};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RegistryConfig {
//!     endpoint: "localhost:5000".to_string(),
//!     ..Default::default()
//! };
//! let client = Client::new(&registry)?;
//!
//! for repo in list_repositories(&client).await? {
//!     let repo = get_repo_with_tags(&client, &repo, DEFAULT_BATCH_SIZE).await;
//!     for tag in repo.tags {
//!         println!("{}:{} {}", repo.name, tag.name, tag.created);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`client`] - Registry transport and the [`RegistryApi`] seam
//! - [`resolver`] - Tag → manifest → config blob → creation time
//! - [`pipeline`] - Batched resolution of all tags of a repository
//! - [`catalog`] - Repository listing with classified failures
//! - [`config`] - Process settings and the active registry configuration
//!
//! The library keeps no global state. Callers build a [`Client`] from a
//! [`RegistryConfig`] snapshot and pass it down explicitly.

#![warn(clippy::all)]

/// Returns the libsuite crate version.
///
/// # Examples
///
/// ```
/// let version = libsuite::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// Re-export commonly used types for convenience
pub use auth::Credentials;
pub use catalog::{CatalogError, CatalogErrorKind};
pub use client::{Client, ClientConfig, RegistryApi};
pub use config::{Config, RegistryConfig, RegistryUpdate};
pub use digest::Digest;
pub use error::{Result, SuiteError};
pub use oci::Manifest;
pub use pipeline::RepositoryTags;
pub use resolver::Tag;

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod digest;
pub mod error;
pub mod oci;
pub mod pipeline;
pub mod resolver;

#[cfg(test)]
mod fake;
