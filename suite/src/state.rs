//! Shared request state.

use crate::error::ApiError;
use crate::minikube::Minikube;
use libsuite::auth::Credentials;
use libsuite::client::{Client, ClientConfig};
use libsuite::config::{Config, RegistryConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// State shared by all handlers.
///
/// The active [`RegistryConfig`] is the only mutable part. Handlers take a
/// snapshot with [`AppState::registry`] and use it for the whole request.
#[derive(Debug, Clone)]
pub struct AppState {
    registry: Arc<RwLock<RegistryConfig>>,
    client_config: ClientConfig,
    batch_size: usize,
    static_dir: PathBuf,
    minikube: Minikube,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: Arc::new(RwLock::new(config.registry.clone().unwrap_or_default())),
            client_config: ClientConfig::from(&config.network),
            batch_size: config.pipeline.batch_size,
            static_dir: PathBuf::from(&config.server.static_dir),
            minikube: Minikube::new(config.minikube.binary.clone()),
        }
    }

    /// A copy of the active registry configuration.
    pub async fn registry(&self) -> RegistryConfig {
        self.registry.read().await.clone()
    }

    /// Replaces the active registry configuration.
    pub async fn replace_registry(&self, registry: RegistryConfig) {
        *self.registry.write().await = registry;
    }

    /// Builds a client for `registry`, or 400 when no registry is set.
    pub fn client_for(&self, registry: &RegistryConfig) -> Result<Client, ApiError> {
        if !registry.is_configured() {
            return Err(ApiError::registry_not_configured());
        }
        let client = Client::with_config(registry, self.client_config.clone())
            .map_err(|e| ApiError::internal("Failed to create registry client", e.to_string()))?;
        debug!(
            registry = client.base_url(),
            authenticated = !matches!(client.credentials(), Credentials::Anonymous),
            insecure = client.accepts_invalid_certs(),
            "registry client ready"
        );
        Ok(client)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn static_dir(&self) -> &PathBuf {
        &self.static_dir
    }

    pub fn minikube(&self) -> &Minikube {
        &self.minikube
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
