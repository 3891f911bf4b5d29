use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use libsuite::catalog::list_repositories;
use libsuite::config::{RegistryConfig, RegistryUpdate};
use libsuite::pipeline::{RepositoryTags, get_repo_with_tags};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ConfigUpdated {
    pub message: &'static str,
    pub config: RegistryConfig,
}

/// `GET /api/config/registry`
pub async fn get_config(State(state): State<AppState>) -> Json<RegistryConfig> {
    Json(state.registry().await)
}

/// `POST /api/config/registry`
///
/// Replaces the active registry configuration; absent fields take their
/// defaults.
pub async fn update_config(
    State(state): State<AppState>,
    body: Result<Json<RegistryUpdate>, JsonRejection>,
) -> Result<Json<ConfigUpdated>, ApiError> {
    let Json(update) = body.map_err(|rejection| {
        let mut err = ApiError::bad_request("Invalid request body");
        err.details = Some(Value::String(rejection.body_text()));
        err
    })?;

    let config =
        RegistryConfig::from_update(update).map_err(|_| ApiError::bad_request("URL is required"))?;

    info!(
        registry = %config.endpoint,
        secure = config.secure,
        kind = %config.kind,
        "registry configuration updated"
    );
    state.replace_registry(config.clone()).await;

    Ok(Json(ConfigUpdated {
        message: "Registry configuration updated",
        config,
    }))
}

/// `GET /api/repositories`
pub async fn get_repositories(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let registry = state.registry().await;
    let client = state.client_for(&registry)?;

    let repositories = list_repositories(&client).await.map_err(|e| {
        let details = serde_json::to_value(&e).unwrap_or_else(|_| Value::String(e.message.clone()));
        ApiError::internal("Failed to get repositories", details)
    })?;

    Ok(Json(repositories))
}

/// `GET /api/repositories/:name/tags`
///
/// `name` may contain `/` when percent-encoded (`team%2Fapp`).
pub async fn get_tags(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RepositoryTags>, ApiError> {
    let registry = state.registry().await;
    let client = state.client_for(&registry).map_err(|e| {
        if e.status.is_client_error() {
            e
        } else {
            ApiError::internal("Failed to fetch tags", e.details.unwrap_or(Value::Null))
        }
    })?;

    let repository = get_repo_with_tags(&client, &name, state.batch_size()).await;
    Ok(Json(repository))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
