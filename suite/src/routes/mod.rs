//! HTTP routes.

use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};

/// Registry configuration, repository and tag handlers
pub mod registry;

/// Static dashboard assets
pub mod assets;

/// Local cluster control handlers
pub mod system;

/// Builds the dashboard router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/config/registry",
            get(registry::get_config).post(registry::update_config),
        )
        .route("/api/repositories", get(registry::get_repositories))
        .route("/api/repositories/:name/tags", get(registry::get_tags))
        .route("/api/system/minikube/status", get(system::minikube_status))
        .route("/api/system/minikube/start", post(system::start_minikube))
        .route("/api/system/minikube/stop", post(system::stop_minikube))
        .fallback(assets::serve_asset)
        .with_state(state)
}
