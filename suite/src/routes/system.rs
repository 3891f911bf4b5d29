use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use libsuite::error::SuiteError;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub message: &'static str,
    pub output: String,
}

/// `GET /api/system/minikube/status`
pub async fn minikube_status(State(state): State<AppState>) -> Json<Value> {
    Json(state.minikube().status().await)
}

/// `POST /api/system/minikube/start`
pub async fn start_minikube(
    State(state): State<AppState>,
) -> Result<Json<CommandResult>, ApiError> {
    info!("starting minikube");
    let output = state
        .minikube()
        .start()
        .await
        .map_err(|e| ApiError::internal("Failed to start Minikube", failure_details(e)))?;

    Ok(Json(CommandResult {
        message: "Minikube started",
        output,
    }))
}

/// `POST /api/system/minikube/stop`
pub async fn stop_minikube(
    State(state): State<AppState>,
) -> Result<Json<CommandResult>, ApiError> {
    info!("stopping minikube");
    let output = state
        .minikube()
        .stop()
        .await
        .map_err(|e| ApiError::internal("Failed to stop Minikube", failure_details(e)))?;

    Ok(Json(CommandResult {
        message: "Minikube stopped",
        output,
    }))
}

/// The command's own message, without the error-kind prefix.
fn failure_details(err: SuiteError) -> String {
    match err {
        SuiteError::Process { message, .. } => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
