use super::*;
use axum::body::to_bytes;

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_bad_request_omits_details() {
    let response = ApiError::bad_request("URL is required").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "URL is required"})
    );
}

#[tokio::test]
async fn test_internal_carries_details() {
    let details = serde_json::json!({"type": "FETCH_ERROR", "message": "boom"});
    let response = ApiError::internal("Failed to get repositories", details.clone()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "Failed to get repositories", "details": details})
    );
}

#[test]
fn test_internal_accepts_plain_strings() {
    let err = ApiError::internal("Failed to start Minikube", "no driver");
    assert_eq!(err.details, Some(Value::String("no driver".to_string())));
}

#[test]
fn test_registry_not_configured() {
    let err = ApiError::registry_not_configured();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error, "Registry URL is not configured");
}
