use axum::Json;
use wabridge_api::HealthResponse;

/// GET /api/health — liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
