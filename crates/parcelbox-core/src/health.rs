use axum::http::StatusCode;

/// Handler for `GET /healthz` liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
