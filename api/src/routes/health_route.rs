use axum::{http::StatusCode, response::Response};
use serde::Serialize;

use crate::core::http::response_envelope::ApiResponse;

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
}

/// Liveness probe.
pub async fn health_route() -> Response {
    ApiResponse::success(HealthData { status: "ok" }).into_response_with_status(StatusCode::OK)
}
