use axum::{http::StatusCode, response::IntoResponse};

use super::error_responses::AppError;

pub async fn not_found() -> impl IntoResponse {
    AppError::not_found("NOT_FOUND", "Route not found")
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
