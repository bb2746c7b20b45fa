use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("unsupported_currency: {0}")]
    UnsupportedCurrency(String),
    #[error("external_unavailable: {0}")]
    External(String),
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")] pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { error: "Invalid input", details: Some(msg) }),
            ).into_response(),
            ApiError::UnsupportedCurrency(code) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { error: "Currency not supported", details: Some(code) }),
            ).into_response(),
            // Upstream failures surface as 500, not 503.
            ApiError::External(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { error: "Failed to fetch rates", details: Some(msg) }),
            ).into_response(),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { error: "Internal server error", details: Some(msg) }),
            ).into_response(),
        }
    }
}
