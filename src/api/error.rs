use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error types that can be returned from handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body carried no usable city.
    #[error("City and energy type are required")]
    MissingCity,

    /// The weather provider produced no observation for the requested city.
    #[error("Weather data unavailable for {0}")]
    WeatherUnavailable(String),
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCity => StatusCode::BAD_REQUEST,
            ApiError::WeatherUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::MissingCity => tracing::debug!(error = %self, "client error"),
            ApiError::WeatherUnavailable(_) => tracing::warn!(error = %self, "upstream error"),
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
