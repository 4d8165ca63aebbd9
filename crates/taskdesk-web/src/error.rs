use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use taskdesk_core::{AppError, AuthError};
use taskdesk_services::{TaskServiceError, ValidationErrors};
use taskdesk_weather::WeatherError;
use thiserror::Error;

/// Everything a handler can fail with, mapped onto a status and JSON body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] AuthError),

    #[error("This action is unauthorized.")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Weather lookup failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::Validation(errors) => ApiError::Validation(errors),
            TaskServiceError::Forbidden => ApiError::Forbidden,
            TaskServiceError::Storage(e) => ApiError::Internal(AppError::Database(e)),
            TaskServiceError::Worker(e) => ApiError::Internal(AppError::Other(e.into())),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

fn validation_body(errors: &ValidationErrors) -> serde_json::Value {
    json!({
        "message": errors.first_message().unwrap_or("The given data was invalid."),
        "errors": errors,
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated(e) => {
                tracing::debug!("Rejected request: {}", e);
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": e.user_message() })),
                )
                    .into_response()
            }
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "This action is unauthorized." })),
            )
                .into_response(),
            ApiError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(validation_body(&errors))).into_response()
            }
            ApiError::MalformedPayload(detail) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Malformed payload", "detail": detail })),
            )
                .into_response(),
            ApiError::Weather(WeatherError::InvalidCity(message)) => {
                let mut errors = ValidationErrors::default();
                errors.add("city", message);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(validation_body(&errors))).into_response()
            }
            ApiError::Weather(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(json!({ "error": e.user_message() }))).into_response()
            }
            ApiError::Internal(e) => {
                tracing::error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": e.user_message() })),
                )
                    .into_response()
            }
        }
    }
}
