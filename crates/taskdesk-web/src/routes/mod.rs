//! HTTP routes.

mod dashboard;
mod profile;
mod tasks;
mod weather;

use axum::{
    extract::State,
    response::Redirect,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use taskdesk_services::ValidationErrors;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/dashboard", get(dashboard::show))
        .route("/tasks", post(tasks::store))
        .route(
            "/tasks/:id",
            put(tasks::update).patch(tasks::update).delete(tasks::destroy),
        )
        .route("/tasks/:id/complete", patch(tasks::complete))
        .route("/profile", delete(profile::destroy))
        .route("/weather", post(weather::current))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> Redirect {
    Redirect::to("/dashboard")
}

/// Liveness probe. No identity required.
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "taskdesk",
        "weather_configured": state.weather.is_configured(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Decode a JSON form body into `T`.
///
/// Each of `fields` must be a string or null when present; anything else is
/// reported against that field. Bodies that are not objects are malformed.
fn decode_form<T: DeserializeOwned>(body: Value, fields: &[&str]) -> Result<T, ApiError> {
    let Value::Object(map) = &body else {
        return Err(ApiError::MalformedPayload("Expected a JSON object".to_string()));
    };

    let mut errors = ValidationErrors::default();
    for &field in fields {
        if let Some(value) = map.get(field) {
            if !(value.is_string() || value.is_null()) {
                errors.add(field, format!("The {} field must be a string.", field));
            }
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    serde_json::from_value(body).map_err(|e| ApiError::MalformedPayload(e.to_string()))
}
