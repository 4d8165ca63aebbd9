use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use taskdesk_weather::validate_city;

use super::decode_form;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherRequest {
    #[serde(default)]
    city: Option<String>,
}

/// Current weather for a city, passed through from the upstream API.
pub async fn current(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let request: WeatherRequest = decode_form(body, &["city"])?;
    let city = validate_city(request.city.as_deref())?;
    let weather = state.weather.current(&city).await?;
    Ok(Json(weather))
}
