//! Weather lookup for the dashboard widget
//!
//! Forwards a city name to OpenWeatherMap's current-weather endpoint and
//! hands the upstream JSON back untouched. No caching, no retries.

pub mod error;
pub mod provider;

pub use error::{validate_city, WeatherError, MAX_CITY_LENGTH};
pub use provider::WeatherProvider;
