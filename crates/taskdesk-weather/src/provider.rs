use crate::error::WeatherError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use taskdesk_core::{ReqwestErrorExt, WeatherConfig};
use tracing::instrument;

/// Units and language sent with every lookup.
const UNITS: &str = "metric";
const LANG: &str = "pt";

/// OpenWeatherMap current-weather client
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Transport(e.into_network_error()))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.to_string(),
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::new(
            config.api_key.clone(),
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Current conditions for `city`, exactly as the upstream API returned them.
    ///
    /// `city` is expected to be validated already (see `validate_city`).
    #[instrument(skip(self), level = "info")]
    pub async fn current(&self, city: &str) -> Result<Value, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            tracing::error!("Weather lookup attempted without an API key");
            WeatherError::MissingApiKey
        })?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", api_key),
                ("units", UNITS),
                ("lang", LANG),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Weather request failed: {}", e);
                WeatherError::Transport(e.into_network_error())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Weather API returned {} for {:?}", status, city);
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read weather response: {}", e);
            WeatherError::Transport(e.into_network_error())
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("Weather response was not JSON: {}", e);
            WeatherError::InvalidResponse(e.to_string())
        })
    }
}
