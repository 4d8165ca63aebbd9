use taskdesk_core::NetworkError;

/// Longest city name forwarded upstream.
pub const MAX_CITY_LENGTH: usize = 100;

/// Weather lookup errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// City rejected before any request was made
    #[error("Invalid city: {0}")]
    InvalidCity(String),

    #[error("Weather API key is not configured")]
    MissingApiKey,

    /// Upstream answered with a non-success status
    #[error("Weather API returned status {status}")]
    Upstream { status: u16 },

    #[error("Transport error: {0}")]
    Transport(#[from] NetworkError),

    /// Upstream said success but the body was not JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl WeatherError {
    /// HTTP status the web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            WeatherError::InvalidCity(_) => 422,
            WeatherError::Upstream { status } => *status,
            WeatherError::MissingApiKey
            | WeatherError::Transport(_)
            | WeatherError::InvalidResponse(_) => 500,
        }
    }

    /// Message shown in the widget.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::InvalidCity(message) => message.clone(),
            WeatherError::MissingApiKey => "Chave da API de clima não configurada.".to_string(),
            WeatherError::Upstream { .. } => "Cidade não encontrada ou erro na API.".to_string(),
            WeatherError::Transport(_) | WeatherError::InvalidResponse(_) => {
                "Erro interno de conexão.".to_string()
            }
        }
    }
}

/// Trim and check a city name. Returns the value to send upstream.
pub fn validate_city(city: Option<&str>) -> Result<String, WeatherError> {
    let city = city.map(str::trim).unwrap_or_default();

    if city.is_empty() {
        return Err(WeatherError::InvalidCity(
            "The city field is required.".to_string(),
        ));
    }
    if city.chars().count() > MAX_CITY_LENGTH {
        return Err(WeatherError::InvalidCity(format!(
            "The city field must not be greater than {} characters.",
            MAX_CITY_LENGTH
        )));
    }

    Ok(city.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_validate_city_trims() {
        assert_eq!(validate_city(Some("  Birigui ")).unwrap(), "Birigui");
    }

    #[test]
    fn test_validate_city_requires_a_value() {
        for city in [None, Some(""), Some("   ")] {
            let err = validate_city(city).unwrap_err();
            assert_eq!(err.status_code(), 422);
            assert_eq!(err.user_message(), "The city field is required.");
        }
    }

    #[test]
    fn test_validate_city_length_boundary() {
        assert!(validate_city(Some(&"a".repeat(100))).is_ok());
        let err = validate_city(Some(&"a".repeat(101))).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidCity(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(WeatherError::MissingApiKey.status_code(), 500);
        assert_eq!(WeatherError::Upstream { status: 404 }.status_code(), 404);
        assert_eq!(WeatherError::Upstream { status: 401 }.status_code(), 401);
        assert_eq!(
            WeatherError::Transport(NetworkError::Timeout).status_code(),
            500
        );
        assert_eq!(
            WeatherError::InvalidResponse("not json".to_string()).status_code(),
            500
        );
    }

    #[test]
    fn test_user_messages_are_portuguese() {
        assert_eq!(
            WeatherError::MissingApiKey.user_message(),
            "Chave da API de clima não configurada."
        );
        assert_eq!(
            WeatherError::Upstream { status: 404 }.user_message(),
            "Cidade não encontrada ou erro na API."
        );
        assert_eq!(
            WeatherError::Transport(NetworkError::Timeout).user_message(),
            "Erro interno de conexão."
        );
    }
}
