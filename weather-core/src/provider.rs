use crate::{Config, WeatherError, WeatherQuery, WeatherResult, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of current weather for a city.
///
/// One call is one outbound request; implementations never retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weather-card configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    Ok(Arc::new(OpenWeatherProvider::with_base_url(
        api_key.to_owned(),
        config.base_url.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `weather-card configure`"));
    }

    #[test]
    fn provider_from_config_works_when_key_set() {
        let cfg = Config { api_key: Some("KEY".to_string()), ..Config::default() };

        assert!(provider_from_config(&cfg).is_ok());
    }
}
