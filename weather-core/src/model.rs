use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WeatherError;

/// A validated city name: trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeatherQuery(String);

impl WeatherQuery {
    /// Trim `raw` and reject empty or whitespace-only input.
    pub fn parse(raw: &str) -> Result<Self, WeatherError> {
        let city = raw.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyInput);
        }

        Ok(Self(city.to_string()))
    }

    pub fn city(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for WeatherQuery {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Current conditions for one city, as shown on the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub city_name: String,
    pub country_code: String,
    pub temperature_c: i32,
    pub condition_text: String,
    pub humidity_percent: u8,
    pub wind_speed_mps: f64,
    pub icon_code: String,
}

impl WeatherResult {
    /// "London, GB"
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.city_name, self.country_code)
    }

    pub fn humidity_label(&self) -> String {
        format!("{}%", self.humidity_percent)
    }

    pub fn wind_label(&self) -> String {
        format!("{} m/s", self.wind_speed_mps)
    }

    /// Icon image URL on the provider's CDN, always the `@2x` size.
    pub fn icon_url(&self, icon_base_url: &str) -> String {
        format!("{}/{}@2x.png", icon_base_url.trim_end_matches('/'), self.icon_code)
    }
}

/// Round a temperature to whole degrees, halves going toward positive infinity.
///
/// `-0.5` becomes `0` and `-2.5` becomes `-2`, while `2.5` becomes `3`.
pub fn round_temperature(celsius: f64) -> i32 {
    let whole = celsius.floor();
    let rounded = if celsius - whole >= 0.5 { whole + 1.0 } else { whole };
    rounded as i32
}
