use reqwest::StatusCode;
use thiserror::Error;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a city name";
pub const NOT_FOUND_MESSAGE: &str = "City not found. Please check the city name and try again.";
pub const SERVICE_MESSAGE: &str = "Unable to fetch weather data. Please try again later.";

/// Every way a weather lookup can fail.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no city name given")]
    EmptyInput,

    #[error("provider does not know the city '{city}'")]
    NotFound { city: String },

    #[error("provider request failed with status {status}: {body}")]
    Service { status: StatusCode, body: String },

    #[error("failed to reach the weather provider")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode the weather provider response: {0}")]
    Parse(String),

    #[error("weather fetch did not complete: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

impl WeatherError {
    /// Text shown to the user in the error state.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::EmptyInput => EMPTY_INPUT_MESSAGE,
            WeatherError::NotFound { .. } => NOT_FOUND_MESSAGE,
            WeatherError::Service { .. }
            | WeatherError::Transport(_)
            | WeatherError::Parse(_)
            | WeatherError::Interrupted(_) => SERVICE_MESSAGE,
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Parse(err.to_string())
    }
}
