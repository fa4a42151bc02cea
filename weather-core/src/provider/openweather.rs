use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    model::{WeatherQuery, WeatherResult, round_temperature},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

const UNITS: &str = "metric";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        debug!(city = %query, "requesting current weather from OpenWeather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", query.city()),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
            ])
            .send()
            .await
            .inspect_err(|err| warn!(city = %query, error = %err, "OpenWeather request failed"))?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            debug!(city = %query, "OpenWeather does not know this city");
            return Err(WeatherError::NotFound { city: query.city().to_string() });
        }

        if !status.is_success() {
            warn!(city = %query, %status, "OpenWeather returned an error status");
            return Err(WeatherError::Service { status, body: truncate_body(&body) });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        parsed.into_result()
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl OwCurrentResponse {
    fn into_result(self) -> Result<WeatherResult, WeatherError> {
        // Only the first condition is shown, even when several are reported.
        let condition = self.weather.into_iter().next().ok_or_else(|| {
            WeatherError::Parse("OpenWeather response contained no weather conditions".to_string())
        })?;

        Ok(WeatherResult {
            city_name: self.name,
            country_code: self.sys.country,
            temperature_c: round_temperature(self.main.temp),
            condition_text: condition.description,
            humidity_percent: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            icon_code: condition.icon,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_weather(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        self.fetch_current(query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    const PATH: &str = "/data/2.5/weather";

    fn london_body() -> serde_json::Value {
        json!({
            "name": "London",
            "dt": 1_700_000_000,
            "sys": { "country": "GB" },
            "main": { "temp": 15.4, "feels_like": 14.2, "humidity": 70 },
            "wind": { "speed": 3.1 },
            "weather": [
                { "main": "Clear", "description": "clear sky", "icon": "01d" },
                { "main": "Mist", "description": "mist", "icon": "50d" }
            ]
        })
    }

    fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::with_base_url("KEY".into(), format!("{}{PATH}", server.uri()))
    }

    fn query(city: &str) -> WeatherQuery {
        WeatherQuery::parse(city).expect("valid city")
    }

    #[tokio::test]
    async fn success_maps_first_condition_and_rounds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .and(query_param("q", "London"))
            .and(query_param("appid", "KEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&server)
            .await;

        let result = provider_for(&server).fetch_weather(&query("London")).await.unwrap();

        assert_eq!(
            result,
            WeatherResult {
                city_name: "London".into(),
                country_code: "GB".into(),
                temperature_c: 15,
                condition_text: "clear sky".into(),
                humidity_percent: 70,
                wind_speed_mps: 3.1,
                icon_code: "01d".into(),
            }
        );
    }

    #[tokio::test]
    async fn city_with_spaces_is_encoded() {
        let server = MockServer::start().await;
        let mut body = london_body();
        body["name"] = json!("New York");
        body["sys"]["country"] = json!("US");
        Mock::given(method("GET"))
            .and(path(PATH))
            .and(query_param("q", "New York"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let result = provider_for(&server).fetch_weather(&query(" New York ")).await.unwrap();
        assert_eq!(result.location_label(), "New York, US");
    }

    #[tokio::test]
    async fn not_found_status_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).fetch_weather(&query("Qwxyzzy")).await.unwrap_err();
        assert!(matches!(err, WeatherError::NotFound { ref city } if city == "Qwxyzzy"));
    }

    #[tokio::test]
    async fn server_error_maps_to_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = provider_for(&server).fetch_weather(&query("London")).await.unwrap_err();
        match err {
            WeatherError::Service { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_is_a_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = provider_for(&server).fetch_weather(&query("London")).await.unwrap_err();
        assert!(matches!(err, WeatherError::Service { .. }));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "London" })))
            .mount(&server)
            .await;

        let err = provider_for(&server).fetch_weather(&query("London")).await.unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[tokio::test]
    async fn empty_condition_list_maps_to_parse_error() {
        let server = MockServer::start().await;
        let mut body = london_body();
        body["weather"] = json!([]);
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let err = provider_for(&server).fetch_weather(&query("London")).await.unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[tokio::test]
    async fn connection_failure_maps_to_transport_error() {
        let provider =
            OpenWeatherProvider::with_base_url("KEY".into(), "http://127.0.0.1:1/weather".into());

        let err = provider.fetch_weather(&query("London")).await.unwrap_err();
        assert!(matches!(err, WeatherError::Transport(_)));
        assert_eq!(err.user_message(), crate::error::SERVICE_MESSAGE);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(150);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
