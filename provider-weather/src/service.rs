//! OpenWeatherMap connector.
//!
//! Fetches current conditions over the shared `HttpClient` transport and
//! flattens the response into [`WeatherReport`]. Single attempt per call;
//! the environmental screen polls, so a failed read simply surfaces.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};

use crate::error::{Result, WeatherError};
use crate::types::{CurrentWeatherResponse, WeatherReport};

/// OpenWeatherMap current-weather API base URL.
pub const OWM_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Icon asset host.
const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Connector configuration.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
    /// Unit system passed through to the API; metric yields °C and m/s.
    pub units: String,
}

impl WeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: OWM_BASE_URL.to_string(),
            api_key: api_key.into(),
            units: "metric".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Current-conditions client for OpenWeatherMap.
pub struct WeatherService {
    http_client: Arc<dyn HttpClient>,
    config: WeatherConfig,
}

impl WeatherService {
    pub fn new(http_client: Arc<dyn HttpClient>, config: WeatherConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Current conditions for a city by name.
    #[instrument(skip(self))]
    pub async fn current_by_city(&self, city: &str) -> Result<WeatherReport> {
        info!(city = city, "Fetching current weather");
        let url = self.weather_url(&[("q", city)])?;
        self.fetch(url).await
    }

    /// Current conditions at coordinates.
    #[instrument(skip(self))]
    pub async fn current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReport> {
        info!("Fetching current weather by coordinates");
        let url = self.weather_url(&[
            ("lat", &latitude.to_string()),
            ("lon", &longitude.to_string()),
        ])?;
        self.fetch(url).await
    }

    fn weather_url(&self, params: &[(&str, &str)]) -> Result<String> {
        let mut url = Url::parse(&format!("{}/weather", self.config.base_url))
            .map_err(|e| WeatherError::Parse(format!("invalid base URL: {}", e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("appid", &self.config.api_key);
            pairs.append_pair("units", &self.config.units);
        }

        Ok(url.into())
    }

    async fn fetch(&self, url: String) -> Result<WeatherReport> {
        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Accept", "application/json")
            .timeout(Duration::from_secs(10));

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| WeatherError::Unreachable(e.to_string()))?;

        match response.status {
            200 => {
                let parsed: CurrentWeatherResponse = response
                    .json()
                    .map_err(|e| WeatherError::Parse(e.to_string()))?;
                debug!(location = %parsed.name, "Weather response received");
                Ok(Self::flatten(parsed))
            }
            404 => Err(WeatherError::LocationNotFound),
            status => Err(WeatherError::RequestFailed {
                status,
                message: response.text().unwrap_or_default(),
            }),
        }
    }

    fn flatten(raw: CurrentWeatherResponse) -> WeatherReport {
        let condition = raw.weather.into_iter().next();
        let (description, icon) = match condition {
            Some(c) => (c.description, c.icon),
            None => (String::new(), String::new()),
        };

        WeatherReport {
            temperature: raw.main.temp,
            feels_like: raw.main.feels_like,
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            wind_speed: raw.wind.speed,
            description,
            icon_url: format!("{}/{}@2x.png", ICON_BASE_URL, icon),
            location: raw.name,
            sunrise: raw.sys.sunrise,
            sunset: raw.sys.sunset,
        }
    }
}
