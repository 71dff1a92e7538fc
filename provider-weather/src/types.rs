//! OpenWeatherMap wire types and the flattened report handed to callers.

use serde::Deserialize;

/// Flattened current-conditions report.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Temperature in °C.
    pub temperature: f64,
    /// Perceived temperature in °C.
    pub feels_like: f64,
    /// Relative humidity in percent.
    pub humidity: u8,
    /// Atmospheric pressure in hPa.
    pub pressure: u32,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    /// Short textual description ("clear sky").
    pub description: String,
    /// Full URL of the condition icon.
    pub icon_url: String,
    /// Resolved location name.
    pub location: String,
    /// Sunrise, Unix seconds UTC.
    pub sunrise: i64,
    /// Sunset, Unix seconds UTC.
    pub sunset: i64,
}

/// Raw `/weather` response; only the fields the report needs.
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentWeatherResponse {
    pub main: MainSection,
    pub wind: WindSection,
    pub weather: Vec<ConditionSection>,
    pub name: String,
    pub sys: SysSection,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MainSection {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WindSection {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionSection {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SysSection {
    pub sunrise: i64,
    pub sunset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_weather_deserializes_nominal_payload() {
        let json = r#"{
            "main": {"temp": 28.4, "feels_like": 31.2, "humidity": 74, "pressure": 1008},
            "wind": {"speed": 3.6},
            "weather": [{"description": "scattered clouds", "icon": "03d"}],
            "name": "Hanoi",
            "sys": {"sunrise": 1714518000, "sunset": 1714564800},
            "cod": 200
        }"#;

        let parsed: CurrentWeatherResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.name, "Hanoi");
        assert_eq!(parsed.main.humidity, 74);
        assert_eq!(parsed.weather[0].icon, "03d");
    }
}
