//! # OpenWeatherMap Provider
//!
//! Current-conditions connector for the environmental screen, built over
//! the shared `bridge_traits::HttpClient` transport.
//!
//! ```ignore
//! use provider_weather::{WeatherConfig, WeatherService};
//!
//! let weather = WeatherService::new(http_client, WeatherConfig::new(api_key));
//! let report = weather.current_by_city("Hanoi").await?;
//! println!("{} °C, {}", report.temperature, report.description);
//! ```

pub mod error;
pub mod service;
pub mod types;

pub use error::{Result, WeatherError};
pub use service::{WeatherConfig, WeatherService, OWM_BASE_URL};
pub use types::WeatherReport;
