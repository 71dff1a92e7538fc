use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Location not found. Please check the city name")]
    LocationNotFound,

    #[error("Weather request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Weather service unreachable: {0}")]
    Unreachable(String),

    #[error("Failed to parse weather response: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, WeatherError>;
