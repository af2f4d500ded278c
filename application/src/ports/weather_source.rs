//! Weather source port
//!
//! Where the weather tools get their data from. The infrastructure layer
//! provides an OpenWeatherMap adapter.

use async_trait::async_trait;
use skycast_domain::{CurrentConditions, Forecast, Units};
use thiserror::Error;

/// Errors a weather source can report
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Weather API key not configured (set {0})")]
    MissingApiKey(String),

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Weather API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid weather data: {0}")]
    InvalidResponse(String),

    #[error("Weather request timed out")]
    Timeout,
}

/// Source of current conditions and forecasts
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions for `city`.
    async fn current(&self, city: &str, units: Units) -> Result<CurrentConditions, WeatherError>;

    /// Up to `samples` 3-hourly forecast points for `city`, oldest first.
    async fn forecast(
        &self,
        city: &str,
        units: Units,
        samples: u32,
    ) -> Result<Forecast, WeatherError>;
}
