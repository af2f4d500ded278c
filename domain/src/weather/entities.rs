//! Weather records as the tools see them, independent of any upstream API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Measurement system requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Celsius, meters per second
    #[default]
    Metric,
    /// Fahrenheit, miles per hour
    Imperial,
    /// Kelvin, meters per second
    Standard,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown units '{0}', expected one of: metric, imperial, standard")]
pub struct UnknownUnits(pub String);

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl FromStr for Units {
    type Err = UnknownUnits;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(UnknownUnits(s.to_string())),
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current observation for one place.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub city: String,
    pub country: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
    pub humidity: f64,
    /// hPa
    pub pressure: f64,
    pub wind_speed: f64,
    /// Meteorological degrees, absent when calm or unreported.
    pub wind_deg: Option<f64>,
}

/// One point of a multi-day forecast (upstream reports every 3 hours).
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub date: NaiveDate,
    pub temperature: f64,
    pub description: String,
    pub humidity: f64,
    pub wind_speed: f64,
}

/// Forecast samples for one place, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub city: String,
    pub country: Option<String>,
    pub samples: Vec<ForecastSample>,
}

/// Aggregate of the samples that fall on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub condition: String,
    pub avg_humidity: f64,
    pub avg_wind: f64,
    pub samples: usize,
}
