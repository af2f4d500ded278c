//! Weather toolset.
//!
//! The tools the weather server exposes, implemented as a [`ToolProvider`]
//! over any [`WeatherSource`]:
//!
//! | Tool | Arguments |
//! |------|-----------|
//! | `get_current_weather` | `city`, `units` = `"metric"` |
//! | `get_forecast` | `city`, `days` = 3 (clamped to 1..=5), `units` = `"metric"` |
//!
//! Bad arguments and upstream failures come back as error results with a
//! readable message, never as [`ProviderError`]s.

use crate::ports::weather_source::WeatherSource;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use skycast_domain::weather::{
    SAMPLES_PER_DAY, clamp_days, format_current, format_forecast, group_by_day,
};
use skycast_domain::{ProviderError, ToolCallResult, ToolDescriptor, ToolProvider, Units};
use std::sync::Arc;
use tracing::{info, warn};

pub const CURRENT_WEATHER_TOOL: &str = "get_current_weather";
pub const FORECAST_TOOL: &str = "get_forecast";

const DEFAULT_FORECAST_DAYS: i64 = 3;

/// In-process provider of the weather tools
pub struct WeatherToolset {
    source: Arc<dyn WeatherSource>,
}

impl WeatherToolset {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    /// Descriptors of the tools, in a stable order.
    pub fn descriptors() -> Vec<ToolDescriptor> {
        let units = json!({
            "type": "string",
            "enum": ["metric", "imperial", "standard"],
            "default": "metric",
            "description": "Measurement system: metric (°C, m/s), imperial (°F, mph) or standard (K, m/s)"
        });
        let city = json!({
            "type": "string",
            "description": "City name in any language, e.g. \"London\" or \"Москва\". May include a country code: \"Paris,FR\""
        });

        vec![
            ToolDescriptor::new(
                CURRENT_WEATHER_TOOL,
                json!({
                    "type": "object",
                    "properties": { "city": city.clone(), "units": units.clone() },
                    "required": ["city"]
                }),
            )
            .with_description(
                "Get the current weather for a city: temperature, feels-like, \
                 conditions, humidity, pressure and wind.",
            ),
            ToolDescriptor::new(
                FORECAST_TOOL,
                json!({
                    "type": "object",
                    "properties": {
                        "city": city,
                        "days": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": 5,
                            "default": DEFAULT_FORECAST_DAYS,
                            "description": "Number of days to forecast (1-5)"
                        },
                        "units": units
                    },
                    "required": ["city"]
                }),
            )
            .with_description(
                "Get a multi-day weather forecast for a city with daily average, \
                 minimum and maximum temperature, conditions, humidity and wind.",
            ),
        ]
    }

    async fn current_weather(&self, args: &Map<String, Value>) -> ToolCallResult {
        let (city, units) = match (city_arg(args), units_arg(args)) {
            (Ok(city), Ok(units)) => (city, units),
            (Err(message), _) | (_, Err(message)) => return ToolCallResult::error(message),
        };
        info!("Current weather requested for '{}' ({})", city, units);

        match self.source.current(city, units).await {
            Ok(current) => ToolCallResult::text(format_current(&current, units)),
            Err(e) => {
                warn!("Current weather for '{}' failed: {}", city, e);
                ToolCallResult::error(format!("Could not get the weather for '{}': {}", city, e))
            }
        }
    }

    async fn forecast(&self, args: &Map<String, Value>) -> ToolCallResult {
        let (city, units, days) = match (city_arg(args), units_arg(args), days_arg(args)) {
            (Ok(city), Ok(units), Ok(days)) => (city, units, days),
            (Err(message), _, _) | (_, Err(message), _) | (_, _, Err(message)) => {
                return ToolCallResult::error(message);
            }
        };
        info!("Forecast requested for '{}', {} days ({})", city, days, units);

        match self.source.forecast(city, units, days * SAMPLES_PER_DAY).await {
            Ok(forecast) => {
                let summaries = group_by_day(&forecast.samples, days as usize);
                ToolCallResult::text(format_forecast(
                    &forecast.city,
                    forecast.country.as_deref(),
                    &summaries,
                    units,
                ))
            }
            Err(e) => {
                warn!("Forecast for '{}' failed: {}", city, e);
                ToolCallResult::error(format!("Could not get the forecast for '{}': {}", city, e))
            }
        }
    }
}

fn city_arg(args: &Map<String, Value>) -> Result<&str, String> {
    match args.get("city") {
        Some(Value::String(city)) if !city.trim().is_empty() => Ok(city.trim()),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            Err("Missing required argument 'city'".to_string())
        }
        Some(other) => Err(format!("Argument 'city' must be a string, got {}", other)),
    }
}

fn units_arg(args: &Map<String, Value>) -> Result<Units, String> {
    match args.get("units") {
        None | Some(Value::Null) => Ok(Units::default()),
        Some(Value::String(units)) => units.parse().map_err(|e| format!("{}", e)),
        Some(other) => Err(format!("Argument 'units' must be a string, got {}", other)),
    }
}

fn days_arg(args: &Map<String, Value>) -> Result<u32, String> {
    let requested = match args.get("days") {
        None | Some(Value::Null) => DEFAULT_FORECAST_DAYS,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(days) => days,
            None => n.as_f64().map(|f| f as i64).unwrap_or(DEFAULT_FORECAST_DAYS),
        },
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| format!("Argument 'days' must be an integer, got \"{}\"", s))?,
        Some(other) => return Err(format!("Argument 'days' must be an integer, got {}", other)),
    };
    Ok(clamp_days(requested))
}

#[async_trait]
impl ToolProvider for WeatherToolset {
    fn id(&self) -> &str {
        "weather"
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
        Ok(Self::descriptors())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, ProviderError> {
        let result = match name {
            CURRENT_WEATHER_TOOL => self.current_weather(&arguments).await,
            FORECAST_TOOL => self.forecast(&arguments).await,
            other => ToolCallResult::error(format!("Unknown tool: {}", other)),
        };
        Ok(result)
    }
}
