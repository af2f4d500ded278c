//! OpenWeatherMap adapter for the [`WeatherSource`] port.
//!
//! Uses the free 2.5 API: `/weather` for current conditions and `/forecast`
//! for 3-hourly forecast samples.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use skycast_application::{WeatherError, WeatherSource};
use skycast_domain::{CurrentConditions, Forecast, ForecastSample, Units};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Format of `dt_txt` in forecast samples.
const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct OpenWeatherSettings {
    pub base_url: String,
    /// `None` when the key is not configured; requests then fail with
    /// [`WeatherError::MissingApiKey`].
    pub api_key: Option<String>,
    /// Name of the variable the key is expected in, for error messages.
    pub api_key_env: String,
    /// Language of condition descriptions (`lang` query parameter).
    pub lang: Option<String>,
    pub timeout: Duration,
}

impl Default for OpenWeatherSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            lang: None,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    settings: OpenWeatherSettings,
}

impl OpenWeatherClient {
    pub fn new(settings: OpenWeatherSettings) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| WeatherError::Connection(e.to_string()))?;
        if settings.api_key.is_none() {
            warn!(
                "No OpenWeatherMap API key configured; weather tools will report an error (set {})",
                settings.api_key_env
            );
        }
        Ok(Self { client, settings })
    }

    async fn get(&self, endpoint: &str, city: &str, units: Units, extra: &[(&str, String)]) -> Result<String, WeatherError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| WeatherError::MissingApiKey(self.settings.api_key_env.clone()))?;

        let url = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), endpoint);
        let mut query: Vec<(&str, String)> = vec![
            ("q", city.to_string()),
            ("units", units.as_str().to_string()),
            ("appid", api_key.to_string()),
        ];
        if let Some(lang) = &self.settings.lang {
            query.push(("lang", lang.clone()));
        }
        query.extend(extra.iter().cloned());

        info!("Weather request: /{} for '{}'", endpoint, city);
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_send_error)?;
        debug!("Weather response {} ({} bytes)", status, body.len());

        if status.as_u16() == 404 {
            return Err(WeatherError::CityNotFound(city.to_string()));
        }
        if !status.is_success() {
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }
        Ok(body)
    }
}

fn map_send_error(error: reqwest::Error) -> WeatherError {
    if error.is_timeout() {
        WeatherError::Timeout
    } else {
        WeatherError::Connection(error.to_string())
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, city: &str, units: Units) -> Result<CurrentConditions, WeatherError> {
        let body = self.get("weather", city, units, &[]).await?;
        parse_current(&body)
    }

    async fn forecast(&self, city: &str, units: Units, samples: u32) -> Result<Forecast, WeatherError> {
        let body = self
            .get("forecast", city, units, &[("cnt", samples.to_string())])
            .await?;
        parse_forecast(&body)
    }
}

// ==================== Wire types ====================

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    name: String,
    #[serde(default)]
    sys: Option<Sys>,
    main: Main,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct Sys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Main {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastItem>,
    city: City,
}

#[derive(Debug, Deserialize)]
struct City {
    name: String,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt_txt: String,
    main: Main,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    wind: Wind,
}

fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn first_description(conditions: &[Condition]) -> String {
    conditions
        .first()
        .map(|c| c.description.clone())
        .unwrap_or_default()
}

/// Decode a `/weather` response body.
pub fn parse_current(body: &str) -> Result<CurrentConditions, WeatherError> {
    let data: CurrentResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;

    Ok(CurrentConditions {
        city: data.name,
        country: data.sys.and_then(|s| s.country),
        temperature: data.main.temp,
        feels_like: data.main.feels_like.unwrap_or(data.main.temp),
        temp_min: data.main.temp_min.unwrap_or(data.main.temp),
        temp_max: data.main.temp_max.unwrap_or(data.main.temp),
        description: first_description(&data.weather),
        humidity: data.main.humidity,
        pressure: data.main.pressure,
        wind_speed: data.wind.speed,
        wind_deg: data.wind.deg,
    })
}

/// Decode a `/forecast` response body. Samples keep their arrival order.
pub fn parse_forecast(body: &str) -> Result<Forecast, WeatherError> {
    let data: ForecastResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;

    let samples = data
        .list
        .into_iter()
        .map(|item| {
            let timestamp = NaiveDateTime::parse_from_str(&item.dt_txt, DT_TXT_FORMAT).map_err(|e| {
                WeatherError::InvalidResponse(format!("bad dt_txt '{}': {}", item.dt_txt, e))
            })?;
            Ok(ForecastSample {
                date: timestamp.date(),
                temperature: item.main.temp,
                description: first_description(&item.weather),
                humidity: item.main.humidity,
                wind_speed: item.wind.speed,
            })
        })
        .collect::<Result<Vec<_>, WeatherError>>()?;

    Ok(Forecast {
        city: data.city.name,
        country: data.city.country,
        samples,
    })
}
