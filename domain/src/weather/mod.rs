//! Weather domain: records returned by a weather source, day grouping of
//! forecasts, and the text the weather tools hand back to the model.

pub mod entities;
pub mod forecast;
pub mod format;

pub use entities::{CurrentConditions, DaySummary, Forecast, ForecastSample, Units, UnknownUnits};
pub use forecast::{MAX_FORECAST_DAYS, SAMPLES_PER_DAY, clamp_days, group_by_day, summarize_day};
pub use format::{format_current, format_day, format_forecast};
