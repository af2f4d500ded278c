//! Grouping of 3-hourly forecast samples into calendar days

use super::entities::{DaySummary, ForecastSample};

/// Forecast horizon the upstream API supports, in days.
pub const MAX_FORECAST_DAYS: u32 = 5;

/// Samples per day at a 3-hour resolution.
pub const SAMPLES_PER_DAY: u32 = 8;

/// Clamp a requested horizon to `1..=MAX_FORECAST_DAYS`.
pub fn clamp_days(days: i64) -> u32 {
    days.clamp(1, MAX_FORECAST_DAYS as i64) as u32
}

/// Summarize the first `days` calendar days found in `samples`.
///
/// Samples are grouped by date in arrival order; a new group starts whenever
/// the date changes. A trailing partial day is summarized from the samples it
/// has.
pub fn group_by_day(samples: &[ForecastSample], days: usize) -> Vec<DaySummary> {
    samples
        .chunk_by(|a, b| a.date == b.date)
        .take(days)
        .filter_map(summarize_day)
        .collect()
}

/// Aggregate one day's samples. `None` for an empty slice.
pub fn summarize_day(samples: &[ForecastSample]) -> Option<DaySummary> {
    let first = samples.first()?;
    let count = samples.len() as f64;

    let mut min_temp = f64::INFINITY;
    let mut max_temp = f64::NEG_INFINITY;
    let mut temp_sum = 0.0;
    for sample in samples {
        min_temp = min_temp.min(sample.temperature);
        max_temp = max_temp.max(sample.temperature);
        temp_sum += sample.temperature;
    }

    Some(DaySummary {
        date: first.date,
        avg_temp: temp_sum / count,
        min_temp,
        max_temp,
        condition: most_common_condition(samples),
        avg_humidity: samples.iter().map(|s| s.humidity).sum::<f64>() / count,
        avg_wind: samples.iter().map(|s| s.wind_speed).sum::<f64>() / count,
        samples: samples.len(),
    })
}

// Ties go to the condition seen first.
fn most_common_condition(samples: &[ForecastSample]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for sample in samples {
        match counts.iter_mut().find(|(d, _)| *d == sample.description) {
            Some((_, n)) => *n += 1,
            None => counts.push((&sample.description, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (description, n) in counts {
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((description, n));
        }
    }
    best.map(|(d, _)| d.to_string()).unwrap_or_default()
}
