//! Text rendering of weather records, as returned to the model by the tools

use super::entities::{CurrentConditions, DaySummary, Units};

fn place(city: &str, country: Option<&str>) -> String {
    match country {
        Some(country) if !country.is_empty() => format!("{}, {}", city, country),
        _ => city.to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a current observation.
pub fn format_current(current: &CurrentConditions, units: Units) -> String {
    let t = units.temperature_symbol();
    let wind_direction = current
        .wind_deg
        .map(|deg| format!("{:.0}°", deg))
        .unwrap_or_else(|| "n/a".to_string());

    let mut out = format!(
        "🌍 Weather in {}\n\n",
        place(&current.city, current.country.as_deref())
    );
    out.push_str(&format!("🌡️ Temperature: {:.1}{}\n", current.temperature, t));
    out.push_str(&format!("🤔 Feels like: {:.1}{}\n", current.feels_like, t));
    out.push_str(&format!(
        "📊 Min/Max: {:.1}{} / {:.1}{}\n\n",
        current.temp_min, t, current.temp_max, t
    ));
    out.push_str(&format!("☁️ Conditions: {}\n", capitalize(&current.description)));
    out.push_str(&format!("💧 Humidity: {:.0}%\n", current.humidity));
    out.push_str(&format!("🎚️ Pressure: {:.0} hPa\n", current.pressure));
    out.push_str(&format!(
        "💨 Wind: {} {}, direction {}",
        current.wind_speed,
        units.speed_symbol(),
        wind_direction
    ));
    out
}

/// Render one day of a forecast.
pub fn format_day(day: &DaySummary, units: Units) -> String {
    let t = units.temperature_symbol();
    [
        format!("📆 {}", day.date.format("%Y-%m-%d")),
        format!("🌡️ Average temperature: {:.1}{}", day.avg_temp, t),
        format!("📊 Min/Max: {:.1}{} / {:.1}{}", day.min_temp, t, day.max_temp, t),
        format!("☁️ Conditions: {}", capitalize(&day.condition)),
        format!("💧 Humidity: {:.0}%", day.avg_humidity),
        format!("💨 Wind: {:.1} {}", day.avg_wind, units.speed_symbol()),
    ]
    .join("\n")
}

/// Render a multi-day forecast headed by its location.
pub fn format_forecast(
    city: &str,
    country: Option<&str>,
    days: &[DaySummary],
    units: Units,
) -> String {
    let header = format!("📅 Forecast for {}", place(city, country));
    if days.is_empty() {
        return format!("{}\n\nNo forecast data available.", header);
    }
    let body: Vec<String> = days.iter().map(|d| format_day(d, units)).collect();
    format!("{}\n\n{}", header, body.join("\n\n"))
}
