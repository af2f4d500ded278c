//! Weather data adapters.

pub mod openweather;

pub use openweather::{OpenWeatherClient, OpenWeatherSettings};
