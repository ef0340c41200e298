//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather lookup against OpenWeather (current + 5-day forecast)
//! - Shared domain models and the lookup error taxonomy
//!
//! It is used by `cityweather-cli`, but can also be reused by a web front end.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{Config, ProviderConfig};
pub use error::LookupError;
pub use model::{CurrentWeather, ForecastEntry, WeatherReport};
pub use provider::{
    WeatherProvider,
    openweather::{OpenWeatherProvider, ProviderReply, build_report},
    provider_from_config,
};
