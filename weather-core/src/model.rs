use serde::{Deserialize, Serialize};

/// Conditions right now, as reported by the provider's current-weather endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Provider's canonical city name; may differ from what the caller typed.
    pub city: String,
    pub temperature: f64,
    pub description: String,
    /// Provider icon code, e.g. "10d".
    pub icon: String,
}

/// One 3-hour slot of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Timestamp exactly as the provider formats it ("2024-05-01 12:00:00").
    pub datetime: String,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
}

/// Result of a successful lookup. Built per request and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    /// In provider order, which is chronological.
    pub forecast: Vec<ForecastEntry>,
}
