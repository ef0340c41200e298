use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    error::LookupError,
    model::{CurrentWeather, ForecastEntry, WeatherReport},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const UNKNOWN_ERROR: &str = "Unknown error";
const UNKNOWN_CONDITION: &str = "Unknown";

/// Status and raw body of one provider call, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub status: u16,
    pub body: String,
}

impl ProviderReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http: Client::new() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current conditions and the forecast for `city` and reshape them.
    ///
    /// Both calls are always issued, concurrently, and the report is only
    /// built once both have answered.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_report(&self, city: &str) -> Result<WeatherReport, LookupError> {
        let (current, forecast) =
            tokio::join!(self.fetch("weather", city), self.fetch("forecast", city));

        let result = settle(current, forecast);
        if let Err(err) = &result {
            warn!(kind = err.kind(), error = %err, "weather lookup failed");
        }
        result
    }

    async fn fetch(&self, endpoint: &'static str, city: &str) -> Result<ProviderReply, LookupError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;
        debug!(endpoint, status, bytes = body.len(), "OpenWeather replied");

        Ok(ProviderReply { status, body })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn lookup(&self, city: &str) -> Result<WeatherReport, LookupError> {
        self.fetch_report(city).await
    }
}

/// A non-success current reply decides the outcome even when the forecast
/// call never completed.
fn settle(
    current: Result<ProviderReply, LookupError>,
    forecast: Result<ProviderReply, LookupError>,
) -> Result<WeatherReport, LookupError> {
    let current = current?;
    if !current.is_success() {
        return Err(provider_error(&current));
    }
    build_report(current, forecast?)
}

/// Turn the two raw replies into a report.
///
/// A failed current call is reported with its own status and message. If
/// only the forecast failed, the forecast's status and message are reported.
/// Either way nothing partial is returned.
pub fn build_report(
    current: ProviderReply,
    forecast: ProviderReply,
) -> Result<WeatherReport, LookupError> {
    if !current.is_success() {
        return Err(provider_error(&current));
    }
    if !forecast.is_success() {
        return Err(provider_error(&forecast));
    }

    let current: OwCurrentResponse = serde_json::from_str(&current.body)
        .map_err(|source| LookupError::Decode { what: "current", source })?;
    let forecast: OwForecastResponse = serde_json::from_str(&forecast.body)
        .map_err(|source| LookupError::Decode { what: "forecast", source })?;

    let (description, icon) = condition(current.weather);
    let current = CurrentWeather {
        city: current.name,
        temperature: current.main.temp,
        description,
        icon,
    };

    let forecast = forecast
        .list
        .into_iter()
        .map(|item| {
            let (description, icon) = condition(item.weather);
            ForecastEntry {
                datetime: item.dt_txt,
                temperature: item.main.temp,
                description,
                icon,
            }
        })
        .collect();

    Ok(WeatherReport { current, forecast })
}

fn provider_error(reply: &ProviderReply) -> LookupError {
    let message = serde_json::from_str::<OwErrorBody>(&reply.body).ok().and_then(|b| b.message);
    let message = match message {
        Some(Value::String(text)) => text,
        Some(Value::Null) | None => UNKNOWN_ERROR.to_string(),
        Some(other) => other.to_string(),
    };

    LookupError::Provider { status: reply.status, message }
}

fn condition(weather: Vec<OwWeather>) -> (String, String) {
    weather
        .into_iter()
        .next()
        .map(|w| (w.description, w.icon))
        .unwrap_or_else(|| (UNKNOWN_CONDITION.to_string(), String::new()))
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt_txt: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastItem>,
}

/// OpenWeather error bodies look like `{"cod":"404","message":"city not found"}`.
#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<Value>,
}
