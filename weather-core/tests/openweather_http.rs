//! HTTP-level tests for `OpenWeatherProvider` against a wiremock server.

use cityweather_core::{LookupError, OpenWeatherProvider, WeatherProvider};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn london_current() -> serde_json::Value {
    json!({
        "name": "London",
        "main": {"temp": 15.2, "feels_like": 14.1, "humidity": 80},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}]
    })
}

fn london_forecast() -> serde_json::Value {
    json!({
        "cod": "200",
        "cnt": 2,
        "list": [
            {
                "dt": 1714564800,
                "dt_txt": "2024-05-01 12:00:00",
                "main": {"temp": 14.0},
                "weather": [{"description": "clear sky", "icon": "01d"}]
            },
            {
                "dt": 1714575600,
                "dt_txt": "2024-05-01 15:00:00",
                "main": {"temp": 16.5},
                "weather": [{"description": "few clouds", "icon": "02d"}]
            }
        ],
        "city": {"name": "London", "country": "GB"}
    })
}

async fn mount(server: &MockServer, endpoint: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn lookup_returns_current_and_forecast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "london"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_current()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "london"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_forecast()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::with_base_url("TEST_KEY".into(), server.uri());
    let report = provider.lookup("london").await.unwrap();

    // Canonical provider name, not the caller's spelling.
    assert_eq!(report.current.city, "London");
    assert_eq!(report.current.temperature, 15.2);
    assert_eq!(report.current.description, "light rain");
    assert_eq!(report.current.icon, "10d");

    assert_eq!(report.forecast.len(), 2);
    assert_eq!(report.forecast[0].datetime, "2024-05-01 12:00:00");
    assert_eq!(report.forecast[1].datetime, "2024-05-01 15:00:00");
    assert_eq!(report.forecast[1].icon, "02d");
}

#[tokio::test]
async fn unknown_city_returns_provider_error() {
    let server = MockServer::start().await;
    let not_found = json!({"cod": "404", "message": "city not found"});

    mount(&server, "/weather", 404, not_found.clone()).await;
    mount(&server, "/forecast", 404, not_found).await;

    let provider = OpenWeatherProvider::with_base_url("TEST_KEY".into(), server.uri());
    let err = provider.lookup("Nowhereville").await.unwrap_err();

    assert!(err.is_provider());
    assert_eq!(err.user_message(), "Error: 404 - city not found");
}

#[tokio::test]
async fn forecast_failure_is_not_masked_by_current_success() {
    let server = MockServer::start().await;

    mount(&server, "/weather", 200, london_current()).await;
    mount(&server, "/forecast", 503, json!({"message": "service busy"})).await;

    let provider = OpenWeatherProvider::with_base_url("TEST_KEY".into(), server.uri());
    let err = provider.lookup("London").await.unwrap_err();

    assert!(matches!(err, LookupError::Provider { status: 503, .. }));
    assert_eq!(err.user_message(), "Error: 503 - service busy");
}

#[tokio::test]
async fn both_calls_are_issued_even_when_current_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"cod": 401, "message": "Invalid API key"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"cod": 401, "message": "Invalid API key"})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::with_base_url("WRONG".into(), server.uri());
    let err = provider.lookup("London").await.unwrap_err();

    assert_eq!(err.to_string(), "Error: 401 - Invalid API key");
}

#[tokio::test]
async fn repeated_lookups_are_independent_and_identical() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_current()))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_forecast()))
        .expect(2)
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::with_base_url("TEST_KEY".into(), server.uri());
    let first = provider.lookup("London").await.unwrap();
    let second = provider.lookup("London").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    mount(&server, "/forecast", 200, london_forecast()).await;

    let provider = OpenWeatherProvider::with_base_url("TEST_KEY".into(), server.uri());
    let err = provider.lookup("London").await.unwrap_err();

    assert!(matches!(err, LookupError::Decode { what: "current", .. }));
    assert_eq!(err.user_message(), "Error: weather service unavailable");
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let provider = OpenWeatherProvider::with_base_url("TEST_KEY".into(), uri);
    let err = provider.lookup("London").await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.user_message(), "Error: weather service unavailable");
}
