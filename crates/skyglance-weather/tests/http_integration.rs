//! Integration tests for the Open-Meteo and Nominatim clients using wiremock.

use std::time::Duration;

use skyglance_weather::{
    Address, Coordinate, ReverseGeocoder, TemperatureUnit, WeatherCategory, WeatherError,
    WeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bucharest() -> Coordinate {
    Coordinate::new(44.43, 26.1)
}

fn current_body(code: i64, temperature: f64) -> serde_json::Value {
    serde_json::json!({
        "latitude": 44.4375,
        "longitude": 26.125,
        "timezone": "Europe/Bucharest",
        "current_units": {
            "weather_code": "wmo code",
            "temperature_2m": "°C",
            "relative_humidity_2m": "%",
            "wind_speed_10m": "km/h"
        },
        "current": {
            "time": "2026-10-19T14:15",
            "interval": 900,
            "weather_code": code,
            "temperature_2m": temperature,
            "relative_humidity_2m": 64,
            "wind_speed_10m": 9.8
        }
    })
}

fn provider(server: &MockServer, unit: TemperatureUnit) -> WeatherProvider {
    WeatherProvider::with_base_url(
        format!("{}/v1/forecast", server.uri()),
        unit,
        Duration::from_secs(5),
    )
    .unwrap()
}

fn geocoder(server: &MockServer) -> ReverseGeocoder {
    ReverseGeocoder::with_base_url(format!("{}/reverse", server.uri()), Duration::from_secs(5))
        .unwrap()
}

#[tokio::test]
async fn test_fetch_current_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "44.43"))
        .and(query_param("longitude", "26.1"))
        .and(query_param(
            "current",
            "weather_code,temperature_2m,relative_humidity_2m,wind_speed_10m",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(65, 11.6)))
        .mount(&mock_server)
        .await;

    let conditions = provider(&mock_server, TemperatureUnit::Auto)
        .fetch_current(&bucharest())
        .await
        .unwrap();

    assert_eq!(conditions.weather_code, 65);
    assert_eq!(conditions.category(), WeatherCategory::Rainy);
    assert_eq!(conditions.temperature_2m, 11.6);
    assert_eq!(conditions.relative_humidity_2m, 64.0);
    assert_eq!(conditions.wind_speed_10m, 9.8);
}

#[tokio::test]
async fn test_fetch_current_fahrenheit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("temperature_unit", "fahrenheit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(0, 52.9)))
        .mount(&mock_server)
        .await;

    let conditions = provider(&mock_server, TemperatureUnit::Fahrenheit)
        .fetch_current(&bucharest())
        .await
        .unwrap();

    assert_eq!(conditions.temperature_2m, 52.9);
}

#[tokio::test]
async fn test_fetch_current_array_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([current_body(3, 8.0), current_body(71, -2.0)])),
        )
        .mount(&mock_server)
        .await;

    let conditions = provider(&mock_server, TemperatureUnit::Auto)
        .fetch_current(&bucharest())
        .await
        .unwrap();

    assert_eq!(conditions.category(), WeatherCategory::PartlyCloudy);
}

#[tokio::test]
async fn test_fetch_current_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Latitude must be in range of -90 to 90°. Given: 120.0."
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server, TemperatureUnit::Auto)
        .fetch_current(&Coordinate::new(120.0, 0.0))
        .await
        .unwrap_err();

    match err {
        WeatherError::Api { status, reason } => {
            assert_eq!(status, 400);
            assert!(reason.contains("Latitude"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_current_server_error_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server, TemperatureUnit::Auto)
        .fetch_current(&bucharest())
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_reverse_geocode_city_and_country() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "44.43"))
        .and(query_param("lon", "26.1"))
        .and(query_param("format", "jsonv2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "place_id": 123,
            "display_name": "Bucharest, Romania",
            "address": {
                "city": "Bucharest",
                "state": "Bucharest",
                "country": "Romania",
                "country_code": "ro"
            }
        })))
        .mount(&mock_server)
        .await;

    let address = geocoder(&mock_server).lookup_address(&bucharest()).await;

    assert_eq!(
        address,
        Some(Address {
            city: "Bucharest".to_string(),
            country: "Romania".to_string(),
        })
    );
}

#[tokio::test]
async fn test_reverse_geocode_no_match_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "Unable to geocode" })),
        )
        .mount(&mock_server)
        .await;

    let geocoder = geocoder(&mock_server);
    let placemarks = geocoder.reverse_geocode(&Coordinate::new(0.0, -30.0)).await.unwrap();

    assert!(placemarks.is_empty());
    assert_eq!(geocoder.lookup_address(&Coordinate::new(0.0, -30.0)).await, None);
}

#[tokio::test]
async fn test_reverse_geocode_missing_country_has_no_address() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": { "town": "Nowhere" }
        })))
        .mount(&mock_server)
        .await;

    assert_eq!(geocoder(&mock_server).lookup_address(&bucharest()).await, None);
}

#[tokio::test]
async fn test_reverse_geocode_server_error_is_absorbed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let geocoder = geocoder(&mock_server);
    assert!(geocoder.reverse_geocode(&bucharest()).await.is_err());
    assert_eq!(geocoder.lookup_address(&bucharest()).await, None);
}
