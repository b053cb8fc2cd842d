//! Open-Meteo current conditions client.

use crate::types::{Coordinate, CurrentConditions, TemperatureUnit, WeatherError};
use chrono::{NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const CURRENT_FIELDS: &str = "weather_code,temperature_2m,relative_humidity_2m,wind_speed_10m";
const OBSERVED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Open-Meteo answers with an array when several locations are queried.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ForecastResponses {
    Many(Vec<ForecastResponse>),
    One(ForecastResponse),
}

impl ForecastResponses {
    fn into_first(self) -> Option<ForecastResponse> {
        match self {
            Self::Many(responses) => responses.into_iter().next(),
            Self::One(response) => Some(response),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: Option<String>,
    weather_code: Option<f64>,
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}

fn require(value: Option<f64>, field: &str) -> Result<f64, WeatherError> {
    value.ok_or_else(|| WeatherError::Parse(format!("missing current.{}", field)))
}

impl CurrentBlock {
    fn into_conditions(self) -> Result<CurrentConditions, WeatherError> {
        let observed_at = self.time.as_deref().and_then(|t| {
            NaiveDateTime::parse_from_str(t, OBSERVED_AT_FORMAT)
                .map_err(|e| tracing::debug!("Unrecognized observation time {:?}: {}", t, e))
                .ok()
        });

        Ok(CurrentConditions {
            weather_code: require(self.weather_code, "weather_code")?.round() as i32,
            temperature_2m: require(self.temperature_2m, "temperature_2m")?,
            relative_humidity_2m: require(self.relative_humidity_2m, "relative_humidity_2m")?,
            wind_speed_10m: require(self.wind_speed_10m, "wind_speed_10m")?,
            observed_at,
            fetched_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    unit: TemperatureUnit,
}

impl WeatherProvider {
    pub fn new(unit: TemperatureUnit) -> Result<Self, WeatherError> {
        Self::with_base_url(OPEN_METEO_URL, unit, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        unit: TemperatureUnit,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into(),
            unit,
        })
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    fn query(&self, coordinate: &Coordinate) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("wind_speed_unit", "kmh".to_string()),
            ("timezone", "auto".to_string()),
        ];
        if let Some(unit) = self.unit.query_value() {
            query.push(("temperature_unit", unit.to_string()));
        }
        query
    }

    /// Fetch the current conditions at a coordinate.
    pub async fn fetch_current(
        &self,
        coordinate: &Coordinate,
    ) -> Result<CurrentConditions, WeatherError> {
        tracing::debug!(
            "Fetching weather for {}, {}",
            coordinate.latitude,
            coordinate.longitude
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query(coordinate))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.reason)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(WeatherError::Api {
                status: status.as_u16(),
                reason,
            });
        }

        parse_current(&body)
    }
}

/// Decode the first response's `current` block.
fn parse_current(body: &str) -> Result<CurrentConditions, WeatherError> {
    let responses: ForecastResponses =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;

    responses
        .into_first()
        .ok_or_else(|| WeatherError::Parse("empty response list".to_string()))?
        .current
        .ok_or_else(|| WeatherError::Parse("missing current block".to_string()))?
        .into_conditions()
}
