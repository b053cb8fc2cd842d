use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Auto,
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Value for Open-Meteo's `temperature_unit` parameter. `None` keeps the API default (°C).
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Self::Fahrenheit => Some("fahrenheit"),
            Self::Auto | Self::Celsius => None,
        }
    }
}

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherCategory {
    Clear,
    PartlyCloudy,
    Foggy,
    Rainy,
    Snowy,
    #[default]
    Unknown,
}

impl WeatherCategory {
    /// Convert a WMO weather code to a category.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            45 | 48 => Self::Foggy,
            61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => Self::Rainy,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snowy,
            _ => Self::Unknown,
        }
    }

    /// Human-readable label shown under the temperature
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Foggy => "Foggy",
            Self::Rainy => "Rainy",
            Self::Snowy => "Snowy",
            Self::Unknown => "Unknown",
        }
    }

    /// Icon asset name. Foggy and unknown conditions have no icon.
    pub fn icon_name(&self) -> Option<&'static str> {
        match self {
            Self::Clear => Some("sunny"),
            Self::PartlyCloudy => Some("partly-cloudy"),
            Self::Rainy => Some("rainy"),
            Self::Snowy => Some("cloudy"),
            Self::Foggy | Self::Unknown => None,
        }
    }
}

/// Classify an optional WMO code. Absent data is `Unknown`.
pub fn classify(code: Option<i32>) -> WeatherCategory {
    code.map_or(WeatherCategory::Unknown, WeatherCategory::from_wmo_code)
}

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
        }
    }
}

/// One reverse-geocoding candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placemark {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

/// City and country label for a coordinate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub country: String,
}

impl Address {
    /// Build an address from the first candidate only.
    ///
    /// Returns `None` unless that candidate has both a city and a country.
    pub fn from_placemarks(placemarks: &[Placemark]) -> Option<Self> {
        let first = placemarks.first()?;
        let city = first.city.as_deref().map(str::trim).filter(|c| !c.is_empty())?;
        let country = first
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())?;

        Some(Self {
            city: city.to_string(),
            country: country.to_string(),
        })
    }
}

/// Current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub weather_code: i32,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub wind_speed_10m: f64,
    /// Observation time in the location's local time, as reported by the API
    pub observed_at: Option<NaiveDateTime>,
    pub fetched_at: DateTime<Utc>,
}

impl CurrentConditions {
    pub fn category(&self) -> WeatherCategory {
        WeatherCategory::from_wmo_code(self.weather_code)
    }
}

/// Outcome of asking the platform for location access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Reverse geocoding errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Geocoder returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API returned {status}: {reason}")]
    Api { status: u16, reason: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENTED: [(i32, WeatherCategory); 20] = [
        (0, WeatherCategory::Clear),
        (1, WeatherCategory::PartlyCloudy),
        (2, WeatherCategory::PartlyCloudy),
        (3, WeatherCategory::PartlyCloudy),
        (45, WeatherCategory::Foggy),
        (48, WeatherCategory::Foggy),
        (61, WeatherCategory::Rainy),
        (63, WeatherCategory::Rainy),
        (65, WeatherCategory::Rainy),
        (66, WeatherCategory::Rainy),
        (67, WeatherCategory::Rainy),
        (80, WeatherCategory::Rainy),
        (81, WeatherCategory::Rainy),
        (82, WeatherCategory::Rainy),
        (71, WeatherCategory::Snowy),
        (73, WeatherCategory::Snowy),
        (75, WeatherCategory::Snowy),
        (77, WeatherCategory::Snowy),
        (85, WeatherCategory::Snowy),
        (86, WeatherCategory::Snowy),
    ];

    #[test]
    fn test_documented_codes() {
        for (code, expected) in DOCUMENTED {
            assert_eq!(classify(Some(code)), expected, "code {}", code);
        }
    }

    #[test]
    fn test_every_other_code_is_unknown() {
        for code in -5..=120 {
            if DOCUMENTED.iter().any(|(c, _)| *c == code) {
                continue;
            }
            assert_eq!(classify(Some(code)), WeatherCategory::Unknown, "code {}", code);
        }
        assert_eq!(classify(Some(i32::MAX)), WeatherCategory::Unknown);
        assert_eq!(classify(Some(i32::MIN)), WeatherCategory::Unknown);
    }

    #[test]
    fn test_absent_code_is_unknown() {
        assert_eq!(classify(None), WeatherCategory::Unknown);
    }

    #[test]
    fn test_labels() {
        assert_eq!(classify(Some(0)).label(), "Clear");
        assert_eq!(classify(Some(65)).label(), "Rainy");
        assert_eq!(classify(Some(95)).label(), "Unknown");
        assert_eq!(WeatherCategory::PartlyCloudy.label(), "Partly Cloudy");
    }

    #[test]
    fn test_icon_names() {
        assert_eq!(WeatherCategory::Clear.icon_name(), Some("sunny"));
        assert_eq!(WeatherCategory::Snowy.icon_name(), Some("cloudy"));
        assert_eq!(WeatherCategory::Foggy.icon_name(), None);
        assert_eq!(WeatherCategory::Unknown.icon_name(), None);
    }

    #[test]
    fn test_address_from_first_placemark_only() {
        let placemarks = vec![
            Placemark {
                city: None,
                region: Some("Ilfov".into()),
                country: Some("Romania".into()),
            },
            Placemark {
                city: Some("Bucharest".into()),
                region: None,
                country: Some("Romania".into()),
            },
        ];
        assert_eq!(Address::from_placemarks(&placemarks), None);
        assert_eq!(Address::from_placemarks(&placemarks[1..]).map(|a| a.city), Some("Bucharest".to_string()));
    }

    #[test]
    fn test_address_requires_city_and_country() {
        assert_eq!(Address::from_placemarks(&[]), None);
        let blank_country = Placemark {
            city: Some("Oslo".into()),
            region: None,
            country: Some("  ".into()),
        };
        assert_eq!(Address::from_placemarks(&[blank_country]), None);
    }

    #[test]
    fn test_temperature_unit_query_value() {
        assert_eq!(TemperatureUnit::Auto.query_value(), None);
        assert_eq!(TemperatureUnit::Celsius.query_value(), None);
        assert_eq!(TemperatureUnit::Fahrenheit.query_value(), Some("fahrenheit"));
    }
}
