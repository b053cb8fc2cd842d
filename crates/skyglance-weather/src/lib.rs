//! Weather data for SkyGlance
//!
//! Device location (behind a permission request), reverse geocoding via
//! Nominatim and current conditions from the Open-Meteo API.

pub mod types;
pub mod geocode;
pub mod location;
pub mod provider;

#[cfg(target_os = "linux")]
pub mod geoclue;

pub use types::*;
pub use geocode::ReverseGeocoder;
pub use location::{locate, FixedLocator, LocationProvider};
pub use provider::WeatherProvider;

#[cfg(target_os = "linux")]
pub use geoclue::GeoClueLocator;
