//! Shared backends used by the weather screen.
//!
//! `AppServices` bundles the location provider, reverse geocoder and weather
//! provider behind `Arc`s so spawned requests can hold them independently of
//! the screen.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use skyglance_core::{Config, LocationConfig, LocationSource};
use skyglance_weather::{
    Coordinate, FixedLocator, LocationProvider, ReverseGeocoder, TemperatureUnit, WeatherProvider,
};

#[derive(Clone)]
pub struct AppServices {
    locator: Arc<dyn LocationProvider>,
    geocoder: Arc<ReverseGeocoder>,
    weather_provider: Arc<WeatherProvider>,
}

impl AppServices {
    pub fn new(
        locator: Arc<dyn LocationProvider>,
        geocoder: Arc<ReverseGeocoder>,
        weather_provider: Arc<WeatherProvider>,
    ) -> Self {
        Self {
            locator,
            geocoder,
            weather_provider,
        }
    }

    /// Build every backend from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.weather.request_timeout_secs);

        let weather_provider = WeatherProvider::with_base_url(
            config.weather.api_url.clone(),
            weather_unit(config.weather.temperature_unit),
            timeout,
        )
        .context("Failed to create weather provider")?;

        let geocoder = ReverseGeocoder::with_base_url(config.weather.geocoder_url.clone(), timeout)
            .context("Failed to create reverse geocoder")?;

        let locator = build_locator(&config.location);
        tracing::info!("Weather services initialized (location: {})", locator.name());

        Ok(Self::new(
            locator,
            Arc::new(geocoder),
            Arc::new(weather_provider),
        ))
    }

    pub fn locator(&self) -> Arc<dyn LocationProvider> {
        self.locator.clone()
    }

    pub fn geocoder(&self) -> Arc<ReverseGeocoder> {
        self.geocoder.clone()
    }

    pub fn weather_provider(&self) -> Arc<WeatherProvider> {
        self.weather_provider.clone()
    }
}

fn weather_unit(unit: skyglance_core::TemperatureUnit) -> TemperatureUnit {
    match unit {
        skyglance_core::TemperatureUnit::Celsius => TemperatureUnit::Celsius,
        skyglance_core::TemperatureUnit::Fahrenheit => TemperatureUnit::Fahrenheit,
        skyglance_core::TemperatureUnit::Auto => TemperatureUnit::Auto,
    }
}

fn fixed_locator(config: &LocationConfig) -> Arc<dyn LocationProvider> {
    let coordinate = config
        .fixed_coordinates()
        .map(|(latitude, longitude)| Coordinate::new(latitude, longitude));
    Arc::new(FixedLocator::new(coordinate))
}

fn build_locator(config: &LocationConfig) -> Arc<dyn LocationProvider> {
    match config.source {
        LocationSource::Fixed => fixed_locator(config),
        #[cfg(target_os = "linux")]
        LocationSource::Geoclue => Arc::new(skyglance_weather::GeoClueLocator::new(
            config.desktop_id.clone(),
            Duration::from_secs(config.timeout_secs),
        )),
        #[cfg(not(target_os = "linux"))]
        LocationSource::Geoclue => {
            tracing::warn!("GeoClue is not available on this platform, using fixed coordinates");
            fixed_locator(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_source_builds_fixed_locator() {
        let mut config = Config::default();
        config.location.source = LocationSource::Fixed;
        config.location.latitude = Some(59.91);
        config.location.longitude = Some(10.75);

        let services = AppServices::from_config(&config).unwrap();
        assert_eq!(services.locator().name(), "fixed");
    }

    #[test]
    fn configured_unit_reaches_provider() {
        let mut config = Config::default();
        config.location.source = LocationSource::Fixed;
        config.weather.temperature_unit = skyglance_core::TemperatureUnit::Fahrenheit;

        let services = AppServices::from_config(&config).unwrap();
        assert_eq!(services.weather_provider().unit(), TemperatureUnit::Fahrenheit);
    }
}
