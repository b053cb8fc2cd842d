//! Reverse geocoding: convert coordinates to a city/country label.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use crate::types::{Address, Coordinate, GeocodeError, Placemark};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("SkyGlance/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl From<NominatimAddress> for Placemark {
    fn from(addr: NominatimAddress) -> Self {
        // Prefer city > town > village > municipality for the place name
        let city = addr
            .city
            .or(addr.town)
            .or(addr.village)
            .or(addr.municipality);

        Placemark {
            city,
            region: addr.state,
            country: addr.country,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new() -> Result<Self, GeocodeError> {
        Self::with_base_url(NOMINATIM_URL, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Look up the candidates for a coordinate.
    ///
    /// Nominatim answers with at most one match; "Unable to geocode" is an
    /// empty list rather than an error.
    pub async fn reverse_geocode(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Vec<Placemark>, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("format", "jsonv2".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: NominatimResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

        if let Some(reason) = parsed.error {
            tracing::debug!("Nominatim found no match: {}", reason);
            return Ok(Vec::new());
        }

        Ok(parsed.address.map(Placemark::from).into_iter().collect())
    }

    /// Resolve a coordinate to an address, collapsing every failure to `None`.
    pub async fn lookup_address(&self, coordinate: &Coordinate) -> Option<Address> {
        match self.reverse_geocode(coordinate).await {
            Ok(placemarks) => {
                let address = Address::from_placemarks(&placemarks);
                match &address {
                    Some(a) => tracing::info!("Reverse geocoded to: {}, {}", a.city, a.country),
                    None => tracing::debug!("No usable address in {} candidates", placemarks.len()),
                }
                address
            }
            Err(e) => {
                tracing::debug!("Reverse geocode failed: {}", e);
                None
            }
        }
    }
}
