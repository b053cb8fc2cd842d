//! Weather backend: async location, geocoding and weather fetching.
//! All network work runs on spawned tasks; results are sent back via mpsc
//! tagged with the generation they were requested under.

use std::future::Future;

use skyglance_core::error::{NetworkError, ReqwestErrorExt};
use skyglance_weather::{
    Address, Coordinate, CurrentConditions, LocationError as BackendLocationError,
    WeatherError as BackendWeatherError,
};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::app_services::AppServices;
use crate::screen::Command;

/// Error type for weather operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    PermissionDenied,
    LocationUnavailable(String),
    LocationTimeout,
    Network(String),
    NetworkTimeout,
    Api(String),
    InvalidData(String),
    NotInitialized,
}

impl std::fmt::Display for WeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherError::PermissionDenied => write!(f, "Location permission denied"),
            WeatherError::LocationUnavailable(s) => write!(f, "Location error: {}", s),
            WeatherError::LocationTimeout => write!(f, "Location request timed out"),
            WeatherError::Network(s) => write!(f, "Weather error: {}", s),
            WeatherError::NetworkTimeout => write!(f, "Weather request timed out"),
            WeatherError::Api(s) => write!(f, "Weather API error: {}", s),
            WeatherError::InvalidData(s) => write!(f, "Weather data error: {}", s),
            WeatherError::NotInitialized => write!(f, "Weather service not initialized"),
        }
    }
}

impl std::error::Error for WeatherError {}

impl From<BackendLocationError> for WeatherError {
    fn from(e: BackendLocationError) -> Self {
        match e {
            BackendLocationError::PermissionDenied => WeatherError::PermissionDenied,
            BackendLocationError::Timeout => WeatherError::LocationTimeout,
            BackendLocationError::ServiceUnavailable(s) | BackendLocationError::Other(s) => {
                WeatherError::LocationUnavailable(s)
            }
        }
    }
}

impl From<BackendWeatherError> for WeatherError {
    fn from(e: BackendWeatherError) -> Self {
        match e {
            BackendWeatherError::Network(e) => match e.into_network_error() {
                NetworkError::Timeout => WeatherError::NetworkTimeout,
                other => WeatherError::Network(other.to_string()),
            },
            BackendWeatherError::Api { status, reason } => {
                WeatherError::Api(format!("{} {}", status, reason))
            }
            BackendWeatherError::Parse(s) => WeatherError::InvalidData(s),
        }
    }
}

/// Messages sent from async operations back to the screen
#[derive(Debug, Clone)]
pub enum WeatherServiceMessage {
    /// Permission request plus position read finished
    Located {
        generation: u64,
        result: Result<Coordinate, WeatherError>,
    },
    /// Reverse geocoding finished. Failures arrive as `None`.
    AddressResolved {
        generation: u64,
        address: Option<Address>,
    },
    /// Current conditions fetch finished
    ConditionsFetched {
        generation: u64,
        result: Result<CurrentConditions, WeatherError>,
    },
}

impl WeatherServiceMessage {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Located { generation, .. }
            | Self::AddressResolved { generation, .. }
            | Self::ConditionsFetched { generation, .. } => *generation,
        }
    }
}

/// Spawn `work` on the current runtime and forward its message, unless the
/// token is cancelled first. Without a runtime `fallback` is sent instead.
fn spawn_request<F>(
    tx: &UnboundedSender<WeatherServiceMessage>,
    token: &CancellationToken,
    fallback: WeatherServiceMessage,
    work: F,
) where
    F: Future<Output = WeatherServiceMessage> + Send + 'static,
{
    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(r) => r,
        Err(_) => {
            tracing::error!("No tokio runtime available for weather request");
            let _ = tx.send(fallback);
            return;
        }
    };

    let tx = tx.clone();
    let token = token.clone();
    runtime.spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Weather request cancelled");
            }
            message = work => {
                let _ = tx.send(message);
            }
        }
    });
}

/// Request permission and the device position.
/// Sends `Located` on the channel when complete.
pub fn request_locate(
    tx: &UnboundedSender<WeatherServiceMessage>,
    token: &CancellationToken,
    services: &AppServices,
    generation: u64,
) {
    let locator = services.locator();
    spawn_request(
        tx,
        token,
        WeatherServiceMessage::Located {
            generation,
            result: Err(WeatherError::NotInitialized),
        },
        async move {
            let result = skyglance_weather::locate(locator.as_ref())
                .await
                .map_err(WeatherError::from);
            if let Err(e) = &result {
                tracing::warn!("Failed to get location: {}", e);
            }
            WeatherServiceMessage::Located { generation, result }
        },
    );
}

/// Reverse geocode a coordinate.
/// Sends `AddressResolved` on the channel when complete.
pub fn request_address(
    tx: &UnboundedSender<WeatherServiceMessage>,
    token: &CancellationToken,
    services: &AppServices,
    generation: u64,
    coordinate: Coordinate,
) {
    let geocoder = services.geocoder();
    spawn_request(
        tx,
        token,
        WeatherServiceMessage::AddressResolved {
            generation,
            address: None,
        },
        async move {
            let address = geocoder.lookup_address(&coordinate).await;
            WeatherServiceMessage::AddressResolved {
                generation,
                address,
            }
        },
    );
}

/// Fetch current conditions for a coordinate.
/// Sends `ConditionsFetched` on the channel when complete.
pub fn request_conditions(
    tx: &UnboundedSender<WeatherServiceMessage>,
    token: &CancellationToken,
    services: &AppServices,
    generation: u64,
    coordinate: Coordinate,
) {
    let provider = services.weather_provider();
    spawn_request(
        tx,
        token,
        WeatherServiceMessage::ConditionsFetched {
            generation,
            result: Err(WeatherError::NotInitialized),
        },
        async move {
            let result = provider
                .fetch_current(&coordinate)
                .await
                .map_err(WeatherError::from);
            match &result {
                Ok(_) => tracing::info!("Weather data fetched successfully"),
                Err(e) => tracing::error!("Failed to fetch weather: {}", e),
            }
            WeatherServiceMessage::ConditionsFetched { generation, result }
        },
    );
}

/// Run the effect a screen transition asked for.
pub fn dispatch(
    command: Command,
    tx: &UnboundedSender<WeatherServiceMessage>,
    token: &CancellationToken,
    services: &AppServices,
) {
    tracing::debug!("Dispatching {:?}", command);
    match command {
        Command::Locate { generation } => request_locate(tx, token, services, generation),
        Command::LookupAddress {
            generation,
            coordinate,
        } => request_address(tx, token, services, generation, coordinate),
        Command::FetchConditions {
            generation,
            coordinate,
        } => request_conditions(tx, token, services, generation, coordinate),
    }
}
