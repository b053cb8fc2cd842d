//! Device location behind a permission request.

use crate::types::{Coordinate, LocationError, PermissionStatus};
use std::future::Future;
use std::pin::Pin;

pub type LocationFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A source of the device position.
pub trait LocationProvider: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Ask for access to the device position.
    fn request_permission(&self) -> LocationFuture<'_, PermissionStatus>;

    /// Read the current position. Only meaningful after access was granted.
    fn current_position(&self) -> LocationFuture<'_, Result<Coordinate, LocationError>>;
}

/// Request permission, then read the position.
pub async fn locate(provider: &dyn LocationProvider) -> Result<Coordinate, LocationError> {
    match provider.request_permission().await {
        PermissionStatus::Granted => {}
        status => {
            tracing::info!("{}: location permission {:?}", provider.name(), status);
            return Err(LocationError::PermissionDenied);
        }
    }

    let coordinate = provider.current_position().await?;
    tracing::info!(
        "Got location from {}: {}, {}",
        provider.name(),
        coordinate.latitude,
        coordinate.longitude
    );
    Ok(coordinate)
}

/// Coordinates supplied by configuration.
///
/// Access is granted only when a coordinate is configured.
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    coordinate: Option<Coordinate>,
}

impl FixedLocator {
    pub fn new(coordinate: Option<Coordinate>) -> Self {
        Self { coordinate }
    }
}

impl LocationProvider for FixedLocator {
    fn name(&self) -> &str {
        "fixed"
    }

    fn request_permission(&self) -> LocationFuture<'_, PermissionStatus> {
        let status = if self.coordinate.is_some() {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        Box::pin(async move { status })
    }

    fn current_position(&self) -> LocationFuture<'_, Result<Coordinate, LocationError>> {
        let result = self.coordinate.ok_or(LocationError::PermissionDenied);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Undecided;

    impl LocationProvider for Undecided {
        fn name(&self) -> &str {
            "undecided"
        }

        fn request_permission(&self) -> LocationFuture<'_, PermissionStatus> {
            Box::pin(async { PermissionStatus::Undetermined })
        }

        fn current_position(&self) -> LocationFuture<'_, Result<Coordinate, LocationError>> {
            Box::pin(async { Ok(Coordinate::new(0.0, 0.0)) })
        }
    }

    #[tokio::test]
    async fn test_fixed_locator_with_coordinate() {
        let locator = FixedLocator::new(Some(Coordinate::new(44.43, 26.1)));
        let coordinate = locate(&locator).await.unwrap();
        assert_eq!(coordinate, Coordinate::new(44.43, 26.1));
    }

    #[tokio::test]
    async fn test_fixed_locator_without_coordinate_is_denied() {
        let locator = FixedLocator::default();
        assert_eq!(locator.request_permission().await, PermissionStatus::Denied);
        assert!(matches!(
            locate(&locator).await,
            Err(LocationError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_undetermined_permission_skips_position() {
        assert!(matches!(
            locate(&Undecided).await,
            Err(LocationError::PermissionDenied)
        ));
    }
}
