//! GeoClue2 location over the D-Bus system bus.

use crate::location::{LocationFuture, LocationProvider};
use crate::types::{Coordinate, LocationError, PermissionStatus};
use parking_lot::Mutex;
use std::time::Duration;
use zbus::Connection;

/// GClueAccuracyLevel::City. Weather needs nothing finer.
const ACCURACY_CITY: u32 = 4;
const POLL_INTERVAL: Duration = Duration::from_millis(250);
const ACCESS_DENIED: &str = "org.freedesktop.DBus.Error.AccessDenied";

mod dbus {
    use zbus::zvariant::OwnedObjectPath;

    #[zbus::proxy(
        interface = "org.freedesktop.GeoClue2.Manager",
        default_service = "org.freedesktop.GeoClue2",
        default_path = "/org/freedesktop/GeoClue2/Manager"
    )]
    pub trait Manager {
        fn get_client(&self) -> zbus::Result<OwnedObjectPath>;
    }

    #[zbus::proxy(
        interface = "org.freedesktop.GeoClue2.Client",
        default_service = "org.freedesktop.GeoClue2"
    )]
    pub trait Client {
        fn start(&self) -> zbus::Result<()>;

        #[zbus(property)]
        fn set_desktop_id(&self, id: &str) -> zbus::Result<()>;

        #[zbus(property)]
        fn set_requested_accuracy_level(&self, level: u32) -> zbus::Result<()>;

        #[zbus(property)]
        fn location(&self) -> zbus::Result<OwnedObjectPath>;
    }

    #[zbus::proxy(
        interface = "org.freedesktop.GeoClue2.Location",
        default_service = "org.freedesktop.GeoClue2"
    )]
    pub trait Location {
        #[zbus(property)]
        fn latitude(&self) -> zbus::Result<f64>;

        #[zbus(property)]
        fn longitude(&self) -> zbus::Result<f64>;

        #[zbus(property)]
        fn accuracy(&self) -> zbus::Result<f64>;
    }
}

use dbus::{ClientProxy, LocationProxy, ManagerProxy};

fn is_access_denied(err: &zbus::Error) -> bool {
    match err {
        zbus::Error::MethodError(name, _, _) => name.as_str() == ACCESS_DENIED,
        zbus::Error::FDO(e) => matches!(**e, zbus::fdo::Error::AccessDenied(_)),
        _ => false,
    }
}

fn unavailable(err: zbus::Error) -> LocationError {
    LocationError::ServiceUnavailable(err.to_string())
}

/// Location from the GeoClue2 daemon.
///
/// The permission request starts a GeoClue client; the desktop's location
/// agent decides whether access is granted. The started client is reused for
/// later position reads.
pub struct GeoClueLocator {
    desktop_id: String,
    timeout: Duration,
    client: Mutex<Option<ClientProxy<'static>>>,
}

impl GeoClueLocator {
    pub fn new(desktop_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            desktop_id: desktop_id.into(),
            timeout,
            client: Mutex::new(None),
        }
    }

    async fn start_client(&self) -> zbus::Result<ClientProxy<'static>> {
        let conn = Connection::system().await?;
        let manager = ManagerProxy::new(&conn).await?;
        let path = manager.get_client().await?;

        let client = ClientProxy::builder(&conn).path(path)?.build().await?;
        client.set_desktop_id(&self.desktop_id).await?;
        client.set_requested_accuracy_level(ACCURACY_CITY).await?;
        client.start().await?;

        Ok(client)
    }

    async fn wait_for_fix(client: &ClientProxy<'static>) -> Result<Coordinate, LocationError> {
        loop {
            let path = client.location().await.map_err(unavailable)?;
            // GeoClue reports "/" until the first fix arrives.
            if path.as_str() != "/" {
                let location = LocationProxy::builder(client.inner().connection())
                    .path(path)
                    .map_err(unavailable)?
                    .build()
                    .await
                    .map_err(unavailable)?;

                return Ok(Coordinate {
                    latitude: location.latitude().await.map_err(unavailable)?,
                    longitude: location.longitude().await.map_err(unavailable)?,
                    accuracy_meters: location.accuracy().await.ok(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl LocationProvider for GeoClueLocator {
    fn name(&self) -> &str {
        "geoclue"
    }

    fn request_permission(&self) -> LocationFuture<'_, PermissionStatus> {
        Box::pin(async move {
            let started = self.client.lock().is_some();
            if started {
                return PermissionStatus::Granted;
            }

            match self.start_client().await {
                Ok(client) => {
                    *self.client.lock() = Some(client);
                    PermissionStatus::Granted
                }
                Err(e) if is_access_denied(&e) => PermissionStatus::Denied,
                Err(e) => {
                    tracing::warn!("GeoClue unavailable: {}", e);
                    PermissionStatus::Undetermined
                }
            }
        })
    }

    fn current_position(&self) -> LocationFuture<'_, Result<Coordinate, LocationError>> {
        Box::pin(async move {
            let client = self
                .client
                .lock()
                .clone()
                .ok_or(LocationError::PermissionDenied)?;

            tokio::time::timeout(self.timeout, Self::wait_for_fix(&client))
                .await
                .map_err(|_| LocationError::Timeout)?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_is_recognized() {
        let denied = zbus::Error::FDO(Box::new(zbus::fdo::Error::AccessDenied(
            "agent refused".into(),
        )));
        assert!(is_access_denied(&denied));

        let other = zbus::Error::FDO(Box::new(zbus::fdo::Error::ServiceUnknown(
            "org.freedesktop.GeoClue2".into(),
        )));
        assert!(!is_access_denied(&other));
        assert!(!is_access_denied(&zbus::Error::Failure("no bus".into())));
    }

    #[test]
    fn test_bus_errors_become_unavailable() {
        assert!(matches!(
            unavailable(zbus::Error::Failure("no bus".into())),
            LocationError::ServiceUnavailable(msg) if msg.contains("no bus")
        ));
    }

    #[tokio::test]
    async fn test_position_before_permission_is_denied() {
        let locator = GeoClueLocator::new("skyglance-test", Duration::from_secs(1));
        assert!(matches!(
            locator.current_position().await,
            Err(LocationError::PermissionDenied)
        ));
    }
}
