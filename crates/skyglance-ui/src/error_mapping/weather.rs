use crate::services::weather_service::WeatherError as UiWeatherError;
use skyglance_core::{AppError, LocationError, NetworkError, WeatherError};

impl From<UiWeatherError> for AppError {
    fn from(e: UiWeatherError) -> Self {
        match e {
            UiWeatherError::PermissionDenied => AppError::Location(LocationError::PermissionDenied),
            UiWeatherError::LocationUnavailable(s) => {
                AppError::Location(LocationError::ServiceUnavailable(s))
            }
            UiWeatherError::LocationTimeout => AppError::Location(LocationError::Timeout),
            UiWeatherError::Network(s) => AppError::Network(NetworkError::ConnectionFailed(s)),
            UiWeatherError::NetworkTimeout => AppError::Network(NetworkError::Timeout),
            UiWeatherError::Api(s) => AppError::Weather(WeatherError::ApiError(s)),
            UiWeatherError::InvalidData(s) => AppError::Weather(WeatherError::InvalidData(s)),
            UiWeatherError::NotInitialized => AppError::Weather(WeatherError::ServiceUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_failures_use_denied_message() {
        for e in [
            UiWeatherError::PermissionDenied,
            UiWeatherError::LocationUnavailable("no bus".into()),
            UiWeatherError::LocationTimeout,
        ] {
            assert_eq!(
                AppError::from(e).user_message(),
                "Permission to access location was denied :("
            );
        }
    }

    #[test]
    fn fetch_failures_map_to_weather_or_network() {
        assert!(matches!(
            AppError::from(UiWeatherError::Api("500".into())),
            AppError::Weather(WeatherError::ApiError(_))
        ));
        assert!(matches!(
            AppError::from(UiWeatherError::NetworkTimeout),
            AppError::Network(NetworkError::Timeout)
        ));
    }
}
