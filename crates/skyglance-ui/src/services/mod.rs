pub mod weather_service;

pub use weather_service::{
    dispatch as dispatch_weather_command, request_address, request_conditions, request_locate,
    WeatherError, WeatherServiceMessage,
};
