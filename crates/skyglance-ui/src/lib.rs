pub mod app_services;
pub mod controller;
mod error_mapping;
pub mod input;
pub mod render;
pub mod screen;
pub mod services;

pub use app_services::AppServices;
pub use controller::WeatherController;
pub use input::Input;
pub use render::{render, RenderOptions};
pub use screen::{Command, ViewState, WeatherScreen};
