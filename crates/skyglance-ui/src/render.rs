//! Plain-text rendering of each screen variant.

use skyglance_core::UiConfig;

use crate::screen::{ViewState, WeatherScreen};

const RELOADING: &str = "Reloading";

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub show_coordinates: bool,
}

impl From<&UiConfig> for RenderOptions {
    fn from(ui: &UiConfig) -> Self {
        Self {
            show_coordinates: ui.show_coordinates,
        }
    }
}

/// Render the screen as lines of text.
pub fn render(screen: &WeatherScreen, options: &RenderOptions) -> String {
    let lines = match screen.view_state() {
        ViewState::AwaitingLocation => vec!["Waiting for your location...".to_string()],
        ViewState::Granting => vec!["Granting your permission...".to_string()],
        ViewState::PermissionDenied => vec![
            "Oops!".to_string(),
            String::new(),
            screen.error_message().unwrap_or_default().to_string(),
            String::new(),
            "[t] Try again!".to_string(),
        ],
        ViewState::Ready { refreshing } => render_ready(screen, refreshing, options),
    };
    lines.join("\n")
}

fn render_ready(screen: &WeatherScreen, refreshing: bool, options: &RenderOptions) -> Vec<String> {
    let address = screen.address();
    let conditions = screen.conditions();
    let category = screen.category();
    let mut lines = Vec::new();

    if refreshing {
        lines.push(RELOADING.to_string());
        lines.push(format!("{}...", RELOADING));
    } else {
        lines.push(address.map_or("Unknown City", |a| a.city.as_str()).to_string());
        lines.push(address.map_or("Unknown Country", |a| a.country.as_str()).to_string());
    }

    if options.show_coordinates {
        if let Some(c) = screen.coordinate() {
            lines.push(format!("({:.4}, {:.4})", c.latitude, c.longitude));
        }
    }

    lines.push(String::new());
    lines.push(if screen.can_refresh() {
        "[r] Refresh".to_string()
    } else {
        "Refreshing...".to_string()
    });
    lines.push(String::new());

    if refreshing {
        lines.push(format!("{}...", RELOADING));
        lines.push(format!("{}°", RELOADING));
        lines.push(RELOADING.to_string());
        lines.push(format!("Wind {}   Humidity {} %", RELOADING, RELOADING));
    } else {
        if let Some(icon) = category.icon_name() {
            lines.push(format!("[{}]", icon));
        }
        let temperature = conditions.map_or(0.0, |c| c.temperature_2m).floor();
        let wind = conditions.map_or(0.0, |c| c.wind_speed_10m).floor();
        let humidity = conditions
            .map(|c| format!("{}", c.relative_humidity_2m.round()))
            .unwrap_or_default();

        lines.push(format!("{}°", temperature));
        lines.push(category.label().to_string());
        lines.push(format!("Wind {} km/h   Humidity {} %", wind, humidity));
    }

    if let Some(notice) = screen.weather_notice() {
        lines.push(String::new());
        lines.push(notice.to_string());
    }

    if let Some(observed) = conditions.and_then(|c| c.observed_at) {
        lines.push(format!("Updated {}", observed.format("%H:%M")));
    }

    lines
}
