//! Drives a `WeatherScreen`: runs the commands its transitions return and
//! feeds the results back in.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::app_services::AppServices;
use crate::screen::{Command, WeatherScreen};
use crate::services::{dispatch_weather_command, WeatherServiceMessage};

pub struct WeatherController {
    screen: WeatherScreen,
    services: AppServices,
    weather_service_tx: UnboundedSender<WeatherServiceMessage>,
    weather_service_rx: UnboundedReceiver<WeatherServiceMessage>,
    cancel_token: CancellationToken,
}

impl WeatherController {
    /// Create the screen and start its first location request.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(services: AppServices) -> Self {
        let (weather_service_tx, weather_service_rx) = mpsc::unbounded_channel();
        let (screen, command) = WeatherScreen::new();

        let controller = Self {
            screen,
            services,
            weather_service_tx,
            weather_service_rx,
            cancel_token: CancellationToken::new(),
        };
        controller.run(command);
        controller
    }

    pub fn screen(&self) -> &WeatherScreen {
        &self.screen
    }

    fn run(&self, command: Command) {
        dispatch_weather_command(
            command,
            &self.weather_service_tx,
            &self.cancel_token,
            &self.services,
        );
    }

    /// Reload location, address and weather. Returns false when inert.
    pub fn refresh(&mut self) -> bool {
        match self.screen.refresh() {
            Some(command) => {
                self.run(command);
                true
            }
            None => false,
        }
    }

    /// Ask for location access again. Returns false when inert.
    pub fn retry_permission(&mut self) -> bool {
        match self.screen.retry_permission() {
            Some(command) => {
                self.run(command);
                true
            }
            None => false,
        }
    }

    /// Wait for the next service result and apply it.
    ///
    /// Returns true when the result belonged to the latest request (the
    /// screen may have changed) and false for discarded stale results.
    /// Cancel safe.
    pub async fn next_update(&mut self) -> bool {
        // The controller holds a sender, so the channel never closes.
        let Some(message) = self.weather_service_rx.recv().await else {
            return false;
        };

        let current = self.screen.is_current(&message);
        for command in self.screen.apply(message) {
            self.run(command);
        }
        current
    }

    /// Stop all in-flight requests.
    pub fn shutdown(&self) {
        tracing::info!("Weather controller shutdown initiated");
        self.cancel_token.cancel();
    }
}

impl Drop for WeatherController {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
