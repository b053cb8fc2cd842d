//! The weather screen's state machine.
//!
//! `WeatherScreen` owns everything the screen shows and only changes through
//! the transitions below. It performs no I/O: each transition returns the
//! `Command`s the caller must run, and async results come back through
//! [`WeatherScreen::apply`].
//!
//! Every location request bumps the generation. Results carry the generation
//! they were requested under and are dropped once a newer request exists, so
//! a slow response can never overwrite newer data.

use skyglance_core::AppError;
use skyglance_weather::{classify, Address, Coordinate, CurrentConditions, WeatherCategory};

use crate::services::WeatherServiceMessage;

const STALE_SUFFIX: &str = "Showing the last known data.";

/// Which screen variant to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// No position and no error yet
    AwaitingLocation,
    /// Location access failed; a retry action is offered
    PermissionDenied,
    /// A user-triggered retry is in flight
    Granting,
    /// A position is known
    Ready { refreshing: bool },
}

/// Effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Locate { generation: u64 },
    LookupAddress { generation: u64, coordinate: Coordinate },
    FetchConditions { generation: u64, coordinate: Coordinate },
}

/// Lookups still outstanding for the current generation
#[derive(Debug, Clone, Copy, Default)]
struct Pending {
    address: bool,
    conditions: bool,
}

impl Pending {
    fn is_settled(self) -> bool {
        !self.address && !self.conditions
    }
}

#[derive(Debug, Clone)]
pub struct WeatherScreen {
    state: ViewState,
    generation: u64,
    pending: Pending,
    coordinate: Option<Coordinate>,
    address: Option<Address>,
    conditions: Option<CurrentConditions>,
    error_message: Option<String>,
    weather_notice: Option<String>,
}

impl WeatherScreen {
    /// A fresh screen waiting for its first position, plus the request for it.
    pub fn new() -> (Self, Command) {
        let screen = Self {
            state: ViewState::AwaitingLocation,
            generation: 1,
            pending: Pending::default(),
            coordinate: None,
            address: None,
            conditions: None,
            error_message: None,
            weather_notice: None,
        };
        let command = Command::Locate {
            generation: screen.generation,
        };
        (screen, command)
    }

    pub fn view_state(&self) -> ViewState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn coordinate(&self) -> Option<&Coordinate> {
        self.coordinate.as_ref()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn conditions(&self) -> Option<&CurrentConditions> {
        self.conditions.as_ref()
    }

    pub fn category(&self) -> WeatherCategory {
        classify(self.conditions.as_ref().map(|c| c.weather_code))
    }

    /// Message for the permission-denied screen
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Set when the last weather fetch failed and older data is shown
    pub fn weather_notice(&self) -> Option<&str> {
        self.weather_notice.as_deref()
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self.state, ViewState::Ready { refreshing: true })
    }

    pub fn can_refresh(&self) -> bool {
        self.state == ViewState::Ready { refreshing: false }
    }

    pub fn can_retry(&self) -> bool {
        self.state == ViewState::PermissionDenied
    }

    /// True when `message` answers the latest request
    pub fn is_current(&self, message: &WeatherServiceMessage) -> bool {
        message.generation() == self.generation
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.pending = Pending::default();
        self.generation
    }

    /// User asked to reload. Inert unless the screen is ready and idle.
    pub fn refresh(&mut self) -> Option<Command> {
        if !self.can_refresh() {
            tracing::debug!("Refresh ignored in {:?}", self.state);
            return None;
        }

        self.state = ViewState::Ready { refreshing: true };
        let generation = self.next_generation();
        tracing::info!("Refreshing (generation {})", generation);
        Some(Command::Locate { generation })
    }

    /// User pressed "Try again!" on the permission-denied screen.
    pub fn retry_permission(&mut self) -> Option<Command> {
        if !self.can_retry() {
            tracing::debug!("Retry ignored in {:?}", self.state);
            return None;
        }

        self.state = ViewState::Granting;
        let generation = self.next_generation();
        tracing::info!("Retrying location permission (generation {})", generation);
        Some(Command::Locate { generation })
    }

    /// Apply an async result and return any follow-up effects.
    pub fn apply(&mut self, message: WeatherServiceMessage) -> Vec<Command> {
        if !self.is_current(&message) {
            tracing::debug!(
                "Discarding stale result from generation {} (current {})",
                message.generation(),
                self.generation
            );
            return Vec::new();
        }

        match message {
            WeatherServiceMessage::Located {
                generation,
                result: Ok(coordinate),
            } => {
                let refreshing = self.is_refreshing();
                self.state = ViewState::Ready { refreshing };
                self.coordinate = Some(coordinate);
                self.error_message = None;
                self.pending = Pending {
                    address: true,
                    conditions: true,
                };
                vec![
                    Command::LookupAddress {
                        generation,
                        coordinate,
                    },
                    Command::FetchConditions {
                        generation,
                        coordinate,
                    },
                ]
            }
            WeatherServiceMessage::Located { result: Err(e), .. } => {
                let message = AppError::from(e).user_message();
                self.state = ViewState::PermissionDenied;
                self.error_message = Some(message.to_string());
                self.pending = Pending::default();
                Vec::new()
            }
            WeatherServiceMessage::AddressResolved { address, .. } => {
                self.address = address;
                self.pending.address = false;
                self.settle();
                Vec::new()
            }
            WeatherServiceMessage::ConditionsFetched { result, .. } => {
                match result {
                    Ok(conditions) => {
                        self.conditions = Some(conditions);
                        self.weather_notice = None;
                    }
                    Err(e) => {
                        // Keep whatever we showed before; refresh is the recovery path.
                        let message = AppError::from(e).user_message();
                        self.weather_notice = Some(if self.conditions.is_some() {
                            format!("{} {}", message, STALE_SUFFIX)
                        } else {
                            message.to_string()
                        });
                    }
                }
                self.pending.conditions = false;
                self.settle();
                Vec::new()
            }
        }
    }

    fn settle(&mut self) {
        if self.pending.is_settled() && self.is_refreshing() {
            self.state = ViewState::Ready { refreshing: false };
        }
    }
}
