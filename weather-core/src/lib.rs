//! Core library for the `weather-card` app.
//!
//! This crate defines:
//! - The OpenWeather client behind the [`WeatherProvider`] trait
//! - The view controller and its loading / error / result states
//! - The event loop tying user input, fetches and the clock together
//! - Configuration handling
//!
//! It is used by `weather-card`, but any front-end that implements
//! [`RenderTarget`] can drive it.

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod runtime;
pub mod view;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use controller::{Effect, Event, RacePolicy, ViewController, ViewSettings, ViewState};
pub use error::WeatherError;
pub use model::{WeatherQuery, WeatherResult};
pub use provider::{WeatherProvider, provider_from_config};
pub use runtime::Runtime;
pub use view::{Attribute, Element, RenderTarget, Surface};
