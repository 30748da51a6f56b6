//! Core library for the SkyPulse weather dashboard.
//!
//! This crate defines:
//! - Configuration and persistent key-value storage
//! - The recent-search / favorites list manager
//! - Collaborators for geocoding, forecasts, air quality and geolocation
//! - The `Dashboard` controller that owns application state and emits change
//!   events for any front end to render
//!
//! It is used by `skypulse-cli`, but holds no presentation code of its own.

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod locations;
pub mod model;
pub mod provider;
pub mod sequence;
pub mod snapshot;
pub mod store;

pub use catalog::{AqiBand, WeatherCodeInfo, classify_aqi, describe_weather_code};
pub use config::Config;
pub use dashboard::{
    Dashboard, DashboardSettings, FetchOutcome, Outcome, Selection, ShareOutcome,
};
pub use error::{DashboardError, GeolocationError};
pub use events::{DashboardEvent, Notice, NoticeLevel};
pub use locations::{FavoriteToggle, ListKind, LocationLists};
pub use model::{
    Coordinates, GeoPlace, Location, Temperature, TemperatureUnit, Theme, celsius_to_fahrenheit,
    round_for_display,
};
pub use provider::{ForecastProvider, GeocodingProvider, GeolocationProvider, ShareTarget};
pub use snapshot::{AirQuality, ForecastPayload, WeatherSnapshot};
pub use store::{FileStore, KeyValueStore, MemoryStore};
