//! Core library for the `skyboard` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and its raw payload shapes
//! - Transforms from the three-hour forecast series into daily and hourly views
//! - Air-quality classification
//! - The fetch orchestrator and the persisted search history
//!
//! It is used by `skyboard-cli`, but can also be reused by other front ends.

pub mod air_quality;
pub mod config;
pub mod daily;
pub mod error;
pub mod geolocation;
pub mod history;
pub mod hourly;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod units;

pub use config::{Config, Endpoints, Theme, Units};
pub use error::{GeolocationError, UpstreamSource, WeatherError};
pub use geolocation::{ConfiguredGeolocator, GeolocationOptions, Geolocator};
pub use history::SearchHistory;
pub use model::{
    AirQualityReading, AqiLevel, Coordinates, CurrentWeatherSnapshot, DailySummary, FetchState,
    HourlyPoint, LocationQuery, Pollutant, RawIntervalRecord, WeatherReport,
};
pub use orchestrator::{FetchTicket, Orchestrator, RawPayloads};
pub use provider::{WeatherSource, openweather::OpenWeatherClient};
