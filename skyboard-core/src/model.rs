use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Label used for coordinate queries in place of a city name.
pub const CURRENT_LOCATION: &str = "Current Location";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// What the user asked the weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub fn city(name: impl Into<String>) -> Self {
        LocationQuery::City(name.into())
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        LocationQuery::Coordinates(Coordinates { lat, lon })
    }

    /// Query-string pairs understood by every OpenWeather endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::City(name) => vec![("q", name.trim().to_string())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())]
            }
        }
    }

    /// Name shown for the location and, for cities, stored in the search history.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            LocationQuery::City(name) => Some(name.trim()),
            LocationQuery::Coordinates(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, LocationQuery::City(name) if name.trim().is_empty())
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name.trim()),
            LocationQuery::Coordinates(c) => write!(f, "{:.4}, {:.4}", c.lat, c.lon),
        }
    }
}

/// One three-hour forecast sample, already checked for the required fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawIntervalRecord {
    pub timestamp: i64,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub pressure: Option<f64>,
    pub wind_speed_mps: f64,
    /// Probability of precipitation in `0.0..=1.0`.
    pub pop: f64,
    pub condition: String,
    pub description: String,
    pub icon: Option<String>,
    pub visibility_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherSnapshot {
    pub city: String,
    pub country: String,
    pub condition: String,
    pub description: String,
    pub icon: Option<String>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
    pub pressure_hpa: Option<f64>,
    pub visibility_km: Option<f64>,
    pub sunrise: String,
    pub sunset: String,
    pub updated_at: String,
    pub coords: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// e.g. "Jan 5"
    pub date_label: String,
    /// e.g. "Monday"
    pub day: String,
    pub condition: String,
    pub icon: Option<String>,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub precipitation_pct: i64,
    pub humidity_pct: i64,
    pub wind_speed_kmh: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    /// e.g. "3 PM"
    pub time: String,
    pub condition: String,
    pub description: String,
    pub icon: Option<String>,
    pub temperature_c: f64,
    pub precipitation_pct: i64,
    pub wind_speed_kmh: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    Pm2_5,
    Pm10,
    No2,
    O3,
    So2,
    Co,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub aqi: i64,
    pub level: AqiLevel,
    pub dominant_pollutant: Option<Pollutant>,
    pub health_implications: String,
    /// Raw concentrations in μg/m³ keyed by provider component name.
    pub components: BTreeMap<String, f64>,
}

/// Everything one successful fetch publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub current: CurrentWeatherSnapshot,
    pub daily: Vec<DailySummary>,
    pub hourly: Vec<HourlyPoint>,
    pub air_quality: Option<AirQualityReading>,
    pub fetched_at: DateTime<Utc>,
}

/// Lifecycle of the most recent fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success(Box<WeatherReport>),
    Error(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            FetchState::Success(report) => Some(report.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_query_sends_trimmed_name() {
        let q = LocationQuery::city("  Tokyo ");
        assert_eq!(q.query_params(), vec![("q", "Tokyo".to_string())]);
        assert_eq!(q.display_name(), Some("Tokyo"));
        assert!(!q.is_blank());
    }

    #[test]
    fn coordinate_query_has_no_history_name() {
        let q = LocationQuery::coordinates(35.68, 139.69);
        let params = q.query_params();
        assert_eq!(params[0], ("lat", "35.68".to_string()));
        assert_eq!(params[1], ("lon", "139.69".to_string()));
        assert_eq!(q.display_name(), None);
    }

    #[test]
    fn blank_city_is_detected() {
        assert!(LocationQuery::city("   ").is_blank());
        assert!(!LocationQuery::coordinates(0.0, 0.0).is_blank());
    }

    #[test]
    fn fetch_state_accessors() {
        assert!(FetchState::Loading.is_loading());
        assert_eq!(FetchState::Error("boom".into()).error(), Some("boom"));
        assert!(FetchState::Idle.report().is_none());
    }
}
