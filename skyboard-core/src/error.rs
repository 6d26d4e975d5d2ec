use std::fmt;

use thiserror::Error;

/// Upstream endpoint a request was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamSource {
    CurrentConditions,
    Forecast,
    AirQuality,
}

impl UpstreamSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamSource::CurrentConditions => "Current weather",
            UpstreamSource::Forecast => "Forecast",
            UpstreamSource::AirQuality => "Air quality",
        }
    }
}

impl fmt::Display for UpstreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to acquire the device position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Failed to get your location. Please allow location access in your settings.")]
    PermissionDenied,
    #[error("Failed to get your location. Location information is unavailable.")]
    PositionUnavailable,
    #[error("Failed to get your location. Location request timed out.")]
    Timeout,
    #[error("Geolocation is not supported on this system.")]
    Unsupported,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{0}")]
    Configuration(String),

    #[error("{endpoint} fetch failed: {message}")]
    Upstream {
        endpoint: UpstreamSource,
        message: String,
    },

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error("Failed to persist search history: {0}")]
    Persistence(String),
}

impl WeatherError {
    pub fn upstream(endpoint: UpstreamSource, message: impl Into<String>) -> Self {
        WeatherError::Upstream {
            endpoint,
            message: message.into(),
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
