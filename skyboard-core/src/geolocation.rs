use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;

use crate::{error::GeolocationError, model::Coordinates};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest acceptable cached fix. Zero always asks for a fresh position.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Source of the device position.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(
        &self,
        options: &GeolocationOptions,
    ) -> Result<Coordinates, GeolocationError>;
}

/// Reports the position saved in the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredGeolocator {
    home: Option<Coordinates>,
}

impl ConfiguredGeolocator {
    pub fn new(home: Option<Coordinates>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl Geolocator for ConfiguredGeolocator {
    async fn locate(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Coordinates, GeolocationError> {
        let home = self.home.ok_or(GeolocationError::Unsupported)?;
        if !(-90.0..=90.0).contains(&home.lat) || !(-180.0..=180.0).contains(&home.lon) {
            return Err(GeolocationError::PositionUnavailable);
        }
        Ok(home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_request_fresh_fix() {
        let opts = GeolocationOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.maximum_age, Duration::ZERO);
        assert!(opts.high_accuracy);
    }

    #[tokio::test]
    async fn configured_geolocator_without_home_is_unsupported() {
        let geo = ConfiguredGeolocator::default();
        let err = geo.locate(&GeolocationOptions::default()).await.unwrap_err();
        assert_eq!(err, GeolocationError::Unsupported);
    }

    #[tokio::test]
    async fn configured_geolocator_validates_range() {
        let geo = ConfiguredGeolocator::new(Some(Coordinates { lat: 123.0, lon: 0.0 }));
        let err = geo.locate(&GeolocationOptions::default()).await.unwrap_err();
        assert_eq!(err, GeolocationError::PositionUnavailable);

        let home = Coordinates { lat: 48.85, lon: 2.35 };
        let geo = ConfiguredGeolocator::new(Some(home));
        assert_eq!(geo.locate(&GeolocationOptions::default()).await.unwrap(), home);
    }
}
