use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    config::Config,
    error::Result,
    model::LocationQuery,
    provider::openweather::{
        OpenWeatherClient, OwAirPollutionResponse, OwCurrentResponse, OwForecastResponse,
    },
};

pub mod openweather;

/// The three upstream endpoints the orchestrator calls for every query.
///
/// Each method fails with [`crate::WeatherError::Upstream`] on transport
/// errors, non-2xx statuses, or bodies that are not JSON. Payloads that parse
/// but lack fields come back `Ok` and are handled by the transforms.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, query: &LocationQuery) -> Result<OwCurrentResponse>;

    async fn forecast(&self, query: &LocationQuery) -> Result<OwForecastResponse>;

    async fn air_quality(&self, query: &LocationQuery) -> Result<OwAirPollutionResponse>;
}

/// Build the OpenWeather client from config. Fails before any network
/// activity when no usable API key is configured.
pub fn source_from_config(config: &Config) -> Result<OpenWeatherClient> {
    let api_key = config.api_key()?;
    Ok(OpenWeatherClient::new(
        api_key.to_owned(),
        config.endpoints.clone(),
    ))
}
