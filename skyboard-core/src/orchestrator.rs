//! Request lifecycle: three concurrent upstream calls, composition through
//! the transforms, and publication into a single [`FetchState`].

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::{
    air_quality,
    config::Config,
    daily,
    error::{GeolocationError, Result, UpstreamSource, WeatherError},
    geolocation::{GeolocationOptions, Geolocator},
    history::SearchHistory,
    hourly,
    model::{CURRENT_LOCATION, FetchState, LocationQuery, WeatherReport},
    provider::{
        WeatherSource,
        openweather::{
            self, OpenWeatherClient, OwAirPollutionResponse, OwCurrentResponse,
            OwForecastResponse,
        },
        source_from_config,
    },
    units,
};

/// Bodies returned by one round of upstream calls.
#[derive(Debug, Clone, Default)]
pub struct RawPayloads {
    pub current: OwCurrentResponse,
    pub forecast: OwForecastResponse,
    /// `None` when the air-quality call failed.
    pub air_quality: Option<OwAirPollutionResponse>,
}

/// Handle for one fetch. Tickets are numbered in the order fetches start.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    seq: u64,
    query: LocationQuery,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &LocationQuery {
        &self.query
    }
}

/// Call all three endpoints concurrently and wait for every one of them.
///
/// Current conditions and forecast are mandatory; the air-quality call only
/// logs a warning when it fails.
pub async fn load_payloads<S: WeatherSource + ?Sized>(
    source: &S,
    query: &LocationQuery,
) -> Result<RawPayloads> {
    let (current, forecast, air_quality) = tokio::join!(
        source.current(query),
        source.forecast(query),
        source.air_quality(query),
    );

    let current = current?;
    let forecast = forecast?;
    let air_quality = match air_quality {
        Ok(aq) => Some(aq),
        Err(e) => {
            warn!(%query, error = %e, "air quality data unavailable, continuing without it");
            None
        }
    };

    Ok(RawPayloads {
        current,
        forecast,
        air_quality,
    })
}

/// Run the payloads through every transform and assemble the report.
pub fn compose_report(query: &LocationQuery, payloads: &RawPayloads) -> Result<WeatherReport> {
    let city_override = match query {
        LocationQuery::Coordinates(_) => Some(CURRENT_LOCATION),
        LocationQuery::City(_) => None,
    };

    let current = openweather::snapshot_from_current(&payloads.current, city_override)
        .ok_or_else(|| {
            WeatherError::upstream(
                UpstreamSource::CurrentConditions,
                "response is missing temperature, condition, or wind data",
            )
        })?;

    let records = openweather::records_from_forecast(&payloads.forecast);
    if records.is_none() {
        warn!(%query, "forecast payload is malformed, publishing without forecast");
    }
    let offset = units::offset_from_shift(
        payloads
            .forecast
            .timezone()
            .or(payloads.current.timezone),
    );

    let air_quality = payloads
        .air_quality
        .as_ref()
        .and_then(air_quality::reading_from_response);
    if payloads.air_quality.is_some() && air_quality.is_none() {
        warn!(%query, "air quality payload has no index, continuing without it");
    }

    Ok(WeatherReport {
        location: current.city.clone(),
        daily: daily::daily_from_records(records.as_deref(), offset),
        hourly: hourly::hourly_from_records(records.as_deref(), offset),
        current,
        air_quality,
        fetched_at: Utc::now(),
    })
}

/// Owns the fetch state and the search history for one dashboard session.
#[derive(Debug)]
pub struct Orchestrator<S> {
    source: Result<S, String>,
    state: FetchState,
    history: SearchHistory,
    next_seq: u64,
    published_seq: u64,
}

impl Orchestrator<OpenWeatherClient> {
    /// Build against OpenWeather. A missing API key is not an error here;
    /// every fetch reports it instead.
    pub fn from_config(config: &Config, history: SearchHistory) -> Self {
        let source = source_from_config(config).map_err(|e| e.to_string());
        Self::with_source(source, history)
    }
}

impl<S: WeatherSource> Orchestrator<S> {
    pub fn new(source: S, history: SearchHistory) -> Self {
        Self::with_source(Ok(source), history)
    }

    /// Orchestrator whose provider access is not configured.
    pub fn unconfigured(reason: impl Into<String>, history: SearchHistory) -> Self {
        Self::with_source(Err(reason.into()), history)
    }

    fn with_source(source: Result<S, String>, history: SearchHistory) -> Self {
        Self {
            source,
            state: FetchState::Idle,
            history,
            next_seq: 0,
            published_seq: 0,
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.state.report()
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear()
    }

    /// Back to `Idle`. The search history is kept and fetches still in
    /// flight will not publish.
    pub fn reset(&mut self) {
        self.state = FetchState::Idle;
        self.published_seq = self.next_seq;
    }

    /// Hand back the search history when the session ends.
    pub fn shutdown(self) -> SearchHistory {
        self.history
    }

    fn source(&self) -> Result<&S> {
        self.source
            .as_ref()
            .map_err(|reason| WeatherError::Configuration(reason.clone()))
    }

    fn fail(&mut self, err: &WeatherError) {
        error!(error = %err, "weather fetch failed");
        self.state = FetchState::Error(err.to_string());
    }

    /// Start a fetch: check configuration and move to `Loading`.
    ///
    /// A blank city name is ignored and yields `Ok(None)`.
    pub fn begin(&mut self, query: LocationQuery) -> Result<Option<FetchTicket>> {
        if query.is_blank() {
            return Ok(None);
        }
        if let Err(e) = self.source().map(|_| ()) {
            self.fail(&e);
            return Err(e);
        }

        self.next_seq += 1;
        self.state = FetchState::Loading;
        debug!(seq = self.next_seq, %query, "fetch started");

        Ok(Some(FetchTicket {
            seq: self.next_seq,
            query,
        }))
    }

    /// Publish the outcome of a fetch.
    ///
    /// Returns `Ok(true)` when the result was published and `Ok(false)` when a
    /// newer fetch has already published, in which case nothing changes.
    pub fn complete(&mut self, ticket: FetchTicket, outcome: Result<RawPayloads>) -> Result<bool> {
        if ticket.seq <= self.published_seq {
            debug!(
                seq = ticket.seq,
                published = self.published_seq,
                "discarding stale fetch result"
            );
            return Ok(false);
        }
        self.published_seq = ticket.seq;

        let report = match outcome.and_then(|p| compose_report(&ticket.query, &p)) {
            Ok(report) => report,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        info!(
            location = %report.location,
            days = report.daily.len(),
            hours = report.hourly.len(),
            air_quality = report.air_quality.is_some(),
            "weather data updated"
        );
        self.state = FetchState::Success(Box::new(report));

        if let Some(name) = ticket.query.display_name() {
            if let Err(e) = self.history.record(name) {
                warn!(error = %e, "search history not saved");
            }
        }

        Ok(true)
    }

    /// Fetch and publish weather for `query`.
    pub async fn fetch(&mut self, query: LocationQuery) -> Result<Option<&WeatherReport>> {
        let Some(ticket) = self.begin(query)? else {
            return Ok(None);
        };

        let outcome = match self.source() {
            Ok(source) => load_payloads(source, ticket.query()).await,
            Err(e) => Err(e),
        };

        self.complete(ticket, outcome)?;
        Ok(self.state.report())
    }

    pub async fn fetch_city(&mut self, city: &str) -> Result<Option<&WeatherReport>> {
        self.fetch(LocationQuery::city(city)).await
    }

    pub async fn fetch_coordinates(&mut self, lat: f64, lon: f64) -> Result<Option<&WeatherReport>> {
        self.fetch(LocationQuery::coordinates(lat, lon)).await
    }

    /// Acquire a fresh position from `geolocator`, then fetch for it.
    pub async fn fetch_current_location<G: Geolocator + ?Sized>(
        &mut self,
        geolocator: &G,
    ) -> Result<Option<&WeatherReport>> {
        if let Err(e) = self.source().map(|_| ()) {
            self.fail(&e);
            return Err(e);
        }

        // Fetches already in flight must not overwrite this one.
        self.next_seq += 1;
        self.published_seq = self.next_seq;

        let options = GeolocationOptions::default();
        self.state = FetchState::Loading;

        let position =
            match tokio::time::timeout(options.timeout, geolocator.locate(&options)).await {
                Ok(Ok(position)) => position,
                Ok(Err(e)) => {
                    let err = WeatherError::Geolocation(e);
                    self.fail(&err);
                    return Err(err);
                }
                Err(_) => {
                    let err = WeatherError::Geolocation(GeolocationError::Timeout);
                    self.fail(&err);
                    return Err(err);
                }
            };

        self.fetch(LocationQuery::Coordinates(position)).await
    }
}
