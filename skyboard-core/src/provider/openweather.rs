use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::Endpoints,
    error::{Result, UpstreamSource, WeatherError},
    model::{Coordinates, CurrentWeatherSnapshot, LocationQuery, RawIntervalRecord},
    units::{self, NOT_AVAILABLE},
};

use super::WeatherSource;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    endpoints: Endpoints,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, endpoints: Endpoints) -> Self {
        Self {
            api_key,
            endpoints,
            http: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        source: UpstreamSource,
        url: &str,
        query: &LocationQuery,
    ) -> Result<T> {
        let mut params = query.query_params();
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        debug!(%source, %url, %query, "sending OpenWeather request");

        let res = self
            .http
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| WeatherError::upstream(source, format!("request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::upstream(source, format!("failed to read body: {e}")))?;

        if !status.is_success() {
            let reason = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_owned))
                .unwrap_or_else(|| status.to_string());
            return Err(WeatherError::upstream(source, reason));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::upstream(
                source,
                format!("invalid JSON ({e}): {}", truncate_body(&body)),
            )
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, query: &LocationQuery) -> Result<OwCurrentResponse> {
        let url = format!("{}/weather", self.endpoints.weather_base_url);
        self.get_json(UpstreamSource::CurrentConditions, &url, query)
            .await
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<OwForecastResponse> {
        let url = format!("{}/forecast", self.endpoints.weather_base_url);
        self.get_json(UpstreamSource::Forecast, &url, query).await
    }

    async fn air_quality(&self, query: &LocationQuery) -> Result<OwAirPollutionResponse> {
        let url = format!("{}/air_pollution", self.endpoints.air_quality_base_url);
        self.get_json(UpstreamSource::AirQuality, &url, query).await
    }
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

/// OpenWeather reports failures as `{"cod": "404", "message": "city not found"}`.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

// Every field is optional: shape checks happen in the transforms so that a
// response missing pieces degrades to an absent result instead of a parse error.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwWeather {
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwWind {
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwSys {
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OwCoord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwCurrentResponse {
    pub name: Option<String>,
    pub dt: Option<i64>,
    pub timezone: Option<i64>,
    pub coord: Option<OwCoord>,
    pub main: Option<OwMain>,
    pub weather: Option<Vec<OwWeather>>,
    pub wind: Option<OwWind>,
    pub sys: Option<OwSys>,
    pub visibility: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwCity {
    pub name: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwForecastEntry {
    pub dt: Option<i64>,
    pub main: Option<OwMain>,
    pub weather: Option<Vec<OwWeather>>,
    pub wind: Option<OwWind>,
    pub pop: Option<f64>,
    pub visibility: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwForecastResponse {
    pub city: Option<OwCity>,
    pub list: Option<Vec<OwForecastEntry>>,
}

impl OwForecastResponse {
    pub fn timezone(&self) -> Option<i64> {
        self.city.as_ref().and_then(|c| c.timezone)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OwAqiMain {
    pub aqi: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwAirPollutionEntry {
    pub main: Option<OwAqiMain>,
    #[serde(default)]
    pub components: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwAirPollutionResponse {
    pub list: Option<Vec<OwAirPollutionEntry>>,
}

fn primary_weather(weather: Option<&Vec<OwWeather>>) -> Option<&OwWeather> {
    weather.and_then(|w| w.first())
}

fn label_or_na(value: Option<&String>) -> String {
    value
        .cloned()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Normalize the current-conditions payload.
///
/// Returns `None` when the temperature, condition, or wind object is missing.
pub fn snapshot_from_current(
    data: &OwCurrentResponse,
    city_override: Option<&str>,
) -> Option<CurrentWeatherSnapshot> {
    let main = data.main.as_ref()?;
    let weather = data.weather.as_ref()?;
    let wind = data.wind.as_ref()?;

    let offset = units::offset_from_shift(data.timezone);
    let primary = weather.first();
    let sys = data.sys.as_ref();

    let city = city_override
        .map(str::to_owned)
        .or_else(|| data.name.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let coords = data.coord.and_then(|c| match (c.lat, c.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
        _ => None,
    });

    Some(CurrentWeatherSnapshot {
        city,
        country: label_or_na(sys.and_then(|s| s.country.as_ref())),
        condition: label_or_na(primary.and_then(|w| w.main.as_ref())),
        description: label_or_na(primary.and_then(|w| w.description.as_ref())),
        icon: primary.and_then(|w| w.icon.clone()),
        temperature_c: main.temp?,
        feels_like_c: main.feels_like.or(main.temp)?,
        humidity_pct: main.humidity.unwrap_or_default(),
        wind_speed_kmh: units::mps_to_kmh(wind.speed.unwrap_or_default()),
        pressure_hpa: main.pressure,
        visibility_km: data.visibility.map(units::meters_to_km),
        sunrise: units::format_clock(sys.and_then(|s| s.sunrise), offset),
        sunset: units::format_clock(sys.and_then(|s| s.sunset), offset),
        updated_at: units::format_clock(data.dt, offset),
        coords,
    })
}

fn record_from_entry(entry: &OwForecastEntry) -> Option<RawIntervalRecord> {
    let main = entry.main.as_ref()?;
    let wind = entry.wind.as_ref()?;
    let primary = primary_weather(entry.weather.as_ref());
    let temp = main.temp?;

    Some(RawIntervalRecord {
        timestamp: entry.dt?,
        temp,
        temp_min: main.temp_min.unwrap_or(temp),
        temp_max: main.temp_max.unwrap_or(temp),
        humidity: main.humidity.unwrap_or_default(),
        pressure: main.pressure,
        wind_speed_mps: wind.speed.unwrap_or_default(),
        pop: entry.pop.unwrap_or_default(),
        condition: label_or_na(primary.and_then(|w| w.main.as_ref())),
        description: label_or_na(primary.and_then(|w| w.description.as_ref())),
        icon: primary.and_then(|w| w.icon.clone()),
        visibility_m: entry.visibility,
    })
}

/// Extract the interval series. `None` when the list is missing or any entry
/// lacks its timestamp, temperature, or wind object.
pub fn records_from_forecast(data: &OwForecastResponse) -> Option<Vec<RawIntervalRecord>> {
    data.list
        .as_ref()?
        .iter()
        .map(record_from_entry)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSize {
    Small,
    Double,
    Quadruple,
}

/// Image URL for an OpenWeather icon code such as `10d`.
pub fn icon_url(code: &str, size: IconSize) -> Option<String> {
    if code.is_empty() {
        return None;
    }
    let suffix = match size {
        IconSize::Small => "",
        IconSize::Double => "@2x",
        IconSize::Quadruple => "@4x",
    };
    Some(format!("https://openweathermap.org/img/wn/{code}{suffix}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current_json() -> serde_json::Value {
        json!({
            "name": "Tokyo",
            "dt": 1_704_067_200,
            "timezone": 32_400,
            "coord": { "lat": 35.6895, "lon": 139.6917 },
            "main": { "temp": 8.5, "feels_like": 6.1, "pressure": 1015, "humidity": 40 },
            "weather": [{ "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
            "wind": { "speed": 5.0 },
            "sys": { "country": "JP", "sunrise": 1_704_059_000, "sunset": 1_704_095_000 },
            "visibility": 10000
        })
    }

    #[test]
    fn snapshot_converts_units() {
        let data: OwCurrentResponse = serde_json::from_value(current_json()).unwrap();
        let snap = snapshot_from_current(&data, None).unwrap();

        assert_eq!(snap.city, "Tokyo");
        assert_eq!(snap.country, "JP");
        assert_eq!(snap.condition, "Clouds");
        assert!((snap.wind_speed_kmh - 18.0).abs() < 1e-9);
        assert_eq!(snap.visibility_km, Some(10.0));
        assert_eq!(snap.updated_at, "09:00");
        assert_eq!(snap.coords, Some(Coordinates { lat: 35.6895, lon: 139.6917 }));
    }

    #[test]
    fn snapshot_uses_city_override_and_na_defaults() {
        let data: OwCurrentResponse = serde_json::from_value(json!({
            "name": "Shuzenji",
            "main": { "temp": 20.0 },
            "weather": [],
            "wind": {}
        }))
        .unwrap();
        let snap = snapshot_from_current(&data, Some("Current Location")).unwrap();

        assert_eq!(snap.city, "Current Location");
        assert_eq!(snap.country, "N/A");
        assert_eq!(snap.condition, "N/A");
        assert_eq!(snap.sunrise, "N/A");
        assert_eq!(snap.visibility_km, None);
        assert_eq!(snap.coords, None);
    }

    #[test]
    fn snapshot_missing_shape_is_none() {
        let mut value = current_json();
        value.as_object_mut().unwrap().remove("wind");
        let data: OwCurrentResponse = serde_json::from_value(value).unwrap();
        assert!(snapshot_from_current(&data, None).is_none());
    }

    #[test]
    fn forecast_records_require_every_entry_to_be_well_formed() {
        let ok: OwForecastResponse = serde_json::from_value(json!({
            "list": [
                { "dt": 1, "main": { "temp": 1.0 }, "wind": { "speed": 1.0 }, "weather": [] }
            ]
        }))
        .unwrap();
        let records = records_from_forecast(&ok).unwrap();
        assert_eq!(records[0].temp_min, 1.0);
        assert_eq!(records[0].pop, 0.0);
        assert_eq!(records[0].condition, "N/A");

        let broken: OwForecastResponse = serde_json::from_value(json!({
            "list": [
                { "dt": 1, "main": { "temp": 1.0 }, "wind": { "speed": 1.0 } },
                { "dt": 2, "wind": { "speed": 1.0 } }
            ]
        }))
        .unwrap();
        assert!(records_from_forecast(&broken).is_none());
        assert!(records_from_forecast(&OwForecastResponse::default()).is_none());
    }

    #[test]
    fn error_message_prefers_provider_reason() {
        assert_eq!(
            error_message(r#"{"cod":"404","message":"city not found"}"#).as_deref(),
            Some("city not found")
        );
        assert_eq!(error_message("<html>"), None);
    }

    #[test]
    fn icon_urls() {
        assert_eq!(
            icon_url("10d", IconSize::Double).as_deref(),
            Some("https://openweathermap.org/img/wn/10d@2x.png")
        );
        assert_eq!(
            icon_url("01n", IconSize::Small).as_deref(),
            Some("https://openweathermap.org/img/wn/01n.png")
        );
        assert_eq!(icon_url("", IconSize::Quadruple), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
