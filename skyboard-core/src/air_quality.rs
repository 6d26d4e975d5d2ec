use std::collections::BTreeMap;
use std::fmt;

use crate::{
    model::{AirQualityReading, AqiLevel, Pollutant},
    provider::openweather::OwAirPollutionResponse,
};

impl AqiLevel {
    /// OpenWeather's 1..=5 scale; anything else is `Unknown`.
    pub fn from_index(aqi: i64) -> Self {
        match aqi {
            1 => AqiLevel::Good,
            2 => AqiLevel::Fair,
            3 => AqiLevel::Moderate,
            4 => AqiLevel::Poor,
            5 => AqiLevel::VeryPoor,
            _ => AqiLevel::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Fair => "Fair",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::Poor => "Poor",
            AqiLevel::VeryPoor => "Very Poor",
            AqiLevel::Unknown => "Unknown",
        }
    }

    pub fn health_implications(&self) -> &'static str {
        match self {
            AqiLevel::Good => {
                "Air quality is satisfactory, and air pollution poses little or no risk."
            }
            AqiLevel::Fair => {
                "Air quality is acceptable. However, there may be a risk for some people."
            }
            AqiLevel::Moderate => "Members of sensitive groups may experience health effects.",
            AqiLevel::Poor => "Everyone may begin to experience health effects.",
            AqiLevel::VeryPoor => "Health warnings of emergency conditions.",
            AqiLevel::Unknown => "Air quality data is unavailable.",
        }
    }
}

impl fmt::Display for AqiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Pollutant {
    /// Tie-break order for dominant pollutant selection.
    pub const CANONICAL: [Pollutant; 6] = [
        Pollutant::Pm2_5,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::O3,
        Pollutant::So2,
        Pollutant::Co,
    ];

    /// Component key in the provider payload.
    pub fn component_key(&self) -> &'static str {
        match self {
            Pollutant::Pm2_5 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
            Pollutant::So2 => "so2",
            Pollutant::Co => "co",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm2_5 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO₂",
            Pollutant::O3 => "O₃",
            Pollutant::So2 => "SO₂",
            Pollutant::Co => "CO",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pollutant with the strictly highest concentration; ties keep the earlier
/// entry of [`Pollutant::CANONICAL`]. Missing components are skipped.
pub fn dominant_pollutant(components: &BTreeMap<String, f64>) -> Option<Pollutant> {
    let mut best: Option<(Pollutant, f64)> = None;
    for pollutant in Pollutant::CANONICAL {
        let Some(&value) = components.get(pollutant.component_key()) else {
            continue;
        };
        if best.is_none_or(|(_, max)| value > max) {
            best = Some((pollutant, value));
        }
    }
    best.map(|(p, _)| p)
}

pub fn classify(aqi: i64, components: BTreeMap<String, f64>) -> AirQualityReading {
    let level = AqiLevel::from_index(aqi);
    AirQualityReading {
        aqi,
        level,
        dominant_pollutant: dominant_pollutant(&components),
        health_implications: level.health_implications().to_string(),
        components,
    }
}

/// Reading from the first sample of the air-pollution payload, or `None`
/// when the payload has no sample or no index.
pub fn reading_from_response(data: &OwAirPollutionResponse) -> Option<AirQualityReading> {
    let entry = data.list.as_ref()?.first()?;
    let aqi = entry.main?.aqi?;
    Some(classify(aqi, entry.components.clone()))
}
