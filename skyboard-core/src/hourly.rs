use chrono::FixedOffset;

use crate::{
    model::{HourlyPoint, RawIntervalRecord},
    units,
};

/// Longest near-term series produced from one forecast.
pub const MAX_POINTS: usize = 24;

/// How many points the dashboard actually renders.
pub const DISPLAYED_POINTS: usize = 12;

/// Map the first [`MAX_POINTS`] records one-to-one onto hourly points.
pub fn project_hourly(records: &[RawIntervalRecord], offset: FixedOffset) -> Vec<HourlyPoint> {
    records
        .iter()
        .take(MAX_POINTS)
        .map(|r| HourlyPoint {
            time: units::format_hour(r.timestamp, offset),
            condition: r.condition.clone(),
            description: r.description.clone(),
            icon: r.icon.clone(),
            temperature_c: r.temp,
            precipitation_pct: units::probability_to_pct(r.pop),
            wind_speed_kmh: units::mps_to_kmh(r.wind_speed_mps).round() as i64,
        })
        .collect()
}

pub fn hourly_from_records(
    records: Option<&[RawIntervalRecord]>,
    offset: FixedOffset,
) -> Vec<HourlyPoint> {
    records
        .map(|r| project_hourly(r, offset))
        .unwrap_or_default()
}
