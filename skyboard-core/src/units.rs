//! Conversions from OpenWeather's metric units and epoch timestamps into
//! display values.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Used wherever a timestamp or label is missing from the payload.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn mps_to_kmh(speed: f64) -> f64 {
    speed * 3.6
}

pub fn meters_to_km(distance: f64) -> f64 {
    distance / 1000.0
}

/// Probability in `0..=1` to a whole percentage.
pub fn probability_to_pct(pop: f64) -> i64 {
    (pop * 100.0).round() as i64
}

pub fn celsius_to_fahrenheit(temp: f64) -> f64 {
    temp * 9.0 / 5.0 + 32.0
}

/// Offset east of UTC for a provider `timezone` shift in seconds. Falls back
/// to UTC when the shift is missing or out of range.
pub fn offset_from_shift(shift_seconds: Option<i64>) -> FixedOffset {
    shift_seconds
        .and_then(|s| i32::try_from(s).ok())
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

pub fn local_datetime(ts: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&offset))
}

/// Calendar date at the location, used as the daily bucketing key.
pub fn local_date(ts: i64, offset: FixedOffset) -> Option<NaiveDate> {
    local_datetime(ts, offset).map(|dt| dt.date_naive())
}

/// "06:15" style clock time, or `N/A`.
pub fn format_clock(ts: Option<i64>, offset: FixedOffset) -> String {
    ts.and_then(|ts| local_datetime(ts, offset))
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// "3 PM" style hour label.
pub fn format_hour(ts: i64, offset: FixedOffset) -> String {
    local_datetime(ts, offset)
        .map(|dt| dt.format("%-I %p").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// "Jan 5" style date label.
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Full weekday name, e.g. "Monday".
pub fn format_day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_speed_and_distance() {
        assert!((mps_to_kmh(10.0) - 36.0).abs() < 1e-9);
        assert!((meters_to_km(10_000.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn probability_rounds_to_nearest_percent() {
        assert_eq!(probability_to_pct(0.0), 0);
        assert_eq!(probability_to_pct(0.456), 46);
        assert_eq!(probability_to_pct(1.0), 100);
    }

    #[test]
    fn fahrenheit_conversion() {
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 1e-9);
        assert!((celsius_to_fahrenheit(-40.0) + 40.0).abs() < 1e-9);
    }

    #[test]
    fn clock_uses_location_offset() {
        // 2024-01-01T00:00:00Z
        let ts = 1_704_067_200;
        assert_eq!(format_clock(Some(ts), offset_from_shift(None)), "00:00");
        assert_eq!(format_clock(Some(ts), offset_from_shift(Some(9 * 3600))), "09:00");
        assert_eq!(format_clock(None, offset_from_shift(None)), "N/A");
    }

    #[test]
    fn hour_label_is_twelve_hour() {
        let ts = 1_704_067_200 + 15 * 3600;
        assert_eq!(format_hour(ts, offset_from_shift(None)), "3 PM");
        assert_eq!(format_hour(1_704_067_200, offset_from_shift(None)), "12 AM");
    }

    #[test]
    fn local_date_crosses_midnight_with_offset() {
        // 2024-01-01T20:00:00Z is already Jan 2 in Tokyo
        let ts = 1_704_067_200 + 20 * 3600;
        let utc = local_date(ts, offset_from_shift(None)).unwrap();
        let tokyo = local_date(ts, offset_from_shift(Some(9 * 3600))).unwrap();
        assert_eq!(utc.to_string(), "2024-01-01");
        assert_eq!(tokyo.to_string(), "2024-01-02");
    }

    #[test]
    fn out_of_range_shift_falls_back_to_utc() {
        assert_eq!(offset_from_shift(Some(999_999)).local_minus_utc(), 0);
    }

    #[test]
    fn date_labels() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_date_label(date), "Jan 1");
        assert_eq!(format_day_name(date), "Monday");
    }
}
