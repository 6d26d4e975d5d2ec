//! Reduction of the three-hour forecast series into per-day summaries.

use chrono::{FixedOffset, NaiveDate};

use crate::{
    model::{DailySummary, RawIntervalRecord},
    units,
};

/// Number of days the dashboard shows.
pub const MAX_DAYS: usize = 5;

/// Running frequency count that remembers which label reached the current
/// maximum first. A label only takes the lead by strictly exceeding it.
#[derive(Debug, Default)]
struct ConditionTally {
    counts: Vec<(String, usize)>,
    leader: Option<usize>,
}

impl ConditionTally {
    fn add(&mut self, label: &str) {
        let idx = match self.counts.iter().position(|(l, _)| l == label) {
            Some(idx) => idx,
            None => {
                self.counts.push((label.to_owned(), 0));
                self.counts.len() - 1
            }
        };
        self.counts[idx].1 += 1;

        let best = self.leader.map(|i| self.counts[i].1).unwrap_or(0);
        if self.counts[idx].1 > best {
            self.leader = Some(idx);
        }
    }

    fn dominant(&self) -> String {
        self.leader
            .map(|i| self.counts[i].0.clone())
            .unwrap_or_else(|| units::NOT_AVAILABLE.to_string())
    }
}

#[derive(Debug)]
struct DayBucket {
    date: NaiveDate,
    icon: Option<String>,
    min_temp: f64,
    max_temp: f64,
    conditions: ConditionTally,
    precipitation: Vec<f64>,
    humidity: Vec<f64>,
    wind_kmh: Vec<f64>,
}

impl DayBucket {
    fn new(date: NaiveDate, first: &RawIntervalRecord) -> Self {
        Self {
            date,
            icon: first.icon.clone(),
            min_temp: first.temp_min,
            max_temp: first.temp_max,
            conditions: ConditionTally::default(),
            precipitation: Vec::new(),
            humidity: Vec::new(),
            wind_kmh: Vec::new(),
        }
    }

    fn push(&mut self, record: &RawIntervalRecord) {
        self.min_temp = self.min_temp.min(record.temp_min);
        self.max_temp = self.max_temp.max(record.temp_max);
        self.conditions.add(&record.condition);
        self.precipitation.push(record.pop * 100.0);
        self.humidity.push(record.humidity);
        self.wind_kmh.push(units::mps_to_kmh(record.wind_speed_mps));
    }

    fn summarize(self) -> DailySummary {
        DailySummary {
            date_label: units::format_date_label(self.date),
            day: units::format_day_name(self.date),
            condition: self.conditions.dominant(),
            icon: self.icon,
            max_temp_c: self.max_temp,
            min_temp_c: self.min_temp,
            precipitation_pct: rounded_mean(&self.precipitation),
            humidity_pct: rounded_mean(&self.humidity),
            wind_speed_kmh: rounded_mean(&self.wind_kmh),
            date: self.date,
        }
    }
}

fn rounded_mean(values: &[f64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    (values.iter().sum::<f64>() / values.len() as f64).round() as i64
}

/// Group records by calendar date at `offset` and reduce each day.
///
/// Days are taken in the order they are first encountered, capped at
/// [`MAX_DAYS`], and returned sorted by date. Records whose timestamp cannot
/// be represented are skipped.
pub fn aggregate_daily(records: &[RawIntervalRecord], offset: FixedOffset) -> Vec<DailySummary> {
    let mut buckets: Vec<DayBucket> = Vec::new();

    for record in records {
        let Some(date) = units::local_date(record.timestamp, offset) else {
            continue;
        };

        match buckets.iter_mut().find(|b| b.date == date) {
            Some(bucket) => bucket.push(record),
            None => {
                let mut bucket = DayBucket::new(date, record);
                bucket.push(record);
                buckets.push(bucket);
            }
        }
    }

    buckets.truncate(MAX_DAYS);
    buckets.sort_by_key(|b| b.date);
    buckets.into_iter().map(DayBucket::summarize).collect()
}

/// Daily summaries for an optional record series; malformed input (`None`)
/// yields an empty list.
pub fn daily_from_records(
    records: Option<&[RawIntervalRecord]>,
    offset: FixedOffset,
) -> Vec<DailySummary> {
    records
        .map(|r| aggregate_daily(r, offset))
        .unwrap_or_default()
}
