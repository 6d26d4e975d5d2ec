use chrono::Local;
use skyboard_core::{
    Units, WeatherReport,
    hourly::DISPLAYED_POINTS,
    provider::openweather::{IconSize, icon_url},
};

pub fn print_report(report: &WeatherReport, units: Units, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", format_report(report, units));
    }
    Ok(())
}

fn temp(units: Units, celsius: f64) -> String {
    format!("{:.0}{}", units.temperature(celsius), units.temperature_symbol())
}

pub fn format_report(report: &WeatherReport, units: Units) -> String {
    let mut out = String::new();
    let c = &report.current;

    out.push_str(&format!("{}, {}\n", c.city, c.country));
    out.push_str(&format!(
        "  {} ({}), {} (feels like {})\n",
        c.condition,
        c.description,
        temp(units, c.temperature_c),
        temp(units, c.feels_like_c),
    ));
    out.push_str(&format!(
        "  Humidity {:.0}%  Wind {:.1} km/h",
        c.humidity_pct, c.wind_speed_kmh
    ));
    if let Some(p) = c.pressure_hpa {
        out.push_str(&format!("  Pressure {p:.0} hPa"));
    }
    if let Some(v) = c.visibility_km {
        out.push_str(&format!("  Visibility {v:.1} km"));
    }
    out.push('\n');
    out.push_str(&format!(
        "  Sunrise {}  Sunset {}  Updated {} (fetched {})\n",
        c.sunrise,
        c.sunset,
        c.updated_at,
        report.fetched_at.with_timezone(&Local).format("%H:%M")
    ));
    if let Some(url) = c.icon.as_deref().and_then(|i| icon_url(i, IconSize::Double)) {
        out.push_str(&format!("  Icon {url}\n"));
    }

    if let Some(aq) = &report.air_quality {
        out.push_str(&format!("\nAir quality: {} (AQI {})", aq.level, aq.aqi));
        if let Some(p) = aq.dominant_pollutant {
            out.push_str(&format!(", mostly {p}"));
        }
        out.push_str(&format!("\n  {}\n", aq.health_implications));
    }

    if !report.hourly.is_empty() {
        out.push_str("\nNext hours\n");
        for h in report.hourly.iter().take(DISPLAYED_POINTS) {
            out.push_str(&format!(
                "  {:>5}  {:<12} {:>6}  {:>3}% rain  {:>3} km/h\n",
                h.time,
                h.condition,
                temp(units, h.temperature_c),
                h.precipitation_pct,
                h.wind_speed_kmh
            ));
        }
    }

    if !report.daily.is_empty() {
        out.push_str("\nNext days\n");
        for d in &report.daily {
            out.push_str(&format!(
                "  {:<9} {:<6}  {:<12} {:>6} / {:<6}  {:>3}% rain  {:>3}% hum  {:>3} km/h\n",
                d.day,
                d.date_label,
                d.condition,
                temp(units, d.max_temp_c),
                temp(units, d.min_temp_c),
                d.precipitation_pct,
                d.humidity_pct,
                d.wind_speed_kmh
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use skyboard_core::{CurrentWeatherSnapshot, DailySummary, HourlyPoint};

    fn report() -> WeatherReport {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        WeatherReport {
            location: "Tokyo".into(),
            current: CurrentWeatherSnapshot {
                city: "Tokyo".into(),
                country: "JP".into(),
                condition: "Clouds".into(),
                description: "broken clouds".into(),
                icon: Some("04d".into()),
                temperature_c: 10.0,
                feels_like_c: 8.0,
                humidity_pct: 45.0,
                wind_speed_kmh: 14.8,
                pressure_hpa: Some(1018.0),
                visibility_km: Some(10.0),
                sunrise: "06:30".into(),
                sunset: "16:40".into(),
                updated_at: "09:00".into(),
                coords: None,
            },
            daily: vec![DailySummary {
                date,
                date_label: "Jan 1".into(),
                day: "Monday".into(),
                condition: "Rain".into(),
                icon: None,
                max_temp_c: 12.0,
                min_temp_c: 4.0,
                precipitation_pct: 60,
                humidity_pct: 70,
                wind_speed_kmh: 11,
            }],
            hourly: (0..24)
                .map(|i| HourlyPoint {
                    time: format!("{i}h"),
                    condition: "Clear".into(),
                    description: "clear sky".into(),
                    icon: None,
                    temperature_c: 5.0,
                    precipitation_pct: 0,
                    wind_speed_kmh: 3,
                })
                .collect(),
            air_quality: None,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn shows_only_first_twelve_hours() {
        let text = format_report(&report(), Units::Metric);
        assert!(text.contains(" 11h "));
        assert!(!text.contains(" 12h "));
    }

    #[test]
    fn imperial_converts_temperatures() {
        let text = format_report(&report(), Units::Imperial);
        assert!(text.contains("50°F"));
        assert!(!text.contains("°C"));
    }

    #[test]
    fn includes_icon_url_and_daily_row() {
        let text = format_report(&report(), Units::Metric);
        assert!(text.contains("https://openweathermap.org/img/wn/04d@2x.png"));
        assert!(text.contains("Monday"));
    }
}
