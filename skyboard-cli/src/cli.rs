use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Select, Text};
use skyboard_core::{
    Config, ConfiguredGeolocator, LocationQuery, Orchestrator, SearchHistory, Units,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyboard", version, about = "Weather dashboard in your terminal")]
pub struct Cli {
    /// Log request details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for Units {
    fn from(value: UnitsArg) -> Self {
        match value {
            UnitsArg::Metric => Units::Metric,
            UnitsArg::Imperial => Units::Imperial,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and display preferences.
    Configure {
        /// API key; prompted for when omitted.
        #[arg(long)]
        api_key: Option<String>,

        #[arg(long, value_enum)]
        units: Option<UnitsArg>,

        /// Coordinates reported by `skyboard here`, as LAT,LON.
        #[arg(long, value_parser = parse_coordinates, allow_hyphen_values = true)]
        home: Option<(f64, f64)>,
    },

    /// Show weather for a city or a coordinate pair.
    Show {
        /// City name, e.g. "Tokyo".
        #[arg(conflicts_with_all = ["lat", "lon"], required_unless_present = "lat")]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show weather for the configured home position.
    Here {
        #[arg(long)]
        json: bool,
    },

    /// List recent searches.
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// Forget all recent searches.
    Clear,
}

fn parse_coordinates(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| "expected LAT,LON".to_string())?;
    let lat = lat.trim().parse().map_err(|e| format!("invalid latitude: {e}"))?;
    let lon = lon.trim().parse().map_err(|e| format!("invalid longitude: {e}"))?;
    Ok((lat, lon))
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure {
                api_key,
                units,
                home,
            } => configure(api_key, units, home),
            Command::Show {
                city,
                lat,
                lon,
                json,
            } => {
                let query = match (city, lat, lon) {
                    (Some(city), _, _) => LocationQuery::city(city),
                    (None, Some(lat), Some(lon)) => LocationQuery::coordinates(lat, lon),
                    _ => bail!("Provide a city name or both --lat and --lon."),
                };
                show(query, json).await
            }
            Command::Here { json } => here(json).await,
            Command::History { action } => history(action),
        }
    }
}

fn configure(
    api_key: Option<String>,
    units: Option<UnitsArg>,
    home: Option<(f64, f64)>,
) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = match api_key {
        Some(key) => key,
        None => Text::new("OpenWeather API key:")
            .with_help_message("Create one at https://home.openweathermap.org/api_keys")
            .prompt()
            .context("Failed to read API key")?,
    };
    config.set_api_key(api_key.trim().to_string());

    config.units = match units {
        Some(units) => units.into(),
        None => {
            let choice = Select::new("Temperature units:", vec!["metric", "imperial"])
                .prompt()
                .context("Failed to read unit preference")?;
            if choice == "imperial" { Units::Imperial } else { Units::Metric }
        }
    };

    if let Some((lat, lon)) = home {
        config.home = Some(skyboard_core::Coordinates { lat, lon });
    }

    config.save()?;
    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn open_orchestrator(config: &Config) -> anyhow::Result<Orchestrator<skyboard_core::OpenWeatherClient>> {
    let history = SearchHistory::open_default()?;
    Ok(Orchestrator::from_config(config, history))
}

async fn show(query: LocationQuery, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut orch = open_orchestrator(&config)?;

    match orch.fetch(query).await? {
        Some(report) => render::print_report(report, config.units, json),
        None => bail!("Please enter a city name."),
    }
}

async fn here(json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let geolocator = ConfiguredGeolocator::new(config.home);
    let mut orch = open_orchestrator(&config)?;

    match orch.fetch_current_location(&geolocator).await? {
        Some(report) => render::print_report(report, config.units, json),
        None => Ok(()),
    }
}

fn history(action: Option<HistoryAction>) -> anyhow::Result<()> {
    let mut history = SearchHistory::open_default()?;

    match action {
        Some(HistoryAction::Clear) => {
            history.clear()?;
            println!("Search history cleared.");
        }
        None if history.is_empty() => println!("No recent searches."),
        None => {
            for (i, name) in history.entries().iter().enumerate() {
                println!("{}. {name}", i + 1);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_show_by_city() {
        let cli = Cli::try_parse_from(["skyboard", "show", "Tokyo", "--json"]).unwrap();
        match cli.command {
            Command::Show { city, json, .. } => {
                assert_eq!(city.as_deref(), Some("Tokyo"));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_show_by_coordinates() {
        let cli =
            Cli::try_parse_from(["skyboard", "show", "--lat", "51.5", "--lon", "-0.12"]).unwrap();
        match cli.command {
            Command::Show { city, lat, lon, .. } => {
                assert!(city.is_none());
                assert_eq!(lat, Some(51.5));
                assert_eq!(lon, Some(-0.12));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_without_lon_is_rejected() {
        assert!(Cli::try_parse_from(["skyboard", "show", "--lat", "51.5"]).is_err());
    }

    #[test]
    fn coordinates_parser() {
        assert_eq!(parse_coordinates("35.6, 139.7"), Ok((35.6, 139.7)));
        assert!(parse_coordinates("35.6").is_err());
        assert!(parse_coordinates("a,b").is_err());
    }
}
