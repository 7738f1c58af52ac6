use std::{sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use serde_json::{Value, json};
use tracing::debug;
use weather_tools_core::{Config, Operation, ToolRegistry, WeatherApiClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-tools", version, about = "WeatherAPI.com tools")]
pub struct Cli {
    /// Abandon the call if it has not finished after this many seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a WeatherAPI key in the config file.
    Configure,

    /// Print the tool catalog with argument schemas.
    Tools,

    /// Invoke a tool by name with JSON arguments.
    Call {
        /// Tool name, e.g. "get_forecast".
        name: String,

        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Current conditions.
    Current { location: String },

    /// Daily forecast.
    Forecast {
        location: String,

        /// Number of days; upstream default window is used when absent.
        #[arg(long)]
        days: Option<u32>,
    },

    /// Weather on a past date.
    History {
        location: String,

        /// Date in YYYY-MM-DD format.
        #[arg(long)]
        date: String,
    },

    /// Sunrise, sunset and moon details.
    Astronomy {
        location: String,

        /// Date in YYYY-MM-DD format; today if absent.
        #[arg(long)]
        date: Option<String>,
    },

    /// Active weather alerts.
    Alerts { location: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let (name, args) = match self.command {
            Command::Configure => return configure(),
            Command::Tools => {
                let registry = build_registry()?;
                return print_json(&serde_json::to_value(registry.descriptors())?);
            }
            Command::Call { name, args } => {
                let args: Value = serde_json::from_str(&args)
                    .with_context(|| format!("--args is not valid JSON: {args}"))?;
                (name, args)
            }
            Command::Current { location } => {
                (Operation::CurrentWeather.to_string(), json!({ "location": location }))
            }
            Command::Forecast { location, days } => {
                let mut args = json!({ "location": location });
                if let Some(days) = days {
                    args["days"] = json!(days);
                }
                (Operation::Forecast.to_string(), args)
            }
            Command::History { location, date } => (
                Operation::HistoricalWeather.to_string(),
                json!({ "location": location, "date": date }),
            ),
            Command::Astronomy { location, date } => {
                let date = date.unwrap_or_else(today);
                (Operation::Astronomy.to_string(), json!({ "location": location, "date": date }))
            }
            Command::Alerts { location } => {
                (Operation::WeatherAlerts.to_string(), json!({ "location": location }))
            }
        };

        let registry = build_registry()?;
        debug!(tool = %name, "invoking tool from command line");

        let result = match self.timeout_secs {
            Some(secs) => {
                registry.call_with_timeout(&name, args, Duration::from_secs(secs)).await?
            }
            None => registry.call(&name, args).await?,
        };

        print_json(&result)
    }
}

/// Resolve settings up front so a missing key fails before any request.
fn build_registry() -> anyhow::Result<ToolRegistry> {
    let settings = Config::load()?.resolve()?;
    debug!(?settings, "resolved client settings");

    let client = WeatherApiClient::new(settings).context("Failed to build HTTP client")?;
    Ok(ToolRegistry::new(Arc::new(client)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("WeatherAPI key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.resolve_with(|_| None).context("Refusing to store this key")?;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_shortcut_parses_days() {
        let cli = Cli::parse_from(["weather-tools", "forecast", "London", "--days", "5"]);
        match cli.command {
            Command::Forecast { location, days } => {
                assert_eq!(location, "London");
                assert_eq!(days, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn call_defaults_to_empty_arguments() {
        let cli = Cli::parse_from(["weather-tools", "call", "get_current_weather"]);
        match cli.command {
            Command::Call { name, args } => {
                assert_eq!(name, "get_current_weather");
                assert_eq!(args, "{}");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn timeout_is_accepted_after_subcommand() {
        let cli = Cli::parse_from(["weather-tools", "alerts", "Oslo", "--timeout-secs", "4"]);
        assert_eq!(cli.timeout_secs, Some(4));
    }

    #[test]
    fn today_is_iso_date() {
        let date = today();
        assert!(chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }
}
