//! Maps each tool operation to the upstream endpoint and query parameters it needs.

use std::{convert::TryFrom, fmt};

use crate::{error::ToolError, model::ToolArgs};

/// Upstream forecast window used when the caller does not ask for one.
pub const DEFAULT_FORECAST_DAYS: u32 = 3;

/// The five operations exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    CurrentWeather,
    Forecast,
    HistoricalWeather,
    Astronomy,
    WeatherAlerts,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CurrentWeather => "get_current_weather",
            Operation::Forecast => "get_forecast",
            Operation::HistoricalWeather => "get_historical_weather",
            Operation::Astronomy => "get_astronomy",
            Operation::WeatherAlerts => "get_weather_alerts",
        }
    }

    pub const fn all() -> &'static [Operation] {
        &[
            Operation::CurrentWeather,
            Operation::Forecast,
            Operation::HistoricalWeather,
            Operation::Astronomy,
            Operation::WeatherAlerts,
        ]
    }

    /// Upstream endpoint serving this operation.
    ///
    /// `WeatherAlerts` has no endpoint of its own: WeatherAPI embeds the
    /// `alerts` object in forecast responses, so the alerts normalizer reads
    /// a `forecast.json` document.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Operation::CurrentWeather => Endpoint::Current,
            Operation::Forecast | Operation::WeatherAlerts => Endpoint::Forecast,
            Operation::HistoricalWeather => Endpoint::History,
            Operation::Astronomy => Endpoint::Astronomy,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Operation {
    type Error = ToolError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Operation::all()
            .iter()
            .copied()
            .find(|op| op.as_str() == value)
            .ok_or_else(|| ToolError::UnknownTool { name: value.to_string() })
    }
}

/// Upstream endpoint; the request path is `{base_url}/{name}.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
    History,
    Astronomy,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current",
            Endpoint::Forecast => "forecast",
            Endpoint::History => "history",
            Endpoint::Astronomy => "astronomy",
        }
    }

    /// File-style name used as the URL path segment, e.g. `forecast.json`.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "current.json",
            Endpoint::Forecast => "forecast.json",
            Endpoint::History => "history.json",
            Endpoint::Astronomy => "astronomy.json",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One upstream call, minus the API key which the client injects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }
}

/// Build the upstream request for validated tool arguments.
pub fn route(args: &ToolArgs) -> UpstreamRequest {
    let op = args.operation();
    let params = match args {
        ToolArgs::CurrentWeather { location } | ToolArgs::WeatherAlerts { location } => {
            vec![("q", location.clone())]
        }
        ToolArgs::Forecast { location, days } => {
            let days = days.unwrap_or(DEFAULT_FORECAST_DAYS);
            vec![("q", location.clone()), ("days", days.to_string())]
        }
        ToolArgs::HistoricalWeather { location, date } | ToolArgs::Astronomy { location, date } => {
            vec![("q", location.clone()), ("dt", date.clone())]
        }
    };

    UpstreamRequest { endpoint: op.endpoint(), params }
}
