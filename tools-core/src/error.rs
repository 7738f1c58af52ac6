use std::time::Duration;

use thiserror::Error;

/// Failure of a single tool invocation.
///
/// Every variant is terminal for the call that produced it: nothing is
/// retried and no partial result is returned alongside the error.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Caller arguments were missing or had the wrong type. Raised before any
    /// upstream request is issued.
    #[error("invalid arguments for '{tool}': {message}")]
    Validation { tool: String, message: String },

    #[error("unknown tool '{name}'")]
    UnknownTool { name: String },

    /// Upstream could not be reached (DNS, connection refused, timeout...).
    #[error("failed to reach WeatherAPI ({endpoint}): {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-2xx status. `body` is the raw response text.
    #[error("WeatherAPI {endpoint} request failed with status {status}: {}", truncate_body(.body))]
    UpstreamStatus {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// Upstream answered 2xx but the document could not be interpreted.
    /// `context` names the tool or endpoint whose response was rejected.
    #[error("unexpected WeatherAPI response ({context}): {message}")]
    Shape { context: &'static str, message: String },

    #[error("'{tool}' did not finish within {timeout:?}")]
    Cancelled { tool: String, timeout: Duration },
}

impl ToolError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Validation { .. } => "validation",
            ToolError::UnknownTool { .. } => "unknown_tool",
            ToolError::Transport { .. } => "transport",
            ToolError::UpstreamStatus { .. } => "upstream_status",
            ToolError::Shape { .. } => "shape",
            ToolError::Cancelled { .. } => "cancelled",
        }
    }

    pub(crate) fn shape(context: &'static str, message: impl Into<String>) -> Self {
        ToolError::Shape { context, message: message.into() }
    }
}

/// Problems resolving client settings at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "no WeatherAPI key configured.\n\
         Hint: set WEATHER_API_KEY or run `weather-tools configure`."
    )]
    MissingApiKey,

    #[error("WeatherAPI key is the placeholder value '{0}'; configure a real key")]
    PlaceholderApiKey(String),

    #[error("invalid timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
