//! WeatherAPI.com exposed as a small set of typed tools.
//!
//! This crate defines:
//! - Configuration & credential resolution
//! - The HTTP client adapter and endpoint routing
//! - Normalizers turning upstream JSON into stable output records
//! - The tool registry a host dispatches calls through
//!
//! It is used by `weather-tools-cli`, but the registry can be handed to any
//! host integration.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod registry;
pub mod router;

pub use client::{Upstream, WeatherApiClient};
pub use config::{ClientSettings, Config};
pub use error::{ConfigError, ToolError};
pub use model::{Alert, AstronomyInfo, CurrentWeather, ForecastDay, HistoricalDay, ToolArgs};
pub use registry::{Tool, ToolDescriptor, ToolRegistry};
pub use router::{Endpoint, Operation, UpstreamRequest};
