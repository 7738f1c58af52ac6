//! The catalog of tools handed to the host, and dispatch by tool name.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::{
    client::Upstream,
    error::ToolError,
    model::ToolArgs,
    normalize::normalize,
    router::{DEFAULT_FORECAST_DAYS, Operation, route},
};

/// A named callable exposed to the host.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema of the `arguments` object accepted by [`Tool::call`].
    fn input_schema(&self) -> Value;

    async fn call(&self, arguments: Value) -> Result<Value, ToolError>;
}

/// Catalog entry describing one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// One WeatherAPI operation: validate, route, send, normalize.
#[derive(Debug)]
pub struct WeatherTool {
    op: Operation,
    upstream: Arc<dyn Upstream>,
}

impl WeatherTool {
    pub fn new(op: Operation, upstream: Arc<dyn Upstream>) -> Self {
        Self { op, upstream }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        self.op.as_str()
    }

    fn description(&self) -> &'static str {
        match self.op {
            Operation::CurrentWeather => "Get current weather conditions.",
            Operation::Forecast => "Get daily weather forecast for specified days.",
            Operation::HistoricalWeather => "Get historical weather for a specific date.",
            Operation::Astronomy => "Get astronomy details (sunrise, sunset, moon phase).",
            Operation::WeatherAlerts => "Get weather alerts for a location.",
        }
    }

    fn input_schema(&self) -> Value {
        let location = json!({
            "type": "string",
            "description": "City name, lat/long pair, postcode, IP address or similar"
        });
        let date = json!({
            "type": "string",
            "description": "Date in YYYY-MM-DD format"
        });

        match self.op {
            Operation::CurrentWeather | Operation::WeatherAlerts => json!({
                "type": "object",
                "properties": { "location": location },
                "required": ["location"]
            }),
            Operation::Forecast => json!({
                "type": "object",
                "properties": {
                    "location": location,
                    "days": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Number of forecast days",
                        "default": DEFAULT_FORECAST_DAYS
                    }
                },
                "required": ["location"]
            }),
            Operation::HistoricalWeather | Operation::Astronomy => json!({
                "type": "object",
                "properties": { "location": location, "date": date },
                "required": ["location", "date"]
            }),
        }
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let args = ToolArgs::parse(self.op, arguments)?;
        let request = route(&args);
        let doc = self.upstream.send(&request).await?;
        normalize(&args, &doc)
    }
}

/// Name → tool mapping built once at startup.
///
/// Holds no per-call state, so a shared `&ToolRegistry` can serve any number
/// of concurrent calls.
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with every WeatherAPI operation bound to `upstream`.
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        let mut registry = Self::empty();
        for op in Operation::all() {
            registry.register(Arc::new(WeatherTool::new(*op, upstream.clone())));
        }
        registry
    }

    pub fn empty() -> Self {
        Self { tools: BTreeMap::new() }
    }

    /// Add or replace a tool under its own name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.keys().copied()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|t| ToolDescriptor {
                name: t.name(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool =
            self.tools.get(name).ok_or_else(|| ToolError::UnknownTool { name: name.to_string() })?;

        info!(tool = name, "dispatching tool call");
        let result = tool.call(arguments).await;
        if let Err(err) = &result {
            warn!(tool = name, kind = err.kind(), error = %err, "tool call failed");
        }
        result
    }

    /// Like [`ToolRegistry::call`], but abandons the in-flight upstream request
    /// once `timeout` elapses.
    pub async fn call_with_timeout(
        &self,
        name: &str,
        arguments: Value,
        timeout: Duration,
    ) -> Result<Value, ToolError> {
        tokio::time::timeout(timeout, self.call(name, arguments))
            .await
            .map_err(|_| ToolError::Cancelled { tool: name.to_string(), timeout })?
    }
}
