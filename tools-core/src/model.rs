use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{error::ToolError, router::Operation};

/// Validated arguments for one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolArgs {
    CurrentWeather { location: String },
    Forecast { location: String, days: Option<u32> },
    HistoricalWeather { location: String, date: String },
    Astronomy { location: String, date: String },
    WeatherAlerts { location: String },
}

#[derive(Deserialize)]
struct LocationArgs {
    location: String,
}

#[derive(Deserialize)]
struct ForecastArgs {
    location: String,
    #[serde(default)]
    days: Option<u32>,
}

#[derive(Deserialize)]
struct DatedArgs {
    location: String,
    date: String,
}

impl ToolArgs {
    /// Check presence and types of the raw JSON arguments for `op`.
    ///
    /// `null` is accepted as "no arguments" so that a missing required field
    /// is reported by name. Unknown extra fields are ignored.
    pub fn parse(op: Operation, raw: Value) -> Result<Self, ToolError> {
        let raw = match raw {
            Value::Null => Value::Object(Default::default()),
            obj @ Value::Object(_) => obj,
            other => {
                return Err(ToolError::Validation {
                    tool: op.to_string(),
                    message: format!("arguments must be a JSON object, got {}", json_type(&other)),
                });
            }
        };

        let args = match op {
            Operation::CurrentWeather => {
                let LocationArgs { location } = decode(op, raw)?;
                ToolArgs::CurrentWeather { location }
            }
            Operation::WeatherAlerts => {
                let LocationArgs { location } = decode(op, raw)?;
                ToolArgs::WeatherAlerts { location }
            }
            Operation::Forecast => {
                let ForecastArgs { location, days } = decode(op, raw)?;
                ToolArgs::Forecast { location, days }
            }
            Operation::HistoricalWeather => {
                let DatedArgs { location, date } = decode(op, raw)?;
                ToolArgs::HistoricalWeather { location, date }
            }
            Operation::Astronomy => {
                let DatedArgs { location, date } = decode(op, raw)?;
                ToolArgs::Astronomy { location, date }
            }
        };

        Ok(args)
    }

    pub fn operation(&self) -> Operation {
        match self {
            ToolArgs::CurrentWeather { .. } => Operation::CurrentWeather,
            ToolArgs::Forecast { .. } => Operation::Forecast,
            ToolArgs::HistoricalWeather { .. } => Operation::HistoricalWeather,
            ToolArgs::Astronomy { .. } => Operation::Astronomy,
            ToolArgs::WeatherAlerts { .. } => Operation::WeatherAlerts,
        }
    }
}

fn decode<T: DeserializeOwned>(op: Operation, raw: Value) -> Result<T, ToolError> {
    serde_json::from_value(raw)
        .map_err(|e| ToolError::Validation { tool: op.to_string(), message: e.to_string() })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Result of `get_current_weather`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub last_updated: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: String,
    pub icon: String,
    pub wind_kph: f64,
    pub humidity: i64,
    pub uv_index: f64,
}

/// One entry of `get_forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub condition: String,
    pub icon: String,
    pub uv_index: f64,
}

/// Result of `get_historical_weather`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDay {
    /// The date the caller asked for.
    pub date: String,
    pub avgtemp_c: f64,
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub condition: String,
}

/// Result of `get_astronomy`. Values are upstream's strings, e.g. "05:43 AM".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstronomyInfo {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
}

/// One entry of `get_weather_alerts`. Fields upstream omitted serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub headline: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub effective_date: Option<String>,
    pub expires_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forecast_days_are_optional() {
        let args = ToolArgs::parse(Operation::Forecast, json!({"location": "Rome"})).unwrap();
        assert_eq!(args, ToolArgs::Forecast { location: "Rome".into(), days: None });

        let args =
            ToolArgs::parse(Operation::Forecast, json!({"location": "Rome", "days": 5})).unwrap();
        assert_eq!(args, ToolArgs::Forecast { location: "Rome".into(), days: Some(5) });
    }

    #[test]
    fn missing_required_field_is_named() {
        let err = ToolArgs::parse(Operation::Astronomy, json!({"location": "Rome"})).unwrap_err();
        match err {
            ToolError::Validation { tool, message } => {
                assert_eq!(tool, "get_astronomy");
                assert!(message.contains("date"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn null_arguments_report_missing_location() {
        let err = ToolArgs::parse(Operation::CurrentWeather, Value::Null).unwrap_err();
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = ToolArgs::parse(Operation::CurrentWeather, json!({"location": 42})).unwrap_err();
        assert_eq!(err.kind(), "validation");

        let err = ToolArgs::parse(Operation::Forecast, json!({"location": "x", "days": "three"}))
            .unwrap_err();
        assert_eq!(err.kind(), "validation");

        let err = ToolArgs::parse(Operation::Forecast, json!({"location": "x", "days": -1}))
            .unwrap_err();
        assert_eq!(err.kind(), "validation");

        let err = ToolArgs::parse(Operation::WeatherAlerts, json!(["Oslo"])).unwrap_err();
        assert!(err.to_string().contains("got array"));
    }

    #[test]
    fn alert_absent_fields_serialize_as_null() {
        let alert = Alert {
            headline: Some("Flood Warning".into()),
            severity: None,
            description: None,
            effective_date: None,
            expires_date: None,
        };
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["severity"], Value::Null);
        assert_eq!(value.as_object().unwrap().len(), 5);
    }
}
