//! Projections from WeatherAPI JSON documents to the stable tool outputs.
//!
//! Outer paths are walked with [`at`] so a missing object is reported by its
//! dotted path; leaf records are decoded into the `Wa*` schema structs below.
//! Only `alerts.alert` may be absent, everything else is required.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::ToolError,
    model::{Alert, AstronomyInfo, CurrentWeather, ForecastDay, HistoricalDay, ToolArgs},
    router::Operation,
};

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaConditionText {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    last_updated: String,
    temp_c: f64,
    temp_f: f64,
    condition: WaCondition,
    wind_kph: f64,
    humidity: i64,
    uv: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDayStats {
    maxtemp_c: f64,
    mintemp_c: f64,
    condition: WaCondition,
    uv: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaForecastDayStats,
}

#[derive(Debug, Deserialize)]
struct WaHistoryDayStats {
    avgtemp_c: f64,
    maxtemp_c: f64,
    mintemp_c: f64,
    condition: WaConditionText,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
    moonrise: String,
    moonset: String,
    moon_phase: String,
}

#[derive(Debug, Deserialize)]
struct WaAlert {
    headline: Option<String>,
    severity: Option<String>,
    desc: Option<String>,
    effective: Option<String>,
    expires: Option<String>,
}

/// Follow `path` through nested objects, failing with the dotted path walked so far.
fn at<'a>(tool: Operation, doc: &'a Value, path: &[&str]) -> Result<&'a Value, ToolError> {
    let mut node = doc;
    for (depth, key) in path.iter().enumerate() {
        node = node.get(*key).filter(|v| !v.is_null()).ok_or_else(|| {
            ToolError::shape(tool.as_str(), format!("missing `{}`", path[..=depth].join(".")))
        })?;
    }
    Ok(node)
}

fn decode<T: DeserializeOwned>(tool: Operation, path: &str, node: &Value) -> Result<T, ToolError> {
    T::deserialize(node)
        .map_err(|e| ToolError::shape(tool.as_str(), format!("at `{path}`: {e}")))
}

fn forecast_days_node(tool: Operation, doc: &Value) -> Result<&Vec<Value>, ToolError> {
    at(tool, doc, &["forecast", "forecastday"])?
        .as_array()
        .ok_or_else(|| ToolError::shape(tool.as_str(), "`forecast.forecastday` is not an array"))
}

/// `current.*` of a `current.json` document.
pub fn current_weather(doc: &Value) -> Result<CurrentWeather, ToolError> {
    let tool = Operation::CurrentWeather;
    let current: WaCurrent = decode(tool, "current", at(tool, doc, &["current"])?)?;

    Ok(CurrentWeather {
        last_updated: current.last_updated,
        temp_c: current.temp_c,
        temp_f: current.temp_f,
        condition: current.condition.text,
        icon: current.condition.icon,
        wind_kph: current.wind_kph,
        humidity: current.humidity,
        uv_index: current.uv,
    })
}

/// Every `forecast.forecastday[]` entry, in upstream order.
pub fn forecast_days(doc: &Value) -> Result<Vec<ForecastDay>, ToolError> {
    let tool = Operation::Forecast;

    forecast_days_node(tool, doc)?
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let day: WaForecastDay = decode(tool, &format!("forecast.forecastday[{i}]"), entry)?;
            Ok(ForecastDay {
                date: day.date,
                maxtemp_c: day.day.maxtemp_c,
                mintemp_c: day.day.mintemp_c,
                condition: day.day.condition.text,
                icon: day.day.condition.icon,
                uv_index: day.day.uv,
            })
        })
        .collect()
}

/// `forecast.forecastday[0].day` of a `history.json` document. Later entries are ignored.
pub fn historical_day(doc: &Value, date: &str) -> Result<HistoricalDay, ToolError> {
    let tool = Operation::HistoricalWeather;

    let first = forecast_days_node(tool, doc)?
        .first()
        .ok_or_else(|| ToolError::shape(tool.as_str(), "`forecast.forecastday` is empty"))?;
    let day: WaHistoryDayStats =
        decode(tool, "forecast.forecastday[0].day", at(tool, first, &["day"])?)?;

    Ok(HistoricalDay {
        date: date.to_string(),
        avgtemp_c: day.avgtemp_c,
        maxtemp_c: day.maxtemp_c,
        mintemp_c: day.mintemp_c,
        condition: day.condition.text,
    })
}

pub fn astronomy(doc: &Value) -> Result<AstronomyInfo, ToolError> {
    let tool = Operation::Astronomy;
    let astro: WaAstro =
        decode(tool, "astronomy.astro", at(tool, doc, &["astronomy", "astro"])?)?;

    Ok(AstronomyInfo {
        sunrise: astro.sunrise,
        sunset: astro.sunset,
        moonrise: astro.moonrise,
        moonset: astro.moonset,
        moon_phase: astro.moon_phase,
    })
}

/// `alerts.alert[]` of a `forecast.json` document; empty when either key is absent.
pub fn alerts(doc: &Value) -> Result<Vec<Alert>, ToolError> {
    let tool = Operation::WeatherAlerts;

    if !doc.is_object() {
        return Err(ToolError::shape(tool.as_str(), "response is not a JSON object"));
    }

    let entries = match doc.get("alerts").and_then(|a| a.get("alert")) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ToolError::shape(tool.as_str(), "`alerts.alert` is not an array"));
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let alert: WaAlert = decode(tool, &format!("alerts.alert[{i}]"), entry)?;
            Ok(Alert {
                headline: alert.headline,
                severity: alert.severity,
                description: alert.desc,
                effective_date: alert.effective,
                expires_date: alert.expires,
            })
        })
        .collect()
}

/// Run the normalizer matching `args` and serialize its output.
pub fn normalize(args: &ToolArgs, doc: &Value) -> Result<Value, ToolError> {
    match args {
        ToolArgs::CurrentWeather { .. } => to_json(args, current_weather(doc)?),
        ToolArgs::Forecast { .. } => to_json(args, forecast_days(doc)?),
        ToolArgs::HistoricalWeather { date, .. } => to_json(args, historical_day(doc, date)?),
        ToolArgs::Astronomy { .. } => to_json(args, astronomy(doc)?),
        ToolArgs::WeatherAlerts { .. } => to_json(args, alerts(doc)?),
    }
}

fn to_json<T: Serialize>(args: &ToolArgs, out: T) -> Result<Value, ToolError> {
    serde_json::to_value(out)
        .map_err(|e| ToolError::shape(args.operation().as_str(), e.to_string()))
}
