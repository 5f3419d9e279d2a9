//! National Weather Service alert and forecast handlers.

use std::borrow::Cow;
use std::sync::Arc;

use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::Fetcher;

pub const ALERTS_UNAVAILABLE: &str = "Unable to fetch alerts or no alerts found.";
pub const NO_ACTIVE_ALERTS: &str = "No active alerts for this state.";
pub const FORECAST_UNAVAILABLE: &str = "Unable to fetch forecast data for this location.";
pub const DETAILED_FORECAST_UNAVAILABLE: &str = "Unable to fetch detailed forecast.";

/// Number of forecast periods reported by `get_forecast`.
pub const FORECAST_PERIODS: usize = 5;

const SEPARATOR: &str = "\n---\n";

/// Errors raised when the forecast endpoints answer with an unexpected shape.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Malformed {resource} response: {source}")]
    Malformed {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Fields of a single alert. Every field is optional upstream, and
/// non-string values are printed as their JSON text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    pub event: Option<Value>,
    pub area_desc: Option<Value>,
    pub severity: Option<Value>,
    pub description: Option<Value>,
    pub instruction: Option<Value>,
}

/// One element of an alert feature collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFeature {
    #[serde(default)]
    pub properties: Option<AlertProperties>,
}

impl AlertFeature {
    /// Decode one element of `features`. An element that is not a feature
    /// object formats with every default rather than failing the collection.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("Unexpected alert feature shape: {}", e);
            Self::default()
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PointsProperties {
    /// URL of the gridpoint forecast for this point.
    pub forecast: String,
}

/// Response of `/points/{lat},{lon}`.
#[derive(Debug, Deserialize)]
pub struct PointsResponse {
    pub properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

/// A single forecast period (e.g. "Tonight").
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub name: String,
    pub temperature: serde_json::Number,
    pub temperature_unit: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub detailed_forecast: String,
}

/// Format an alert feature into a readable block.
pub fn format_alert(feature: &AlertFeature) -> String {
    let default = AlertProperties::default();
    let props = feature.properties.as_ref().unwrap_or(&default);
    format!(
        "\nEvent: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}\n",
        field_or(&props.event, "Unknown"),
        field_or(&props.area_desc, "Unknown"),
        field_or(&props.severity, "Unknown"),
        field_or(&props.description, "No description available"),
        field_or(&props.instruction, "No specific instructions provided"),
    )
}

fn field_or<'a>(value: &'a Option<Value>, default: &'a str) -> Cow<'a, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(default),
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

/// Format a forecast period into a readable block.
pub fn format_period(period: &ForecastPeriod) -> String {
    format!(
        "\n{}:\nTemperature: {}°{}\nWind: {} {}\nForecast: {}\n",
        period.name,
        period.temperature,
        period.temperature_unit,
        period.wind_speed,
        period.wind_direction,
        period.detailed_forecast,
    )
}

/// Handlers backed by the NWS API.
#[derive(Clone)]
pub struct WeatherApi {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl WeatherApi {
    /// Create a handler set rooted at `base_url` (e.g. `https://api.weather.gov`).
    pub fn new(fetcher: Arc<dyn Fetcher>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Active alerts for a two-letter US state code.
    ///
    /// The state is forwarded as-is; an unknown code just yields the
    /// fallback message once the upstream rejects it.
    pub async fn get_alerts(&self, state: &str) -> String {
        info!("Fetching alerts for state {}", state);
        let url = format!("{}/alerts/active/area/{}", self.base_url, state);

        let collection = match self.fetcher.get_json(&url).await {
            Ok(collection) => collection,
            Err(e) => {
                warn!("Failed to fetch alerts for {}: {}", state, e);
                return ALERTS_UNAVAILABLE.to_string();
            }
        };

        // `"features": null` means nothing is active, same as an empty list.
        let features = match collection.get("features") {
            Some(Value::Array(features)) => features.clone(),
            Some(Value::Null) => Vec::new(),
            Some(other) => {
                warn!("Alert features for {} are not a list: {}", state, other);
                return ALERTS_UNAVAILABLE.to_string();
            }
            None => {
                warn!("Alert response for {} has no features", state);
                return ALERTS_UNAVAILABLE.to_string();
            }
        };

        if features.is_empty() {
            return NO_ACTIVE_ALERTS.to_string();
        }

        debug!("Formatting {} alerts", features.len());
        features
            .into_iter()
            .map(AlertFeature::from_value)
            .map(|feature| format_alert(&feature))
            .join(SEPARATOR)
    }

    /// Forecast for the next few periods at a coordinate.
    ///
    /// Fetch failures produce a fallback message. A response that decodes
    /// but lacks the forecast URL or its periods is reported as
    /// `ForecastError::Malformed` so the caller sees a tool error.
    pub async fn get_forecast(&self, latitude: f64, longitude: f64) -> Result<String, ForecastError> {
        info!("Fetching forecast for {},{}", latitude, longitude);
        let points_url = format!("{}/points/{},{}", self.base_url, latitude, longitude);

        let points = match self.fetch_present(&points_url).await {
            Some(points) => points,
            None => return Ok(FORECAST_UNAVAILABLE.to_string()),
        };
        let points: PointsResponse = decode("points", points)?;

        let forecast = match self.fetch_present(&points.properties.forecast).await {
            Some(forecast) => forecast,
            None => return Ok(DETAILED_FORECAST_UNAVAILABLE.to_string()),
        };
        let forecast: ForecastResponse = decode("forecast", forecast)?;

        let periods = forecast
            .properties
            .periods
            .into_iter()
            .take(FORECAST_PERIODS)
            .map(|period| decode::<ForecastPeriod>("forecast period", period))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(periods.iter().map(format_period).join(SEPARATOR))
    }

    /// Fetch a JSON object, treating failures, empty objects and non-object
    /// bodies alike as absent.
    async fn fetch_present(&self, url: &str) -> Option<Value> {
        match self.fetcher.get_json(url).await {
            Ok(Value::Object(map)) if !map.is_empty() => Some(Value::Object(map)),
            Ok(other) => {
                warn!("No usable object at {}: {}", url, other);
                None
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                None
            }
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    resource: &'static str,
    value: Value,
) -> Result<T, ForecastError> {
    serde_json::from_value(value).map_err(|source| {
        warn!("Malformed {} response: {}", resource, source);
        ForecastError::Malformed { resource, source }
    })
}
