use std::collections::HashMap;
use std::time::Duration;

use crate::units::TemperatureUnit;

pub const GEOCODE_ENDPOINT: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const FORECAST_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_LOG_FILTER: &str = "warn";

pub const WEATHER_UNIT_ENV: &str = "WEATHER_UNIT";
pub const WEATHER_GEOCODE_ENDPOINT_ENV: &str = "WEATHER_GEOCODE_ENDPOINT";
pub const WEATHER_FORECAST_ENDPOINT_ENV: &str = "WEATHER_FORECAST_ENDPOINT";
pub const WEATHER_HTTP_TIMEOUT_SECS_ENV: &str = "WEATHER_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub unit: TemperatureUnit,
    pub geocode_endpoint: String,
    pub forecast_endpoint: String,
    /// `None` leaves requests unbounded.
    pub http_timeout: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            unit: TemperatureUnit::Celsius,
            geocode_endpoint: GEOCODE_ENDPOINT.to_string(),
            forecast_endpoint: FORECAST_ENDPOINT.to_string(),
            http_timeout: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            unit: resolve_unit(&map),
            geocode_endpoint: resolve_endpoint(&map, WEATHER_GEOCODE_ENDPOINT_ENV, GEOCODE_ENDPOINT),
            forecast_endpoint: resolve_endpoint(
                &map,
                WEATHER_FORECAST_ENDPOINT_ENV,
                FORECAST_ENDPOINT,
            ),
            http_timeout: resolve_http_timeout(&map),
        }
    }

    pub fn with_unit(mut self, unit: Option<TemperatureUnit>) -> Self {
        if let Some(unit) = unit {
            self.unit = unit;
        }
        self
    }
}

fn non_empty<'a>(env_map: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env_map
        .get(key)
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn resolve_unit(env_map: &HashMap<String, String>) -> TemperatureUnit {
    non_empty(env_map, WEATHER_UNIT_ENV)
        .and_then(TemperatureUnit::parse)
        .unwrap_or_default()
}

fn resolve_endpoint(env_map: &HashMap<String, String>, key: &str, default: &str) -> String {
    non_empty(env_map, key)
        .filter(|value| value.starts_with("http://") || value.starts_with("https://"))
        .map(|value| value.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}

fn resolve_http_timeout(env_map: &HashMap<String, String>) -> Option<Duration> {
    non_empty(env_map, WEATHER_HTTP_TIMEOUT_SECS_ENV)
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
}
