use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First geocoding match for a searched city. Replaced on every search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub windspeed_kmh: f64,
    pub weather_code: i32,
}

/// Day-indexed parallel arrays, aligned on `time`. Numeric entries may be
/// null in the provider payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub temperature_max_c: Vec<Option<f64>>,
    pub temperature_min_c: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
    pub uv_index_max: Vec<Option<f64>>,
}

/// Hour-indexed parallel arrays, aligned on `time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_c: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    pub visibility_m: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub description: String,
}

/// Raw forecast payload, temperatures in Celsius as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentWeather,
    pub daily: DailySeries,
    pub hourly: HourlySeries,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<WeatherAlert>,
}

pub fn normalize_city(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyCity);
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("city must not be empty")]
    EmptyCity,
}
