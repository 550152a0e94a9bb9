//! Pure projection of a forecast snapshot into per-region view models.
//!
//! Every region is built up front so a malformed payload is rejected before
//! any region is touched.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{DailySeries, HourlySeries, ResolvedLocation, WeatherAlert, WeatherSnapshot};
use crate::units::{TemperatureUnit, format_number, format_temperature};
use crate::weather_code::{condition_label, icon_class};

pub const HOURLY_CARD_LIMIT: usize = 12;
pub const NO_ALERTS_MESSAGE: &str = "No alerts for this location.";
pub const MAP_EMBED_HEIGHT_PX: u32 = 300;
const MAP_EMBED_WIDTH: &str = "100%";
const MAP_ZOOM: u8 = 10;
const PLACEHOLDER: &str = "--";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("{series} has {actual} entries, expected at least {expected}")]
    SeriesLength {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{series} has unparsable timestamp '{value}'")]
    Timestamp { series: &'static str, value: String },
    #[error("{series} is empty")]
    MissingValue { series: &'static str },
    #[error("{series} is null at index {index}")]
    NullValue { series: &'static str, index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditionsView {
    pub city_name: String,
    pub temperature: String,
    pub feels_like: String,
    pub condition: String,
    pub humidity: String,
    pub wind_speed: String,
    pub pressure: String,
    pub visibility: String,
    pub sunrise: String,
    pub sunset: String,
    pub uv_index: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCard {
    pub date: String,
    pub icon: String,
    pub temperature_range: String,
    pub condition: String,
    pub humidity: String,
    pub wind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyCard {
    pub time: String,
    pub icon: String,
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertsView {
    pub has_alerts: bool,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEmbed {
    pub url: String,
    pub width: String,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherView {
    pub unit: TemperatureUnit,
    pub current: CurrentConditionsView,
    pub daily: Vec<DailyCard>,
    pub hourly: Vec<HourlyCard>,
    pub alerts: AlertsView,
    pub map: MapEmbed,
}

pub fn build_weather_view(
    location: &ResolvedLocation,
    snapshot: &WeatherSnapshot,
    unit: TemperatureUnit,
) -> Result<WeatherView, ViewError> {
    Ok(WeatherView {
        unit,
        current: build_current_conditions(location, snapshot, unit)?,
        daily: build_daily_cards(&snapshot.daily, unit)?,
        hourly: build_hourly_cards(&snapshot.hourly, unit)?,
        alerts: build_alerts(&snapshot.alerts),
        map: build_map_embed(location.latitude, location.longitude),
    })
}

pub fn build_current_conditions(
    location: &ResolvedLocation,
    snapshot: &WeatherSnapshot,
    unit: TemperatureUnit,
) -> Result<CurrentConditionsView, ViewError> {
    let current = &snapshot.current;
    let temperature = format!(
        "{}°{}",
        format_temperature(current.temperature_c, unit),
        unit.symbol()
    );

    let visibility = first(&snapshot.hourly.visibility_m, "hourly.visibility")?
        .map(|meters| format!("{} km", format_number(meters / 1000.0)))
        .unwrap_or_else(|| format!("{PLACEHOLDER} km"));
    let sunrise = first(&snapshot.daily.sunrise, "daily.sunrise")?;
    let sunset = first(&snapshot.daily.sunset, "daily.sunset")?;
    let uv_index = first(&snapshot.daily.uv_index_max, "daily.uv_index_max")?
        .map(|value| value.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    Ok(CurrentConditionsView {
        city_name: location.name.clone(),
        feels_like: format!("Feels Like: {temperature}"),
        temperature,
        condition: condition_label(current.weather_code).to_string(),
        humidity: format!("{PLACEHOLDER}%"),
        wind_speed: format!("{} km/h", format_number(current.windspeed_kmh)),
        pressure: PLACEHOLDER.to_string(),
        visibility,
        sunrise: format_clock(sunrise, "daily.sunrise")?,
        sunset: format_clock(sunset, "daily.sunset")?,
        uv_index,
    })
}

pub fn build_daily_cards(
    daily: &DailySeries,
    unit: TemperatureUnit,
) -> Result<Vec<DailyCard>, ViewError> {
    let days = daily.time.len();
    require_len(&daily.temperature_max_c, days, "daily.temperature_2m_max")?;
    require_len(&daily.temperature_min_c, days, "daily.temperature_2m_min")?;
    require_len(&daily.weather_code, days, "daily.weathercode")?;

    daily
        .time
        .iter()
        .enumerate()
        .map(|(index, date)| {
            let code = value_at(&daily.weather_code, index, "daily.weathercode")?;
            let max = value_at(&daily.temperature_max_c, index, "daily.temperature_2m_max")?;
            let min = value_at(&daily.temperature_min_c, index, "daily.temperature_2m_min")?;
            Ok(DailyCard {
                date: format_day(date)?,
                icon: icon_class(code).to_string(),
                temperature_range: format!(
                    "{}°/{}° {}",
                    format_temperature(max, unit),
                    format_temperature(min, unit),
                    unit.symbol()
                ),
                condition: condition_label(code).to_string(),
                humidity: format!("Humidity: {PLACEHOLDER}%"),
                wind: format!("Wind: {PLACEHOLDER} km/h"),
            })
        })
        .collect()
}

pub fn build_hourly_cards(
    hourly: &HourlySeries,
    unit: TemperatureUnit,
) -> Result<Vec<HourlyCard>, ViewError> {
    let hours = hourly.time.len().min(HOURLY_CARD_LIMIT);
    require_len(&hourly.temperature_c, hours, "hourly.temperature_2m")?;
    require_len(&hourly.weather_code, hours, "hourly.weathercode")?;

    hourly
        .time
        .iter()
        .take(hours)
        .enumerate()
        .map(|(index, time)| {
            let code = value_at(&hourly.weather_code, index, "hourly.weathercode")?;
            let temperature = value_at(&hourly.temperature_c, index, "hourly.temperature_2m")?;
            Ok(HourlyCard {
                time: format_clock(time, "hourly.time")?,
                icon: icon_class(code).to_string(),
                temperature: format!(
                    "{}° {}",
                    format_temperature(temperature, unit),
                    unit.symbol()
                ),
            })
        })
        .collect()
}

pub fn build_alerts(alerts: &[WeatherAlert]) -> AlertsView {
    if alerts.is_empty() {
        return AlertsView {
            has_alerts: false,
            messages: vec![NO_ALERTS_MESSAGE.to_string()],
        };
    }

    AlertsView {
        has_alerts: true,
        messages: alerts
            .iter()
            .map(|alert| alert.description.clone())
            .collect(),
    }
}

pub fn build_map_embed(latitude: f64, longitude: f64) -> MapEmbed {
    MapEmbed {
        url: map_embed_url(latitude, longitude),
        width: MAP_EMBED_WIDTH.to_string(),
        height: MAP_EMBED_HEIGHT_PX,
    }
}

pub fn map_embed_url(latitude: f64, longitude: f64) -> String {
    format!("https://www.google.com/maps?q={latitude},{longitude}&z={MAP_ZOOM}&output=embed")
}

fn first<'a, T>(values: &'a [T], series: &'static str) -> Result<&'a T, ViewError> {
    values.first().ok_or(ViewError::MissingValue { series })
}

/// Nulls are only rejected where a card actually reads them.
fn value_at<T: Copy>(
    values: &[Option<T>],
    index: usize,
    series: &'static str,
) -> Result<T, ViewError> {
    values
        .get(index)
        .copied()
        .flatten()
        .ok_or(ViewError::NullValue { series, index })
}

fn require_len<T>(values: &[T], expected: usize, series: &'static str) -> Result<(), ViewError> {
    if values.len() < expected {
        return Err(ViewError::SeriesLength {
            series,
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

fn format_day(raw: &str) -> Result<String, ViewError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(|date| date.format("%a, %b %-d").to_string())
        .map_err(|_| ViewError::Timestamp {
            series: "daily.time",
            value: raw.to_string(),
        })
}

/// Formats a provider-local `YYYY-MM-DDTHH:MM` timestamp as `HH:MM`.
fn format_clock(raw: &str, series: &'static str) -> Result<String, ViewError> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
        .map(|timestamp| timestamp.format("%H:%M").to_string())
        .ok_or_else(|| ViewError::Timestamp {
            series,
            value: raw.to_string(),
        })
}
