use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    CurrentWeather, DailySeries, HourlySeries, ResolvedLocation, WeatherAlert, WeatherSnapshot,
};

use super::ProviderError;

const FORECAST_DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,sunrise,sunset,uv_index_max,weathercode";
const FORECAST_HOURLY_FIELDS: &str = "temperature_2m,weathercode,visibility,windspeed_10m";
const AUTO_TIMEZONE: &str = "auto";

#[derive(Debug, Serialize)]
struct GeocodeQuery<'a> {
    name: &'a str,
    count: u8,
    language: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
    latitude: f64,
    longitude: f64,
    timezone: Option<String>,
}

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    current_weather: bool,
    daily: &'a str,
    hourly: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeatherPayload>,
    daily: Option<DailyPayload>,
    hourly: Option<HourlyPayload>,
    #[serde(default)]
    alerts: Option<Vec<AlertPayload>>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherPayload {
    temperature: f64,
    windspeed: f64,
    #[serde(alias = "weather_code")]
    weathercode: i32,
}

#[derive(Debug, Deserialize)]
struct DailyPayload {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Vec<String>,
    #[serde(default)]
    sunset: Vec<String>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
    #[serde(default, alias = "weather_code")]
    weathercode: Vec<Option<i32>>,
}

#[derive(Debug, Deserialize)]
struct HourlyPayload {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default, alias = "weather_code")]
    weathercode: Vec<Option<i32>>,
    #[serde(default)]
    visibility: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AlertPayload {
    description: Option<String>,
}

pub fn fetch_geocode(
    client: &Client,
    endpoint: &str,
    city: &str,
) -> Result<ResolvedLocation, ProviderError> {
    let query = GeocodeQuery {
        name: city,
        count: 1,
        language: "en",
        format: "json",
    };

    tracing::debug!(endpoint, city, "requesting geocode");
    let body = execute_request(client.get(endpoint).query(&query))?;
    let location = parse_geocode_response(&body, city)?;
    tracing::info!(
        name = %location.name,
        latitude = location.latitude,
        longitude = location.longitude,
        timezone = %location.timezone,
        "resolved city"
    );
    Ok(location)
}

pub fn fetch_forecast(
    client: &Client,
    endpoint: &str,
    location: &ResolvedLocation,
) -> Result<WeatherSnapshot, ProviderError> {
    let query = ForecastQuery {
        latitude: location.latitude,
        longitude: location.longitude,
        current_weather: true,
        daily: FORECAST_DAILY_FIELDS,
        hourly: FORECAST_HOURLY_FIELDS,
        timezone: &location.timezone,
    };

    tracing::debug!(endpoint, name = %location.name, "requesting forecast");
    let body = execute_request(client.get(endpoint).query(&query))?;
    let snapshot = parse_forecast_response(&body)?;
    tracing::debug!(
        days = snapshot.daily.time.len(),
        hours = snapshot.hourly.time.len(),
        alerts = snapshot.alerts.len(),
        "parsed forecast"
    );
    Ok(snapshot)
}

fn execute_request(request: RequestBuilder) -> Result<String, ProviderError> {
    let response = request
        .send()
        .map_err(|error| ProviderError::Transport(error.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|error| ProviderError::Transport(error.to_string()))?;

    if status.is_success() {
        return Ok(body);
    }

    let message = extract_error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    tracing::warn!(status = status.as_u16(), %message, "open-meteo request failed");

    Err(ProviderError::Http {
        status: status.as_u16(),
        message,
    })
}

fn parse_geocode_response(body: &str, city: &str) -> Result<ResolvedLocation, ProviderError> {
    let payload: GeocodeResponse = serde_json::from_str(body)
        .map_err(|error| ProviderError::InvalidResponse(format!("geocode payload: {error}")))?;

    let Some(result) = payload.results.unwrap_or_default().into_iter().next() else {
        return Err(ProviderError::NotFound(city.to_string()));
    };

    if result.name.trim().is_empty() {
        return Err(ProviderError::InvalidResponse(
            "geocode payload: empty location name".to_string(),
        ));
    }

    let timezone = result
        .timezone
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| AUTO_TIMEZONE.to_string());

    Ok(ResolvedLocation {
        name: result.name,
        latitude: result.latitude,
        longitude: result.longitude,
        timezone,
    })
}

fn parse_forecast_response(body: &str) -> Result<WeatherSnapshot, ProviderError> {
    let payload: ForecastResponse = serde_json::from_str(body)
        .map_err(|error| ProviderError::InvalidResponse(format!("forecast payload: {error}")))?;

    let current = payload.current_weather.ok_or_else(|| {
        ProviderError::InvalidResponse("forecast payload: missing current_weather".to_string())
    })?;
    let daily = payload
        .daily
        .ok_or_else(|| ProviderError::InvalidResponse("forecast payload: missing daily".into()))?;
    let hourly = payload
        .hourly
        .ok_or_else(|| ProviderError::InvalidResponse("forecast payload: missing hourly".into()))?;

    let alerts = payload
        .alerts
        .unwrap_or_default()
        .into_iter()
        .filter_map(|alert| alert.description)
        .map(|description| description.trim().to_string())
        .filter(|description| !description.is_empty())
        .map(|description| WeatherAlert { description })
        .collect();

    Ok(WeatherSnapshot {
        current: CurrentWeather {
            temperature_c: current.temperature,
            windspeed_kmh: current.windspeed,
            weather_code: current.weathercode,
        },
        daily: DailySeries {
            time: daily.time,
            temperature_max_c: daily.temperature_2m_max,
            temperature_min_c: daily.temperature_2m_min,
            weather_code: daily.weathercode,
            sunrise: daily.sunrise,
            sunset: daily.sunset,
            uv_index_max: daily.uv_index_max,
        },
        hourly: HourlySeries {
            time: hourly.time,
            temperature_c: hourly.temperature_2m,
            weather_code: hourly.weathercode,
            visibility_m: hourly.visibility,
        },
        alerts,
    })
}

fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let from_json = serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|json| {
            ["reason", "message", "error", "detail"]
                .into_iter()
                .filter_map(|key| json.get(key).and_then(Value::as_str))
                .map(str::trim)
                .find(|message| !message.is_empty())
                .map(str::to_string)
        });

    from_json.or_else(|| Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock_server::{MockResponse, MockServer};

    fn paris() -> ResolvedLocation {
        ResolvedLocation {
            name: "Paris".to_string(),
            latitude: 48.85,
            longitude: 2.35,
            timezone: "Europe/Paris".to_string(),
        }
    }

    #[test]
    fn open_meteo_geocode_parses_first_result() {
        let body = r#"{
            "results": [
                {
                    "name": "Paris",
                    "latitude": 48.85341,
                    "longitude": 2.3488,
                    "timezone": "Europe/Paris"
                },
                {
                    "name": "Paris",
                    "latitude": 33.66094,
                    "longitude": -95.55551,
                    "timezone": "America/Chicago"
                }
            ]
        }"#;

        let location = parse_geocode_response(body, "Paris").expect("location");
        assert_eq!(location.name, "Paris");
        assert_eq!(location.latitude, 48.85341);
        assert_eq!(location.longitude, 2.3488);
        assert_eq!(location.timezone, "Europe/Paris");
    }

    #[test]
    fn open_meteo_geocode_returns_not_found_when_empty() {
        let body = r#"{"results":[]}"#;
        let error = parse_geocode_response(body, "Nowhere").expect_err("must fail");
        assert_eq!(error, ProviderError::NotFound("Nowhere".to_string()));
    }

    #[test]
    fn open_meteo_geocode_returns_not_found_when_results_missing() {
        let body = r#"{"generationtime_ms":0.5}"#;
        let error = parse_geocode_response(body, "Nowhere").expect_err("must fail");
        assert_eq!(error, ProviderError::NotFound("Nowhere".to_string()));
    }

    #[test]
    fn open_meteo_geocode_defaults_missing_timezone_to_auto() {
        let body = r#"{"results":[{"name":"Null Island","latitude":0.0,"longitude":0.0}]}"#;
        let location = parse_geocode_response(body, "Null Island").expect("location");
        assert_eq!(location.timezone, "auto");
    }

    #[test]
    fn open_meteo_geocode_rejects_malformed_payload() {
        let error = parse_geocode_response("<html>", "Paris").expect_err("must fail");
        assert!(matches!(error, ProviderError::InvalidResponse(message) if message.starts_with("geocode payload")));
    }

    #[test]
    fn open_meteo_forecast_maps_all_series() {
        let body = r#"{
            "timezone": "Europe/Paris",
            "current_weather": {"temperature": 15.0, "windspeed": 11.2, "weathercode": 3},
            "daily": {
                "time": ["2026-10-18", "2026-10-19"],
                "temperature_2m_max": [17.4, 16.0],
                "temperature_2m_min": [9.1, 8.5],
                "sunrise": ["2026-10-18T08:12", "2026-10-19T08:13"],
                "sunset": ["2026-10-18T18:51", "2026-10-19T18:49"],
                "uv_index_max": [2.35, null],
                "weathercode": [3, 61]
            },
            "hourly": {
                "time": ["2026-10-18T00:00", "2026-10-18T01:00"],
                "temperature_2m": [11.0, 10.6],
                "weathercode": [2, 3],
                "visibility": [24140.0, null],
                "windspeed_10m": [8.3, 7.9]
            },
            "alerts": [{"description": "Wind advisory"}, {"description": "  "}, {}]
        }"#;

        let snapshot = parse_forecast_response(body).expect("snapshot");
        assert_eq!(snapshot.current.temperature_c, 15.0);
        assert_eq!(snapshot.current.weather_code, 3);
        assert_eq!(snapshot.daily.time.len(), 2);
        assert_eq!(snapshot.daily.uv_index_max, vec![Some(2.35), None]);
        assert_eq!(snapshot.daily.weather_code, vec![Some(3), Some(61)]);
        assert_eq!(snapshot.hourly.visibility_m, vec![Some(24140.0), None]);
        assert_eq!(
            snapshot.alerts,
            vec![WeatherAlert {
                description: "Wind advisory".to_string()
            }]
        );
    }

    #[test]
    fn open_meteo_forecast_accepts_renamed_weather_code_fields() {
        let body = r#"{
            "current_weather": {"temperature": -2.5, "windspeed": 3.0, "weather_code": 0},
            "daily": {"time": [], "weather_code": []},
            "hourly": {"time": [], "weather_code": []}
        }"#;

        let snapshot = parse_forecast_response(body).expect("snapshot");
        assert_eq!(snapshot.current.weather_code, 0);
        assert!(snapshot.alerts.is_empty());
    }

    #[test]
    fn open_meteo_forecast_keeps_null_series_entries() {
        let body = r#"{
            "current_weather": {"temperature": 4.0, "windspeed": 2.0, "weathercode": 1},
            "daily": {"time": ["2026-10-18"], "temperature_2m_max": [null], "weathercode": [null]},
            "hourly": {
                "time": ["2026-10-18T00:00", "2026-10-18T01:00"],
                "temperature_2m": [3.5, null],
                "weathercode": [1, null]
            }
        }"#;

        let snapshot = parse_forecast_response(body).expect("snapshot");
        assert_eq!(snapshot.daily.temperature_max_c, vec![None]);
        assert_eq!(snapshot.daily.weather_code, vec![None]);
        assert_eq!(snapshot.hourly.temperature_c, vec![Some(3.5), None]);
        assert_eq!(snapshot.hourly.weather_code, vec![Some(1), None]);
    }

    #[test]
    fn open_meteo_forecast_rejects_missing_current_weather() {
        let body = r#"{"daily": {}, "hourly": {}}"#;
        let error = parse_forecast_response(body).expect_err("must fail");
        assert!(
            matches!(error, ProviderError::InvalidResponse(message) if message.contains("current_weather"))
        );
    }

    #[test]
    fn open_meteo_extract_error_message_prefers_reason() {
        let body = r#"{"error": true, "reason": "Parameter 'timezone' is invalid"}"#;
        assert_eq!(
            extract_error_message(body),
            Some("Parameter 'timezone' is invalid".to_string())
        );
        assert_eq!(extract_error_message("  "), None);
        assert_eq!(
            extract_error_message("Bad Gateway"),
            Some("Bad Gateway".to_string())
        );
    }

    #[test]
    fn open_meteo_fetch_geocode_sends_first_match_query() {
        let server = MockServer::spawn(vec![MockResponse::json(
            200,
            "OK",
            r#"{"results":[{"name":"Paris","latitude":48.85,"longitude":2.35,"timezone":"Europe/Paris"}]}"#,
        )]);

        let client = Client::builder().build().expect("client");
        let location =
            fetch_geocode(&client, &server.url("/v1/search"), "Paris").expect("location");

        assert_eq!(location, paris());
        assert_eq!(
            server.request_lines(),
            vec!["GET /v1/search?name=Paris&count=1&language=en&format=json HTTP/1.1"]
        );

        server.join();
    }

    #[test]
    fn open_meteo_fetch_forecast_sends_all_requested_series() {
        let server = MockServer::spawn(vec![MockResponse::json(
            200,
            "OK",
            r#"{
                "current_weather": {"temperature": 15.0, "windspeed": 9.4, "weathercode": 0},
                "daily": {"time": []},
                "hourly": {"time": []}
            }"#,
        )]);

        let client = Client::builder().build().expect("client");
        let snapshot =
            fetch_forecast(&client, &server.url("/v1/forecast"), &paris()).expect("snapshot");
        assert_eq!(snapshot.current.temperature_c, 15.0);

        let lines = server.request_lines();
        assert_eq!(lines.len(), 1);
        let request_line = &lines[0];
        assert!(request_line.starts_with("GET /v1/forecast?"));
        for fragment in [
            "latitude=48.85",
            "longitude=2.35",
            "current_weather=true",
            "daily=temperature_2m_max%2Ctemperature_2m_min%2Csunrise%2Csunset%2Cuv_index_max%2Cweathercode",
            "hourly=temperature_2m%2Cweathercode%2Cvisibility%2Cwindspeed_10m",
            "timezone=Europe%2FParis",
        ] {
            assert!(
                request_line.contains(fragment),
                "missing {fragment} in {request_line}"
            );
        }

        server.join();
    }

    #[test]
    fn open_meteo_fetch_geocode_maps_server_error() {
        let server = MockServer::spawn(vec![MockResponse::json(
            500,
            "Internal Server Error",
            r#"{"error":true,"reason":"geocoder unavailable"}"#,
        )]);

        let client = Client::builder().build().expect("client");
        let error = fetch_geocode(&client, &server.url("/v1/search"), "Paris")
            .expect_err("must fail");

        assert_eq!(
            error,
            ProviderError::Http {
                status: 500,
                message: "geocoder unavailable".to_string(),
            }
        );

        server.join();
    }

    #[test]
    fn open_meteo_fetch_forecast_maps_server_error() {
        let server = MockServer::spawn(vec![MockResponse::json(
            500,
            "Internal Server Error",
            r#"{"error":true,"reason":"forecast backend down"}"#,
        )]);

        let client = Client::builder().build().expect("client");
        let error = fetch_forecast(&client, &server.url("/v1/forecast"), &paris())
            .expect_err("must fail");

        assert_eq!(
            error,
            ProviderError::Http {
                status: 500,
                message: "forecast backend down".to_string(),
            }
        );

        server.join();
    }

    #[test]
    fn open_meteo_fetch_falls_back_to_status_reason_for_empty_error_body() {
        let server = MockServer::spawn(vec![MockResponse::json(503, "Service Unavailable", "")]);

        let client = Client::builder().build().expect("client");
        let error = fetch_geocode(&client, &server.url("/v1/search"), "Paris")
            .expect_err("must fail");

        assert_eq!(
            error,
            ProviderError::Http {
                status: 503,
                message: "Service Unavailable".to_string(),
            }
        );

        server.join();
    }
}
