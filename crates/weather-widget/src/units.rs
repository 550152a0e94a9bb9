use serde::{Deserialize, Serialize};

/// Temperature unit preference for rendered values.
///
/// Provider payloads are always requested in Celsius; this preference only
/// changes how values are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" | "metric" => Some(Self::Celsius),
            "f" | "fahrenheit" | "imperial" => Some(Self::Fahrenheit),
            _ => None,
        }
    }
}

pub fn convert_temperature(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    }
}

/// Renders a measurement with at most one decimal, dropping a trailing `.0`.
pub fn format_number(value: f64) -> String {
    let rounded = round1(value);
    // -0.0 would otherwise print as "-0"
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

pub fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    format_number(convert_temperature(celsius, unit))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
