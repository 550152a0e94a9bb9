pub const UNKNOWN_CONDITION: &str = "Unknown";
pub const UNKNOWN_ICON: &str = "fa-question";

pub fn condition_label(code: i32) -> &'static str {
    match code {
        0 => "Clear Sky",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing Rime Fog",
        51 => "Light Drizzle",
        61 => "Light Rain",
        80 => "Rain Showers",
        95 => "Thunderstorm",
        _ => UNKNOWN_CONDITION,
    }
}

/// Font Awesome class for the card icon.
pub fn icon_class(code: i32) -> &'static str {
    match code {
        0 => "fa-sun",
        1..=3 => "fa-cloud",
        45 | 48 => "fa-smog",
        51 => "fa-cloud-rain",
        61 | 80 => "fa-cloud-showers-heavy",
        95 => "fa-bolt",
        _ => UNKNOWN_ICON,
    }
}
