//! Rendering adapter: five page regions plus a loading indicator and a
//! notice channel, the way the widget markup lays them out.

use serde::Serialize;

use crate::view::{AlertsView, CurrentConditionsView, DailyCard, HourlyCard, MapEmbed};

/// Display target driven by the widget. Each region render replaces the
/// region content and reveals it.
pub trait Surface {
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn notify(&mut self, message: &str);
    fn render_current(&mut self, view: &CurrentConditionsView);
    fn render_daily(&mut self, cards: &[DailyCard]);
    fn render_hourly(&mut self, cards: &[HourlyCard]);
    fn render_alerts(&mut self, alerts: &AlertsView);
    fn render_map(&mut self, map: &MapEmbed);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region<T> {
    pub hidden: bool,
    pub content: T,
}

impl<T: Default> Default for Region<T> {
    fn default() -> Self {
        Self {
            hidden: true,
            content: T::default(),
        }
    }
}

impl<T> Region<T> {
    fn replace(&mut self, content: T) {
        self.content = content;
        self.hidden = false;
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub loading: bool,
    pub current: Region<Option<CurrentConditionsView>>,
    pub daily: Region<Vec<DailyCard>>,
    pub hourly: Region<Vec<HourlyCard>>,
    pub alerts: Region<Option<AlertsView>>,
    pub map: Region<Option<MapEmbed>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible_regions(&self) -> Vec<&'static str> {
        [
            ("current", self.current.is_visible()),
            ("daily", self.daily.is_visible()),
            ("hourly", self.hourly.is_visible()),
            ("alerts", self.alerts.is_visible()),
            ("map", self.map.is_visible()),
        ]
        .into_iter()
        .filter_map(|(name, visible)| visible.then_some(name))
        .collect()
    }

    pub fn last_notice(&self) -> Option<&str> {
        self.notices.last().map(String::as_str)
    }

    /// Drains notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        if let (true, Some(current)) = (self.current.is_visible(), &self.current.content) {
            lines.push(current.city_name.clone());
            lines.push(format!(
                "  {}  {}  ({})",
                current.temperature, current.condition, current.feels_like
            ));
            lines.push(format!(
                "  Humidity: {}  Wind: {}  Pressure: {}  Visibility: {}",
                current.humidity, current.wind_speed, current.pressure, current.visibility
            ));
            lines.push(format!(
                "  Sunrise: {}  Sunset: {}  UV index: {}",
                current.sunrise, current.sunset, current.uv_index
            ));
        }

        if self.daily.is_visible() {
            lines.push(String::new());
            lines.push(format!("{}-day forecast", self.daily.content.len()));
            for card in &self.daily.content {
                lines.push(format!(
                    "  {:<12} {:<16} {}",
                    card.date, card.temperature_range, card.condition
                ));
            }
        }

        if self.hourly.is_visible() {
            lines.push(String::new());
            lines.push("Hourly forecast".to_string());
            let row = self
                .hourly
                .content
                .iter()
                .map(|card| format!("{} {}", card.time, card.temperature))
                .collect::<Vec<_>>();
            for chunk in row.chunks(4) {
                lines.push(format!("  {}", chunk.join(" | ")));
            }
        }

        if let (true, Some(alerts)) = (self.alerts.is_visible(), &self.alerts.content) {
            lines.push(String::new());
            lines.push("Alerts".to_string());
            for message in &alerts.messages {
                lines.push(format!("  {message}"));
            }
        }

        if let (true, Some(map)) = (self.map.is_visible(), &self.map.content) {
            lines.push(String::new());
            lines.push(format!("Map: {}", map.url));
        }

        lines.join("\n")
    }

    /// Standalone HTML document using the widget's element ids and classes.
    pub fn to_html(&self) -> String {
        let mut html = String::from(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Weather</title>\n</head>\n<body>\n",
        );

        html.push_str(&format!(
            "<div id=\"loading-spinner\"{}></div>\n",
            hidden_class("", !self.loading)
        ));

        html.push_str(&format!(
            "<section{}>\n",
            hidden_class("weather-info", self.current.hidden)
        ));
        if let Some(current) = &self.current.content {
            for (id, value) in [
                ("city-name", &current.city_name),
                ("temp", &current.temperature),
                ("feels-like", &current.feels_like),
                ("condition", &current.condition),
                ("humidity", &current.humidity),
                ("wind-speed", &current.wind_speed),
                ("pressure", &current.pressure),
                ("visibility", &current.visibility),
                ("sunrise", &current.sunrise),
                ("sunset", &current.sunset),
                ("uv-index", &current.uv_index),
            ] {
                html.push_str(&format!(
                    "  <span id=\"{id}\">{}</span>\n",
                    escape_html(value)
                ));
            }
        }
        html.push_str("</section>\n");

        html.push_str(&format!(
            "<section{}>\n<div id=\"forecast-cards\">\n",
            hidden_class("forecast", self.daily.hidden)
        ));
        for card in &self.daily.content {
            html.push_str(&format!(
                "  <div class=\"forecast-card\">\n    <p>{}</p>\n    <i class=\"fas {}\"></i>\n    <p>{}</p>\n    <p>{}</p>\n    <p>{}</p>\n    <p>{}</p>\n  </div>\n",
                escape_html(&card.date),
                escape_html(&card.icon),
                escape_html(&card.temperature_range),
                escape_html(&card.condition),
                escape_html(&card.humidity),
                escape_html(&card.wind),
            ));
        }
        html.push_str("</div>\n</section>\n");

        html.push_str(&format!(
            "<section{}>\n<div id=\"hourly-cards\">\n",
            hidden_class("hourly-forecast", self.hourly.hidden)
        ));
        for card in &self.hourly.content {
            html.push_str(&format!(
                "  <div class=\"hourly-card\">\n    <p>{}</p>\n    <i class=\"fas {}\"></i>\n    <p>{}</p>\n  </div>\n",
                escape_html(&card.time),
                escape_html(&card.icon),
                escape_html(&card.temperature),
            ));
        }
        html.push_str("</div>\n</section>\n");

        html.push_str(&format!(
            "<section id=\"alerts-section\"{}>\n<div id=\"alerts\">\n",
            hidden_class("", self.alerts.hidden)
        ));
        if let Some(alerts) = &self.alerts.content {
            for message in &alerts.messages {
                html.push_str(&format!("  <p>{}</p>\n", escape_html(message)));
            }
        }
        html.push_str("</div>\n</section>\n");

        html.push_str(&format!(
            "<section id=\"map-section\"{}>\n",
            hidden_class("", self.map.hidden)
        ));
        if let Some(map) = &self.map.content {
            html.push_str(&format!(
                "  <iframe src=\"{}\" width=\"{}\" height=\"{}\" style=\"border:0;\"></iframe>\n",
                escape_html(&map.url),
                escape_html(&map.width),
                map.height
            ));
        }
        html.push_str("</section>\n</body>\n</html>\n");

        html
    }
}

impl Surface for Page {
    fn show_loading(&mut self) {
        self.loading = true;
        self.current.hidden = true;
        self.daily.hidden = true;
        self.hourly.hidden = true;
        self.alerts.hidden = true;
        self.map.hidden = true;
    }

    fn hide_loading(&mut self) {
        self.loading = false;
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn render_current(&mut self, view: &CurrentConditionsView) {
        self.current.replace(Some(view.clone()));
    }

    fn render_daily(&mut self, cards: &[DailyCard]) {
        self.daily.replace(cards.to_vec());
    }

    fn render_hourly(&mut self, cards: &[HourlyCard]) {
        self.hourly.replace(cards.to_vec());
    }

    fn render_alerts(&mut self, alerts: &AlertsView) {
        self.alerts.replace(Some(alerts.clone()));
    }

    fn render_map(&mut self, map: &MapEmbed) {
        self.map.replace(Some(map.clone()));
    }
}

fn hidden_class(base: &str, hidden: bool) -> String {
    let class = match (base.is_empty(), hidden) {
        (true, false) => return String::new(),
        (true, true) => "hidden".to_string(),
        (false, false) => base.to_string(),
        (false, true) => format!("{base} hidden"),
    };
    format!(" class=\"{class}\"")
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
