use crate::error::SearchError;
use crate::model::{ResolvedLocation, normalize_city};
use crate::page::Surface;
use crate::providers::ProviderApi;
use crate::units::TemperatureUnit;
use crate::view::{WeatherView, build_weather_view};

/// Session state: the unit preference and the text currently in the city
/// input. Both survive across searches; nothing else is retained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Widget {
    unit: TemperatureUnit,
    city_input: String,
}

impl Widget {
    pub fn new(unit: TemperatureUnit) -> Self {
        Self {
            unit,
            city_input: String::new(),
        }
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn set_city_input(&mut self, raw: impl Into<String>) {
        self.city_input = raw.into();
    }

    /// Geocodes the current input, fetches its forecast and renders every
    /// region. Failures raise a notice on the surface and leave regions
    /// untouched beyond the loading toggle.
    pub fn search<P, S>(&self, providers: &P, surface: &mut S) -> Result<WeatherView, SearchError>
    where
        P: ProviderApi,
        S: Surface,
    {
        let city = match normalize_city(&self.city_input) {
            Ok(city) => city,
            Err(error) => {
                let error = SearchError::from(error);
                surface.notify(error.alert_message());
                return Err(error);
            }
        };

        surface.show_loading();
        let outcome = fetch_view(providers, &city, self.unit);
        if let Ok((location, view)) = &outcome {
            render(surface, location, view);
        }
        surface.hide_loading();

        match outcome {
            Ok((_, view)) => Ok(view),
            Err(error) => {
                match &error {
                    SearchError::CityNotFound(_) => {
                        tracing::info!(%city, "no geocoding match")
                    }
                    _ => tracing::error!(%city, %error, "weather search failed"),
                }
                surface.notify(error.alert_message());
                Err(error)
            }
        }
    }

    /// Flips the unit and re-runs the whole search for the current input.
    pub fn toggle_unit<P, S>(
        &mut self,
        providers: &P,
        surface: &mut S,
    ) -> Result<WeatherView, SearchError>
    where
        P: ProviderApi,
        S: Surface,
    {
        self.unit = self.unit.toggled();
        tracing::debug!(unit = self.unit.as_str(), "unit toggled");
        self.search(providers, surface)
    }
}

fn fetch_view<P: ProviderApi>(
    providers: &P,
    city: &str,
    unit: TemperatureUnit,
) -> Result<(ResolvedLocation, WeatherView), SearchError> {
    let location = providers.geocode_city(city)?;
    let snapshot = providers.fetch_forecast(&location)?;
    let view = build_weather_view(&location, &snapshot, unit)?;
    Ok((location, view))
}

fn render<S: Surface>(surface: &mut S, location: &ResolvedLocation, view: &WeatherView) {
    tracing::debug!(name = %location.name, "rendering regions");
    surface.render_current(&view.current);
    surface.render_daily(&view.daily);
    surface.render_hourly(&view.hourly);
    surface.render_map(&view.map);
    surface.render_alerts(&view.alerts);
}
