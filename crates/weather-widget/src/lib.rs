//! City weather widget.
//!
//! - `providers`: Open-Meteo geocoding + forecast lookups behind `ProviderApi`.
//! - `view`: pure projection of a forecast into region view models.
//! - `page`: rendering adapter (`Surface`) and the in-memory `Page`.
//! - `widget`: search orchestration and the unit toggle.
//! - `session`: interactive line-driven loop.

pub mod config;
pub mod error;
pub mod model;
pub mod page;
pub mod providers;
pub mod session;
pub mod units;
pub mod view;
pub mod weather_code;
pub mod widget;

pub use config::RuntimeConfig;
pub use error::{ErrorKind, SearchError};
pub use page::{Page, Surface};
pub use providers::{HttpProviders, ProviderApi, ProviderError};
pub use units::TemperatureUnit;
pub use view::WeatherView;
pub use widget::Widget;
