use reqwest::blocking::Client;
use thiserror::Error;

use crate::config::RuntimeConfig;
use crate::model::{ResolvedLocation, WeatherSnapshot};

#[cfg(test)]
pub(crate) mod mock_server;
pub mod open_meteo;

/// The two remote lookups a search depends on, in call order.
pub trait ProviderApi {
    fn geocode_city(&self, city: &str) -> Result<ResolvedLocation, ProviderError>;
    fn fetch_forecast(&self, location: &ResolvedLocation) -> Result<WeatherSnapshot, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct HttpProviders {
    client: Client,
    geocode_endpoint: String,
    forecast_endpoint: String,
}

impl HttpProviders {
    pub fn new(config: &RuntimeConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|error| ProviderError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            geocode_endpoint: config.geocode_endpoint.clone(),
            forecast_endpoint: config.forecast_endpoint.clone(),
        })
    }
}

impl ProviderApi for HttpProviders {
    fn geocode_city(&self, city: &str) -> Result<ResolvedLocation, ProviderError> {
        open_meteo::fetch_geocode(&self.client, &self.geocode_endpoint, city)
    }

    fn fetch_forecast(&self, location: &ResolvedLocation) -> Result<WeatherSnapshot, ProviderError> {
        open_meteo::fetch_forecast(&self.client, &self.forecast_endpoint, location)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("location not found: {0}")]
    NotFound(String),
}
