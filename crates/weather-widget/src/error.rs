use thiserror::Error;

use crate::model::ValidationError;
use crate::providers::ProviderError;
use crate::view::ViewError;

pub const EMPTY_CITY_ALERT: &str = "Please enter a city name.";
pub const CITY_NOT_FOUND_ALERT: &str = "City not found. Please try again.";
pub const FETCH_FAILED_ALERT: &str = "Unable to fetch weather data. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    User,
    Runtime,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Runtime => "runtime",
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Self::User => 2,
            Self::Runtime => 1,
        }
    }
}

/// Terminal outcome of a failed search attempt.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("city not found: {0}")]
    CityNotFound(String),
    #[error(transparent)]
    Provider(ProviderError),
    #[error("malformed forecast payload: {0}")]
    Payload(#[from] ViewError),
}

impl From<ProviderError> for SearchError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::NotFound(city) => Self::CityNotFound(city),
            other => Self::Provider(other),
        }
    }
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::CityNotFound(_) => ErrorKind::User,
            Self::Provider(_) | Self::Payload(_) => ErrorKind::Runtime,
        }
    }

    /// Message shown to the user in place of a browser alert.
    pub fn alert_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => EMPTY_CITY_ALERT,
            Self::CityNotFound(_) => CITY_NOT_FOUND_ALERT,
            Self::Provider(_) | Self::Payload(_) => FETCH_FAILED_ALERT,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_error_not_found_is_lifted_out_of_provider_errors() {
        let error = SearchError::from(ProviderError::NotFound("Atlantis".to_string()));
        assert_eq!(error, SearchError::CityNotFound("Atlantis".to_string()));
        assert_eq!(error.alert_message(), CITY_NOT_FOUND_ALERT);
        assert_eq!(error.kind(), ErrorKind::User);
    }

    #[test]
    fn search_error_transport_and_http_share_generic_alert() {
        for provider_error in [
            ProviderError::Transport("connection refused".to_string()),
            ProviderError::Http {
                status: 502,
                message: "Bad Gateway".to_string(),
            },
            ProviderError::InvalidResponse("forecast payload: eof".to_string()),
        ] {
            let error = SearchError::from(provider_error);
            assert_eq!(error.alert_message(), FETCH_FAILED_ALERT);
            assert_eq!(error.exit_code(), 1);
        }
    }

    #[test]
    fn exit_code_mapping_user_and_runtime_are_stable() {
        assert_eq!(SearchError::from(ValidationError::EmptyCity).exit_code(), 2);
        assert_eq!(
            SearchError::from(ViewError::MissingValue { series: "hourly.visibility" }).exit_code(),
            1
        );
    }
}
