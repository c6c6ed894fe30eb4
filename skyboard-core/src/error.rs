use reqwest::StatusCode;
use thiserror::Error;

use crate::provider::ProviderId;

/// Errors surfaced to the dashboard host.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The city search box was empty (or whitespace only).
    #[error("Please enter a city name")]
    EmptyCity,

    /// A regional record was requested without a place name.
    #[error("No district selected")]
    NoDistrictSelected,

    /// An upstream call failed. The feed tells which path broke.
    #[error("Failed to fetch {feed} weather data: {source}")]
    Fetch {
        feed: ProviderId,
        #[source]
        source: FetchError,
    },
}

impl WeatherError {
    pub(crate) fn fetch(feed: ProviderId, source: impl Into<FetchError>) -> Self {
        Self::Fetch { feed, source: source.into() }
    }
}

/// Low-level causes of a failed upstream call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error! Status: {status}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("City not found")]
    CityNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_is_wrapped_with_feed_name() {
        let err = WeatherError::fetch(
            ProviderId::Regional,
            FetchError::Status { status: StatusCode::BAD_GATEWAY, body: String::new() },
        );

        assert_eq!(
            err.to_string(),
            "Failed to fetch regional weather data: HTTP error! Status: 502 Bad Gateway"
        );
    }

    #[test]
    fn city_not_found_message() {
        let err = WeatherError::fetch(ProviderId::Global, FetchError::CityNotFound);
        assert_eq!(err.to_string(), "Failed to fetch global weather data: City not found");
    }
}
