//! Hong Kong Observatory open-data feed.
//!
//! Current conditions (`rhrread`) and the local forecast (`flw`) come from the
//! same endpoint, selected by the `dataType` query parameter.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::{
    config::{Config, RegionalConfig},
    error::{FetchError, WeatherError},
    model::{Reading, WeatherRecord, WeatherRequest},
    normalize,
};

use super::{ProviderId, WeatherProvider, get_json};

const CURRENT_DATA_TYPE: &str = "rhrread";
const FORECAST_DATA_TYPE: &str = "flw";

/// One place/value pair from a current-conditions series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Measurement {
    #[serde(default)]
    pub place: String,
    pub value: Option<Reading>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindMeasurement {
    #[serde(default)]
    pub place: String,
    pub speed: Option<Reading>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Series<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Parsed `rhrread` payload. Only the fields the dashboard shows are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: Option<Series<Measurement>>,
    pub humidity: Option<Series<Measurement>>,
    pub wind: Option<Series<WindMeasurement>>,
    pub update_time: Option<String>,
}

/// Parsed `flw` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalForecast {
    pub general_situation: Option<String>,
    pub forecast_desc: Option<String>,
}

/// Everything one regional refresh produced. This is what a session caches
/// so that district changes can be re-rendered without a network call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionalSnapshot {
    pub current: CurrentConditions,
    /// `None` when the forecast request failed.
    pub forecast: Option<LocalForecast>,
}

#[derive(Debug, Clone)]
pub struct RegionalProvider {
    base_url: String,
    lang: String,
    default_district: String,
    http: Client,
}

impl RegionalProvider {
    pub fn new(config: &RegionalConfig, default_district: impl Into<String>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            lang: config.lang.clone(),
            default_district: default_district.into(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.regional, config.display.default_district.as_str())
    }

    pub fn default_district(&self) -> &str {
        &self.default_district
    }

    /// Fetch current conditions, then the forecast.
    ///
    /// Only the first call is mandatory. A broken forecast is logged and
    /// leaves [`RegionalSnapshot::forecast`] empty.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch(&self) -> Result<RegionalSnapshot, WeatherError> {
        let current = self
            .fetch_current()
            .await
            .map_err(|e| WeatherError::fetch(ProviderId::Regional, e))?;

        let forecast = match self.fetch_forecast().await {
            Ok(forecast) => Some(forecast),
            Err(err) => {
                warn!(error = %err, "regional forecast unavailable, using current conditions only");
                None
            }
        };

        Ok(RegionalSnapshot { current, forecast })
    }

    async fn fetch_current(&self) -> Result<CurrentConditions, FetchError> {
        get_json(
            &self.http,
            &self.base_url,
            &[("dataType", CURRENT_DATA_TYPE), ("lang", self.lang.as_str())],
        )
        .await
    }

    async fn fetch_forecast(&self) -> Result<LocalForecast, FetchError> {
        get_json(
            &self.http,
            &self.base_url,
            &[("dataType", FORECAST_DATA_TYPE), ("lang", self.lang.as_str())],
        )
        .await
    }
}

#[async_trait]
impl WeatherProvider for RegionalProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Regional
    }

    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherRecord, WeatherError> {
        let district = request.location.as_deref().unwrap_or(&self.default_district);
        let snapshot = self.fetch().await?;
        normalize::regional_record(&snapshot, district)
    }
}
