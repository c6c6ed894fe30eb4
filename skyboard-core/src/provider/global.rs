//! Open-Meteo geocoding + forecast feed for arbitrary cities.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    config::{Config, GlobalConfig},
    error::{FetchError, WeatherError},
    model::{WeatherRecord, WeatherRequest},
    normalize,
};

use super::{ProviderId, WeatherProvider, get_json};

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoMatch {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The geocoder omits `results` entirely when nothing matched.
#[derive(Debug, Clone, Default, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeoMatch>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentUnits {
    pub relative_humidity_2m: Option<String>,
    pub wind_speed_10m: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentValues {
    /// Local wall time, e.g. `2024-01-15T12:00`.
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub weather_code: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub current_units: CurrentUnits,
    #[serde(default)]
    pub current: CurrentValues,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSnapshot {
    pub place: GeoMatch,
    pub forecast: ForecastResponse,
}

#[derive(Debug, Clone)]
pub struct GlobalProvider {
    geocoding_url: String,
    forecast_url: String,
    result_count: String,
    language: String,
    http: Client,
}

impl GlobalProvider {
    pub fn new(config: &GlobalConfig) -> Self {
        Self {
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            result_count: config.result_count.max(1).to_string(),
            language: config.language.clone(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.global)
    }

    /// Geocode `city` and fetch current conditions for the first match.
    #[instrument(skip(self))]
    pub async fn fetch(&self, city: &str) -> Result<GlobalSnapshot, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }

        let place =
            self.locate(city).await.map_err(|e| WeatherError::fetch(ProviderId::Global, e))?;
        debug!(name = %place.name, lat = place.latitude, lon = place.longitude, "geocoded");

        let forecast = self
            .fetch_forecast(&place)
            .await
            .map_err(|e| WeatherError::fetch(ProviderId::Global, e))?;

        Ok(GlobalSnapshot { place, forecast })
    }

    async fn locate(&self, city: &str) -> Result<GeoMatch, FetchError> {
        let res: GeocodingResponse = get_json(
            &self.http,
            &self.geocoding_url,
            &[
                ("name", city),
                ("count", self.result_count.as_str()),
                ("language", self.language.as_str()),
                ("format", "json"),
            ],
        )
        .await?;

        res.results
            .and_then(|results| results.into_iter().next())
            .ok_or(FetchError::CityNotFound)
    }

    async fn fetch_forecast(&self, place: &GeoMatch) -> Result<ForecastResponse, FetchError> {
        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();

        get_json(
            &self.http,
            &self.forecast_url,
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("timezone", "auto"),
            ],
        )
        .await
    }
}

#[async_trait]
impl WeatherProvider for GlobalProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Global
    }

    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherRecord, WeatherError> {
        let city = request.location.as_deref().unwrap_or_default();
        let snapshot = self.fetch(city).await?;
        Ok(normalize::global_record(&snapshot))
    }
}

/// Text for a WMO weather interpretation code.
pub fn describe_weather_code(code: u8) -> Option<&'static str> {
    let text = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => return None,
    };
    Some(text)
}
