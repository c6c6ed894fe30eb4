//! Per-host dashboard state.
//!
//! Holds the last successful regional snapshot so a district change can be
//! answered from memory. The state lives in this value, never in a global.

use tracing::{debug, info};

use crate::{
    Config, WeatherError, WeatherProvider, WeatherRecord, WeatherRequest,
    model::DISTRICTS,
    normalize,
    provider::{
        global::GlobalProvider,
        regional::{RegionalProvider, RegionalSnapshot},
    },
};

#[derive(Debug)]
pub struct Dashboard {
    regional: RegionalProvider,
    global: Box<dyn WeatherProvider>,
    last_regional: Option<RegionalSnapshot>,
    selected_district: Option<String>,
}

impl Dashboard {
    pub fn new(regional: RegionalProvider, global: Box<dyn WeatherProvider>) -> Self {
        Self { regional, global, last_regional: None, selected_district: None }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RegionalProvider::from_config(config),
            Box::new(GlobalProvider::from_config(config)),
        )
    }

    /// Place names for the district selector.
    pub fn districts(&self) -> &'static [&'static str] {
        &DISTRICTS
    }

    /// District the next regional record is built for.
    pub fn selected_district(&self) -> &str {
        self.selected_district.as_deref().unwrap_or(self.regional.default_district())
    }

    pub fn cached_snapshot(&self) -> Option<&RegionalSnapshot> {
        self.last_regional.as_ref()
    }

    /// Fetch fresh regional data, cache it, and build the record for the
    /// selected district.
    ///
    /// A failed fetch keeps whatever was cached before. A fetched snapshot is
    /// cached even when no record can be built from it.
    pub async fn refresh_regional(&mut self) -> Result<WeatherRecord, WeatherError> {
        let snapshot = self.regional.fetch().await?;
        info!(has_forecast = snapshot.forecast.is_some(), "regional data refreshed");

        let snapshot = self.last_regional.insert(snapshot);
        let district =
            self.selected_district.as_deref().unwrap_or(self.regional.default_district());
        normalize::regional_record(snapshot, district)
    }

    /// Switch districts. Returns a record rebuilt from the cached snapshot, or
    /// `None` when nothing has been fetched yet.
    pub fn select_district(
        &mut self,
        district: &str,
    ) -> Result<Option<WeatherRecord>, WeatherError> {
        let district = district.trim();
        if district.is_empty() {
            return Err(WeatherError::NoDistrictSelected);
        }
        self.selected_district = Some(district.to_string());

        let Some(snapshot) = &self.last_regional else {
            debug!(district, "no regional snapshot cached yet");
            return Ok(None);
        };

        normalize::regional_record(snapshot, district).map(Some)
    }

    /// Look up an arbitrary city on the global feed. Leaves the regional
    /// cache alone.
    pub async fn search_city(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        self.global.get_weather(&WeatherRequest::at(city)).await
    }
}
