//! Fills the dashboard's fixed output slots from a [`WeatherRecord`].

use std::fmt::{self, Write as _};

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use tracing::warn;

use crate::{Config, WeatherRecord};

/// Shown in any slot whose value is unavailable.
pub const PLACEHOLDER: &str = "--";

const TEMPERATURE_UNIT: &str = "°C";

/// Text for each output slot, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub city_name: String,
    pub temperature: String,
    pub description: String,
    pub humidity: String,
    pub wind_speed: String,
    pub last_update: String,
}

impl RenderedView {
    /// Slot labels paired with their text, in display order.
    pub fn slots(&self) -> [(&'static str, &str); 6] {
        [
            ("Location", self.city_name.as_str()),
            ("Temperature", self.temperature.as_str()),
            ("Conditions", self.description.as_str()),
            ("Humidity", self.humidity.as_str()),
            ("Wind", self.wind_speed.as_str()),
            ("Updated", self.last_update.as_str()),
        ]
    }
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.slots() {
            writeln!(f, "{label:<12} {value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    time_format: String,
}

impl Renderer {
    pub fn new(time_format: impl Into<String>) -> Self {
        Self { time_format: time_format.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.display.time_format.as_str())
    }

    /// Render with timestamps shown in the machine's local zone.
    pub fn render(&self, record: &WeatherRecord) -> RenderedView {
        self.render_in(record, &Local)
    }

    /// Render with timestamps converted into `tz`.
    pub fn render_in<Tz>(&self, record: &WeatherRecord, tz: &Tz) -> RenderedView
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        RenderedView {
            city_name: record.location_name.clone(),
            temperature: record
                .temperature
                .as_ref()
                .map(|t| format!("{t}{TEMPERATURE_UNIT}"))
                .unwrap_or_else(placeholder),
            description: record.description.clone().unwrap_or_else(placeholder),
            humidity: record.humidity.clone().unwrap_or_else(placeholder),
            wind_speed: record.wind.clone().unwrap_or_else(placeholder),
            last_update: record
                .last_updated
                .and_then(|t| self.format_time(t, tz))
                .unwrap_or_else(placeholder),
        }
    }

    fn format_time<Tz>(&self, time: DateTime<FixedOffset>, tz: &Tz) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut out = String::new();
        match write!(out, "{}", time.with_timezone(tz).format(&self.time_format)) {
            Ok(()) => Some(out),
            Err(_) => {
                warn!(format = %self.time_format, "invalid time format, leaving timestamp blank");
                None
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}
