//! Turns the two upstream payload shapes into one [`WeatherRecord`].

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use regex::Regex;
use tracing::warn;

use crate::{
    error::WeatherError,
    model::{Reading, WeatherRecord},
    provider::{
        global::{GlobalSnapshot, describe_weather_code},
        regional::RegionalSnapshot,
    },
};

static HUMIDITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)humidity\s+(\d+)%").expect("humidity pattern is valid")
});

static WIND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)wind\s+(\d+)\s*km/h").expect("wind pattern is valid")
});

/// How a per-place series is searched for the selected district.
///
/// Temperature only ever shows the selected place; humidity and wind are
/// reported by a handful of stations, so they borrow the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPolicy {
    ExactPlace,
    PlaceOrFirst,
}

impl LookupPolicy {
    pub fn pick<'a, T>(
        self,
        entries: &'a [T],
        place: &str,
        place_of: impl Fn(&T) -> &str,
    ) -> Option<&'a T> {
        let exact = entries.iter().find(|e| place_of(*e) == place);
        match self {
            LookupPolicy::ExactPlace => exact,
            LookupPolicy::PlaceOrFirst => exact.or_else(|| entries.first()),
        }
    }
}

const TEMPERATURE_LOOKUP: LookupPolicy = LookupPolicy::ExactPlace;
const HUMIDITY_LOOKUP: LookupPolicy = LookupPolicy::PlaceOrFirst;
const WIND_LOOKUP: LookupPolicy = LookupPolicy::PlaceOrFirst;

/// Humidity/wind figures scraped from forecast prose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedReadings {
    pub humidity: Option<String>,
    pub wind: Option<String>,
}

/// Look for `humidity NN%` and `wind NN km/h` in `text`.
///
/// Only the fields flagged as missing are searched for.
pub fn scrape_readings(text: &str, want_humidity: bool, want_wind: bool) -> ScrapedReadings {
    ScrapedReadings {
        humidity: want_humidity
            .then(|| first_capture(&HUMIDITY_RE, text))
            .flatten()
            .map(|n| format!("{n}%")),
        wind: want_wind
            .then(|| first_capture(&WIND_RE, text))
            .flatten()
            .map(|n| format!("{n} km/h")),
    }
}

fn first_capture<'h>(re: &Regex, text: &'h str) -> Option<&'h str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Build the record for `district` out of a regional snapshot.
pub fn regional_record(
    snapshot: &RegionalSnapshot,
    district: &str,
) -> Result<WeatherRecord, WeatherError> {
    let district = district.trim();
    if district.is_empty() {
        return Err(WeatherError::NoDistrictSelected);
    }

    let current = &snapshot.current;
    let mut record = WeatherRecord::named(district);

    record.temperature = current.temperature.as_ref().and_then(|series| {
        TEMPERATURE_LOOKUP.pick(&series.data, district, |m| m.place.as_str())?.value.clone()
    });

    record.humidity = current
        .humidity
        .as_ref()
        .and_then(|series| {
            HUMIDITY_LOOKUP.pick(&series.data, district, |m| m.place.as_str())?.value.as_ref()
        })
        .map(|value| format!("{value}%"));

    record.wind = current
        .wind
        .as_ref()
        .and_then(|series| {
            WIND_LOOKUP.pick(&series.data, district, |w| w.place.as_str())?.speed.as_ref()
        })
        .map(|speed| format!("{speed} km/h"));

    record.description = snapshot
        .forecast
        .as_ref()
        .and_then(|f| f.general_situation.clone())
        .filter(|s| !s.trim().is_empty());

    record.last_updated = current.update_time.as_deref().and_then(parse_rfc3339);

    let summary = snapshot.forecast.as_ref().and_then(|f| f.forecast_desc.as_deref());
    if let Some(summary) = summary {
        let scraped = scrape_readings(summary, record.humidity.is_none(), record.wind.is_none());
        record.humidity = record.humidity.or(scraped.humidity);
        record.wind = record.wind.or(scraped.wind);
    }

    Ok(record)
}

/// Build the record for a geocoded city.
pub fn global_record(snapshot: &GlobalSnapshot) -> WeatherRecord {
    let current = &snapshot.forecast.current;
    let units = &snapshot.forecast.current_units;
    let mut record = WeatherRecord::named(snapshot.place.name.as_str());

    record.temperature = current.temperature_2m.map(|t| Reading::Number(round_half_up(t)));

    record.humidity = current.relative_humidity_2m.map(|h| {
        format!("{h}{}", units.relative_humidity_2m.as_deref().unwrap_or("%"))
    });

    record.wind = current
        .wind_speed_10m
        .map(|w| format!("{w} {}", units.wind_speed_10m.as_deref().unwrap_or("km/h")));

    record.description =
        current.weather_code.and_then(describe_weather_code).map(str::to_string);

    record.last_updated = current
        .time
        .as_deref()
        .and_then(|t| parse_local_time(t, snapshot.forecast.utc_offset_seconds));

    record
}

/// Nearest integer, halves toward positive infinity. Never yields `-0.0`.
fn round_half_up(t: f64) -> f64 {
    (t + 0.5).floor()
}

fn parse_rfc3339(s: &str) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt),
        Err(err) => {
            warn!(value = s, error = %err, "ignoring unparsable update time");
            None
        }
    }
}

/// Open-Meteo reports wall time in the location's zone plus a separate offset.
fn parse_local_time(s: &str, utc_offset_seconds: i32) -> Option<DateTime<FixedOffset>> {
    let Some(offset) = FixedOffset::east_opt(utc_offset_seconds) else {
        warn!(utc_offset_seconds, "ignoring out-of-range UTC offset");
        return None;
    };

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"));

    match naive {
        Ok(naive) => naive.and_local_timezone(offset).single(),
        Err(err) => {
            warn!(value = s, error = %err, "ignoring unparsable observation time");
            None
        }
    }
}
