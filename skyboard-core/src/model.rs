use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// Known regional observation places, in selection-control order.
pub const DISTRICTS: [&str; 27] = [
    "Hong Kong Observatory",
    "King's Park",
    "Wong Chuk Hang",
    "Ta Kwu Ling",
    "Lau Fau Shan",
    "Tai Po",
    "Sha Tin",
    "Tuen Mun",
    "Tseung Kwan O",
    "Sai Kung",
    "Cheung Chau",
    "Chek Lap Kok",
    "Tsing Yi",
    "Shek Kong",
    "Tsuen Wan Ho Koon",
    "Tsuen Wan Shing Mun Valley",
    "Hong Kong Park",
    "Shau Kei Wan",
    "Kowloon City",
    "Happy Valley",
    "Wong Tai Sin",
    "Stanley",
    "Kwun Tong",
    "Sham Shui Po",
    "Kai Tak Runway Park",
    "Yuen Long Park",
    "Tai Mei Tuk",
];

/// A single query against one of the providers.
///
/// For the global feed `location` is the free-text city; for the regional
/// feed it is the district name, falling back to the configured default.
#[derive(Debug, Clone, Default)]
pub struct WeatherRequest {
    pub location: Option<String>,
}

impl WeatherRequest {
    pub fn at(location: impl Into<String>) -> Self {
        Self { location: Some(location.into()) }
    }
}

/// A measured value as the upstream sent it: numbers stay numbers, anything
/// else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Number(n) => write!(f, "{n}"),
            Reading::Text(s) => f.write_str(s),
        }
    }
}

/// Normalized display model shared by both feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub location_name: String,
    pub temperature: Option<Reading>,
    pub description: Option<String>,
    /// Already carries its unit, e.g. `"79%"`.
    pub humidity: Option<String>,
    /// Already carries its unit, e.g. `"12 km/h"`.
    pub wind: Option<String>,
    pub last_updated: Option<DateTime<FixedOffset>>,
}

impl WeatherRecord {
    /// A record with only the name filled in.
    pub fn named(location_name: impl Into<String>) -> Self {
        Self {
            location_name: location_name.into(),
            temperature: None,
            description: None,
            humidity: None,
            wind: None,
            last_updated: None,
        }
    }
}
