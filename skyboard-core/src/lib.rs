//! Core library for the `skyboard` weather dashboard.
//!
//! This crate defines:
//! - Configuration loading (upstream URLs, default district, time format)
//! - The regional observatory and global geocoding/forecast providers
//! - Normalization of both payload shapes into one display record,
//!   including the forecast-text fallback for humidity and wind
//! - Rendering into the dashboard's fixed output slots
//! - A session object that caches the last regional fetch
//!
//! It is used by `skyboard-cli`, but can also be embedded by other hosts.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod render;
pub mod session;

pub use config::Config;
pub use error::{FetchError, WeatherError};
pub use model::{DISTRICTS, Reading, WeatherRecord, WeatherRequest};
pub use provider::{ProviderId, WeatherProvider, provider_from_config};
pub use render::{PLACEHOLDER, RenderedView, Renderer};
pub use session::Dashboard;
