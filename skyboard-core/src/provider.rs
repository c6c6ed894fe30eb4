use crate::{
    Config, WeatherError, WeatherRecord, WeatherRequest,
    error::FetchError,
    provider::{global::GlobalProvider, regional::RegionalProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

pub mod global;
pub mod regional;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Regional,
    Global,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Regional => "regional",
            ProviderId::Global => "global",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Regional, ProviderId::Global]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherRecord, WeatherError>;
}

/// Construct a provider for the given feed from config.
pub fn provider_from_config(id: ProviderId, config: &Config) -> Box<dyn WeatherProvider> {
    match id {
        ProviderId::Regional => Box::new(RegionalProvider::from_config(config)),
        ProviderId::Global => Box::new(GlobalProvider::from_config(config)),
    }
}

/// GET `url` with `query` and decode a JSON body. Non-2xx responses become
/// [`FetchError::Status`] carrying a truncated body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, FetchError> {
    debug!(url, ?query, "GET");

    let res = http.get(url).query(query).send().await?;
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(FetchError::Status { status, body: truncate_body(&body) });
    }

    Ok(serde_json::from_str(&body)?)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
