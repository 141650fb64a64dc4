use crate::{
    Cep, Config,
    error::LocationError,
    model::{LocationLookupResult, WeatherResult},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod viacep;
pub mod weatherapi;

pub use viacep::ViaCepProvider;
pub use weatherapi::WeatherApiProvider;

/// Resolves a postal code to address metadata.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    /// On success the returned `city` is non-empty.
    async fn lookup(&self, cep: &Cep) -> Result<LocationLookupResult, LocationError>;
}

/// Reports current conditions for a named place.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> anyhow::Result<WeatherResult>;
}

/// Construct the ViaCEP provider from config.
pub fn location_provider_from_config(config: &Config) -> anyhow::Result<ViaCepProvider> {
    ViaCepProvider::new(&config.viacep.base_url, config.request_timeout())
}

/// Construct the WeatherAPI provider from config. Fails without an API key.
pub fn weather_provider_from_config(config: &Config) -> anyhow::Result<WeatherApiProvider> {
    let api_key = config.weatherapi_key()?;
    WeatherApiProvider::new(
        &config.weatherapi.base_url,
        api_key.to_owned(),
        config.request_timeout(),
    )
}

/// Each provider owns its own client so timeouts stay independent.
pub(crate) fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
