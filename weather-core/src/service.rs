//! The postal code → location → temperature pipeline.
//!
//! Both upstream calls run strictly in sequence: the weather lookup needs the
//! city resolved from the postal code. There are no retries; the first
//! failure ends the lookup.

use std::sync::Arc;

use crate::{
    Config,
    cep::Cep,
    error::LookupError,
    model::TemperatureResponse,
    provider::{
        LocationProvider, WeatherProvider, location_provider_from_config,
        weather_provider_from_config,
    },
};

#[derive(Debug, Clone)]
pub struct WeatherService {
    locations: Arc<dyn LocationProvider>,
    weather: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(locations: Arc<dyn LocationProvider>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { locations, weather }
    }

    /// Wire ViaCEP and WeatherAPI from config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let locations = location_provider_from_config(config)?;
        let weather = weather_provider_from_config(config)?;
        Ok(Self::new(Arc::new(locations), Arc::new(weather)))
    }

    /// Resolve the current temperature for a raw, caller-supplied postal code.
    ///
    /// `None` and the empty string both count as "not provided".
    pub async fn temperature_for(
        &self,
        raw_cep: Option<&str>,
    ) -> Result<TemperatureResponse, LookupError> {
        let raw = raw_cep.filter(|s| !s.is_empty()).ok_or(LookupError::MissingCep)?;
        let cep = Cep::parse(raw)?;

        tracing::info!(cep = %cep, "looking up location");
        let location = self.locations.lookup(&cep).await?;
        tracing::info!(cep = %cep, city = %location.city, "location resolved");

        let weather = self
            .weather
            .current(&location.city)
            .await
            .map_err(LookupError::Weather)?;

        let temperature = TemperatureResponse::from_celsius(weather.current.temp_c);
        tracing::info!(city = %location.city, temp_c = temperature.temp_c, "temperature resolved");
        Ok(temperature)
    }
}
