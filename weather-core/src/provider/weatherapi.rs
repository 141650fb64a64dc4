use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::model::WeatherResult;

use super::{WeatherProvider, http_client, truncate_body};

/// WeatherAPI.com current conditions (`{base_url}/current.json`).
#[derive(Clone)]
pub struct WeatherApiProvider {
    base_url: String,
    api_key: String,
    http: Client,
}

// Manual impl keeps the API key out of logs.
impl std::fmt::Debug for WeatherApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl WeatherApiProvider {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, city: &str) -> Result<WeatherResult> {
        let url = format!("{}/current.json", self.base_url);

        // `query` percent-encodes the city name.
        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (current)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI current response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WeatherResult = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse WeatherAPI current JSON (body: {body})"))?;

        tracing::debug!(
            city,
            location = %parsed.location.name,
            region = %parsed.location.region,
            temp_c = parsed.current.temp_c,
            "WeatherAPI lookup succeeded"
        );
        Ok(parsed)
    }
}
