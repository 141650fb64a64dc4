use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::{cep::Cep, error::LocationError, model::LocationLookupResult};

use super::{LocationProvider, http_client, truncate_body};

/// ViaCEP postal code lookup (`{base_url}/{cep}/json/`).
#[derive(Debug, Clone)]
pub struct ViaCepProvider {
    base_url: String,
    http: Client,
}

impl ViaCepProvider {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }

    fn url_for(&self, cep: &Cep) -> String {
        format!("{}/{}/json/", self.base_url, cep)
    }
}

#[async_trait]
impl LocationProvider for ViaCepProvider {
    async fn lookup(&self, cep: &Cep) -> Result<LocationLookupResult, LocationError> {
        let url = self.url_for(cep);

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to send request to ViaCEP")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read ViaCEP response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "ViaCEP request failed with status {}: {}",
                status,
                truncate_body(&body),
            )
            .into());
        }

        let parsed: LocationLookupResult = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse ViaCEP JSON (body: {body})"))?;

        if parsed.error {
            return Err(LocationError::NotFound(cep.clone()));
        }

        if parsed.city.trim().is_empty() {
            return Err(LocationError::MissingCity(cep.clone()));
        }

        tracing::debug!(
            cep = %cep,
            city = %parsed.city,
            state = %parsed.state,
            "ViaCEP lookup succeeded"
        );
        Ok(parsed)
    }
}
