use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use weather_core::{Config, LookupError, WeatherService};

use crate::http;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cep-weather", version, about = "Current temperature by Brazilian postal code")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (`GET /weather?cep=...`).
    Serve {
        /// Address to bind, overrides config and CEP_WEATHER_LISTEN_ADDR.
        #[arg(long)]
        listen: Option<String>,
    },

    /// Look up the temperature for a single postal code and print it.
    Lookup {
        /// Postal code, with or without punctuation (e.g. 01310-100).
        cep: String,
    },

    /// Store the WeatherAPI.com key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { listen } => {
                let cfg = Config::load()?;
                let listen_addr = listen.unwrap_or_else(|| cfg.listen_addr.clone());
                let service = WeatherService::from_config(&cfg)?;
                http::serve(&listen_addr, Arc::new(service)).await
            }
            Command::Lookup { cep } => {
                let cfg = Config::load()?;
                let service = WeatherService::from_config(&cfg)?;
                lookup(&service, &cep).await
            }
            Command::Configure => configure(),
        }
    }
}

async fn lookup(service: &WeatherService, cep: &str) -> anyhow::Result<()> {
    match service.temperature_for(Some(cep)).await {
        Ok(t) => {
            println!("{:.1} °C | {:.1} °F | {:.1} K", t.temp_c, t.temp_f, t.temp_k);
            Ok(())
        }
        // Validation and not-found are user errors; print the message only.
        Err(err @ (LookupError::MissingCep | LookupError::InvalidCep | LookupError::NotFound)) => {
            anyhow::bail!("{err}")
        }
        Err(err) => Err(anyhow::Error::new(err)),
    }
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut cfg = Config::load_from(&path)?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_help_message("Get one at https://www.weatherapi.com/my/")
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    cfg.set_weatherapi_key(api_key);
    cfg.save_to(&path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
