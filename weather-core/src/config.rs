use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_VIACEP_URL: &str = "https://viacep.com.br/ws";
pub const DEFAULT_WEATHERAPI_URL: &str = "http://api.weatherapi.com/v1";

/// ViaCEP endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViaCepConfig {
    pub base_url: String,
}

impl Default for ViaCepConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_VIACEP_URL.to_string() }
    }
}

/// WeatherAPI.com endpoint settings and credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_WEATHERAPI_URL.to_string(), api_key: None }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// listen_addr = "0.0.0.0:8080"
/// request_timeout_secs = 10
///
/// [weatherapi]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,

    /// Timeout applied to each upstream request.
    pub request_timeout_secs: u64,

    pub viacep: ViaCepConfig,

    pub weatherapi: WeatherApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            viacep: ViaCepConfig::default(),
            weatherapi: WeatherApiConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or defaults if it doesn't exist yet, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Load config from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Override fields from environment-style variables.
    ///
    /// `lookup` is `std::env::var` in production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = get("CEP_WEATHER_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(secs) = get("CEP_WEATHER_TIMEOUT_SECS") {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("CEP_WEATHER_TIMEOUT_SECS is not a number: {secs}"))?;
        }
        if let Some(url) = get("VIACEP_BASE_URL") {
            self.viacep.base_url = url;
        }
        if let Some(url) = get("WEATHERAPI_BASE_URL") {
            self.weatherapi.base_url = url;
        }
        if let Some(key) = get("WEATHERAPI_KEY") {
            self.weatherapi.api_key = Some(key);
        }

        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cep-weather", "cep-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the WeatherAPI key, or an error telling the user how to set one.
    pub fn weatherapi_key(&self) -> Result<&str> {
        self.weatherapi
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No WeatherAPI key configured.\n\
                     Hint: run `cep-weather configure` or set WEATHERAPI_KEY."
                )
            })
    }

    pub fn set_weatherapi_key(&mut self, api_key: String) {
        self.weatherapi.api_key = Some(api_key);
    }
}
