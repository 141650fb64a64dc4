//! Core library for the `cep-weather` service.
//!
//! This crate defines:
//! - Postal code (CEP) normalization and validation
//! - Upstream adapters for ViaCEP and WeatherAPI.com
//! - The lookup pipeline and its error taxonomy
//! - Configuration & credentials handling
//!
//! It is used by `cep-weather-server`, but carries no HTTP server code itself.

pub mod cep;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;
pub mod temperature;

pub use cep::Cep;
pub use config::Config;
pub use error::{ErrorKind, LocationError, LookupError};
pub use model::{ErrorResponse, LocationLookupResult, TemperatureResponse, WeatherResult};
pub use provider::{LocationProvider, WeatherProvider};
pub use service::WeatherService;
