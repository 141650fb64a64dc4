//! Celsius conversions. Kelvin uses an offset of 273, not 273.15.

use crate::model::TemperatureResponse;

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn to_kelvin(celsius: f64) -> f64 {
    celsius + 273.0
}

impl TemperatureResponse {
    /// Build a response from Celsius alone; the other units are always derived.
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            temp_c: celsius,
            temp_f: to_fahrenheit(celsius),
            temp_k: to_kelvin(celsius),
        }
    }
}
