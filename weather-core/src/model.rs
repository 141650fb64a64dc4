use serde::{Deserialize, Deserializer, Serialize};

/// ViaCEP lookup result. Only `city` is used downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationLookupResult {
    pub cep: String,
    #[serde(rename = "logradouro")]
    pub street: String,
    #[serde(rename = "complemento")]
    pub complement: String,
    #[serde(rename = "bairro")]
    pub neighborhood: String,
    #[serde(rename = "localidade")]
    pub city: String,
    #[serde(rename = "uf")]
    pub state: String,
    pub ibge: String,
    pub gia: String,
    pub ddd: String,
    pub siafi: String,
    /// ViaCEP's "not found" flag. Sent as `true` or as the string `"true"`.
    #[serde(rename = "erro", deserialize_with = "lenient_bool")]
    pub error: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    String(String),
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => b,
        BoolOrString::String(s) => s.eq_ignore_ascii_case("true"),
    })
}

/// WeatherAPI.com `current.json` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    #[serde(default)]
    pub location: WeatherLocation,
    pub current: CurrentWeather,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherLocation {
    pub name: String,
    pub region: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temp_c: f64,
    /// Reported upstream but never returned; Fahrenheit is recomputed from `temp_c`.
    #[serde(default)]
    pub temp_f: f64,
}

/// The body returned to the caller on success.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureResponse {
    #[serde(rename = "temp_C")]
    pub temp_c: f64,
    #[serde(rename = "temp_F")]
    pub temp_f: f64,
    #[serde(rename = "temp_K")]
    pub temp_k: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
