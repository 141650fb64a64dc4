//! Brazilian postal code (CEP) normalization and validation.

use std::fmt;

use crate::error::LookupError;

/// Number of digits in a normalized CEP.
pub const CEP_LEN: usize = 8;

/// Strip every character that is not an ASCII digit.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// `true` iff `raw` normalizes to exactly eight digits.
pub fn is_valid(raw: &str) -> bool {
    normalize(raw).len() == CEP_LEN
}

/// A normalized, validated postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cep(String);

impl Cep {
    /// Normalize `raw` and accept it if exactly eight digits remain.
    ///
    /// Punctuated input such as `01310-100` is accepted.
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let digits = normalize(raw);
        if digits.len() != CEP_LEN {
            return Err(LookupError::InvalidCep);
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Cep {
    type Error = LookupError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Cep::parse(value)
    }
}
