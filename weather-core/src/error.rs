use thiserror::Error;

use crate::cep::Cep;

/// Failure modes of the location provider.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The provider explicitly reported that the postal code does not exist.
    #[error("postal code {0} not found")]
    NotFound(Cep),

    /// No error flag, but no locality either.
    #[error("provider returned no locality for postal code {0}")]
    MissingCity(Cep),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// Coarse classification of a [`LookupError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Upstream,
}

/// Everything that can stop a postal code → temperature lookup.
///
/// `Display` yields the message shown to clients; upstream detail lives in
/// `source()` and is only meant for logs.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("postal code not provided")]
    MissingCep,

    #[error("invalid zipcode")]
    InvalidCep,

    #[error("can not find zipcode")]
    NotFound,

    #[error("failed to resolve location")]
    Location(#[source] LocationError),

    #[error("failed to fetch temperature")]
    Weather(#[source] anyhow::Error),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::MissingCep | LookupError::InvalidCep => ErrorKind::Validation,
            LookupError::NotFound => ErrorKind::NotFound,
            LookupError::Location(_) | LookupError::Weather(_) => ErrorKind::Upstream,
        }
    }
}

impl From<LocationError> for LookupError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::NotFound(_) => LookupError::NotFound,
            other => LookupError::Location(other),
        }
    }
}
