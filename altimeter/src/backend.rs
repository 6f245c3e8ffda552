//! The capability every elevation backend implements.

use std::fmt;

use thiserror::Error;

use crate::error::{BoxError, HgtError};

/// Elevation lookup, shared by all request workers.
///
/// Implementations are called concurrently from the blocking pool. A backend
/// holding mutable state (a cache, a connection) must synchronize it
/// internally.
pub trait ElevationBackend: Send + Sync + fmt::Debug {
    /// Elevation in meters at `(lat, lng)`.
    ///
    /// `Ok(None)` means no data covers the position, which is a normal
    /// outcome and not a failure.
    fn lookup(&self, lat: f64, lng: f64) -> Result<Option<f64>, BackendError>;
}

/// A failed lookup.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend chose the status and a client-safe message.
    #[error("{message}")]
    Declared { status: u16, message: String },

    /// Anything else. Only logged; clients get a generic message.
    #[error("{0}")]
    Other(#[source] BoxError),
}

impl BackendError {
    pub fn declared(status: u16, message: impl Into<String>) -> Self {
        BackendError::Declared {
            status,
            message: message.into(),
        }
    }

    pub fn other<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        BackendError::Other(err.into())
    }

    /// HTTP status the failure maps to.
    pub fn status(&self) -> u16 {
        match self {
            BackendError::Declared { status, .. } => *status,
            BackendError::Other(_) => 500,
        }
    }
}

impl From<HgtError> for BackendError {
    fn from(err: HgtError) -> Self {
        BackendError::Other(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        assert_eq!(BackendError::declared(503, "busy").status(), 503);
        assert_eq!(BackendError::other("boom").status(), 500);
        assert_eq!(
            BackendError::from(HgtError::InvalidFileSize { size: 3 }).status(),
            500
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(BackendError::declared(503, "busy").to_string(), "busy");
        assert_eq!(BackendError::other("boom").to_string(), "boom");
    }
}
