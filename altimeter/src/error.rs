//! Error types for the altimeter library.

use thiserror::Error;

use crate::schema::ValidationErrors;

/// Boxed error returned by backend constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Startup-time failures. None of them is recoverable: the process reports
/// the diagnostic and stops.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more fields failed schema validation.
    ///
    /// Displays one `'<key>' in ['<section>'] : <reason>` line per failure.
    #[error("{0}")]
    InvalidConfig(#[from] ValidationErrors),

    /// The requested backend is not part of the registry.
    #[error("No handler of type {name}")]
    UnknownBackend { name: String },

    /// The backend constructor rejected its validated parameters.
    #[error("Failed to construct the '{name}' handler: {source}")]
    BackendConstruction {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The configuration source could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors raised while reading HGT tiles.
#[derive(Error, Debug)]
pub enum HgtError {
    /// IO error when reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File size doesn't match SRTM1 or SRTM3 format.
    #[error("Invalid file size: {size} bytes (expected 25934402 for SRTM1 or 2884802 for SRTM3)")]
    InvalidFileSize { size: usize },

    /// A `.hgt.zip` archive could not be read.
    #[error("Invalid archive {name}: {source}")]
    Archive {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// A `.hgt.zip` archive holds no `.hgt` entry.
    #[error("No .hgt file found in {name}")]
    EmptyArchive { name: String },
}

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HgtError::InvalidFileSize { size: 1000 };
        assert!(err.to_string().contains("1000"));

        let err = ConfigError::UnknownBackend {
            name: "celery".to_string(),
        };
        assert_eq!(err.to_string(), "No handler of type celery");

        let err = ConfigError::BackendConstruction {
            name: "file".to_string(),
            source: "folder /nope does not exist or is not a directory".into(),
        };
        assert!(err.to_string().starts_with("Failed to construct the 'file' handler"));
        assert!(err.to_string().contains("/nope"));
    }
}
