//! Error types for the backoffice panel.
//!
//! [`BackofficeError`] covers the failure categories the panel can encounter:
//! HTTP-level errors surfaced by the API, registration/configuration errors
//! raised by the admin site, and serialization/IO plumbing errors. Each
//! variant maps to an HTTP status code via [`BackofficeError::status_code`].

use thiserror::Error;

/// The primary error type for the backoffice panel.
#[derive(Error, Debug)]
pub enum BackofficeError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    // ── Registration / configuration ─────────────────────────────────

    /// An admin configuration cannot be bound to the site it was offered to,
    /// e.g. it references fields the model does not declare, or its inlines
    /// point at models unrelated to the parent.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Plumbing ─────────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BackofficeError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest` -> 400
    /// - `NotFound` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::ImproperlyConfigured(_)
            | Self::ConfigurationError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }
}

impl From<toml::de::Error> for BackofficeError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, BackofficeError>`.
pub type BackofficeResult<T> = Result<T, BackofficeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BackofficeError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(BackofficeError::NotFound("x".into()).status_code(), 404);
        assert_eq!(
            BackofficeError::ImproperlyConfigured("x".into()).status_code(),
            500
        );
        assert_eq!(
            BackofficeError::ConfigurationError("x".into()).status_code(),
            500
        );
        assert_eq!(
            BackofficeError::SerializationError("x".into()).status_code(),
            500
        );
    }

    #[test]
    fn test_display() {
        let err = BackofficeError::NotFound("sales.order".into());
        assert_eq!(err.to_string(), "Not found: sales.order");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: BackofficeError = io_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("not [ valid").unwrap_err();
        let err: BackofficeError = toml_err.into();
        assert_eq!(err.status_code(), 500);
    }
}
