//! Error types for opcon-console
//!
//! The variants follow what the operator is told: a validation problem, an
//! unknown record, an unreachable service, a player that refused to start,
//! or any other failure message the service sent back.

use thiserror::Error;

/// Main error type for opcon-console
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected input, locally or by the service (HTTP 400)
    #[error("{0}")]
    Validation(String),

    /// Unknown operator, media item or session (HTTP 404)
    #[error("{0}")]
    NotFound(String),

    /// Service unreachable or response unreadable
    #[error("Network error: {0}")]
    Network(String),

    /// The media element refused to start
    #[error("Playback error: {0}")]
    Playback(String),

    /// Any other failure envelope from the service
    #[error("{0}")]
    Service(String),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File or terminal I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<opcon_common::Error> for Error {
    fn from(e: opcon_common::Error) -> Self {
        match e {
            opcon_common::Error::InvalidInput(msg) => Error::Validation(msg),
            opcon_common::Error::Io(e) => Error::Io(e),
            other => Error::Config(other.to_string()),
        }
    }
}

/// Convenience Result type using opcon-console Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_messages_shown_as_is() {
        assert_eq!(Error::Validation("Name and DNI are required.".into()).to_string(), "Name and DNI are required.");
        assert_eq!(Error::Service("boom".into()).to_string(), "boom");
        assert_eq!(Error::Playback("blocked".into()).to_string(), "Playback error: blocked");
    }

    #[test]
    fn test_common_error_conversion() {
        let err: Error = opcon_common::Error::InvalidInput("bad kind".into()).into();
        assert!(matches!(err, Error::Validation(msg) if msg == "bad kind"));

        let err: Error = opcon_common::Error::Config("missing".into()).into();
        assert!(matches!(err, Error::Config(_)));
    }
}
