use std::io;
use thiserror::Error;

use crate::protocol::{Message, Status};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Convert error to a wire error response carrying the given error status.
    ///
    /// The text is what the client sees; internal detail stays in the server
    /// log.
    pub fn to_response(&self, status: Status) -> Message {
        let text = match self {
            Error::KeyNotFound(_) => "Specified key not found",
            Error::Protocol(_) => "Invalid request",
            _ => "Error while processing request",
        };
        Message::error(status, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_descriptive_text() {
        let err = Error::KeyNotFound("foo".to_string());
        let response = err.to_response(Status::GetError);
        assert_eq!(response.status, Status::GetError);
        assert_eq!(response.key, None);
        assert_eq!(response.value.as_deref(), Some("Specified key not found"));
    }

    #[test]
    fn io_failure_maps_to_generic_text() {
        let err = Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let response = err.to_response(Status::PutError);
        assert_eq!(response.status, Status::PutError);
        assert_eq!(
            response.value.as_deref(),
            Some("Error while processing request")
        );
    }
}
