use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::InputSlot;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0.missing_message())]
    MissingFile(InputSlot),

    #[error("El archivo '{name}' ({}) está vacío", .slot.label())]
    EmptyFile { slot: InputSlot, name: String },

    #[error("El archivo '{name}' ({}) debe tener extensión {expected}", .slot.label())]
    UnsupportedExtension {
        slot: InputSlot,
        name: String,
        expected: &'static str,
    },

    #[error("Ya hay una predicción en curso")]
    AlreadySubmitting,

    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Ocurrió un error al obtener la predicción.")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds the error for a non-success HTTP status. A blank body falls
    /// back to a message carrying the status code.
    pub fn service(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("Error HTTP {}", status)
        } else {
            body.to_string()
        };
        Error::Service { status, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingFile(_) => ErrorKind::MissingFile,
            Error::EmptyFile { .. } | Error::UnsupportedExtension { .. } => ErrorKind::InvalidFile,
            Error::AlreadySubmitting => ErrorKind::AlreadySubmitting,
            Error::Network(_) => ErrorKind::Network,
            Error::Service { .. } => ErrorKind::Service,
            Error::Parse(_) | Error::Serialization(_) => ErrorKind::Parse,
            Error::Config(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingFile,
    InvalidFile,
    AlreadySubmitting,
    Network,
    Service,
    Parse,
    Internal,
}

/// What the presenter gets to see of a failed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&Error> for ErrorInfo {
    fn from(err: &Error) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_uses_body_text() {
        let err = Error::service(500, "internal error");
        assert_eq!(err.to_string(), "internal error");
        assert_eq!(err.kind(), ErrorKind::Service);
    }

    #[test]
    fn test_service_error_without_body_mentions_status() {
        let err = Error::service(502, "  \n");
        assert_eq!(err.to_string(), "Error HTTP 502");
    }

    #[test]
    fn test_missing_file_names_the_slot() {
        let info = ErrorInfo::from(&Error::MissingFile(InputSlot::Mask));
        assert_eq!(info.kind, ErrorKind::MissingFile);
        assert!(info.message.contains("máscara"));

        let info = ErrorInfo::from(&Error::MissingFile(InputSlot::Image));
        assert!(info.message.contains("imagen T1"));
    }

    #[test]
    fn test_network_error_is_verbatim() {
        let err = Error::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
