use std::fmt;
use thiserror::Error;

/// Closed taxonomy of classified API error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalServerError,
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        };
        write!(f, "{}", name)
    }
}

/// API-level errors for apmec-api
#[derive(Error, Debug)]
pub enum ApiError {
    /// The transport could not complete the round trip. Retryable for
    /// idempotent methods only.
    #[error("Unable to establish connection: {reason}")]
    ConnectionFailed { reason: String },

    /// Non-success status with a recognized domain error type.
    #[error("{message}")]
    Api {
        status_code: u16,
        kind: ErrorKind,
        message: String,
    },

    /// Non-success status whose body did not match a recognized shape.
    #[error("{message}")]
    Generic { status_code: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API version {0} is not supported")]
    UnsupportedVersion(String),

    #[error("Core domain error: {0}")]
    Core(#[from] apmec_core::CoreError),
}

impl ApiError {
    /// Status code carried by classified errors, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Api { status_code, .. } | ApiError::Generic { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
