//! Error types for push delivery and credential validation.

use std::fmt;

use pingie_core::PingieError;

/// Failures moving a request to the push endpoint and back.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,
    #[error("Could not connect: {0}")]
    Connect(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Worker failed: {0}")]
    Worker(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for TransportError {
    fn from(err: tokio::task::JoinError) -> Self {
        TransportError::Worker(err.to_string())
    }
}

impl From<TransportError> for PingieError {
    fn from(err: TransportError) -> Self {
        PingieError::Transport(err.to_string())
    }
}

/// Why a credential check did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Cannot connect: {0}")]
    CannotConnect(String),
    #[error("Invalid auth: {0}")]
    InvalidAuth(String),
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl ValidationError {
    /// The form-level code shown to the user for this failure.
    pub fn code(&self) -> FormErrorCode {
        match self {
            ValidationError::CannotConnect(_) => FormErrorCode::CannotConnect,
            ValidationError::InvalidAuth(_) => FormErrorCode::InvalidAuth,
            ValidationError::Unknown(_) => FormErrorCode::Unknown,
        }
    }
}

impl From<TransportError> for ValidationError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => {
                ValidationError::CannotConnect("Connection to push API timed out".into())
            }
            TransportError::Connect(_) => {
                ValidationError::CannotConnect("Could not connect to push API".into())
            }
            TransportError::Request(msg) => {
                ValidationError::CannotConnect(format!("Unexpected error: {}", msg))
            }
            TransportError::Worker(msg) => ValidationError::Unknown(msg),
        }
    }
}

/// Error code attached to the whole form, never to a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormErrorCode {
    CannotConnect,
    InvalidAuth,
    Unknown,
}

impl FormErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormErrorCode::CannotConnect => "cannot_connect",
            FormErrorCode::InvalidAuth => "invalid_auth",
            FormErrorCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FormErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Misuse of the wizard state machine.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Wizard already committed")]
    AlreadyCommitted,
}
