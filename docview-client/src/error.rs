//! Error types for the client layer.

use crate::config::ConfigError;
use docview_core::{DocViewError, NotFoundError, TransportError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiClientError {
    /// Local validation or lookup failure. No request was sent.
    #[error(transparent)]
    Engine(#[from] DocViewError),

    /// Non-2xx response.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx response carrying `success: false`.
    #[error("Request rejected: {message}")]
    Envelope { message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<ValidationError> for ApiClientError {
    fn from(err: ValidationError) -> Self {
        Self::Engine(DocViewError::Validation(err))
    }
}

impl From<NotFoundError> for ApiClientError {
    fn from(err: NotFoundError) -> Self {
        Self::Engine(DocViewError::NotFound(err))
    }
}

impl From<ConfigError> for ApiClientError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl ApiClientError {
    /// True when the failure was raised locally, before any network call.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Engine(_))
    }

    /// True when the server answered and refused.
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Envelope { .. })
    }
}

pub type ApiClientResult<T> = Result<T, ApiClientError>;
