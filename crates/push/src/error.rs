use geopush_core::{RelayError, TokenError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Expo API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<PushError> for TokenError {
    fn from(err: PushError) -> Self {
        TokenError::Registration(err.to_string())
    }
}

impl From<PushError> for RelayError {
    fn from(err: PushError) -> Self {
        match err {
            PushError::Request(e) => RelayError::Network(e.to_string()),
            other => RelayError::InvalidResponse(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PushError>;
