use geopush_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Firestore API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<FirestoreError> for StoreError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::Request(e) => StoreError::Network(e.to_string()),
            FirestoreError::Api { status, message } => StoreError::Rejected { status, message },
            FirestoreError::InvalidResponse(msg) => StoreError::InvalidResponse(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, FirestoreError>;
