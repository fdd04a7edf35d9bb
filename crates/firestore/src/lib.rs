//! Minimal Firestore REST client used as the remote record store.

pub mod client;
pub mod error;
pub mod value;

pub use client::{FirestoreClient, FirestoreConfig, USERS_COLLECTION};
pub use error::{FirestoreError, Result};
pub use value::{encode_record, Document, Value};
