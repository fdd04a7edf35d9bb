//! Interfaces of the external services the workflow drives.

use async_trait::async_trait;

use crate::domain::{
    Coordinates, DeviceToken, DocumentId, LocalNotification, PushMessage, RelayResponse,
    UserRecord,
};
use crate::error::{LocationError, NotifyError, RelayError, StoreError, TokenError};

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire_token(&self) -> Result<DeviceToken, TokenError>;
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Best-effort current position. Implementations negotiate the
    /// foreground-location permission themselves.
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, collection: &str, record: &UserRecord) -> Result<DocumentId, StoreError>;
}

#[async_trait]
pub trait PushRelay: Send + Sync {
    /// Returns whatever status the relay answered with. Only transport
    /// failures are errors; callers decide what counts as delivered.
    async fn send(&self, message: &PushMessage) -> Result<RelayResponse, RelayError>;
}

#[async_trait]
pub trait NotificationPresenter: Send + Sync {
    /// Display immediately, without a delay trigger.
    async fn show_now(&self, notification: &LocalNotification) -> Result<(), NotifyError>;
}
