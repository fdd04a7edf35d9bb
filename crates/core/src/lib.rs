//! Domain types and collaborator traits shared by every geopush crate.
//!
//! The orchestrator only talks to the outside world through the traits in
//! [`ports`]; concrete clients live in the `firestore`, `location` and `push`
//! crates.

pub mod domain;
pub mod error;
pub mod permissions;
pub mod ports;

pub use domain::*;
pub use error::{LocationError, NotifyError, RelayError, StoreError, TokenError};
pub use permissions::{ensure_granted, PermissionKind, PermissionService, PermissionStatus, StaticPermissions};
pub use ports::{LocationProvider, NotificationPresenter, PushRelay, RecordStore, TokenProvider};
