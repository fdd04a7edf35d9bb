//! Location providers.
//!
//! Every provider is wrapped in [`PermissionedLocation`], which negotiates the
//! foreground-location permission before asking for a position.

pub mod ip;
pub mod permissioned;
pub mod providers;

pub use ip::{IpLocationProvider, DEFAULT_IP_ENDPOINT};
pub use permissioned::PermissionedLocation;
pub use providers::{FixedLocationProvider, NoLocationProvider};
