use std::sync::Arc;

use async_trait::async_trait;
use geopush_core::permissions::ensure_granted;
use geopush_core::{
    Coordinates, LocationError, LocationProvider, PermissionKind, PermissionService,
};
use tracing::debug;

/// Requests foreground-location permission, then reads from `inner`.
pub struct PermissionedLocation<P> {
    inner: P,
    permissions: Arc<dyn PermissionService>,
}

impl<P: LocationProvider> PermissionedLocation<P> {
    pub fn new(inner: P, permissions: Arc<dyn PermissionService>) -> Self {
        Self { inner, permissions }
    }
}

#[async_trait]
impl<P: LocationProvider> LocationProvider for PermissionedLocation<P> {
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        let status =
            ensure_granted(self.permissions.as_ref(), PermissionKind::ForegroundLocation).await;
        if !status.is_granted() {
            return Err(LocationError::PermissionDenied);
        }

        let coordinates = self.inner.current_coordinates().await?;
        debug!(%coordinates, "Location resolved");
        Ok(coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FixedLocationProvider;
    use geopush_core::{PermissionStatus, StaticPermissions};

    fn permissions(current: PermissionStatus, on_request: PermissionStatus) -> Arc<StaticPermissions> {
        Arc::new(StaticPermissions::new().with(
            PermissionKind::ForegroundLocation,
            current,
            on_request,
        ))
    }

    #[tokio::test]
    async fn test_denied_permission_blocks_read() {
        let provider = PermissionedLocation::new(
            FixedLocationProvider::new(Coordinates::new(1.0, 2.0)),
            permissions(PermissionStatus::Undetermined, PermissionStatus::Denied),
        );

        assert_eq!(
            provider.current_coordinates().await,
            Err(LocationError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn test_prompt_then_read() {
        let provider = PermissionedLocation::new(
            FixedLocationProvider::new(Coordinates::new(1.0, 2.0)),
            permissions(PermissionStatus::Undetermined, PermissionStatus::Granted),
        );

        assert_eq!(
            provider.current_coordinates().await,
            Ok(Coordinates::new(1.0, 2.0))
        );
    }
}
