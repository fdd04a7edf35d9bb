use async_trait::async_trait;
use geopush_core::{Coordinates, LocationError, LocationProvider};

/// Always answers with the configured position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    coordinates: Coordinates,
}

impl FixedLocationProvider {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}

/// A host with no positioning hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocationProvider;

#[async_trait]
impl LocationProvider for NoLocationProvider {
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable(
            "no location source configured".to_string(),
        ))
    }
}
