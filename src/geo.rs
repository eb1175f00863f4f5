//! Device geolocation
//!
//! A position request resolves exactly once, either to a [`Position`] or to a
//! [`LocationError`]. "Unavailable" is an explicit outcome, never a request
//! that simply stays pending.

use crate::config::{LocationConfig, LocationSource};
use crate::error::LocationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A resolved device position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometres (haversine)
    pub fn distance_km(&self, other: &Position) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// One-shot position source
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Position, LocationError>;
}

pub type SharedLocation = Arc<dyn LocationProvider>;

/// Always answers with the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Position);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Position, LocationError> {
        Ok(self.0)
    }
}

/// A device without geolocation
#[derive(Debug, Clone)]
pub struct NoLocation(pub LocationError);

impl Default for NoLocation {
    fn default() -> Self {
        Self(LocationError::Unsupported)
    }
}

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Position, LocationError> {
        Err(self.0.clone())
    }
}

/// Build the provider described by the config
pub fn from_config(config: &LocationConfig) -> SharedLocation {
    match (config.source, config.latitude, config.longitude) {
        (LocationSource::Fixed, Some(latitude), Some(longitude)) => {
            Arc::new(FixedLocation(Position::new(latitude, longitude)))
        }
        (LocationSource::Fixed, _, _) => Arc::new(NoLocation(LocationError::Unavailable(
            "no coordinates configured".to_string(),
        ))),
        (LocationSource::None, _, _) => Arc::new(NoLocation::default()),
    }
}
