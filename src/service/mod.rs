//! Boat data service
//!
//! The backend is an external collaborator with a fixed contract: four
//! operations, described by [`BoatDataService`]. Components only ever talk to
//! the trait object, so the HTTP binding, the demo fleet and test fakes are
//! interchangeable.

use crate::config::Config;
use crate::error::ServiceError;
use crate::model::{BoatRecord, BoatType, RowEditBatch};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub mod demo;
pub mod http;

#[cfg(test)]
pub mod testing;

pub use demo::DemoBoatService;
pub use http::HttpBoatService;

/// The four operations of the boat data service
#[async_trait]
pub trait BoatDataService: Send + Sync {
    /// All boat categories
    async fn list_boat_types(&self) -> Result<Vec<BoatType>, ServiceError>;

    /// Boats of one type; `""` means unfiltered
    async fn search_boats(&self, boat_type_id: &str) -> Result<Vec<BoatRecord>, ServiceError>;

    /// Boats near a position, as a serialized JSON array
    ///
    /// Callers deserialize the payload themselves.
    async fn search_boats_near(
        &self,
        latitude: f64,
        longitude: f64,
        boat_type_id: &str,
    ) -> Result<String, ServiceError>;

    /// Persist a batch of row edits
    async fn update_boats(&self, batch: &RowEditBatch) -> Result<(), ServiceError>;
}

pub type SharedService = Arc<dyn BoatDataService>;

/// Build the data service described by the config
pub fn from_config(config: &Config) -> Result<SharedService> {
    if config.demo_mode {
        tracing::info!("Running in DEMO MODE - serving the in-memory fleet");
        return Ok(Arc::new(DemoBoatService::new()));
    }

    let service = HttpBoatService::new(
        config.api_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(Arc::new(service))
}
