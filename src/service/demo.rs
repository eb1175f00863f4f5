// Demo mode: an in-memory fleet behind the data service contract
//
// Lets the browser run without a backend. Updates are applied to the
// in-memory rows all-or-nothing, like a single DML statement would be, and
// near-me answers with the closest boats first.
//
// Run with: FLEET_DEMO=1 cargo run --release

use super::BoatDataService;
use crate::error::ServiceError;
use crate::geo::Position;
use crate::model::{BoatRecord, BoatType, RowEditBatch};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

/// Maximum number of boats returned by the near-me search
const NEAR_ME_LIMIT: usize = 10;

/// Simulated round-trip time
const DEMO_LATENCY: Duration = Duration::from_millis(250);

/// Where demo users stand when no coordinates are configured (the Embarcadero)
pub const DEMO_POSITION: Position = Position {
    latitude: 37.7955,
    longitude: -122.3937,
};

pub struct DemoBoatService {
    types: Vec<BoatType>,
    boats: Mutex<Vec<BoatRecord>>,
    latency: Duration,
}

impl DemoBoatService {
    pub fn new() -> Self {
        Self::with_latency(DEMO_LATENCY)
    }

    pub fn with_latency(latency: Duration) -> Self {
        let (types, boats) = demo_fleet();
        Self {
            types,
            boats: Mutex::new(boats),
            latency,
        }
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }

    fn snapshot(&self) -> Vec<BoatRecord> {
        self.boats
            .lock()
            .map(|boats| boats.clone())
            .unwrap_or_default()
    }
}

impl Default for DemoBoatService {
    fn default() -> Self {
        Self::new()
    }
}

/// Demo boats carry their type in the Id prefix: "sail-1" is a Sailboat
fn type_of(boat: &BoatRecord) -> &str {
    boat.id.split('-').next().unwrap_or_default()
}

fn matches_type(boat: &BoatRecord, boat_type_id: &str) -> bool {
    boat_type_id.is_empty() || type_of(boat) == boat_type_id
}

#[async_trait]
impl BoatDataService for DemoBoatService {
    async fn list_boat_types(&self) -> Result<Vec<BoatType>, ServiceError> {
        self.round_trip().await;
        Ok(self.types.clone())
    }

    async fn search_boats(&self, boat_type_id: &str) -> Result<Vec<BoatRecord>, ServiceError> {
        self.round_trip().await;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|boat| matches_type(boat, boat_type_id))
            .collect())
    }

    async fn search_boats_near(
        &self,
        latitude: f64,
        longitude: f64,
        boat_type_id: &str,
    ) -> Result<String, ServiceError> {
        self.round_trip().await;
        let origin = Position::new(latitude, longitude);

        let mut nearby: Vec<(f64, BoatRecord)> = self
            .snapshot()
            .into_iter()
            .filter(|boat| matches_type(boat, boat_type_id))
            .filter_map(|boat| {
                let position = Position::new(boat.latitude?, boat.longitude?);
                Some((origin.distance_km(&position), boat))
            })
            .collect();
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

        let boats: Vec<BoatRecord> = nearby
            .into_iter()
            .take(NEAR_ME_LIMIT)
            .map(|(_, boat)| boat)
            .collect();
        serde_json::to_string(&boats).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn update_boats(&self, batch: &RowEditBatch) -> Result<(), ServiceError> {
        self.round_trip().await;
        let mut boats = self
            .boats
            .lock()
            .map_err(|_| ServiceError::Rejected("demo fleet unavailable".to_string()))?;

        // Validate everything before touching any row
        for edit in &batch.data {
            if !boats.iter().any(|boat| boat.id == edit.id) {
                return Err(ServiceError::Rejected(format!(
                    "Boat {} does not exist",
                    edit.id
                )));
            }
            if edit.price.is_some_and(|p| p < 0.0) {
                return Err(ServiceError::Rejected(
                    "Price must be a positive number".to_string(),
                ));
            }
            if edit.length.is_some_and(|l| l <= 0.0) {
                return Err(ServiceError::Rejected(
                    "Length must be greater than zero".to_string(),
                ));
            }
            if edit.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
                return Err(ServiceError::Rejected("Name is required".to_string()));
            }
        }

        for edit in &batch.data {
            if let Some(boat) = boats.iter_mut().find(|boat| boat.id == edit.id) {
                edit.apply_to(boat);
            }
        }
        tracing::debug!(rows = batch.len(), "Demo fleet updated");
        Ok(())
    }
}

fn boat(
    id: &str,
    name: &str,
    length: f64,
    price: f64,
    description: &str,
    (latitude, longitude): (f64, f64),
) -> BoatRecord {
    BoatRecord {
        id: id.to_string(),
        name: name.to_string(),
        length: Some(length),
        price: Some(price),
        description: Some(description.to_string()),
        picture_url: Some(format!("https://boats.example.com/img/{id}.png")),
        latitude: Some(latitude),
        longitude: Some(longitude),
    }
}

/// Types and boats around San Francisco Bay
fn demo_fleet() -> (Vec<BoatType>, Vec<BoatRecord>) {
    let types = vec![
        BoatType::new("sail", "Sailboat"),
        BoatType::new("motor", "Motorboat"),
        BoatType::new("yacht", "Yacht"),
        BoatType::new("fish", "Fishing Boat"),
    ];

    let boats = vec![
        boat(
            "sail-1",
            "Sea Breeze",
            32.0,
            85_000.0,
            "Classic sloop, freshly rigged",
            (37.8080, -122.4177),
        ),
        boat(
            "sail-2",
            "Windward",
            27.0,
            42_500.0,
            "Day sailer with roller furling",
            (37.8651, -122.4990),
        ),
        boat(
            "motor-1",
            "Bay Runner",
            24.0,
            61_000.0,
            "Twin outboards, seats eight",
            (37.7955, -122.3937),
        ),
        boat(
            "motor-2",
            "Quicksilver",
            21.0,
            38_900.0,
            "Center console, trailer included",
            (37.5630, -122.3255),
        ),
        boat(
            "yacht-1",
            "Golden Hour",
            58.0,
            1_250_000.0,
            "Flybridge, three cabins",
            (37.8716, -122.2727),
        ),
        boat(
            "yacht-2",
            "Marigold",
            46.0,
            720_000.0,
            "Trawler yacht built for long passages",
            (37.9735, -122.5311),
        ),
        boat(
            "fish-1",
            "Reel Deal",
            26.0,
            54_000.0,
            "Walkaround with live well",
            (37.5009, -122.4830),
        ),
        boat(
            "fish-2",
            "Osprey",
            19.0,
            23_750.0,
            "Skiff for shallow water",
            (38.0049, -122.7202),
        ),
    ];

    (types, boats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RowEdit;

    fn service() -> DemoBoatService {
        DemoBoatService::with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn search_filters_by_type() {
        let svc = service();
        assert_eq!(svc.search_boats("").await.unwrap().len(), 8);

        let sailboats = svc.search_boats("sail").await.unwrap();
        assert_eq!(sailboats.len(), 2);
        assert!(sailboats.iter().all(|b| b.id.starts_with("sail-")));
    }

    #[tokio::test]
    async fn near_me_orders_by_distance() {
        let svc = service();
        // Standing next to Bay Runner on the Embarcadero
        let payload = svc
            .search_boats_near(DEMO_POSITION.latitude, DEMO_POSITION.longitude, "")
            .await
            .unwrap();
        let boats: Vec<BoatRecord> = serde_json::from_str(&payload).unwrap();

        assert_eq!(boats.len(), 8);
        assert_eq!(boats[0].id, "motor-1");
        assert_eq!(boats.last().unwrap().id, "fish-2");
    }

    #[tokio::test]
    async fn update_applies_edits() {
        let svc = service();
        let batch = RowEditBatch::from_edits([RowEdit::new("sail-1").with_price(90_000.0)]);
        svc.update_boats(&batch).await.unwrap();

        let boats = svc.search_boats("sail").await.unwrap();
        assert_eq!(boats[0].price, Some(90_000.0));
    }

    #[tokio::test]
    async fn invalid_batch_changes_nothing() {
        let svc = service();
        let batch = RowEditBatch::from_edits([
            RowEdit::new("sail-1").with_price(90_000.0),
            RowEdit::new("sail-2").with_price(-5.0),
        ]);

        let err = svc.update_boats(&batch).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected("Price must be a positive number".into())
        );

        let boats = svc.search_boats("sail").await.unwrap();
        assert_eq!(boats[0].price, Some(85_000.0));
    }
}
