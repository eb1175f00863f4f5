//! Boats-near-me map overlay
//!
//! ```text
//!   Unrendered ──render──▶ AwaitingLocation ──position──▶ QueryPending ──markers──▶ MarkersReady
//!                                │                            ▲                        │
//!                          location error                     └──── boat type change ──┘
//!                          (stays here)
//! ```
//!
//! The near-me query is only ever issued once a position is known.
//!
//! Loading here is a local flag: the overlay emits no `loading`/`doneLoading`
//! events, so the app-wide spinner does not cover near-me queries.
//!
//! `location_request` and `near_request` hand out the async calls as
//! detached futures for the app to spawn; `render` and `run_query` chain them
//! in place for tests.

use crate::config::LocationPolicy;
use crate::error::{FetchError, LocationError, ServiceError};
use crate::events::{EventSink, Toast};
use crate::geo::{Position, SharedLocation};
use crate::model::{BoatRecord, MapMarker, ALL_TYPES_VALUE};
use crate::service::SharedService;
use std::future::Future;
use tracing::{debug, info, warn};

pub const LABEL_YOU_ARE_HERE: &str = "You are here!";
pub const ICON_STANDARD_USER: &str = "standard:user";
pub const ERROR_TITLE: &str = "Error loading Boats Near Me";
pub const ERROR_MESSAGE: &str = "Error getting Boats by Location";
pub const LOCATION_ERROR_TITLE: &str = "Location unavailable";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayState {
    Unrendered,
    AwaitingLocation,
    QueryPending { position: Position },
    MarkersReady { position: Position },
}

impl OverlayState {
    pub fn position(&self) -> Option<Position> {
        match self {
            OverlayState::QueryPending { position } | OverlayState::MarkersReady { position } => {
                Some(*position)
            }
            _ => None,
        }
    }
}

/// An issued near-me query
#[derive(Debug, Clone, PartialEq)]
pub struct NearQuery {
    generation: u64,
    position: Position,
    boat_type_id: String,
}

impl NearQuery {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn boat_type_id(&self) -> &str {
        &self.boat_type_id
    }
}

/// Build the marker list: the user first, then one marker per boat in
/// payload order
pub fn create_map_markers(position: Position, payload: &str) -> Result<Vec<MapMarker>, FetchError> {
    let boats: Vec<BoatRecord> = serde_json::from_str(payload)
        .map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

    let mut markers = Vec::with_capacity(boats.len() + 1);
    markers.push(MapMarker {
        latitude: position.latitude,
        longitude: position.longitude,
        title: LABEL_YOU_ARE_HERE.to_string(),
        icon: Some(ICON_STANDARD_USER.to_string()),
    });

    for boat in boats {
        let (Some(latitude), Some(longitude)) = (boat.latitude, boat.longitude) else {
            return Err(FetchError::MalformedPayload(format!(
                "boat {} has no geolocation",
                boat.id
            )));
        };
        markers.push(MapMarker {
            latitude,
            longitude,
            title: boat.name,
            icon: None,
        });
    }

    Ok(markers)
}

pub struct GeoMapOverlay {
    location: SharedLocation,
    service: SharedService,
    sink: EventSink,
    policy: LocationPolicy,

    state: OverlayState,
    boat_type_id: String,
    markers: Vec<MapMarker>,
    is_loading: bool,
    generation: u64,
    error: Option<FetchError>,
    location_error: Option<LocationError>,
}

impl GeoMapOverlay {
    pub fn new(
        location: SharedLocation,
        service: SharedService,
        sink: EventSink,
        policy: LocationPolicy,
    ) -> Self {
        Self {
            location,
            service,
            sink,
            policy,
            state: OverlayState::Unrendered,
            boat_type_id: ALL_TYPES_VALUE.to_string(),
            markers: Vec::new(),
            is_loading: true,
            generation: 0,
            error: None,
            location_error: None,
        }
    }

    /// First render moves to `AwaitingLocation`
    ///
    /// Returns true exactly once: when the caller should ask for the position.
    pub fn on_render(&mut self) -> bool {
        if self.state != OverlayState::Unrendered {
            return false;
        }
        self.state = OverlayState::AwaitingLocation;
        true
    }

    /// Apply the geolocation outcome
    ///
    /// A position yields the query to run. A failure leaves the overlay
    /// waiting, without ever querying the backend.
    pub fn location_resolved(
        &mut self,
        result: Result<Position, LocationError>,
    ) -> Option<NearQuery> {
        if self.state != OverlayState::AwaitingLocation {
            debug!(state = ?self.state, "Ignoring location outside AwaitingLocation");
            return None;
        }

        match result {
            Ok(position) => {
                debug!(
                    latitude = position.latitude,
                    longitude = position.longitude,
                    "Location resolved"
                );
                self.state = OverlayState::QueryPending { position };
                Some(self.issue_query(position))
            }
            Err(e) => {
                match self.policy {
                    LocationPolicy::Silent => {
                        info!(error = %e, "Location unavailable, near-me map stays empty")
                    }
                    LocationPolicy::Notify => {
                        warn!(error = %e, "Location unavailable");
                        self.sink
                            .toast(Toast::error(LOCATION_ERROR_TITLE, e.to_string()));
                    }
                }
                self.location_error = Some(e);
                None
            }
        }
    }

    /// Change the boat type; re-queries when the position is known
    pub fn set_boat_type_id(&mut self, boat_type_id: &str) -> Option<NearQuery> {
        if self.boat_type_id == boat_type_id {
            return None;
        }
        self.boat_type_id = boat_type_id.to_string();

        let position = self.state.position()?;
        self.state = OverlayState::QueryPending { position };
        self.is_loading = true;
        Some(self.issue_query(position))
    }

    fn issue_query(&mut self, position: Position) -> NearQuery {
        self.generation += 1;
        NearQuery {
            generation: self.generation,
            position,
            boat_type_id: self.boat_type_id.clone(),
        }
    }

    /// Apply a near-me response
    ///
    /// Returns `Ok(false)` when the query was superseded.
    pub fn markers_loaded(
        &mut self,
        query: NearQuery,
        result: Result<String, ServiceError>,
    ) -> Result<bool, FetchError> {
        if query.generation != self.generation {
            debug!(
                generation = query.generation,
                current = self.generation,
                "Discarding stale near-me response"
            );
            return Ok(false);
        }

        let markers = result
            .map_err(FetchError::from)
            .and_then(|payload| create_map_markers(query.position, &payload));
        self.is_loading = false;

        match markers {
            Ok(markers) => {
                debug!(markers = markers.len(), "Near-me markers ready");
                self.markers = markers;
                self.error = None;
                self.state = OverlayState::MarkersReady {
                    position: query.position,
                };
                Ok(true)
            }
            Err(e) => {
                // Markers from the last good query stay on the map
                warn!(error = %e, "Near-me query failed");
                self.error = Some(e.clone());
                self.sink.toast(Toast::error(ERROR_TITLE, ERROR_MESSAGE));
                Err(e)
            }
        }
    }

    /// The one-shot position lookup
    pub fn location_request(
        &self,
    ) -> impl Future<Output = Result<Position, LocationError>> + Send + 'static {
        let location = self.location.clone();
        async move { location.current_position().await }
    }

    /// The backend query for `query`, detached from the overlay
    pub fn near_request(
        &self,
        query: &NearQuery,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send + 'static {
        let service = self.service.clone();
        let position = query.position();
        let boat_type_id = query.boat_type_id().to_string();
        async move {
            service
                .search_boats_near(position.latitude, position.longitude, &boat_type_id)
                .await
        }
    }

    /// First render: resolve the position, then load the markers
    #[cfg(test)]
    pub async fn render(&mut self) -> Result<(), FetchError> {
        if !self.on_render() {
            return Ok(());
        }
        let result = self.location_request().await;
        match self.location_resolved(result) {
            Some(query) => self.run_query(query).await.map(|_| ()),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub async fn run_query(&mut self, query: NearQuery) -> Result<bool, FetchError> {
        let result = self.near_request(&query).await;
        self.markers_loaded(query, result)
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn boat_type_id(&self) -> &str {
        &self.boat_type_id
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn location_error(&self) -> Option<&LocationError> {
        self.location_error.as_ref()
    }
}
