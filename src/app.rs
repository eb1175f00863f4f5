// Search container - owns the components and routes their events
//
// Nothing here blocks on the network. Backend and location calls run as
// spawned tasks that send a `Completion` back over a channel; the front-end
// (TUI loop, headless runner, tests) feeds completions into `apply`, which
// hands each one to the component that asked for it and then drains the UI
// events the components emitted in response.
//
//   TypeFilterSource ──search──▶ FleetApp ──set_filter──▶ ResultsCoordinator
//   SelectableTile ──boatselect──▶ FleetApp ──on_tile_selected──▶ SelectionBus
//   any component ──loading/doneLoading──▶ spinner depth
//   any component ──toast──▶ toast queue

use crate::bus::SelectionBus;
use crate::components::{
    GeoMapOverlay, NearQuery, ResultsCoordinator, SearchTicket, TypeFilterSource,
};
use crate::config::LocationPolicy;
use crate::error::{FetchError, LocationError, SaveError, ServiceError};
use crate::events::{EventSink, Toast, UiEvent};
use crate::geo::{Position, SharedLocation};
use crate::model::{BoatRecord, BoatType, RowEdit, RowEditBatch};
use crate::service::SharedService;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Toasts kept for display; older ones are dropped first
const MAX_TOASTS: usize = 5;

/// Result of a spawned request, routed back to the component that issued it
#[derive(Debug)]
pub enum Completion {
    BoatTypes(Result<Vec<BoatType>, ServiceError>),
    Search(SearchTicket, Result<Vec<BoatRecord>, ServiceError>),
    Saved(RowEditBatch, Result<(), SaveError>),
    Location(Result<Position, LocationError>),
    NearMe(NearQuery, Result<String, ServiceError>),
}

pub struct FleetApp {
    service: SharedService,
    bus: SelectionBus,

    events_rx: mpsc::UnboundedReceiver<UiEvent>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    /// Spawned requests whose completion has not been applied yet
    in_flight: usize,

    pub filter: TypeFilterSource,
    pub results: ResultsCoordinator,
    pub overlay: GeoMapOverlay,

    spinner_depth: usize,
    toasts: VecDeque<Toast>,
    mounted: bool,
}

impl FleetApp {
    pub fn new(service: SharedService, location: SharedLocation, policy: LocationPolicy) -> Self {
        let bus = SelectionBus::new();
        let (sink, events_rx) = EventSink::channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            filter: TypeFilterSource::new(sink.clone()),
            results: ResultsCoordinator::new(service.clone(), bus.clone(), sink.clone()),
            overlay: GeoMapOverlay::new(location, service.clone(), sink, policy),
            service,
            bus,
            events_rx,
            completions_tx,
            completions_rx,
            in_flight: 0,
            spinner_depth: 0,
            toasts: VecDeque::new(),
            mounted: false,
        }
    }

    /// Start the initial requests: boat types, the unfiltered search and the
    /// overlay's location lookup
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        info!("Mounting boat search");

        if let Some(request) = self.filter.types_request(&self.service) {
            self.spawn(async move { Completion::BoatTypes(request.await) });
        }

        let ticket = self.results.begin_refresh();
        self.spawn_search(ticket);

        if self.overlay.on_render() {
            let request = self.overlay.location_request();
            self.spawn(async move { Completion::Location(request.await) });
        }

        self.pump();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Spawning
    // ─────────────────────────────────────────────────────────────────────

    fn spawn<F>(&mut self, request: F)
    where
        F: std::future::Future<Output = Completion> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            // The app only goes away on shutdown; nothing left to deliver to
            let _ = tx.send(request.await);
        });
    }

    fn spawn_search(&mut self, ticket: SearchTicket) {
        let request = self.results.search_request(&ticket);
        self.spawn(async move { Completion::Search(ticket, request.await) });
    }

    fn spawn_near(&mut self, query: NearQuery) {
        let request = self.overlay.near_request(&query);
        self.spawn(async move { Completion::NearMe(query, request.await) });
    }

    fn spawn_save(&mut self, batch: RowEditBatch) {
        let request = self.results.save_request(&batch);
        self.spawn(async move { Completion::Saved(batch, request.await) });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Event routing
    // ─────────────────────────────────────────────────────────────────────

    /// Route one UI event to its handler
    pub fn dispatch(&mut self, event: UiEvent) {
        match event {
            UiEvent::Search { boat_type_id } => {
                match self.results.begin_search(&boat_type_id) {
                    Ok(ticket) => self.spawn_search(ticket),
                    Err(e) => warn!(error = %e, "Search not started"),
                }
                if let Some(query) = self.overlay.set_boat_type_id(&boat_type_id) {
                    self.spawn_near(query);
                }
            }
            UiEvent::BoatSelect { boat_id } => {
                self.results.on_tile_selected(&boat_id);
            }
            UiEvent::Loading => self.spinner_depth += 1,
            UiEvent::DoneLoading => self.spinner_depth = self.spinner_depth.saturating_sub(1),
            UiEvent::Toast(toast) => {
                info!(title = %toast.title, message = %toast.message, "Toast");
                if self.toasts.len() >= MAX_TOASTS {
                    self.toasts.pop_front();
                }
                self.toasts.push_back(toast);
            }
        }
    }

    /// Dispatch every pending UI event; returns how many were handled
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    /// Hand a completion to the component that issued the request
    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match completion {
            Completion::BoatTypes(result) => {
                if self.filter.apply_types(result).is_ok() {
                    self.results.set_known_types(self.filter.known_type_ids());
                }
            }
            Completion::Search(ticket, result) => {
                // Failures are retained by the coordinator
                let _ = self.results.complete_search(ticket, result);
            }
            Completion::Saved(batch, outcome) => {
                let ticket = self.results.finish_save(batch, outcome);
                self.spawn_search(ticket);
            }
            Completion::Location(result) => {
                if let Some(query) = self.overlay.location_resolved(result) {
                    self.spawn_near(query);
                }
            }
            Completion::NearMe(query, result) => {
                let _ = self.overlay.markers_loaded(query, result);
            }
        }

        self.pump();
    }

    /// Wait for the next completion
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Apply completions until nothing is in flight
    ///
    /// Returns false if `timeout` elapsed first.
    pub async fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.in_flight > 0 {
            match tokio::time::timeout_at(deadline, self.completions_rx.recv()).await {
                Ok(Some(completion)) => self.apply(completion),
                Ok(None) => break,
                Err(_) => {
                    debug!(in_flight = self.in_flight, "Timed out waiting for requests");
                    return false;
                }
            }
        }
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // User actions
    // ─────────────────────────────────────────────────────────────────────

    /// Pick a boat type in the filter
    pub fn select_type(&mut self, boat_type_id: &str) -> Result<(), FetchError> {
        self.filter.on_user_change(boat_type_id)?;
        self.pump();
        Ok(())
    }

    /// Move the filter selection by `step` options, wrapping around
    pub fn cycle_type(&mut self, step: isize) -> Result<(), FetchError> {
        let options = self.filter.options();
        if options.is_empty() {
            return Ok(());
        }
        let current = options
            .iter()
            .position(|o| o.value == self.filter.selected_boat_type_id())
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(options.len() as isize) as usize;
        let value = options[next].value.clone();
        self.select_type(&value)
    }

    pub fn activate_tile(&mut self, index: usize) -> Option<String> {
        let boat_id = self.results.activate_tile(index)?;
        self.pump();
        Some(boat_id)
    }

    pub fn request_refresh(&mut self) {
        let ticket = self.results.begin_refresh();
        self.spawn_search(ticket);
        self.pump();
    }

    pub fn stage_edit(&mut self, edit: RowEdit) -> Result<(), SaveError> {
        self.results.stage_edit(edit)
    }

    /// Submit the drafts
    ///
    /// An invalid batch never reaches the backend but still completes through
    /// the failure branch, refresh included.
    pub fn request_save(&mut self) {
        let batch = self.results.drafts_batch();
        self.spawn_save(batch);
        self.pump();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Display state
    // ─────────────────────────────────────────────────────────────────────

    pub fn is_loading(&self) -> bool {
        self.spinner_depth > 0
    }

    pub fn spinner_depth(&self) -> usize {
        self.spinner_depth
    }

    #[cfg(test)]
    pub fn toasts(&self) -> &VecDeque<Toast> {
        &self.toasts
    }

    /// Hand the queued toasts to the front-end
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain(..).collect()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn bus(&self) -> &SelectionBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::OverlayState;
    use crate::events::SelectionMessage;
    use crate::geo::{FixedLocation, NoLocation};
    use crate::service::testing::{Call, ScriptedService};
    use std::sync::Arc;

    const WAIT: Duration = Duration::from_secs(5);

    fn placed(id: &str, name: &str, lat: f64, lon: f64) -> BoatRecord {
        let mut boat = BoatRecord::new(id, name);
        boat.latitude = Some(lat);
        boat.longitude = Some(lon);
        boat
    }

    fn scripted() -> ScriptedService {
        let all = vec![
            placed("b1", "Sea Breeze", 37.80, -122.41),
            placed("b2", "Osprey", 38.00, -122.72),
        ];
        let near = serde_json::to_string(&all).unwrap();
        ScriptedService::new()
            .with_types(vec![
                BoatType::new("t1", "Sailboat"),
                BoatType::new("t2", "Motorboat"),
            ])
            .with_boats("", all.clone())
            .with_boats("t1", vec![all[0].clone()])
            .with_near_payload(&near)
    }

    fn app_with(service: Arc<ScriptedService>, location: SharedLocation) -> FleetApp {
        FleetApp::new(service, location, LocationPolicy::Silent)
    }

    async fn mounted(service: Arc<ScriptedService>) -> FleetApp {
        let mut app = app_with(service, Arc::new(FixedLocation(Position::new(37.79, -122.39))));
        app.mount();
        assert!(app.run_until_idle(WAIT).await);
        app
    }

    #[tokio::test]
    async fn mount_loads_everything() {
        let service = Arc::new(scripted());
        let app = mounted(service.clone()).await;

        assert_eq!(app.filter.options().len(), 3);
        assert_eq!(app.results.boats().len(), 2);
        assert_eq!(app.overlay.markers().len(), 3);
        assert!(matches!(
            app.overlay.state(),
            OverlayState::MarkersReady { .. }
        ));
        assert!(!app.is_loading());
        assert_eq!(app.in_flight(), 0);
        assert_eq!(service.search_calls(), vec![""]);
    }

    #[tokio::test]
    async fn mount_is_idempotent() {
        let service = Arc::new(scripted());
        let mut app = mounted(service.clone()).await;

        app.mount();
        assert!(app.run_until_idle(WAIT).await);
        assert_eq!(service.search_calls().len(), 1);
    }

    #[tokio::test]
    async fn filter_change_searches_results_and_map() {
        let service = Arc::new(scripted());
        let mut app = mounted(service.clone()).await;

        app.select_type("t1").unwrap();
        assert!(app.is_loading());
        assert!(app.run_until_idle(WAIT).await);

        assert_eq!(app.results.filter().boat_type_id(), "t1");
        assert_eq!(app.results.boats().len(), 1);
        assert_eq!(app.overlay.boat_type_id(), "t1");
        assert_eq!(
            service.calls().last(),
            Some(&Call::SearchBoatsNear(37.79, -122.39, "t1".into()))
        );
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn cycle_type_wraps_around() {
        let service = Arc::new(scripted());
        let mut app = mounted(service).await;

        app.cycle_type(-1).unwrap();
        assert_eq!(app.filter.selected_boat_type_id(), "t2");
        app.cycle_type(1).unwrap();
        assert_eq!(app.filter.selected_boat_type_id(), "");
    }

    #[tokio::test]
    async fn tile_activation_reaches_bus_subscriber() {
        let service = Arc::new(scripted());
        let mut app = mounted(service).await;
        let mut subscriber = app.bus().subscribe();

        assert_eq!(app.activate_tile(0), Some("b1".to_string()));

        assert_eq!(subscriber.try_recv(), Some(SelectionMessage::new("b1")));
        assert_eq!(app.results.selected_boat_id(), Some("b1"));
        assert!(app.results.tiles()[0].is_selected());
    }

    #[tokio::test]
    async fn save_toasts_then_refreshes() {
        let service = Arc::new(scripted());
        let mut app = mounted(service.clone()).await;

        app.stage_edit(RowEdit::new("b1").with_price(1000.0)).unwrap();
        app.request_save();
        assert!(app.run_until_idle(WAIT).await);

        let toasts = app.take_toasts();
        assert_eq!(toasts, vec![Toast::success("Success", "Ship it!")]);
        assert!(app.results.draft_values().is_empty());

        let calls = service.calls();
        let update_at = calls
            .iter()
            .position(|c| matches!(c, Call::UpdateBoats(_)))
            .unwrap();
        assert_eq!(
            &calls[update_at + 1..],
            &[Call::SearchBoats(String::new())]
        );
    }

    #[tokio::test]
    async fn rejected_save_keeps_drafts_and_refreshes_once() {
        let service = Arc::new(scripted());
        let mut app = mounted(service.clone()).await;
        service.set_update_result(Err(ServiceError::Rejected(
            "Price must be a positive number".into(),
        )));

        app.stage_edit(RowEdit::new("b1").with_price(-1.0)).unwrap();
        app.request_save();
        assert!(app.run_until_idle(WAIT).await);

        assert_eq!(
            app.take_toasts(),
            vec![Toast::error("Error", "Price must be a positive number")]
        );
        assert_eq!(
            app.results.draft_values(),
            &[RowEdit::new("b1").with_price(-1.0)]
        );
        assert!(!app.is_loading());

        let calls = service.calls();
        let update_at = calls
            .iter()
            .position(|c| matches!(c, Call::UpdateBoats(_)))
            .unwrap();
        assert_eq!(
            &calls[update_at + 1..],
            &[Call::SearchBoats(String::new())]
        );
    }

    #[tokio::test]
    async fn empty_save_fails_but_still_refreshes() {
        let service = Arc::new(scripted());
        let mut app = mounted(service.clone()).await;

        app.request_save();
        assert!(app.run_until_idle(WAIT).await);

        assert_eq!(
            app.take_toasts(),
            vec![Toast::error("Error", "nothing to save")]
        );
        assert_eq!(service.search_calls().len(), 2);
    }

    #[tokio::test]
    async fn missing_location_leaves_map_waiting() {
        let service = Arc::new(scripted());
        let mut app = app_with(service.clone(), Arc::new(NoLocation::default()));
        app.mount();
        assert!(app.run_until_idle(WAIT).await);

        assert_eq!(app.overlay.state(), OverlayState::AwaitingLocation);
        assert!(app.toasts().is_empty());
        assert!(!service
            .calls()
            .iter()
            .any(|c| matches!(c, Call::SearchBoatsNear(..))));
    }

    #[tokio::test]
    async fn toast_queue_is_bounded() {
        let service = Arc::new(ScriptedService::new());
        let mut app = app_with(service, Arc::new(NoLocation::default()));

        for i in 0..8 {
            app.dispatch(UiEvent::Toast(Toast::error("Error", format!("#{i}"))));
        }

        assert_eq!(app.toasts().len(), MAX_TOASTS);
        assert_eq!(app.toasts()[0].message, "#3");
    }
}
