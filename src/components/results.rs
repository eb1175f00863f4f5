//! Search results coordinator
//!
//! Owns the active filter, the fetched rows, the selection and the unsaved
//! edits. Every fetch is split into `begin_*` (bump the generation, emit
//! `loading`, hand out a [`SearchTicket`]) and [`ResultsCoordinator::complete_search`]
//! (apply the response if the ticket is still current). The ticket carries the
//! loading guard, so `doneLoading` fires when it is dropped: after the
//! response is applied, after a stale response is discarded, or when the
//! request future is cancelled.
//!
//! Saving follows the same shape. [`ResultsCoordinator::finish_save`] handles
//! the outcome and returns the refresh ticket that has to run next, whichever
//! branch was taken.
//!
//! The backend calls themselves come from `search_request` / `save_request`
//! as detached futures, so the app can run them as spawned tasks. The
//! awaitable `set_filter`, `refresh` and `save` chain the same halves in
//! place and only exist for driving the coordinator directly in tests.

use super::tile::SelectableTile;
use crate::bus::SelectionBus;
use crate::error::{FetchError, SaveError, ServiceError};
use crate::events::{EventSink, LoadingGuard, LoadingState, SelectionMessage, Toast};
use crate::model::{
    merge_edit, BoatRecord, Column, FilterState, RowEdit, RowEditBatch, ALL_TYPES_VALUE,
    BOAT_COLUMNS,
};
use crate::service::SharedService;
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, info, warn};

pub const SUCCESS_TITLE: &str = "Success";
pub const MESSAGE_SHIP_IT: &str = "Ship it!";
pub const ERROR_TITLE: &str = "Error";

/// An in-flight search
///
/// Dropping the ticket ends its loading pulse.
#[derive(Debug)]
pub struct SearchTicket {
    generation: u64,
    boat_type_id: String,
    _loading: LoadingGuard,
}

impl SearchTicket {
    pub fn boat_type_id(&self) -> &str {
        &self.boat_type_id
    }
}

/// What `complete_search` did with a successful response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchApplied {
    /// The row set was replaced
    Replaced,
    /// A newer search was started meanwhile; the response was dropped
    Stale,
}

pub struct ResultsCoordinator {
    service: SharedService,
    bus: SelectionBus,
    sink: EventSink,
    loading: LoadingState,

    filter: FilterState,
    /// `None` until the boat types are known; only "" is accepted before that
    known_types: Option<HashSet<String>>,
    boats: Vec<BoatRecord>,
    tiles: Vec<SelectableTile>,
    selected_boat_id: Option<String>,
    draft_values: Vec<RowEdit>,

    generation: u64,
    last_error: Option<FetchError>,
}

impl ResultsCoordinator {
    pub fn new(service: SharedService, bus: SelectionBus, sink: EventSink) -> Self {
        Self {
            service,
            bus,
            sink,
            loading: LoadingState::new(),
            filter: FilterState::default(),
            known_types: None,
            boats: Vec::new(),
            tiles: Vec::new(),
            selected_boat_id: None,
            draft_values: Vec::new(),
            generation: 0,
            last_error: None,
        }
    }

    /// Boat type ids that `begin_search` accepts besides ""
    pub fn set_known_types(&mut self, ids: impl IntoIterator<Item = String>) {
        self.known_types = Some(ids.into_iter().collect());
    }

    fn is_known_type(&self, boat_type_id: &str) -> bool {
        boat_type_id == ALL_TYPES_VALUE
            || self
                .known_types
                .as_ref()
                .is_some_and(|known| known.contains(boat_type_id))
    }

    fn issue_ticket(&mut self) -> SearchTicket {
        self.generation += 1;
        let ticket = SearchTicket {
            generation: self.generation,
            boat_type_id: self.filter.boat_type_id().to_string(),
            _loading: self.loading.start(&self.sink),
        };
        debug!(
            generation = ticket.generation,
            boat_type_id = %ticket.boat_type_id,
            "Search started"
        );
        ticket
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────────

    /// Switch the filter and start a search for it
    pub fn begin_search(&mut self, boat_type_id: &str) -> Result<SearchTicket, FetchError> {
        if !self.is_known_type(boat_type_id) {
            warn!(boat_type_id, "Search for unknown boat type rejected");
            return Err(FetchError::UnknownBoatType(boat_type_id.to_string()));
        }
        self.filter.selected_type_id = Some(boat_type_id.to_string());
        Ok(self.issue_ticket())
    }

    /// Start a search for the current filter
    ///
    /// Supersedes any search still in flight.
    pub fn begin_refresh(&mut self) -> SearchTicket {
        self.issue_ticket()
    }

    /// Apply a search response
    ///
    /// Stale tickets are discarded whatever their result. A failure on a
    /// current ticket keeps the previous rows and is retained as
    /// `last_error`.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<Vec<BoatRecord>, ServiceError>,
    ) -> Result<SearchApplied, FetchError> {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                "Discarding stale search response"
            );
            return Ok(SearchApplied::Stale);
        }

        match result {
            Ok(boats) => {
                debug!(
                    rows = boats.len(),
                    boat_type_id = %ticket.boat_type_id,
                    "Search results replaced"
                );
                self.replace_rows(boats);
                self.last_error = None;
                Ok(SearchApplied::Replaced)
            }
            Err(e) => {
                warn!(error = %e, boat_type_id = %ticket.boat_type_id, "Search failed");
                let err = FetchError::from(e);
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn replace_rows(&mut self, boats: Vec<BoatRecord>) {
        self.boats = boats;

        let ids: HashSet<&str> = self.boats.iter().map(|b| b.id.as_str()).collect();
        let before = self.draft_values.len();
        self.draft_values.retain(|edit| ids.contains(edit.id.as_str()));
        if self.draft_values.len() != before {
            debug!(
                dropped = before - self.draft_values.len(),
                "Dropped drafts for rows no longer in the result set"
            );
        }

        let selection = self.selected_boat_id.as_deref();
        self.tiles = self
            .boats
            .iter()
            .map(|boat| SelectableTile::new(boat.clone(), selection))
            .collect();
    }

    /// The backend query for a ticket, detached from the coordinator
    pub fn search_request(
        &self,
        ticket: &SearchTicket,
    ) -> impl Future<Output = Result<Vec<BoatRecord>, ServiceError>> + Send + 'static {
        let service = self.service.clone();
        let boat_type_id = ticket.boat_type_id().to_string();
        async move { service.search_boats(&boat_type_id).await }
    }

    #[cfg(test)]
    pub async fn run_search(&mut self, ticket: SearchTicket) -> Result<SearchApplied, FetchError> {
        let result = self.search_request(&ticket).await;
        self.complete_search(ticket, result)
    }

    #[cfg(test)]
    pub async fn set_filter(&mut self, boat_type_id: &str) -> Result<SearchApplied, FetchError> {
        let ticket = self.begin_search(boat_type_id)?;
        self.run_search(ticket).await
    }

    #[cfg(test)]
    pub async fn refresh(&mut self) -> Result<SearchApplied, FetchError> {
        let ticket = self.begin_refresh();
        self.run_search(ticket).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Editing and saving
    // ─────────────────────────────────────────────────────────────────────

    /// Merge an edit into the drafts; later fields overwrite earlier ones
    pub fn stage_edit(&mut self, edit: RowEdit) -> Result<(), SaveError> {
        if !self.has_row(&edit.id) {
            return Err(SaveError::UnknownRecord(edit.id));
        }
        merge_edit(&mut self.draft_values, edit);
        Ok(())
    }

    pub fn draft_values(&self) -> &[RowEdit] {
        &self.draft_values
    }

    fn has_row(&self, id: &str) -> bool {
        self.boats.iter().any(|boat| boat.id == id)
    }

    /// A batch must be non-empty and only reference fetched rows
    pub fn validate_batch(&self, batch: &RowEditBatch) -> Result<(), SaveError> {
        if batch.is_empty() {
            return Err(SaveError::Empty);
        }
        match batch.ids().find(|id| !self.has_row(id)) {
            Some(unknown) => Err(SaveError::UnknownRecord(unknown.to_string())),
            None => Ok(()),
        }
    }

    /// The backend update for a batch, detached from the coordinator
    ///
    /// An invalid batch resolves to its validation error without reaching
    /// the backend.
    pub fn save_request(
        &self,
        batch: &RowEditBatch,
    ) -> impl Future<Output = Result<(), SaveError>> + Send + 'static {
        let validated = self.validate_batch(batch);
        let service = self.service.clone();
        let batch = batch.clone();
        async move {
            validated?;
            service.update_boats(&batch).await.map_err(SaveError::from)
        }
    }

    /// Handle a save outcome and start the refresh that always follows it
    pub fn finish_save(
        &mut self,
        batch: RowEditBatch,
        outcome: Result<(), SaveError>,
    ) -> SearchTicket {
        match outcome {
            Ok(()) => {
                info!(rows = batch.len(), "Boats saved");
                self.draft_values.clear();
                self.sink
                    .toast(Toast::success(SUCCESS_TITLE, MESSAGE_SHIP_IT));
            }
            Err(e) => {
                warn!(error = %e, rows = batch.len(), "Save failed");
                self.sink.toast(Toast::error(ERROR_TITLE, e.to_string()));
                // Keep the submitted values for rows still on screen;
                // anything staged since wins
                let mut restored: Vec<RowEdit> = batch
                    .data
                    .into_iter()
                    .filter(|edit| self.has_row(&edit.id))
                    .collect();
                for edit in self.draft_values.drain(..) {
                    merge_edit(&mut restored, edit);
                }
                self.draft_values = restored;
            }
        }
        self.begin_refresh()
    }

    /// Persist a batch, then refresh regardless of the outcome
    #[cfg(test)]
    pub async fn save(&mut self, batch: RowEditBatch) -> Result<(), SaveError> {
        let outcome = self.save_request(&batch).await;
        let ticket = self.finish_save(batch, outcome.clone());
        // A failed refresh is retained as last_error
        let _ = self.run_search(ticket).await;
        outcome
    }

    /// Submit the current drafts as one batch
    #[cfg(test)]
    pub async fn save_drafts(&mut self) -> Result<(), SaveError> {
        let batch = self.drafts_batch();
        self.save(batch).await
    }

    pub fn drafts_batch(&self) -> RowEditBatch {
        RowEditBatch::from_edits(self.draft_values.iter().cloned())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────

    /// Record the selection and publish it on the bus
    ///
    /// Returns the number of subscribers reached.
    pub fn on_tile_selected(&mut self, boat_id: &str) -> usize {
        self.selected_boat_id = Some(boat_id.to_string());
        for tile in &mut self.tiles {
            tile.sync_selection(Some(boat_id));
        }
        let reached = self.bus.publish(SelectionMessage::new(boat_id));
        debug!(boat_id, reached, "Selection published");
        reached
    }

    /// Activate the tile at `index`; its `boatselect` goes to the container
    pub fn activate_tile(&mut self, index: usize) -> Option<String> {
        let tile = self.tiles.get_mut(index)?;
        tile.on_activate(&self.sink);
        Some(tile.boat().id.clone())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn columns(&self) -> &'static [Column] {
        &BOAT_COLUMNS
    }

    pub fn boats(&self) -> &[BoatRecord] {
        &self.boats
    }

    pub fn tiles(&self) -> &[SelectableTile] {
        &self.tiles
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn selected_boat_id(&self) -> Option<&str> {
        self.selected_boat_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ToastVariant, UiEvent};
    use crate::service::testing::{Call, ScriptedService};
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn fleet() -> Vec<BoatRecord> {
        vec![
            BoatRecord::new("b1", "Sea Breeze"),
            BoatRecord::new("b2", "Osprey"),
        ]
    }

    fn setup(
        service: ScriptedService,
    ) -> (
        ResultsCoordinator,
        Arc<ScriptedService>,
        UnboundedReceiver<UiEvent>,
        SelectionBus,
    ) {
        let service = Arc::new(service);
        let bus = SelectionBus::new();
        let (sink, rx) = EventSink::channel();
        let mut coordinator = ResultsCoordinator::new(service.clone(), bus.clone(), sink);
        coordinator.set_known_types(["t1".to_string(), "t2".to_string()]);
        (coordinator, service, rx, bus)
    }

    fn drain(rx: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn loading_balance(events: &[UiEvent]) -> i64 {
        events.iter().fold(0, |acc, e| match e {
            UiEvent::Loading => acc + 1,
            UiEvent::DoneLoading => acc - 1,
            _ => acc,
        })
    }

    #[tokio::test]
    async fn set_filter_replaces_rows_with_matched_loading_pair() {
        let (mut c, service, mut rx, _bus) =
            setup(ScriptedService::new().with_boats("t1", fleet()));

        assert_eq!(c.set_filter("t1").await, Ok(SearchApplied::Replaced));

        assert_eq!(c.filter().boat_type_id(), "t1");
        assert_eq!(c.boats().len(), 2);
        assert_eq!(c.tiles().len(), 2);
        assert_eq!(service.search_calls(), vec!["t1"]);
        assert_eq!(drain(&mut rx), vec![UiEvent::Loading, UiEvent::DoneLoading]);
        assert!(!c.is_loading());
    }

    #[tokio::test]
    async fn unknown_filter_is_rejected_without_fetch() {
        let (mut c, service, mut rx, _bus) = setup(ScriptedService::new());

        assert_eq!(
            c.set_filter("t9").await,
            Err(FetchError::UnknownBoatType("t9".into()))
        );
        assert!(service.calls().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn only_all_types_before_types_are_known() {
        let service = Arc::new(ScriptedService::new());
        let (sink, _rx) = EventSink::channel();
        let mut c = ResultsCoordinator::new(service, SelectionBus::new(), sink);

        assert!(c.begin_search("t1").is_err());
        assert!(c.begin_search("").is_ok());
    }

    #[tokio::test]
    async fn consecutive_refreshes_issue_identical_fetches() {
        let (mut c, service, _rx, _bus) = setup(ScriptedService::new().with_boats("t2", fleet()));
        c.set_filter("t2").await.unwrap();

        c.refresh().await.unwrap();
        c.refresh().await.unwrap();

        assert_eq!(service.search_calls(), vec!["t2", "t2", "t2"]);
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let (mut c, _service, mut rx, _bus) = setup(ScriptedService::new());

        let first = c.begin_search("t1").unwrap();
        let second = c.begin_search("t2").unwrap();

        assert_eq!(
            c.complete_search(second, Ok(vec![BoatRecord::new("b2", "Osprey")])),
            Ok(SearchApplied::Replaced)
        );
        assert_eq!(
            c.complete_search(first, Ok(vec![BoatRecord::new("b1", "Sea Breeze")])),
            Ok(SearchApplied::Stale)
        );

        assert_eq!(c.boats()[0].id, "b2");
        assert_eq!(c.filter().boat_type_id(), "t2");
        assert_eq!(loading_balance(&drain(&mut rx)), 0);
    }

    #[tokio::test]
    async fn failure_keeps_rows_and_balances_loading() {
        let (mut c, service, mut rx, _bus) =
            setup(ScriptedService::new().with_boats("", fleet()));
        c.refresh().await.unwrap();
        drain(&mut rx);

        service.fail_search(Some(ServiceError::Transport("offline".into())));
        let err = c.refresh().await.unwrap_err();

        assert_eq!(c.last_error(), Some(&err));
        assert_eq!(c.boats().len(), 2);
        assert_eq!(drain(&mut rx), vec![UiEvent::Loading, UiEvent::DoneLoading]);

        service.fail_search(None);
        c.refresh().await.unwrap();
        assert_eq!(c.last_error(), None);
    }

    #[tokio::test]
    async fn dropped_ticket_still_ends_loading() {
        let (mut c, _service, mut rx, _bus) = setup(ScriptedService::new());

        let ticket = c.begin_refresh();
        assert!(c.is_loading());
        drop(ticket);

        assert!(!c.is_loading());
        assert_eq!(drain(&mut rx), vec![UiEvent::Loading, UiEvent::DoneLoading]);
    }

    #[tokio::test]
    async fn save_success_toasts_then_refreshes_once() {
        let (mut c, service, mut rx, _bus) =
            setup(ScriptedService::new().with_boats("", fleet()));
        c.refresh().await.unwrap();
        c.stage_edit(RowEdit::new("b1").with_price(1000.0)).unwrap();
        drain(&mut rx);

        let batch = c.drafts_batch();
        assert_eq!(c.save(batch.clone()).await, Ok(()));

        assert!(c.draft_values().is_empty());
        assert_eq!(
            drain(&mut rx),
            vec![
                UiEvent::Toast(Toast::success("Success", "Ship it!")),
                UiEvent::Loading,
                UiEvent::DoneLoading,
            ]
        );
        let calls = service.calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[Call::UpdateBoats(batch), Call::SearchBoats(String::new())]
        );
    }

    #[tokio::test]
    async fn save_failure_keeps_drafts_and_still_refreshes() {
        let (mut c, service, mut rx, _bus) =
            setup(ScriptedService::new().with_boats("", fleet()));
        c.refresh().await.unwrap();
        service.set_update_result(Err(ServiceError::Rejected(
            "Price must be a positive number".into(),
        )));
        c.stage_edit(RowEdit::new("b1").with_price(-1.0)).unwrap();
        drain(&mut rx);

        let err = c.save_drafts().await.unwrap_err();

        assert_eq!(
            err,
            SaveError::Rejected("Price must be a positive number".into())
        );
        assert_eq!(c.draft_values(), &[RowEdit::new("b1").with_price(-1.0)]);
        let events = drain(&mut rx);
        match &events[0] {
            UiEvent::Toast(toast) => {
                assert_eq!(toast.variant, ToastVariant::Error);
                assert_eq!(toast.title, "Error");
                assert_eq!(toast.message, "Price must be a positive number");
            }
            other => panic!("expected toast, got {other:?}"),
        }
        assert_eq!(&events[1..], &[UiEvent::Loading, UiEvent::DoneLoading]);
        assert_eq!(service.search_calls().len(), 2);
    }

    #[tokio::test]
    async fn batch_with_unknown_row_skips_backend() {
        let (mut c, service, _rx, _bus) = setup(ScriptedService::new().with_boats("", fleet()));
        c.refresh().await.unwrap();

        let batch = RowEditBatch::from_edits([RowEdit::new("ghost").with_price(1.0)]);
        assert_eq!(
            c.save(batch).await,
            Err(SaveError::UnknownRecord("ghost".into()))
        );

        assert!(!service
            .calls()
            .iter()
            .any(|call| matches!(call, Call::UpdateBoats(_))));
        assert_eq!(service.search_calls().len(), 2);
    }

    #[tokio::test]
    async fn rejected_batch_only_restores_known_rows() {
        let (mut c, service, _rx, _bus) = setup(ScriptedService::new().with_boats("", fleet()));
        c.refresh().await.unwrap();
        service.fail_search(Some(ServiceError::Transport("offline".into())));

        let batch = RowEditBatch::from_edits([
            RowEdit::new("b1").with_price(1.0),
            RowEdit::new("ghost").with_price(2.0),
        ]);
        assert_eq!(
            c.save(batch).await,
            Err(SaveError::UnknownRecord("ghost".into()))
        );

        // The refresh failed, so nothing pruned the drafts since
        assert!(c.last_error().is_some());
        assert_eq!(c.draft_values(), &[RowEdit::new("b1").with_price(1.0)]);

        service.fail_search(None);
        c.stage_edit(RowEdit::new("b2").with_length(5.0)).unwrap();
        assert_eq!(c.save_drafts().await, Ok(()));

        let expected = RowEditBatch::from_edits([
            RowEdit::new("b1").with_price(1.0),
            RowEdit::new("b2").with_length(5.0),
        ]);
        assert!(service.calls().contains(&Call::UpdateBoats(expected)));
    }

    #[tokio::test]
    async fn staged_edits_merge_and_reject_unknown_rows() {
        let (mut c, _service, _rx, _bus) = setup(ScriptedService::new().with_boats("", fleet()));
        c.refresh().await.unwrap();

        c.stage_edit(RowEdit::new("b1").with_price(10.0)).unwrap();
        c.stage_edit(RowEdit::new("b1").with_name("Renamed").with_price(20.0))
            .unwrap();

        assert_eq!(
            c.draft_values(),
            &[RowEdit::new("b1").with_name("Renamed").with_price(20.0)]
        );
        assert_eq!(
            c.stage_edit(RowEdit::new("zz")),
            Err(SaveError::UnknownRecord("zz".into()))
        );
    }

    #[tokio::test]
    async fn drafts_for_vanished_rows_are_pruned() {
        let (mut c, _service, _rx, _bus) = setup(
            ScriptedService::new()
                .with_boats("", fleet())
                .with_boats("t1", vec![BoatRecord::new("b2", "Osprey")]),
        );
        c.refresh().await.unwrap();
        c.stage_edit(RowEdit::new("b1").with_price(10.0)).unwrap();
        c.stage_edit(RowEdit::new("b2").with_price(20.0)).unwrap();

        c.set_filter("t1").await.unwrap();

        assert_eq!(c.draft_values(), &[RowEdit::new("b2").with_price(20.0)]);
    }

    #[tokio::test]
    async fn selection_reaches_earlier_subscriber() {
        let (mut c, _service, mut rx, bus) =
            setup(ScriptedService::new().with_boats("", fleet()));
        c.refresh().await.unwrap();
        let mut subscriber = bus.subscribe();
        drain(&mut rx);

        let boat_id = c.activate_tile(1).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![UiEvent::BoatSelect {
                boat_id: boat_id.clone()
            }]
        );

        assert_eq!(c.on_tile_selected(&boat_id), 1);
        assert_eq!(subscriber.try_recv(), Some(SelectionMessage::new("b2")));
        assert_eq!(c.selected_boat_id(), Some("b2"));
        let selected: Vec<bool> = c.tiles().iter().map(|t| t.is_selected()).collect();
        assert_eq!(selected, vec![false, true]);
    }

    #[tokio::test]
    async fn selection_survives_refresh() {
        let (mut c, _service, _rx, _bus) = setup(ScriptedService::new().with_boats("", fleet()));
        c.refresh().await.unwrap();
        c.on_tile_selected("b1");

        c.refresh().await.unwrap();

        assert!(c.tiles()[0].is_selected());
        assert_eq!(c.activate_tile(5), None);
    }
}
