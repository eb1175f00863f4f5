// TUI application state
//
// Wraps the search container with what only the terminal front-end needs:
// the table cursor, visible toasts, the logs toggle and the spinner frame.
// The status bar listens on the selection bus like any outside subscriber.

use super::components::toast::ToastView;
use crate::app::FleetApp;
use crate::bus::Subscription;
use crate::events::SelectionMessage;
use crate::logging::LogBuffer;
use crate::model::RowEdit;
use std::time::Instant;
use tracing::warn;

/// Price change per `+` / `-` press
pub const PRICE_STEP: f64 = 1000.0;

/// Length change per `]` / `[` press
pub const LENGTH_STEP: f64 = 1.0;

/// Toasts on screen at once
const MAX_VISIBLE_TOASTS: usize = 3;

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct App {
    pub fleet: FleetApp,
    pub log_buffer: LogBuffer,

    /// Highlighted row in the results table
    pub cursor: usize,

    pub toasts: Vec<ToastView>,

    pub show_logs: bool,

    /// Status bar's subscription to the selection bus
    pub selection: Subscription,
    /// Last record id received over the bus
    pub broadcast_selection: Option<String>,

    pub should_quit: bool,

    pub start_time: Instant,

    animation_frame: usize,
}

impl App {
    pub fn new(fleet: FleetApp, log_buffer: LogBuffer) -> Self {
        let selection = fleet.bus().subscribe();
        Self {
            fleet,
            log_buffer,
            cursor: 0,
            toasts: Vec::new(),
            show_logs: true,
            selection,
            broadcast_selection: None,
            should_quit: false,
            start_time: Instant::now(),
            animation_frame: 0,
        }
    }

    pub fn on_selection(&mut self, message: SelectionMessage) {
        self.broadcast_selection = Some(message.record_id);
    }

    pub fn tick_animation(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.animation_frame]
    }

    pub fn uptime(&self) -> String {
        let seconds = self.start_time.elapsed().as_secs();
        format!(
            "{:02}:{:02}:{:02}",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        )
    }

    /// Move queued toasts on screen and drop expired ones
    pub fn sync_toasts(&mut self) {
        self.toasts
            .extend(self.fleet.take_toasts().into_iter().map(ToastView::new));
        self.toasts.retain(|toast| !toast.is_expired());
        let overflow = self.toasts.len().saturating_sub(MAX_VISIBLE_TOASTS);
        self.toasts.drain(..overflow);
    }

    /// Keep the cursor on a row after the result set changed
    pub fn clamp_cursor(&mut self) {
        let rows = self.fleet.results.boats().len();
        self.cursor = self.cursor.min(rows.saturating_sub(1));
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        let rows = self.fleet.results.boats().len();
        if self.cursor + 1 < rows {
            self.cursor += 1;
        }
    }

    pub fn activate_cursor(&mut self) {
        self.fleet.activate_tile(self.cursor);
    }

    /// Stage a price change on the highlighted row
    pub fn adjust_price(&mut self, delta: f64) {
        self.adjust(delta, |edit| edit.price, |boat| boat.price, RowEdit::with_price);
    }

    /// Stage a length change on the highlighted row
    pub fn adjust_length(&mut self, delta: f64) {
        self.adjust(delta, |edit| edit.length, |boat| boat.length, RowEdit::with_length);
    }

    fn adjust(
        &mut self,
        delta: f64,
        drafted: impl Fn(&RowEdit) -> Option<f64>,
        stored: impl Fn(&crate::model::BoatRecord) -> Option<f64>,
        with: impl Fn(RowEdit, f64) -> RowEdit,
    ) {
        let results = &self.fleet.results;
        let Some(boat) = results.boats().get(self.cursor) else {
            return;
        };

        // Build on the pending draft if there is one
        let current = results
            .draft_values()
            .iter()
            .find(|edit| edit.id == boat.id)
            .and_then(&drafted)
            .or_else(|| stored(boat))
            .unwrap_or_default();

        let edit = with(RowEdit::new(boat.id.clone()), current + delta);
        if let Err(e) = self.fleet.stage_edit(edit) {
            warn!(error = %e, "Edit not staged");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationPolicy;
    use crate::geo::NoLocation;
    use crate::model::BoatRecord;
    use crate::service::testing::ScriptedService;
    use std::sync::Arc;
    use std::time::Duration;

    async fn loaded_app() -> App {
        let mut boat = BoatRecord::new("b1", "Sea Breeze");
        boat.price = Some(5000.0);
        let service = Arc::new(
            ScriptedService::new().with_boats("", vec![boat, BoatRecord::new("b2", "Osprey")]),
        );
        let mut fleet = FleetApp::new(service, Arc::new(NoLocation::default()), LocationPolicy::Silent);
        fleet.mount();
        assert!(fleet.run_until_idle(Duration::from_secs(5)).await);
        App::new(fleet, LogBuffer::new())
    }

    #[tokio::test]
    async fn price_steps_accumulate_on_the_draft() {
        let mut app = loaded_app().await;

        app.adjust_price(PRICE_STEP);
        app.adjust_price(PRICE_STEP);

        assert_eq!(
            app.fleet.results.draft_values(),
            &[RowEdit::new("b1").with_price(7000.0)]
        );
    }

    #[tokio::test]
    async fn missing_values_start_from_zero() {
        let mut app = loaded_app().await;
        app.cursor_down();

        app.adjust_length(LENGTH_STEP);

        assert_eq!(
            app.fleet.results.draft_values(),
            &[RowEdit::new("b2").with_length(1.0)]
        );
    }

    #[tokio::test]
    async fn status_subscription_sees_tile_activation() {
        let mut app = loaded_app().await;
        app.cursor_down();

        app.activate_cursor();
        let message = app.selection.try_recv().unwrap();
        app.on_selection(message);

        assert_eq!(app.broadcast_selection.as_deref(), Some("b2"));
    }

    #[tokio::test]
    async fn cursor_stays_in_bounds() {
        let mut app = loaded_app().await;

        app.cursor_down();
        app.cursor_down();
        assert_eq!(app.cursor, 1);
        app.cursor_up();
        app.cursor_up();
        assert_eq!(app.cursor, 0);
    }
}
