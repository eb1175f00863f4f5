// UI events that flow from components to the search container
//
// Components never hold references to each other. They emit `UiEvent`s into
// an `EventSink`, and the container routes them (search → coordinator,
// boatselect → coordinator, loading pulses → spinner, toasts → toast queue).
// Using an enum keeps the contract type-safe across async tasks.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Event emitted by a component toward its container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")] // {"type": "search", "boatTypeId": ...}
pub enum UiEvent {
    /// The user picked a boat type in the filter
    Search {
        #[serde(rename = "boatTypeId")]
        boat_type_id: String,
    },

    /// A tile was activated
    #[serde(rename = "boatselect")]
    BoatSelect {
        #[serde(rename = "boatId")]
        boat_id: String,
    },

    /// A request started (always paired with `DoneLoading`)
    Loading,

    /// A request finished, successfully or not
    DoneLoading,

    /// User-facing notification
    Toast(Toast),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Success,
    Error,
}

/// Toast notification payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            variant: ToastVariant::Success,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            variant: ToastVariant::Error,
        }
    }
}

/// Selection bus payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionMessage {
    #[serde(rename = "recordId")]
    pub record_id: String,
}

impl SelectionMessage {
    pub fn new(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
        }
    }
}

/// Sending half of the UI event channel, cloned into every component
///
/// Unbounded: emitting never waits on the container.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit an event; a closed container just drops it
    pub fn emit(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("UI event dropped, container is gone");
        }
    }

    pub fn toast(&self, toast: Toast) {
        self.emit(UiEvent::Toast(toast));
    }
}

/// Outstanding-request counter shared between a component and its guards
#[derive(Debug, Clone, Default)]
pub struct LoadingState {
    pending: Arc<AtomicUsize>,
}

impl LoadingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `Loading` and return the guard that will emit `DoneLoading`
    pub fn start(&self, sink: &EventSink) -> LoadingGuard {
        self.pending.fetch_add(1, Ordering::SeqCst);
        sink.emit(UiEvent::Loading);
        LoadingGuard {
            sink: sink.clone(),
            pending: Arc::clone(&self.pending),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }
}

/// Emits `DoneLoading` when dropped
///
/// Completion, failure and cancellation all end in a drop, so every
/// `Loading` gets its matching `DoneLoading`.
#[derive(Debug)]
pub struct LoadingGuard {
    sink: EventSink,
    pending: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        self.sink.emit(UiEvent::DoneLoading);
    }
}
