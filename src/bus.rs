//! # Selection Bus
//!
//! In-process publish/subscribe channel for "selection changed" notifications.
//!
//! Each subscriber owns an unbounded queue, so `publish` never waits on a slow
//! consumer and every message reaches every subscriber registered at publish
//! time, in publish order. Nothing is retained: a subscriber registered after
//! a publish never sees it. Dropping a [`Subscription`] unregisters it, which
//! ties subscribe/unsubscribe to the owning component's lifetime.

use crate::events::SelectionMessage;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<(u64, mpsc::UnboundedSender<SelectionMessage>)>,
    published: u64,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Application-scoped selection channel; clones share one registry
#[derive(Debug, Clone, Default)]
pub struct SelectionBus {
    registry: Arc<Mutex<Registry>>,
}

impl SelectionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; it receives every later publish until dropped
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, tx));
        debug!(subscriber = id, "Selection subscriber registered");

        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver to every registered subscriber
    ///
    /// Returns the number of subscribers reached.
    pub fn publish(&self, message: SelectionMessage) -> usize {
        let mut registry = lock(&self.registry);
        registry.published += 1;
        registry
            .subscribers
            .retain(|(_, tx)| tx.send(message.clone()).is_ok());
        let delivered = registry.subscribers.len();
        trace!(record_id = %message.record_id, delivered, "Selection published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }

    /// Total publishes since the bus was created
    pub fn published_count(&self) -> u64 {
        lock(&self.registry).published
    }
}

/// Receiving handle of one subscriber
///
/// Unregisters itself from the bus when dropped.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<SelectionMessage>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Wait for the next message; `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<SelectionMessage> {
        self.rx.recv().await
    }

    /// Next queued message, if any
    pub fn try_recv(&mut self) -> Option<SelectionMessage> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).subscribers.retain(|(id, _)| *id != self.id);
            debug!(subscriber = self.id, "Selection subscriber unregistered");
        }
    }
}
