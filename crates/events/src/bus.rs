//! Event bus: tokio broadcast fan-out plus a short replay history

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::types::{Event, EventEnvelope};

/// Capacity for the broadcast channel
const DEFAULT_CAPACITY: usize = 256;

/// Envelopes kept for subscribers that connect late
const DEFAULT_HISTORY: usize = 100;

/// Event bus for publishing and subscribing to events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    history: Arc<Mutex<VecDeque<EventEnvelope>>>,
    history_limit: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, DEFAULT_HISTORY)
    }

    pub fn with_capacity(capacity: usize, history_limit: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            history: Arc::new(Mutex::new(VecDeque::with_capacity(history_limit))),
            history_limit,
        }
    }

    /// Wrap `event` in an envelope and publish it.
    pub fn emit(&self, event: Event) -> usize {
        self.publish(EventEnvelope::new(event))
    }

    /// Publish to all current subscribers and append to the history.
    ///
    /// Returns the number of subscribers that received the event; with no
    /// subscribers the event is still recorded in the history.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        if let Ok(mut history) = self.history.lock() {
            if self.history_limit > 0 {
                if history.len() >= self.history_limit {
                    history.pop_front();
                }
                history.push_back(envelope.clone());
            }
        }
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Live events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Oldest-first copy of the retained history.
    pub fn recent(&self) -> Vec<EventEnvelope> {
        self.history
            .lock()
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
