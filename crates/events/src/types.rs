//! Event types published while registering for push and running workflows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All possible events in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Registration events
    /// Push token acquired at startup
    #[serde(rename = "token.acquired")]
    TokenAcquired { token: String },

    /// Push registration failed; the relay step will fail on every run
    #[serde(rename = "token.failed")]
    TokenFailed { message: String },

    // Workflow events
    /// A workflow run began
    #[serde(rename = "run.started")]
    RunStarted { run_id: Uuid },

    /// A trigger arrived while a run was in flight and was dropped
    #[serde(rename = "run.ignored")]
    RunIgnored,

    /// Location could not be read; the record carries sentinel coordinates
    #[serde(rename = "location.fallback")]
    LocationFallback { run_id: Uuid, reason: String },

    /// Persist step finished
    #[serde(rename = "store.completed")]
    StoreCompleted {
        run_id: Uuid,
        success: bool,
        document_id: Option<String>,
    },

    /// Relay step finished
    #[serde(rename = "relay.completed")]
    RelayCompleted {
        run_id: Uuid,
        success: bool,
        status: Option<u16>,
    },

    /// Summary notification displayed
    #[serde(rename = "summary.shown")]
    SummaryShown { run_id: Uuid, body: String },

    /// A workflow run finished all four steps
    #[serde(rename = "run.completed")]
    RunCompleted { run_id: Uuid },

    // System events
    /// Generic error event
    #[serde(rename = "error")]
    Error {
        message: String,
        context: Option<String>,
    },
}

impl Event {
    /// Wire name of the event, as used in the `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::TokenAcquired { .. } => "token.acquired",
            Event::TokenFailed { .. } => "token.failed",
            Event::RunStarted { .. } => "run.started",
            Event::RunIgnored => "run.ignored",
            Event::LocationFallback { .. } => "location.fallback",
            Event::StoreCompleted { .. } => "store.completed",
            Event::RelayCompleted { .. } => "relay.completed",
            Event::SummaryShown { .. } => "summary.shown",
            Event::RunCompleted { .. } => "run.completed",
            Event::Error { .. } => "error",
        }
    }

    /// Get the run ID associated with this event, if any
    pub fn run_id(&self) -> Option<Uuid> {
        match self {
            Event::RunStarted { run_id }
            | Event::LocationFallback { run_id, .. }
            | Event::StoreCompleted { run_id, .. }
            | Event::RelayCompleted { run_id, .. }
            | Event::SummaryShown { run_id, .. }
            | Event::RunCompleted { run_id } => Some(*run_id),
            Event::TokenAcquired { .. }
            | Event::TokenFailed { .. }
            | Event::RunIgnored
            | Event::Error { .. } => None,
        }
    }
}
