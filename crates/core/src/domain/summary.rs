use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::counters::SessionCounters;

pub const SUMMARY_TITLE: &str = "Summary";

/// Counter values a single run observed when its store and relay steps
/// finished. Rendering is a pure function of these four numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkflowSummary {
    pub store_success: u64,
    pub store_failure: u64,
    pub relay_success: u64,
    pub relay_failure: u64,
}

impl WorkflowSummary {
    /// Store tallies come from the snapshot taken after the persist step and
    /// relay tallies from the one taken after the relay step.
    pub fn from_snapshots(after_store: &SessionCounters, after_relay: &SessionCounters) -> Self {
        Self {
            store_success: after_store.store_success(),
            store_failure: after_store.store_failure(),
            relay_success: after_relay.relay_success(),
            relay_failure: after_relay.relay_failure(),
        }
    }

    pub fn body(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for WorkflowSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Firestore: {} successful, {} failed",
            self.store_success, self.store_failure
        )?;
        write!(
            f,
            "FCM:       {} successful, {} failed",
            self.relay_success, self.relay_failure
        )
    }
}
