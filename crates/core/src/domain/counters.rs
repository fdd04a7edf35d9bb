use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Running success/failure tallies for the life of the process.
///
/// The only mutators are [`record_store_outcome`](Self::record_store_outcome)
/// and [`record_relay_outcome`](Self::record_relay_outcome). Both return a copy
/// of the counters taken right after the increment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionCounters {
    store_success: u64,
    store_failure: u64,
    relay_success: u64,
    relay_failure: u64,
}

impl SessionCounters {
    pub fn record_store_outcome(&mut self, success: bool) -> SessionCounters {
        if success {
            self.store_success += 1;
        } else {
            self.store_failure += 1;
        }
        *self
    }

    pub fn record_relay_outcome(&mut self, success: bool) -> SessionCounters {
        if success {
            self.relay_success += 1;
        } else {
            self.relay_failure += 1;
        }
        *self
    }

    pub fn store_success(&self) -> u64 {
        self.store_success
    }

    pub fn store_failure(&self) -> u64 {
        self.store_failure
    }

    pub fn relay_success(&self) -> u64 {
        self.relay_success
    }

    pub fn relay_failure(&self) -> u64 {
        self.relay_failure
    }

    pub fn store_total(&self) -> u64 {
        self.store_success + self.store_failure
    }

    pub fn relay_total(&self) -> u64 {
        self.relay_success + self.relay_failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_counter_per_outcome() {
        let mut counters = SessionCounters::default();

        let after = counters.record_store_outcome(true);
        assert_eq!(after.store_success(), 1);
        assert_eq!(after.store_failure(), 0);

        let after = counters.record_store_outcome(false);
        assert_eq!(after.store_success(), 1);
        assert_eq!(after.store_failure(), 1);
        assert_eq!(after.relay_total(), 0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut counters = SessionCounters::default();
        let snapshot = counters.record_relay_outcome(false);
        counters.record_relay_outcome(true);

        assert_eq!(snapshot.relay_success(), 0);
        assert_eq!(snapshot.relay_failure(), 1);
        assert_eq!(counters.relay_total(), 2);
    }
}
