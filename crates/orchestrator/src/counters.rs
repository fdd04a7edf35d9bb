use std::sync::Mutex;

use geopush_core::SessionCounters;

/// Process-wide counters behind one lock.
#[derive(Debug, Default)]
pub struct CounterStore {
    inner: Mutex<SessionCounters>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_store_outcome(&self, success: bool) -> SessionCounters {
        self.with(|c| c.record_store_outcome(success))
    }

    pub fn record_relay_outcome(&self, success: bool) -> SessionCounters {
        self.with(|c| c.record_relay_outcome(success))
    }

    pub fn snapshot(&self) -> SessionCounters {
        self.with(|c| *c)
    }

    fn with<T>(&self, f: impl FnOnce(&mut SessionCounters) -> T) -> T {
        // A panic while holding the lock cannot leave the counters half-updated.
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(CounterStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.record_store_outcome(i % 2 == 0);
                        store.record_relay_outcome(true);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.store_total(), 800);
        assert_eq!(snapshot.store_success(), 400);
        assert_eq!(snapshot.relay_success(), 800);
    }
}
