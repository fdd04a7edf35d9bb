use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use events::{Event, EventBus};
use geopush_core::{
    Coordinates, DeviceToken, LocalNotification, PushMessage, SessionCounters, TokenError,
    UserRecord, WorkflowSummary,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clients::WorkflowClients;
use crate::config::{TriggerPolicy, WorkflowConfig};
use crate::counters::CounterStore;
use crate::error::{OrchestratorError, Result};
use crate::report::{OrchestratorStatus, RunReport, StartupReport, TriggerOutcome};
use crate::run_guard::RunGuard;
use crate::state_machine::RunState;

/// Counts a caller waiting for the run lock until it gets the lock or
/// stops waiting.
struct PendingSlot<'a>(&'a AtomicUsize);

impl<'a> PendingSlot<'a> {
    fn enter(pending: &'a AtomicUsize) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self(pending)
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct LocationStep {
    coordinates: Option<Coordinates>,
    error: Option<String>,
}

struct PersistStep {
    after: SessionCounters,
    document_id: Option<String>,
    error: Option<String>,
}

struct RelayStep {
    after: SessionCounters,
    status: Option<u16>,
    error: Option<String>,
}

/// Drives location → persist → relay → summarize and owns the session
/// counters and the device token.
///
/// Runs never fail outward: every collaborator call is its own failure
/// boundary and the summary step always executes.
pub struct Orchestrator {
    clients: WorkflowClients,
    config: WorkflowConfig,
    counters: CounterStore,
    token: RwLock<Option<DeviceToken>>,
    startup_error: RwLock<Option<TokenError>>,
    run_lock: tokio::sync::Mutex<()>,
    state: Mutex<RunState>,
    pending: AtomicUsize,
    last_report: Mutex<Option<RunReport>>,
    event_bus: Option<EventBus>,
}

impl Orchestrator {
    pub fn new(clients: WorkflowClients, config: WorkflowConfig) -> Self {
        Self {
            clients,
            config,
            counters: CounterStore::new(),
            token: RwLock::new(None),
            startup_error: RwLock::new(None),
            run_lock: tokio::sync::Mutex::new(()),
            state: Mutex::new(RunState::Idle),
            pending: AtomicUsize::new(0),
            last_report: Mutex::new(None),
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    fn emit(&self, event: Event) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event);
        }
    }

    /// Acquire the push token. Performed once: a held token is returned
    /// without asking the provider again.
    pub async fn register_push(&self) -> StartupReport {
        if let Some(token) = self.token() {
            return StartupReport::Registered {
                token: token.to_string(),
            };
        }

        match self.clients.token_provider.acquire_token().await {
            Ok(token) => {
                info!(token = %token, "Registered for push notifications");
                self.emit(Event::TokenAcquired {
                    token: token.to_string(),
                });
                let report = StartupReport::Registered {
                    token: token.to_string(),
                };
                self.set_token(token);
                report
            }
            Err(error) => {
                warn!(error = %error, "Push registration failed");
                self.emit(Event::TokenFailed {
                    message: error.to_string(),
                });
                if let Ok(mut slot) = self.startup_error.write() {
                    *slot = Some(error.clone());
                }
                StartupReport::Failed { error }
            }
        }
    }

    pub fn set_token(&self, token: DeviceToken) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token);
        }
        if let Ok(mut slot) = self.startup_error.write() {
            *slot = None;
        }
    }

    pub fn token(&self) -> Option<DeviceToken> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    pub fn startup_error(&self) -> Option<TokenError> {
        self.startup_error.read().ok().and_then(|e| e.clone())
    }

    pub fn counters(&self) -> SessionCounters {
        self.counters.snapshot()
    }

    pub fn run_state(&self) -> RunState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn pending_triggers(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn last_report(&self) -> Option<RunReport> {
        self.last_report.lock().ok().and_then(|r| r.clone())
    }

    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            token: self.token().map(|t| t.to_string()),
            startup_error: self.startup_error().map(|e| e.to_string()),
            run_state: self.run_state(),
            pending_triggers: self.pending_triggers(),
            counters: self.counters(),
            last_report: self.last_report(),
        }
    }

    /// Handle a user trigger according to the configured [`TriggerPolicy`].
    pub async fn trigger(&self) -> TriggerOutcome {
        match self.config.trigger_policy {
            TriggerPolicy::Queue => TriggerOutcome::Completed(Box::new(self.run_workflow().await)),
            TriggerPolicy::Ignore => match self.run_lock.try_lock() {
                Ok(permit) => {
                    let report = self.execute().await;
                    drop(permit);
                    TriggerOutcome::Completed(Box::new(report))
                }
                Err(_) => {
                    info!("Trigger ignored, a run is already in progress");
                    self.emit(Event::RunIgnored);
                    TriggerOutcome::Ignored
                }
            },
        }
    }

    /// [`trigger`](Self::trigger) on its own task. The run finishes even if
    /// the caller stops waiting for it.
    pub async fn trigger_detached(self: Arc<Self>) -> Result<TriggerOutcome> {
        tokio::spawn(async move { self.trigger().await })
            .await
            .map_err(|e| OrchestratorError::RunAborted(e.to_string()))
    }

    /// Run the workflow once, waiting for any in-flight run to finish first.
    pub async fn run_workflow(&self) -> RunReport {
        let permit = {
            let _slot = PendingSlot::enter(&self.pending);
            self.run_lock.lock().await
        };

        let report = self.execute().await;
        drop(permit);
        report
    }

    /// Caller must hold `run_lock`.
    async fn execute(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut guard = RunGuard::enter(run_id, &self.state, self.event_bus.as_ref());

        info!(run_id = %run_id, "Workflow run started");
        self.emit(Event::RunStarted { run_id });

        let location = self.locate(run_id).await;
        let persist = self.persist(run_id, location.coordinates).await;
        let relay = self.relay(run_id).await;

        let summary = WorkflowSummary::from_snapshots(&persist.after, &relay.after);
        let summary_shown = self.summarize(run_id, &summary).await;

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            location: location.coordinates,
            location_error: location.error,
            store_ok: persist.error.is_none(),
            document_id: persist.document_id,
            store_error: persist.error,
            relay_ok: relay.error.is_none(),
            relay_status: relay.status,
            relay_error: relay.error,
            summary,
            summary_text: summary.body(),
            summary_shown,
        };

        if let Ok(mut last) = self.last_report.lock() {
            *last = Some(report.clone());
        }
        guard.mark_completed();
        self.emit(Event::RunCompleted { run_id });
        info!(
            run_id = %run_id,
            store_ok = report.store_ok,
            relay_ok = report.relay_ok,
            "Workflow run completed"
        );

        report
    }

    async fn locate(&self, run_id: Uuid) -> LocationStep {
        match self.clients.location.current_coordinates().await {
            Ok(coordinates) => {
                debug!(run_id = %run_id, %coordinates, "Location acquired");
                LocationStep {
                    coordinates: Some(coordinates),
                    error: None,
                }
            }
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Location error, continuing without a position");
                self.emit(Event::LocationFallback {
                    run_id,
                    reason: e.to_string(),
                });
                LocationStep {
                    coordinates: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn persist(&self, run_id: Uuid, location: Option<Coordinates>) -> PersistStep {
        let record = UserRecord::new(self.config.identity.clone(), location);

        let (document_id, error) = match self
            .clients
            .store
            .insert(&self.config.collection, &record)
            .await
        {
            Ok(id) => (Some(id.to_string()), None),
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Store write failed");
                (None, Some(e.to_string()))
            }
        };

        let after = self.counters.record_store_outcome(error.is_none());
        self.emit(Event::StoreCompleted {
            run_id,
            success: error.is_none(),
            document_id: document_id.clone(),
        });

        PersistStep {
            after,
            document_id,
            error,
        }
    }

    async fn relay(&self, run_id: Uuid) -> RelayStep {
        // An unset token is sent as an empty recipient; the relay rejects it.
        let to = self.token().map(|t| t.to_string()).unwrap_or_default();
        if to.is_empty() {
            debug!(run_id = %run_id, "No push token held, relay request has no recipient");
        }
        let message = PushMessage::new(to, &self.config.push_title, &self.config.push_body);

        let (status, error) = match self.clients.relay.send(&message).await {
            Ok(response) if response.is_success() => (Some(response.status), None),
            Ok(response) => {
                let error = format!("Status {}", response.status);
                warn!(run_id = %run_id, error = %error, "Relay delivery failed");
                (Some(response.status), Some(error))
            }
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Relay delivery failed");
                (None, Some(e.to_string()))
            }
        };

        let after = self.counters.record_relay_outcome(error.is_none());
        self.emit(Event::RelayCompleted {
            run_id,
            success: error.is_none(),
            status,
        });

        RelayStep {
            after,
            status,
            error,
        }
    }

    async fn summarize(&self, run_id: Uuid, summary: &WorkflowSummary) -> bool {
        let body = summary.body();
        let notification = LocalNotification::new(&self.config.summary_title, &body);

        match self.clients.presenter.show_now(&notification).await {
            Ok(()) => {
                self.emit(Event::SummaryShown { run_id, body });
                true
            }
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Summary notification could not be shown");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use geopush_core::LocationError;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_and_second_run_summaries() {
        let harness = Harness::new()
            .with_store(ScriptedStore::new(vec![true, false]))
            .with_token("ExponentPushToken[abc]");
        let orchestrator = harness.build(WorkflowConfig::default());
        orchestrator.register_push().await;

        let first = orchestrator.run_workflow().await;
        assert_eq!(
            first.summary_text,
            "Firestore: 1 successful, 0 failed\nFCM:       1 successful, 0 failed"
        );

        let second = orchestrator.run_workflow().await;
        assert_eq!(
            second.summary_text,
            "Firestore: 1 successful, 1 failed\nFCM:       2 successful, 0 failed"
        );

        let shown = harness.presenter.shown();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[1].title, "Summary");
        assert_eq!(shown[1].body, second.summary_text);
    }

    #[tokio::test]
    async fn test_alternating_store_outcomes_sum_to_runs() {
        let outcomes: Vec<bool> = (0..7).map(|i| i % 2 == 0).collect();
        let harness = Harness::new()
            .with_store(ScriptedStore::new(outcomes))
            .with_token("ExponentPushToken[abc]");
        let orchestrator = harness.build(WorkflowConfig::default());
        orchestrator.register_push().await;

        for _ in 0..7 {
            orchestrator.run_workflow().await;
        }

        let counters = orchestrator.counters();
        assert_eq!(counters.store_success() + counters.store_failure(), 7);
        assert_eq!(counters.store_success(), 4);
        assert_eq!(counters.store_failure(), 3);
    }

    #[tokio::test]
    async fn test_relay_failure_still_shows_summary() {
        let harness = Harness::new()
            .with_relay(ScriptedRelay::new(vec![RelayScript::Network, RelayScript::Status(500)]))
            .with_token("ExponentPushToken[abc]");
        let orchestrator = harness.build(WorkflowConfig::default());
        orchestrator.register_push().await;

        let first = orchestrator.run_workflow().await;
        let second = orchestrator.run_workflow().await;

        assert!(!first.relay_ok);
        assert_eq!(first.relay_status, None);
        assert!(!second.relay_ok);
        assert_eq!(second.relay_error.as_deref(), Some("Status 500"));
        assert!(first.summary_shown && second.summary_shown);
        assert_eq!(harness.presenter.shown().len(), 2);
        assert_eq!(orchestrator.counters().relay_failure(), 2);
    }

    #[tokio::test]
    async fn test_location_failure_persists_sentinel_uncounted() {
        let harness = Harness::new()
            .with_location(FakeLocation::failing(LocationError::PermissionDenied))
            .with_token("ExponentPushToken[abc]");
        let orchestrator = harness.build(WorkflowConfig::default());
        orchestrator.register_push().await;

        let report = orchestrator.run_workflow().await;

        assert!(report.location.is_none());
        assert_eq!(
            report.location_error.as_deref(),
            Some("Location permission denied")
        );
        let records = harness.store.records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].has_location());
        assert_eq!(records[0].stored_coordinates(), Coordinates::SENTINEL);

        let counters = orchestrator.counters();
        assert_eq!(counters.store_success(), 1);
        assert_eq!(counters.store_failure(), 0);
        assert_eq!(counters.relay_success(), 1);
        assert_eq!(counters.relay_failure(), 0);
    }

    #[tokio::test]
    async fn test_resolved_location_is_persisted() {
        let harness = Harness::new()
            .with_location(FakeLocation::at(Coordinates::new(-6.2, 106.8)))
            .with_token("ExponentPushToken[abc]");
        let orchestrator = harness.build(WorkflowConfig::default());

        orchestrator.run_workflow().await;

        let records = harness.store.records();
        assert_eq!(records[0].location, Some(Coordinates::new(-6.2, 106.8)));
        assert_eq!(records[0].identity.first, "Raditya");
    }

    #[tokio::test]
    async fn test_token_failure_degrades_relay_only() {
        let harness = Harness::new().with_token_error(TokenError::NoDevice);
        let bus = EventBus::new();
        let orchestrator = harness
            .build(WorkflowConfig::default())
            .with_event_bus(bus.clone());

        let startup = orchestrator.register_push().await;
        assert_eq!(
            startup.alert(),
            Some(("Push Error", "Physical device required".to_string()))
        );
        assert!(orchestrator.token().is_none());

        for _ in 0..3 {
            let report = orchestrator.run_workflow().await;
            assert!(report.store_ok);
            assert!(!report.relay_ok);
            assert!(report.summary_shown);
        }

        let sent = harness.relay.messages();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|m| m.to.is_empty()));

        let counters = orchestrator.counters();
        assert_eq!(counters.store_success(), 3);
        assert_eq!(counters.relay_failure(), 3);
        assert_eq!(counters.relay_success(), 0);

        let types: Vec<_> = bus.recent().iter().map(|e| e.event.event_type()).collect();
        assert_eq!(types[0], "token.failed");
    }

    #[tokio::test]
    async fn test_register_push_runs_once() {
        let harness = Harness::new().with_token("ExponentPushToken[abc]");
        let orchestrator = harness.build(WorkflowConfig::default());

        assert!(orchestrator.register_push().await.is_registered());
        assert!(orchestrator.register_push().await.is_registered());
        assert_eq!(harness.tokens.calls(), 1);
    }

    #[tokio::test]
    async fn test_presenter_failure_is_absorbed() {
        let harness = Harness::new()
            .with_presenter(RecordingPresenter::failing())
            .with_token("ExponentPushToken[abc]");
        let orchestrator = harness.build(WorkflowConfig::default());
        orchestrator.register_push().await;

        let report = orchestrator.run_workflow().await;
        assert!(!report.summary_shown);
        assert_eq!(orchestrator.run_state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_step_order_and_events() {
        let harness = Harness::new().with_token("ExponentPushToken[abc]");
        let bus = EventBus::new();
        let orchestrator = harness
            .build(WorkflowConfig::default())
            .with_event_bus(bus.clone());
        orchestrator.register_push().await;

        let report = orchestrator.run_workflow().await;

        let types: Vec<_> = bus
            .recent()
            .iter()
            .filter(|e| e.event.run_id() == Some(report.run_id))
            .map(|e| e.event.event_type())
            .collect();
        assert_eq!(
            types,
            vec![
                "run.started",
                "store.completed",
                "relay.completed",
                "summary.shown",
                "run.completed"
            ]
        );
    }

    #[tokio::test]
    async fn test_ignore_policy_drops_trigger_while_running() {
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let harness = Harness::new()
            .with_store(ScriptedStore::new(vec![]).gated(gate.clone()))
            .with_token("ExponentPushToken[abc]");
        let orchestrator = Arc::new(
            harness.build(WorkflowConfig::default().with_trigger_policy(TriggerPolicy::Ignore)),
        );
        orchestrator.register_push().await;

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.trigger().await })
        };
        while orchestrator.run_state() != RunState::Running {
            tokio::task::yield_now().await;
        }

        assert!(matches!(orchestrator.trigger().await, TriggerOutcome::Ignored));

        gate.add_permits(1);
        let outcome = first.await.unwrap();
        assert!(outcome.report().is_some());
        assert_eq!(orchestrator.counters().store_total(), 1);
        assert_eq!(orchestrator.run_state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_queue_policy_serializes_runs() {
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let harness = Harness::new()
            .with_store(ScriptedStore::new(vec![]).gated(gate.clone()))
            .with_token("ExponentPushToken[abc]");
        let orchestrator = Arc::new(harness.build(WorkflowConfig::default()));
        orchestrator.register_push().await;

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move { orchestrator.trigger().await })
            })
            .collect();

        while orchestrator.pending_triggers() < 2 {
            tokio::task::yield_now().await;
        }
        gate.add_permits(3);

        let mut summaries = Vec::new();
        for handle in handles {
            let outcome = handle.await.unwrap();
            summaries.push(outcome.report().unwrap().summary.store_success);
        }
        summaries.sort();
        assert_eq!(summaries, vec![1, 2, 3]);
        assert_eq!(orchestrator.counters().store_success(), 3);
    }

    async fn wait_until_idle_with_report(orchestrator: &Orchestrator) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while orchestrator.last_report().is_none() || orchestrator.run_state() != RunState::Idle {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("run did not finish");
    }

    #[tokio::test]
    async fn test_abandoned_trigger_still_completes_run() {
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let harness = Harness::new()
            .with_store(ScriptedStore::new(vec![]).gated(gate.clone()))
            .with_token("ExponentPushToken[abc]");
        let orchestrator = Arc::new(harness.build(WorkflowConfig::default()));
        orchestrator.register_push().await;

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            orchestrator.clone().trigger_detached(),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(orchestrator.run_state(), RunState::Running);

        gate.add_permits(1);
        wait_until_idle_with_report(&orchestrator).await;

        let counters = orchestrator.counters();
        assert_eq!(counters.store_total(), 1);
        assert_eq!(counters.relay_total(), 1);
        assert_eq!(harness.presenter.shown().len(), 1);
        assert!(orchestrator.last_report().unwrap().summary_shown);
    }

    #[tokio::test]
    async fn test_detached_trigger_returns_report() {
        let harness = Harness::new().with_token("ExponentPushToken[abc]");
        let orchestrator = Arc::new(harness.build(WorkflowConfig::default()));
        orchestrator.register_push().await;

        let outcome = orchestrator.clone().trigger_detached().await.unwrap();
        assert_eq!(
            outcome.report().unwrap().summary_text,
            "Firestore: 1 successful, 0 failed\nFCM:       1 successful, 0 failed"
        );
    }

    #[tokio::test]
    async fn test_abandoned_queued_trigger_leaves_no_pending_count() {
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let harness = Harness::new()
            .with_store(ScriptedStore::new(vec![]).gated(gate.clone()))
            .with_token("ExponentPushToken[abc]");
        let orchestrator = Arc::new(harness.build(WorkflowConfig::default()));
        orchestrator.register_push().await;

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.run_workflow().await })
        };
        while orchestrator.run_state() != RunState::Running {
            tokio::task::yield_now().await;
        }

        let waited =
            tokio::time::timeout(Duration::from_millis(20), orchestrator.run_workflow()).await;
        assert!(waited.is_err());
        assert_eq!(orchestrator.pending_triggers(), 0);

        gate.add_permits(1);
        first.await.unwrap();

        assert_eq!(orchestrator.pending_triggers(), 0);
        assert_eq!(orchestrator.run_state(), RunState::Idle);
        assert_eq!(orchestrator.status().pending_triggers, 0);
        assert_eq!(orchestrator.counters().store_total(), 1);
    }

    #[test]
    fn test_summary_construction_is_idempotent() {
        let mut counters = SessionCounters::default();
        let after_store = counters.record_store_outcome(true);
        let after_relay = counters.record_relay_outcome(false);

        let a = WorkflowSummary::from_snapshots(&after_store, &after_relay).body();
        let b = WorkflowSummary::from_snapshots(&after_store, &after_relay).body();
        assert_eq!(a, b);
    }
}
