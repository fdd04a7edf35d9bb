//! In-memory collaborators for exercising the orchestrator without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geopush_core::{
    Coordinates, DeviceToken, DocumentId, LocalNotification, LocationError, LocationProvider,
    NotificationPresenter, NotifyError, PushMessage, PushRelay, RecordStore, RelayError,
    RelayResponse, StoreError, TokenError, TokenProvider, UserRecord,
};
use tokio::sync::Semaphore;

use crate::clients::WorkflowClients;
use crate::config::WorkflowConfig;
use crate::workflow::Orchestrator;

pub struct FakeTokenProvider {
    result: Result<DeviceToken, TokenError>,
    calls: AtomicUsize,
}

impl FakeTokenProvider {
    pub fn new(result: Result<DeviceToken, TokenError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for FakeTokenProvider {
    async fn acquire_token(&self) -> Result<DeviceToken, TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct FakeLocation {
    result: Result<Coordinates, LocationError>,
}

impl FakeLocation {
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            result: Ok(coordinates),
        }
    }

    pub fn failing(error: LocationError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl LocationProvider for FakeLocation {
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        self.result.clone()
    }
}

/// Succeeds or fails per the script, then succeeds once it runs out.
pub struct ScriptedStore {
    outcomes: Mutex<VecDeque<bool>>,
    records: Mutex<Vec<UserRecord>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedStore {
    pub fn new(outcomes: Vec<bool>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            records: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Every insert consumes one permit from `gate` before answering.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Every record an insert was attempted with.
    pub fn records(&self) -> Vec<UserRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn insert(&self, _collection: &str, record: &UserRecord) -> Result<DocumentId, StoreError> {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let index = {
            let mut records = self.records.lock().unwrap();
            records.push(record.clone());
            records.len()
        };
        let success = self.outcomes.lock().unwrap().pop_front().unwrap_or(true);

        if success {
            Ok(DocumentId(format!("doc-{index}")))
        } else {
            Err(StoreError::Rejected {
                status: 503,
                message: "UNAVAILABLE".to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RelayScript {
    Status(u16),
    Network,
}

/// Plays back the script, then answers 200. A message with no recipient is
/// always answered with 400.
pub struct ScriptedRelay {
    script: Mutex<VecDeque<RelayScript>>,
    messages: Mutex<Vec<PushMessage>>,
}

impl ScriptedRelay {
    pub fn new(script: Vec<RelayScript>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<PushMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushRelay for ScriptedRelay {
    async fn send(&self, message: &PushMessage) -> Result<RelayResponse, RelayError> {
        self.messages.lock().unwrap().push(message.clone());
        if message.to.is_empty() {
            return Ok(RelayResponse::with_status(400));
        }
        match self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RelayScript::Status(200))
        {
            RelayScript::Status(status) => Ok(RelayResponse::with_status(status)),
            RelayScript::Network => Err(RelayError::Network("connection refused".to_string())),
        }
    }
}

pub struct RecordingPresenter {
    shown: Mutex<Vec<LocalNotification>>,
    fail: bool,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn shown(&self) -> Vec<LocalNotification> {
        self.shown.lock().unwrap().clone()
    }
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationPresenter for RecordingPresenter {
    async fn show_now(&self, notification: &LocalNotification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::ChannelMissing("default".to_string()));
        }
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Fakes for every collaborator, kept reachable for assertions after the
/// orchestrator has been built.
pub struct Harness {
    pub tokens: Arc<FakeTokenProvider>,
    pub location: Arc<FakeLocation>,
    pub store: Arc<ScriptedStore>,
    pub relay: Arc<ScriptedRelay>,
    pub presenter: Arc<RecordingPresenter>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(FakeTokenProvider::new(Ok(DeviceToken::new(
                "ExponentPushToken[test]",
            )))),
            location: Arc::new(FakeLocation::at(Coordinates::new(-6.2, 106.8))),
            store: Arc::new(ScriptedStore::new(Vec::new())),
            relay: Arc::new(ScriptedRelay::new(Vec::new())),
            presenter: Arc::new(RecordingPresenter::new()),
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.tokens = Arc::new(FakeTokenProvider::new(Ok(DeviceToken::new(token))));
        self
    }

    pub fn with_token_error(mut self, error: TokenError) -> Self {
        self.tokens = Arc::new(FakeTokenProvider::new(Err(error)));
        self
    }

    pub fn with_location(mut self, location: FakeLocation) -> Self {
        self.location = Arc::new(location);
        self
    }

    pub fn with_store(mut self, store: ScriptedStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    pub fn with_relay(mut self, relay: ScriptedRelay) -> Self {
        self.relay = Arc::new(relay);
        self
    }

    pub fn with_presenter(mut self, presenter: RecordingPresenter) -> Self {
        self.presenter = Arc::new(presenter);
        self
    }

    pub fn clients(&self) -> WorkflowClients {
        WorkflowClients {
            token_provider: self.tokens.clone(),
            location: self.location.clone(),
            store: self.store.clone(),
            relay: self.relay.clone(),
            presenter: self.presenter.clone(),
        }
    }

    pub fn build(&self, config: WorkflowConfig) -> Orchestrator {
        Orchestrator::new(self.clients(), config)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
