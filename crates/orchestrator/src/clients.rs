use std::sync::Arc;

use geopush_core::{LocationProvider, NotificationPresenter, PushRelay, RecordStore, TokenProvider};

/// External collaborators, built once at startup and handed to the
/// orchestrator.
#[derive(Clone)]
pub struct WorkflowClients {
    pub token_provider: Arc<dyn TokenProvider>,
    pub location: Arc<dyn LocationProvider>,
    pub store: Arc<dyn RecordStore>,
    pub relay: Arc<dyn PushRelay>,
    pub presenter: Arc<dyn NotificationPresenter>,
}
