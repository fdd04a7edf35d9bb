use std::sync::Arc;

use events::EventBus;
use orchestrator::Orchestrator;
use push::LocalNotifier;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub event_bus: EventBus,
    pub notifier: Option<Arc<LocalNotifier>>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, event_bus: EventBus) -> Self {
        Self {
            orchestrator,
            event_bus,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<LocalNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }
}
