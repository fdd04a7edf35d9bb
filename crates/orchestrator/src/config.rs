use geopush_core::{UserIdentity, SUMMARY_TITLE};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COLLECTION: &str = "users";
pub const DEFAULT_PUSH_TITLE: &str = "Test FCM";
pub const DEFAULT_PUSH_BODY: &str = "Check your summary notification";

/// What to do with a trigger that arrives while a run is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Drop it.
    Ignore,
    /// Wait for the current run, then run.
    #[default]
    Queue,
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub collection: String,
    pub identity: UserIdentity,
    pub push_title: String,
    pub push_body: String,
    pub summary_title: String,
    pub trigger_policy: TriggerPolicy,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            identity: UserIdentity::default(),
            push_title: DEFAULT_PUSH_TITLE.to_string(),
            push_body: DEFAULT_PUSH_BODY.to_string(),
            summary_title: SUMMARY_TITLE.to_string(),
            trigger_policy: TriggerPolicy::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_identity(mut self, identity: UserIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_push_content(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.push_title = title.into();
        self.push_body = body.into();
        self
    }

    pub fn with_trigger_policy(mut self, policy: TriggerPolicy) -> Self {
        self.trigger_policy = policy;
        self
    }
}
