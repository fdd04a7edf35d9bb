//! OS-level permission negotiation.
//!
//! Callers first read the current [`PermissionStatus`] and only prompt when it
//! is not already granted. [`StaticPermissions`] answers from configuration,
//! which is how a headless host describes the device it stands in for.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    Notifications,
    ForegroundLocation,
}

impl PermissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notifications => "notifications",
            Self::ForegroundLocation => "foreground_location",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

#[async_trait]
pub trait PermissionService: Send + Sync {
    /// Current status without prompting.
    async fn status(&self, kind: PermissionKind) -> PermissionStatus;

    /// Prompt the user and return the resulting status.
    async fn request(&self, kind: PermissionKind) -> PermissionStatus;
}

/// Check the current status and prompt only if it is not granted yet.
pub async fn ensure_granted(
    permissions: &dyn PermissionService,
    kind: PermissionKind,
) -> PermissionStatus {
    let existing = permissions.status(kind).await;
    if existing.is_granted() {
        return existing;
    }
    permissions.request(kind).await
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    current: PermissionStatus,
    on_request: PermissionStatus,
}

/// Config-driven permission table. Each kind has a current status and the
/// status a prompt would produce; prompting persists the answer.
#[derive(Debug, Default)]
pub struct StaticPermissions {
    entries: Mutex<HashMap<PermissionKind, Entry>>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        self,
        kind: PermissionKind,
        current: PermissionStatus,
        on_request: PermissionStatus,
    ) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(kind, Entry { current, on_request });
        }
        self
    }

    /// Every kind already granted.
    pub fn all_granted() -> Self {
        Self::new()
            .with(
                PermissionKind::Notifications,
                PermissionStatus::Granted,
                PermissionStatus::Granted,
            )
            .with(
                PermissionKind::ForegroundLocation,
                PermissionStatus::Granted,
                PermissionStatus::Granted,
            )
    }
}

#[async_trait]
impl PermissionService for StaticPermissions {
    async fn status(&self, kind: PermissionKind) -> PermissionStatus {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&kind).map(|e| e.current))
            .unwrap_or_default()
    }

    async fn request(&self, kind: PermissionKind) -> PermissionStatus {
        let Ok(mut entries) = self.entries.lock() else {
            return PermissionStatus::Denied;
        };
        let entry = entries.entry(kind).or_insert(Entry {
            current: PermissionStatus::Undetermined,
            on_request: PermissionStatus::Denied,
        });
        if !entry.current.is_granted() {
            entry.current = entry.on_request;
        }
        debug!(permission = kind.as_str(), status = ?entry.current, "Permission requested");
        entry.current
    }
}
